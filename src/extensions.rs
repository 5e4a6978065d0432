//! Media extension sets and player-class partitioning.
//!
//! The scanner only admits paths whose extension is in the combined media set,
//! and the service resolver picks a playback backend from the player class an
//! extension falls into. Both work against one validated table built once at
//! startup and passed by reference.

use std::collections::HashSet;

pub const EXT_AUDIO: [&str; 8] = [".ac3", ".dts", ".flac", ".m4a", ".mp2", ".mp3", ".ogg", ".wav"];
pub const EXT_VIDEO: [&str; 16] = [
    ".ts", ".avi", ".divx", ".f4v", ".flv", ".img", ".iso", ".m2ts", ".m4v", ".mkv", ".mov",
    ".mp4", ".mpeg", ".mpg", ".mts", ".vob",
];
pub const EXT_PLAYLIST: [&str; 1] = [".m3u"];

const EXT_BROADCAST_STREAM: [&str; 1] = [".ts"];
const EXT_M2TS_STREAM: [&str; 1] = [".m2ts"];
const EXT_DISC_STRUCTURE: [&str; 3] = [".iso", ".img", ".ifo"];

/// Pseudo-extension carried by files served from a network-media share.
pub const NETWORK_FILE_TAG: &str = ".vlcf";

/// Playback backend family an extension resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClass {
    /// Broadcast transport streams played by the DVB service.
    BroadcastStream,
    /// Blu-ray style `.m2ts` streams.
    M2tsStream,
    /// Optical-disc images and structures.
    DiscStructure,
    /// Everything else the generic container player handles.
    GenericContainer,
    /// Files served through the network-media plugin.
    ExternalPlugin,
}

/// Validated extension table shared by the scanner and the service resolver.
#[derive(Debug, Clone)]
pub struct MediaExtensions {
    audio: HashSet<&'static str>,
    video: HashSet<&'static str>,
    playlist: HashSet<&'static str>,
    media: HashSet<&'static str>,
    broadcast_stream: HashSet<&'static str>,
    m2ts_stream: HashSet<&'static str>,
    disc_structure: HashSet<&'static str>,
    generic_container: HashSet<&'static str>,
    external_plugin: HashSet<&'static str>,
}

impl MediaExtensions {
    /// Builds the default table and checks the partition invariant: the five
    /// player classes are pairwise disjoint and their union is exactly the
    /// media set plus the network pseudo-extension and the disc-structure
    /// markers (e.g. `.ifo`) that live outside the media set.
    pub fn new() -> Result<MediaExtensions, String> {
        let audio: HashSet<&'static str> = EXT_AUDIO.into_iter().collect();
        let video: HashSet<&'static str> = EXT_VIDEO.into_iter().collect();
        let playlist: HashSet<&'static str> = EXT_PLAYLIST.into_iter().collect();

        let mut media = HashSet::new();
        media.extend(&audio);
        media.extend(&video);
        media.extend(&playlist);

        let broadcast_stream: HashSet<&'static str> = EXT_BROADCAST_STREAM.into_iter().collect();
        let m2ts_stream: HashSet<&'static str> = EXT_M2TS_STREAM.into_iter().collect();
        let disc_structure: HashSet<&'static str> = EXT_DISC_STRUCTURE.into_iter().collect();
        let external_plugin: HashSet<&'static str> = [NETWORK_FILE_TAG].into_iter().collect();
        let generic_container: HashSet<&'static str> = media
            .iter()
            .copied()
            .filter(|ext| {
                !broadcast_stream.contains(ext)
                    && !m2ts_stream.contains(ext)
                    && !disc_structure.contains(ext)
            })
            .collect();

        let table = MediaExtensions {
            audio,
            video,
            playlist,
            media,
            broadcast_stream,
            m2ts_stream,
            disc_structure,
            generic_container,
            external_plugin,
        };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), String> {
        let classes = [
            ("broadcast-stream", &self.broadcast_stream),
            ("m2ts-stream", &self.m2ts_stream),
            ("disc-structure", &self.disc_structure),
            ("generic-container", &self.generic_container),
            ("external-plugin", &self.external_plugin),
        ];

        for (i, (left_name, left)) in classes.iter().enumerate() {
            for (right_name, right) in classes.iter().skip(i + 1) {
                if let Some(ext) = left.intersection(right).next() {
                    return Err(format!(
                        "player classes {} and {} both claim {}",
                        left_name, right_name, ext
                    ));
                }
            }
        }

        let mut union: HashSet<&'static str> = HashSet::new();
        for (_, class) in &classes {
            union.extend(class.iter());
        }
        let mut expected = self.media.clone();
        expected.insert(NETWORK_FILE_TAG);
        expected.extend(self.disc_structure.iter());
        if union != expected {
            return Err("player classes do not cover the media extension set".to_string());
        }
        Ok(())
    }

    /// True when `ext` (lowercase, dot included) is any recognized media,
    /// playlist or disc extension.
    pub fn is_media(&self, ext: &str) -> bool {
        self.media.contains(ext)
    }

    pub fn is_audio(&self, ext: &str) -> bool {
        self.audio.contains(ext)
    }

    pub fn is_video(&self, ext: &str) -> bool {
        self.video.contains(ext)
    }

    pub fn is_playlist(&self, ext: &str) -> bool {
        self.playlist.contains(ext)
    }

    pub fn is_disc_structure(&self, ext: &str) -> bool {
        self.disc_structure.contains(ext)
    }

    /// Maps an extension to the player class its files are handed to.
    pub fn player_class(&self, ext: &str) -> Option<PlayerClass> {
        if self.broadcast_stream.contains(ext) {
            Some(PlayerClass::BroadcastStream)
        } else if self.m2ts_stream.contains(ext) {
            Some(PlayerClass::M2tsStream)
        } else if self.disc_structure.contains(ext) {
            Some(PlayerClass::DiscStructure)
        } else if self.external_plugin.contains(ext) {
            Some(PlayerClass::ExternalPlugin)
        } else if self.generic_container.contains(ext) {
            Some(PlayerClass::GenericContainer)
        } else {
            None
        }
    }
}

/// Lowercased extension of a file name, dot included; empty for none.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name[pos..].to_ascii_lowercase(),
        _ => String::new(),
    }
}
