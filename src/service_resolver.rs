//! Playback-service resolution.
//!
//! Maps a path plus extension onto the backend service family and attaches
//! the final display name. Disc structures get the conventional multi-disc
//! naming treatment so "Disk 1" folders inherit their parent title.

use std::path::Path;

use crate::entry::{ServiceId, ServiceRef};
use crate::extensions::{MediaExtensions, PlayerClass};
use crate::scanner::capitalize;

/// Multi-disc folder prefixes recognized by the disc naming rule.
const DISC_FOLDER_PREFIXES: [&str; 2] = ["Disk ", "DVD "];

fn disc_display_name(path: &Path) -> Option<String> {
    let raw = path.to_string_lossy();
    let stem = if let Some(stripped) = raw.strip_suffix("/VIDEO_TS") {
        stripped
    } else if raw.ends_with('/') {
        raw.trim_end_matches('/')
    } else {
        return None;
    };

    let mut segments = stem.rsplit('/');
    let candidate = segments.next()?;
    let parent = segments.next()?;
    if DISC_FOLDER_PREFIXES
        .iter()
        .any(|prefix| candidate.starts_with(prefix))
    {
        Some(format!("{} - {}", parent, candidate))
    } else {
        Some(candidate.to_string())
    }
}

/// Builds the backend identifier for a path. `name` overrides the display
/// name; when empty the capitalized basename is used.
pub fn resolve_service(
    extensions: &MediaExtensions,
    path: &Path,
    name: &str,
    ext: &str,
) -> ServiceRef {
    let service_id = match extensions.player_class(ext) {
        Some(PlayerClass::BroadcastStream) => ServiceId::Dvb,
        Some(PlayerClass::M2tsStream) => ServiceId::M2ts,
        Some(PlayerClass::DiscStructure) => ServiceId::Dvd,
        Some(PlayerClass::GenericContainer) | Some(PlayerClass::ExternalPlugin) => {
            ServiceId::Generic
        }
        None => ServiceId::Structure,
    };

    let mut display_name = if name.is_empty() {
        path.file_name()
            .map(|base| capitalize(&base.to_string_lossy()))
            .unwrap_or_default()
    } else {
        name.to_string()
    };

    if service_id == ServiceId::Dvd {
        if let Some(disc_name) = disc_display_name(path) {
            display_name = disc_name;
        }
    }

    ServiceRef::new(service_id, path.to_path_buf(), display_name)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::entry::ServiceId;
    use crate::extensions::MediaExtensions;

    use super::resolve_service;

    fn table() -> MediaExtensions {
        MediaExtensions::new().expect("default table should validate")
    }

    #[test]
    fn test_extension_picks_backend_family() {
        let extensions = table();
        let dvb = resolve_service(&extensions, Path::new("/m/rec.ts"), "Rec", ".ts");
        assert_eq!(dvb.service_id, ServiceId::Dvb);

        let m2ts = resolve_service(&extensions, Path::new("/m/clip.m2ts"), "Clip", ".m2ts");
        assert_eq!(m2ts.service_id, ServiceId::M2ts);

        let generic = resolve_service(&extensions, Path::new("/m/film.mkv"), "Film", ".mkv");
        assert_eq!(generic.service_id, ServiceId::Generic);

        let disc = resolve_service(&extensions, Path::new("/m/film.iso"), "Film", ".iso");
        assert_eq!(disc.service_id, ServiceId::Dvd);

        let node = resolve_service(&extensions, Path::new("/m/folder"), "Folder", "");
        assert_eq!(node.service_id, ServiceId::Structure);
    }

    #[test]
    fn test_empty_name_falls_back_to_capitalized_basename() {
        let extensions = table();
        let service = resolve_service(&extensions, Path::new("/m/holiday clip.mkv"), "", ".mkv");
        assert_eq!(service.name, "Holiday clip.mkv");
    }

    #[test]
    fn test_disc_folder_names_join_parent_segments() {
        let extensions = table();
        let service = resolve_service(
            &extensions,
            Path::new("/media/My Movie/Disk 1/VIDEO_TS"),
            "ignored",
            ".ifo",
        );
        assert_eq!(service.name, "My Movie - Disk 1");

        let service = resolve_service(
            &extensions,
            Path::new("/media/Films/My Movie/VIDEO_TS"),
            "ignored",
            ".ifo",
        );
        assert_eq!(service.name, "My Movie");
    }

    #[test]
    fn test_disc_image_files_keep_their_given_name(){
        let extensions = table();
        let service = resolve_service(&extensions, Path::new("/m/backup.iso"), "Backup", ".iso");
        assert_eq!(service.name, "Backup");
    }
}
