//! Entry construction: scan descriptors plus resolver metadata become rows.
//!
//! Title priority is recorder sidecar metadata, then captured broadcast
//! information, then the filename grammar, then the raw filename. The date
//! falls back from the embedded timestamp through resolver timestamps to the
//! filesystem modification time. Sort keys are computed before the title is
//! decorated, so cut-number and extension suffixes never affect ordering.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use log::debug;

use crate::config::Config;
use crate::entry::{EntryKind, MediaEntry, SortKeys};
use crate::extensions::{MediaExtensions, NETWORK_FILE_TAG};
use crate::filename_parser::parse_stem;
use crate::metadata::{BroadcastInfoReader, RecordingMetaReader};
use crate::scanner::{ScanTag, ScannedItem};
use crate::service_resolver::resolve_service;

/// Format of the chronological sort key.
const DATE_KEY_FORMAT: &str = "%Y%m%d%H%M";

fn modification_time(path: &Path) -> Option<NaiveDateTime> {
    let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).naive_local())
}

fn node_kind(tag: &ScanTag) -> EntryKind {
    match tag {
        ScanTag::Directory => EntryKind::Directory,
        ScanTag::Up => EntryKind::Up,
        ScanTag::Trash => EntryKind::Trash,
        ScanTag::LatestRecordings => EntryKind::LatestRecordings,
        ScanTag::NetworkRoot => EntryKind::VlcRoot,
        ScanTag::NetworkServer => EntryKind::VlcServer,
        ScanTag::NetworkDirectory => EntryKind::VlcDirectory,
        ScanTag::Bookmark => EntryKind::Bookmark,
        ScanTag::Media(_) | ScanTag::NetworkFile => EntryKind::UnknownVirtual,
    }
}

/// Builds canonical list rows out of raw scan descriptors.
pub struct EntryBuilder<'a> {
    extensions: &'a MediaExtensions,
    config: &'a Config,
    recording_meta: &'a dyn RecordingMetaReader,
    broadcast_info: &'a dyn BroadcastInfoReader,
}

impl<'a> EntryBuilder<'a> {
    pub fn new(
        extensions: &'a MediaExtensions,
        config: &'a Config,
        recording_meta: &'a dyn RecordingMetaReader,
        broadcast_info: &'a dyn BroadcastInfoReader,
    ) -> EntryBuilder<'a> {
        EntryBuilder {
            extensions,
            config,
            recording_meta,
            broadcast_info,
        }
    }

    /// Directory or pseudo-folder row: no sort keys, no date, never
    /// selectable.
    pub fn build_node(&self, item: &ScannedItem) -> MediaEntry {
        let service = resolve_service(self.extensions, &item.path, &item.name, "");
        MediaEntry::node(service, item.name.clone(), item.path.clone(), node_kind(&item.tag))
    }

    fn file_kind(&self, ext: &str, tag: &ScanTag) -> EntryKind {
        if *tag == ScanTag::NetworkFile {
            return EntryKind::Video;
        }
        if self.extensions.is_video(ext) {
            EntryKind::Video
        } else if self.extensions.is_audio(ext) {
            EntryKind::Audio
        } else if self.extensions.is_playlist(ext) {
            EntryKind::Playlist
        } else if self.extensions.is_disc_structure(ext) {
            EntryKind::DiscStructure
        } else {
            EntryKind::UnknownVirtual
        }
    }

    /// Media-file row with resolved title, date, sort keys and service.
    pub fn build_file(&self, item: &ScannedItem) -> MediaEntry {
        let ext = match &item.tag {
            ScanTag::Media(ext) => ext.as_str(),
            ScanTag::NetworkFile => NETWORK_FILE_TAG,
            _ => "",
        };

        let has_ext_suffix = !ext.is_empty()
            && item
                .name
                .get(item.name.len().saturating_sub(ext.len())..)
                .map_or(false, |tail| tail.eq_ignore_ascii_case(ext));
        let stem = if has_ext_suffix {
            &item.name[..item.name.len() - ext.len()]
        } else {
            item.name.as_str()
        };
        let parsed = parse_stem(stem);

        // Resolver metadata beats the filename; the raw filename is the
        // last resort when everything else came up empty.
        let mut resolver_date = None;
        let mut length = 0;
        let mut resolved_name = None;
        if self.config.recordings.metadata_from_recordings {
            resolved_name = self.recording_meta.name(&item.path);
            if resolved_name.is_some() {
                resolver_date = self.recording_meta.recorded_at(&item.path);
                length = self.recording_meta.length_seconds(&item.path).unwrap_or(0);
            }
        }
        if resolved_name.is_none() && self.config.recordings.metadata_from_broadcast {
            resolved_name = self.broadcast_info.name(&item.path);
            if resolved_name.is_some() {
                resolver_date = self.broadcast_info.recorded_at(&item.path);
                length = self.broadcast_info.length_seconds(&item.path).unwrap_or(0);
            }
        }

        let mut title = resolved_name.unwrap_or_else(|| parsed.title.clone());
        if title.is_empty() {
            title = item.name.clone();
        }

        let recorded_at = parsed
            .recorded_at
            .or(resolver_date)
            .or_else(|| modification_time(&item.path));
        if recorded_at.is_none() {
            debug!("No date source for {}", item.path.display());
        }

        let date_key = recorded_at.map(|date| date.format(DATE_KEY_FORMAT).to_string());
        let alpha_key = format!(
            "{}{}{}",
            title.to_lowercase(),
            parsed.cut_number,
            date_key.as_deref().unwrap_or("")
        );

        // Decoration happens after the keys so it never affects ordering.
        if self.config.display.show_cut_number && !parsed.cut_number.is_empty() {
            title.push(' ');
            title.push_str(&parsed.cut_number);
        }
        if self.config.display.show_extension && ext.len() > 1 {
            title.push(' ');
            title.push_str(&ext[1..]);
        }

        let service = resolve_service(self.extensions, &item.path, &title, ext);
        MediaEntry {
            service,
            sort_keys: SortKeys {
                alpha: Some(alpha_key),
                date: date_key,
            },
            recorded_at,
            title,
            path: item.path.clone(),
            selection_rank: 0,
            length_seconds: length,
            kind: self.file_kind(ext, &item.tag),
        }
    }
}
