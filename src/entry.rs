//! List-row data model: entries, kinds, sort keys and service identity.
//!
//! The original widget carried rows as flat tuples; here every row is an
//! explicit record with a tagged kind so call sites stop re-deriving "is this
//! a directory" from extension strings.

use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use chrono::NaiveDateTime;

/// Playback backend family identifier, matching the backend's service ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    /// Broadcast transport-stream service.
    Dvb,
    /// M2TS stream service.
    M2ts,
    /// Generic container / audio service.
    Generic,
    /// Optical-disc structure service.
    Dvd,
    /// Non-playable structure reference (directories, virtual nodes).
    Structure,
}

impl ServiceId {
    /// Numeric id the playback backend registers the service factory under.
    pub fn numeric(self) -> u32 {
        match self {
            ServiceId::Dvb => 0x1,
            ServiceId::M2ts => 0x3,
            ServiceId::Generic => 0x1001,
            ServiceId::Dvd => 0x1111,
            ServiceId::Structure => 0x2,
        }
    }
}

/// Opaque playback-backend identifier, also the entry's stable identity key.
///
/// Equality and hashing cover the service id and path only; the attached
/// display name is presentation data and never part of the identity.
#[derive(Debug, Clone)]
pub struct ServiceRef {
    pub service_id: ServiceId,
    pub path: PathBuf,
    pub name: String,
}

impl ServiceRef {
    pub fn new(service_id: ServiceId, path: PathBuf, name: String) -> ServiceRef {
        ServiceRef {
            service_id,
            path,
            name,
        }
    }

    /// Wire form handed to the playback backend.
    pub fn reference_string(&self) -> String {
        format!("{}:0:{}", self.service_id.numeric(), self.path.display())
    }
}

impl PartialEq for ServiceRef {
    fn eq(&self, other: &ServiceRef) -> bool {
        self.service_id == other.service_id && self.path == other.path
    }
}

impl Eq for ServiceRef {}

impl Hash for ServiceRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.service_id.hash(state);
        self.path.hash(state);
    }
}

/// Row classification driving playability, selection rules and decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Video,
    Audio,
    Playlist,
    DiscStructure,
    Directory,
    Up,
    Trash,
    LatestRecordings,
    Bookmark,
    VlcRoot,
    VlcServer,
    VlcDirectory,
    UnknownVirtual,
}

impl EntryKind {
    /// True for rows the playback backend can open.
    pub fn is_playable(self) -> bool {
        matches!(
            self,
            EntryKind::Video | EntryKind::Audio | EntryKind::Playlist | EntryKind::DiscStructure
        )
    }

    /// True for plain directories and every synthesized pseudo-folder.
    /// Selection is file-only, so these rows never carry a rank.
    pub fn is_node(self) -> bool {
        !self.is_playable()
    }

    /// True for synthesized rows with no filesystem backing of their own.
    pub fn is_virtual(self) -> bool {
        matches!(
            self,
            EntryKind::Up
                | EntryKind::Trash
                | EntryKind::LatestRecordings
                | EntryKind::Bookmark
                | EntryKind::VlcRoot
                | EntryKind::VlcServer
                | EntryKind::VlcDirectory
                | EntryKind::UnknownVirtual
        )
    }
}

/// Precomputed ordering strings; absent on both axes for unsortable rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortKeys {
    pub alpha: Option<String>,
    pub date: Option<String>,
}

impl SortKeys {
    pub fn none() -> SortKeys {
        SortKeys::default()
    }

    /// Unsortable rows are pinned ahead of every sortable row.
    pub fn is_sortable(&self) -> bool {
        self.date.is_some()
    }
}

/// One row of the media list.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub service: ServiceRef,
    pub sort_keys: SortKeys,
    pub recorded_at: Option<NaiveDateTime>,
    pub title: String,
    pub path: PathBuf,
    pub selection_rank: u32,
    pub length_seconds: i64,
    pub kind: EntryKind,
}

impl MediaEntry {
    /// Node row (directory or virtual pseudo-folder) with no sort keys.
    pub fn node(service: ServiceRef, title: String, path: PathBuf, kind: EntryKind) -> MediaEntry {
        MediaEntry {
            service,
            sort_keys: SortKeys::none(),
            recorded_at: None,
            title,
            path,
            selection_rank: 0,
            length_seconds: 0,
            kind,
        }
    }
}
