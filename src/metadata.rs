//! Collaborator seams for metadata, cut data and recording state.
//!
//! The engine never parses recording sidecar files or talks to the timer
//! subsystem itself; it consumes them through these narrow traits. Hosts
//! plug in real readers, tests plug in fixtures, and the inert defaults keep
//! every lookup a clean miss.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::entry::ServiceRef;

/// Sidecar metadata written by the recorder alongside each recording.
pub trait RecordingMetaReader {
    fn name(&self, path: &Path) -> Option<String>;
    fn recorded_at(&self, path: &Path) -> Option<NaiveDateTime>;
    fn length_seconds(&self, path: &Path) -> Option<i64>;
}

/// Broadcast event information captured from the transmission.
pub trait BroadcastInfoReader {
    fn name(&self, path: &Path) -> Option<String>;
    fn recorded_at(&self, path: &Path) -> Option<NaiveDateTime>;
    fn length_seconds(&self, path: &Path) -> Option<i64>;
}

/// Cut-point data maintained by the player and the trim job.
pub trait CutListReader {
    /// Last playback position in seconds; 0 or negative means none.
    fn last_position(&self, path: &Path) -> i64;
    /// Total length stored with the cut data; 0 means unknown.
    fn total_length(&self, path: &Path) -> i64;
}

/// Live recording and trim activity owned by the timer subsystem.
pub trait RecordingActivityTracker {
    fn is_recording(&self, path: &Path) -> bool;
    fn is_remote_recording(&self, path: &Path) -> bool;
    fn is_being_trimmed(&self, path: &Path) -> bool;
    /// Scheduled `(start, end)` of the active recording, unix seconds.
    fn active_window(&self, path: &Path) -> Option<(i64, i64)>;
}

/// Duration query against the playback backend.
pub trait ServiceLengthProbe {
    /// Media length in seconds; 0 when the backend cannot tell.
    fn length_seconds(&self, service: &ServiceRef) -> i64;
}

/// Browser for network-media shares mounted under the virtual root.
pub trait NetworkShareBrowser {
    /// Configured servers as `(path, display name)` pairs.
    fn servers(&self) -> Vec<(PathBuf, String)>;
    /// Listing of a server sub-path: `(directories, files)`, each entry a
    /// `(path, display name)` pair.
    fn list(&self, path: &Path) -> (Vec<(PathBuf, String)>, Vec<(PathBuf, String)>);
}

/// Collaborator bundle injected into the list controller.
pub struct Collaborators {
    pub recording_meta: Box<dyn RecordingMetaReader>,
    pub broadcast_info: Box<dyn BroadcastInfoReader>,
    pub cut_list: Box<dyn CutListReader>,
    pub recording_activity: Box<dyn RecordingActivityTracker>,
    pub service_lengths: Box<dyn ServiceLengthProbe>,
    pub network_shares: Box<dyn NetworkShareBrowser>,
}

impl Default for Collaborators {
    fn default() -> Collaborators {
        Collaborators {
            recording_meta: Box::new(NoMetadata),
            broadcast_info: Box::new(NoMetadata),
            cut_list: Box::new(NoCutData),
            recording_activity: Box::new(NoActivity),
            service_lengths: Box::new(NoLengths),
            network_shares: Box::new(NoShares),
        }
    }
}

/// Inert resolver: every lookup misses.
pub struct NoMetadata;

impl RecordingMetaReader for NoMetadata {
    fn name(&self, _path: &Path) -> Option<String> {
        None
    }
    fn recorded_at(&self, _path: &Path) -> Option<NaiveDateTime> {
        None
    }
    fn length_seconds(&self, _path: &Path) -> Option<i64> {
        None
    }
}

impl BroadcastInfoReader for NoMetadata {
    fn name(&self, _path: &Path) -> Option<String> {
        None
    }
    fn recorded_at(&self, _path: &Path) -> Option<NaiveDateTime> {
        None
    }
    fn length_seconds(&self, _path: &Path) -> Option<i64> {
        None
    }
}

/// Inert cut-data reader.
pub struct NoCutData;

impl CutListReader for NoCutData {
    fn last_position(&self, _path: &Path) -> i64 {
        0
    }
    fn total_length(&self, _path: &Path) -> i64 {
        0
    }
}

/// Inert activity tracker: nothing records, nothing trims.
pub struct NoActivity;

impl RecordingActivityTracker for NoActivity {
    fn is_recording(&self, _path: &Path) -> bool {
        false
    }
    fn is_remote_recording(&self, _path: &Path) -> bool {
        false
    }
    fn is_being_trimmed(&self, _path: &Path) -> bool {
        false
    }
    fn active_window(&self, _path: &Path) -> Option<(i64, i64)> {
        None
    }
}

/// Inert backend probe.
pub struct NoLengths;

impl ServiceLengthProbe for NoLengths {
    fn length_seconds(&self, _service: &ServiceRef) -> i64 {
        0
    }
}

/// Inert share browser: no servers configured.
pub struct NoShares;

impl NetworkShareBrowser for NoShares {
    fn servers(&self) -> Vec<(PathBuf, String)> {
        Vec::new()
    }
    fn list(&self, _path: &Path) -> (Vec<(PathBuf, String)>, Vec<(PathBuf, String)>) {
        (Vec::new(), Vec::new())
    }
}
