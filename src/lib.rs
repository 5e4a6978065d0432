//! Media-list engine for PVR recordings.
//!
//! Indexes a heterogeneous media library (recordings, video/audio files,
//! optical-disc structures, playlists and virtual pseudo-folders) into one
//! ordered, stateful list for a display widget: scanning, filename
//! heuristics, multi-source metadata fallback, two sort regimes with
//! permanent per-directory overrides, watch/record progress, and a
//! selection state machine with dense renumbering.

pub mod config;
pub mod config_persistence;
pub mod deferred;
pub mod entry;
pub mod entry_builder;
pub mod extensions;
pub mod filename_parser;
pub mod metadata;
pub mod movie_list_manager;
pub mod progress;
pub mod scanner;
pub mod selection;
pub mod service_resolver;
pub mod sorting;

pub use config::{sanitize_config, Config};
pub use entry::{EntryKind, MediaEntry, ServiceId, ServiceRef, SortKeys};
pub use metadata::Collaborators;
pub use movie_list_manager::{ListEvent, MovieListManager, RecordingEvent, RecordingState};
pub use progress::{calculate_progress, WatchState};
pub use selection::PendingMode;
pub use sorting::SortMode;
