//! List-domain orchestrator.
//!
//! Owns the authoritative ordered entry list and the current load path,
//! coordinates scanning, entry building, sorting, selection and progress,
//! and feeds the host widget a stream of repaint events. Everything runs
//! synchronously on the host thread; delayed work goes through the
//! deferred-call queue.

use std::mem;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};

use crate::config::Config;
use crate::deferred::{DeferredCall, DeferredQueue};
use crate::entry::{MediaEntry, ServiceRef};
use crate::entry_builder::EntryBuilder;
use crate::extensions::{extension_of, MediaExtensions};
use crate::metadata::Collaborators;
use crate::progress::{ProgressEngine, WatchState};
use crate::scanner::{
    detect_disc_structure, file_info, read_basic_cfg_file, ScanTag, ScannedItem, Scanner,
    LATEST_RECORDINGS_NAME, NETWORK_ROOT_NAME,
};
use crate::selection::{PendingMode, SelectionState};
use crate::service_resolver::resolve_service;
use crate::sorting::{SortContext, SortMode};

/// Delay before the initial home-path load so the first paint is not
/// blocked by a full scan.
pub const STARTUP_LOAD_DELAY: Duration = Duration::from_secs(10);
/// Settle time between a recording event and the reload it triggers.
pub const RECORDING_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Repaint feed for the host widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// The whole list was replaced; rebuild the view.
    ListReplaced,
    /// One row changed in place.
    EntryInvalidated(usize),
    /// Every row needs a redraw (progress refresh).
    AllInvalidated,
}

/// Notifications from the recording timer subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingEvent {
    /// A recording started writing the given file.
    Started(PathBuf),
    /// A recording finished.
    Ended(PathBuf),
}

/// Recording-related display state of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Active,
    Remote,
    Trimming,
    Idle,
}

/// Coordinates scanning, entry building, ordering and row state for the
/// media list.
pub struct MovieListManager {
    config: Config,
    extensions: MediaExtensions,
    collaborators: Collaborators,
    sort: SortContext,
    selection: SelectionState,
    deferred: DeferredQueue,
    hide_list: Vec<String>,
    no_scan_list: Vec<String>,
    list: Vec<MediaEntry>,
    load_path: PathBuf,
    events: Vec<ListEvent>,
}

impl MovieListManager {
    /// Creates the manager and schedules the initial home-path load.
    pub fn new(config: Config, collaborators: Collaborators) -> Result<MovieListManager, String> {
        let extensions = MediaExtensions::new()?;

        let hide_list = if config.scanner.hide_list_enable {
            read_basic_cfg_file(Path::new(&config.scanner.hide_list_path))
        } else {
            Vec::new()
        };
        let no_scan_list = if config.scanner.no_scan_list_enable {
            read_basic_cfg_file(Path::new(&config.scanner.no_scan_list_path))
        } else {
            Vec::new()
        };

        let sort = SortContext::from_config(&config.sort);
        let load_path = PathBuf::from(&config.paths.home_path);

        let mut deferred = DeferredQueue::new();
        deferred.schedule(
            Instant::now(),
            STARTUP_LOAD_DELAY,
            DeferredCall::Reload(load_path.clone()),
        );

        Ok(MovieListManager {
            config,
            extensions,
            collaborators,
            sort,
            selection: SelectionState::new(),
            deferred,
            hide_list,
            no_scan_list,
            list: Vec::new(),
            load_path,
            events: Vec::new(),
        })
    }

    /// Rebuilds the list for a directory, a single file (incremental), or a
    /// recognized virtual path. Returns `false` for unknown virtual paths,
    /// leaving all state untouched.
    pub fn reload(&mut self, load_path: &Path) -> bool {
        info!("Loading {}", load_path.display());

        let scanner = Scanner::new(
            &self.extensions,
            &self.config,
            &self.hide_list,
            &self.no_scan_list,
        );

        let mut custom: Vec<ScannedItem> = Vec::new();
        let mut subdirs: Vec<ScannedItem> = Vec::new();
        let mut files: Vec<ScannedItem> = Vec::new();
        let mut reset_list = true;
        let mut next_load_path = Some(load_path.to_path_buf());
        let mut forced_mode = None;

        if load_path.is_dir() {
            let (scanned_dirs, scanned_files) = scanner.scan_directory(load_path);
            subdirs = scanned_dirs;
            files = scanned_files;
            custom = scanner.custom_list(load_path, true);
        } else if load_path.is_file() {
            // A single new file extends the current list in place.
            if let Some(item) = file_info(load_path) {
                files.push(item);
            }
            reset_list = false;
            next_load_path = None;
        } else {
            let path_text = load_path.to_string_lossy();
            if path_text.ends_with(NETWORK_ROOT_NAME) {
                debug!("Listing network-media servers");
                subdirs = self
                    .collaborators
                    .network_shares
                    .servers()
                    .into_iter()
                    .map(|(path, name)| ScannedItem::new(path, name, ScanTag::NetworkServer))
                    .collect();
                custom = scanner.custom_list(load_path, false);
            } else if path_text.contains(NETWORK_ROOT_NAME) {
                debug!("Listing network-media share {}", load_path.display());
                let (share_dirs, share_files) =
                    self.collaborators.network_shares.list(load_path);
                subdirs = share_dirs
                    .into_iter()
                    .map(|(path, name)| ScannedItem::new(path, name, ScanTag::NetworkDirectory))
                    .collect();
                files = share_files
                    .into_iter()
                    .map(|(path, name)| ScannedItem::new(path, name, ScanTag::NetworkFile))
                    .collect();
            } else if path_text.ends_with(LATEST_RECORDINGS_NAME) {
                debug!("Collecting latest recordings");
                files = scanner.latest_recordings();
                custom = scanner.custom_list(load_path, false);
                forced_mode = Some(SortMode::Chronological);
            } else {
                warn!("Unrecognized load path {}", load_path.display());
                return false;
            }
        }

        let builder = EntryBuilder::new(
            &self.extensions,
            &self.config,
            self.collaborators.recording_meta.as_ref(),
            self.collaborators.broadcast_info.as_ref(),
        );

        let mut built: Vec<MediaEntry> = Vec::with_capacity(custom.len() + subdirs.len() + files.len());
        for item in custom.iter().chain(subdirs.iter()) {
            built.push(builder.build_node(item));
        }
        for item in &files {
            let entry = builder.build_file(item);
            if self.config.recordings.hide_moving && self.selection.is_moving(&entry.service) {
                continue;
            }
            if self.config.recordings.hide_deleting && self.selection.is_deleting(&entry.service) {
                continue;
            }
            built.push(entry);
        }

        // There is no way back from here; numeric selection does not
        // survive a rebuild.
        let mut old_list = mem::take(&mut self.list);
        self.selection.reset(&mut old_list);

        if let Some(path) = next_load_path {
            self.load_path = path;
            self.sort.enter_directory(&self.load_path);
            if let Some(mode) = forced_mode {
                self.sort.force_mode(mode);
            }
        }

        let merged = if reset_list {
            built
        } else {
            // Incremental: replace rows that reappear, keeping their cached
            // length, and append the rest.
            let mut merged = old_list;
            for mut entry in built {
                match merged.iter().position(|existing| existing.path == entry.path) {
                    Some(index) => {
                        if entry.length_seconds == 0 {
                            entry.length_seconds = merged[index].length_seconds;
                        }
                        merged[index] = entry;
                    }
                    None => merged.push(entry),
                }
            }
            merged
        };

        self.list = self.sort.sort_entries(merged);
        self.selection.apply_pending(&mut self.list);
        self.events.push(ListEvent::ListReplaced);
        true
    }

    /// Invalidates every row so the next draw recomputes progress.
    pub fn refresh(&mut self) {
        self.events.push(ListEvent::AllInvalidated);
    }

    pub fn current_list(&self) -> &[MediaEntry] {
        &self.list
    }

    pub fn load_path(&self) -> &Path {
        &self.load_path
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn entry_at(&self, index: usize) -> Option<&MediaEntry> {
        self.list.get(index)
    }

    pub fn index_of_service(&self, service: &ServiceRef) -> Option<usize> {
        self.list.iter().position(|entry| &entry.service == service)
    }

    pub fn service_at(&self, index: usize) -> Option<&ServiceRef> {
        self.list.get(index).map(|entry| &entry.service)
    }

    pub fn path_of_service(&self, service: &ServiceRef) -> Option<&Path> {
        self.entry_of_service(service).map(|entry| entry.path.as_path())
    }

    pub fn name_of_service(&self, service: &ServiceRef) -> Option<&str> {
        self.entry_of_service(service).map(|entry| entry.title.as_str())
    }

    pub fn length_of_service(&self, service: &ServiceRef) -> i64 {
        self.entry_of_service(service)
            .map(|entry| entry.length_seconds)
            .unwrap_or(0)
    }

    fn entry_of_service(&self, service: &ServiceRef) -> Option<&MediaEntry> {
        self.list.iter().find(|entry| &entry.service == service)
    }

    /// Writes a freshly determined length into the entry cache.
    pub fn update_length(&mut self, service: &ServiceRef, length_seconds: i64) {
        if let Some(index) = self.index_of_service(service) {
            if self.list[index].length_seconds != length_seconds {
                self.list[index].length_seconds = length_seconds;
                self.events.push(ListEvent::EntryInvalidated(index));
            }
        }
    }

    /// Watch progress of the row at `index`; see
    /// [`ProgressEngine::entry_progress`] for the fallback chain.
    pub fn progress_at(
        &mut self,
        index: usize,
        last_override: i64,
        force_recalc: bool,
    ) -> Option<i32> {
        let entry = self.list.get_mut(index)?;
        let engine = ProgressEngine::new(
            self.collaborators.cut_list.as_ref(),
            self.collaborators.service_lengths.as_ref(),
        );
        Some(engine.entry_progress(entry, last_override, force_recalc))
    }

    /// Progress of a running recording at `now_unix` wall-clock seconds.
    pub fn record_progress(&self, path: &Path, now_unix: i64) -> i32 {
        let engine = ProgressEngine::new(
            self.collaborators.cut_list.as_ref(),
            self.collaborators.service_lengths.as_ref(),
        );
        engine.record_progress(self.collaborators.recording_activity.as_ref(), path, now_unix)
    }

    /// Watch-state classification of a progress value under the configured
    /// thresholds.
    pub fn watch_state(&self, progress: i32) -> Option<WatchState> {
        WatchState::classify(progress, &self.config.progress)
    }

    /// Recording-related display state of an entry. Recording checks are
    /// only worth their cost for entries dated within the last day; trim
    /// state is always consulted.
    pub fn recording_state(&self, entry: &MediaEntry, now: NaiveDateTime) -> RecordingState {
        let activity = self.collaborators.recording_activity.as_ref();
        let latest = entry
            .recorded_at
            .map(|date| (now - date).num_days() < 1)
            .unwrap_or(false);

        if latest && activity.is_recording(&entry.path) {
            RecordingState::Active
        } else if latest
            && self.config.recordings.remote_recordings
            && activity.is_remote_recording(&entry.path)
        {
            RecordingState::Remote
        } else if activity.is_being_trimmed(&entry.path) {
            RecordingState::Trimming
        } else {
            RecordingState::Idle
        }
    }

    /// Toggles selection of the row at `index`; emits an invalidation for
    /// every renumbered row.
    pub fn toggle_selection(&mut self, index: usize) {
        let invalidated = self.selection.toggle(&mut self.list, index);
        self.events
            .extend(invalidated.into_iter().map(ListEvent::EntryInvalidated));
    }

    pub fn toggle_selection_of(&mut self, service: &ServiceRef) {
        if let Some(index) = self.index_of_service(service) {
            self.toggle_selection(index);
        }
    }

    /// Parks or releases an entry for an external move/delete job.
    pub fn highlight_service(&mut self, enable: bool, mode: PendingMode, service: &ServiceRef) {
        if enable {
            let invalidated = self.selection.mark_pending(&mut self.list, service, mode);
            self.events
                .extend(invalidated.into_iter().map(ListEvent::EntryInvalidated));
        } else if let Some(index) = self.selection.clear_pending(&mut self.list, service, mode) {
            self.events.push(ListEvent::EntryInvalidated(index));
        }
    }

    pub fn service_busy(&self, service: &ServiceRef) -> bool {
        self.selection.is_busy(service)
    }

    pub fn service_moving(&self, service: &ServiceRef) -> bool {
        self.selection.is_moving(service)
    }

    pub fn service_deleting(&self, service: &ServiceRef) -> bool {
        self.selection.is_deleting(service)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.selected_count()
    }

    /// Working set for an external operation: the recorded selection, or
    /// the cursor row when nothing is selected.
    pub fn make_selection_list(&self, cursor_index: usize) -> Vec<ServiceRef> {
        self.selection.selected_set(&self.list, cursor_index)
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset(&mut self.list);
        self.events.push(ListEvent::AllInvalidated);
    }

    /// Deselects a service if it is selected, otherwise just invalidates
    /// its row.
    pub fn unselect_service(&mut self, service: &ServiceRef) {
        if let Some(index) = self.index_of_service(service) {
            if self.list[index].selection_rank > 0 {
                self.toggle_selection(index);
            } else {
                self.events.push(ListEvent::EntryInvalidated(index));
            }
        }
    }

    /// Drops one entry without a rescan (after an external delete).
    pub fn remove_service(&mut self, service: &ServiceRef) {
        let before = self.list.len();
        self.list.retain(|entry| &entry.service != service);
        if self.list.len() != before {
            self.events.push(ListEvent::ListReplaced);
        }
    }

    /// `(active mode, Some(active == permanent))` for the current path.
    pub fn sort_mode(&self) -> (SortMode, Option<bool>) {
        self.sort.mode_with_permanence(&self.load_path)
    }

    /// Switches the sort regime and reorders the list in place.
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort.set_mode(mode);
        let list = mem::take(&mut self.list);
        self.list = self.sort.sort_entries(list);
        self.events.push(ListEvent::ListReplaced);
    }

    /// Records a permanent sort override and mirrors it into the config for
    /// persistence.
    pub fn set_permanent_sort(&mut self, path: &Path, mode: SortMode) {
        self.sort.set_permanent(path, mode);
        self.config.sort.permanent = self.sort.permanent_table();
    }

    pub fn clear_permanent_sort(&mut self, path: &Path) {
        self.sort.clear_permanent(path);
        self.config.sort.permanent = self.sort.permanent_table();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Count of allowed-extension children of a directory, for trash and
    /// directory row decoration.
    pub fn directory_media_count(&self, path: &Path) -> usize {
        let scanner = Scanner::new(
            &self.extensions,
            &self.config,
            &self.hide_list,
            &self.no_scan_list,
        );
        scanner.dir_info(path)
    }

    /// Lazy enumeration of playable rows starting at `cursor`, wrapping
    /// around once and skipping rows parked on a move or delete job.
    pub fn next_playable_from(&self, cursor: usize) -> impl Iterator<Item = &ServiceRef> + '_ {
        let len = self.list.len();
        (0..len)
            .map(move |offset| &self.list[(cursor + offset) % len])
            .filter(|entry| entry.kind.is_playable() && !self.selection.is_busy(&entry.service))
            .map(|entry| &entry.service)
    }

    /// Every playable file below a directory, in walk order, honoring disc
    /// detection and skipping busy rows. Used when playback starts on a
    /// directory row.
    pub fn playable_under(&self, path: &Path) -> Vec<ServiceRef> {
        let mut found = Vec::new();
        self.collect_playable(path, &mut found);
        found
    }

    fn collect_playable(&self, dir: &Path, found: &mut Vec<ServiceRef>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Failed to read directory {}: {}", dir.display(), err);
                return;
            }
        };

        let mut subdirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
        subdirs.sort_unstable();
        files.sort_unstable();

        let mut descend = Vec::new();
        for subdir in subdirs {
            match detect_disc_structure(&subdir, self.config.scanner.no_scan_linked) {
                Some(marker) => {
                    let name = subdir
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let ext = extension_of(&marker.to_string_lossy());
                    let disc_path = marker.parent().unwrap_or(&subdir).to_path_buf();
                    let service = resolve_service(&self.extensions, &disc_path, &name, &ext);
                    if !self.selection.is_busy(&service) {
                        found.push(service);
                    }
                }
                None => descend.push(subdir),
            }
        }

        for file in files {
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let ext = extension_of(&name);
            if !self.extensions.is_media(&ext) {
                continue;
            }
            let service = resolve_service(&self.extensions, &file, &name, &ext);
            if !self.selection.is_busy(&service) {
                found.push(service);
            }
        }

        for subdir in descend {
            self.collect_playable(&subdir, found);
        }
    }

    /// Handles a recording notification: a start in the current directory
    /// triggers a deferred incremental reload (full when the list is still
    /// empty), an end triggers a deferred refresh.
    pub fn recording_event(&mut self, event: RecordingEvent, now: Instant) {
        match event {
            RecordingEvent::Started(file) => {
                let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
                if parent != self.load_path {
                    return;
                }
                if self.list.is_empty() {
                    debug!("Recording started, scheduling full reload");
                    self.deferred.schedule(
                        now,
                        RECORDING_SETTLE_DELAY,
                        DeferredCall::Reload(self.load_path.clone()),
                    );
                } else {
                    debug!("Recording started, scheduling incremental reload");
                    self.deferred
                        .schedule(now, RECORDING_SETTLE_DELAY, DeferredCall::Reload(file));
                }
            }
            RecordingEvent::Ended(_) => {
                debug!("Recording ended, scheduling refresh");
                self.deferred
                    .schedule(now, RECORDING_SETTLE_DELAY, DeferredCall::Refresh);
            }
        }
    }

    /// Executes every deferred call due at `now`. The host pumps this from
    /// its event loop.
    pub fn pump(&mut self, now: Instant) {
        for call in self.deferred.drain_due(now) {
            match call {
                DeferredCall::Reload(path) => {
                    self.reload(&path);
                }
                DeferredCall::Refresh => self.refresh(),
            }
        }
    }

    /// Drains the accumulated repaint events.
    pub fn take_events(&mut self) -> Vec<ListEvent> {
        mem::take(&mut self.events)
    }
}

impl std::fmt::Debug for MovieListManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieListManager")
            .field("load_path", &self.load_path)
            .field("entries", &self.list.len())
            .field("selected", &self.selection.selected_count())
            .finish()
    }
}

/// Current local time for recording-state queries.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    use crate::config::Config;
    use crate::entry::EntryKind;
    use crate::metadata::Collaborators;
    use crate::selection::PendingMode;
    use crate::sorting::SortMode;

    use super::{
        ListEvent, MovieListManager, RecordingEvent, RECORDING_SETTLE_DELAY,
    };

    fn touch(path: &Path) {
        fs::write(path, b"").expect("fixture file should be writable");
    }

    /// Three dated recordings, one plain subdirectory and a trash directory.
    fn fixture_tree(root: &Path) {
        touch(&root.join("20230101 1200 - one - Alpha.ts"));
        touch(&root.join("20230301 1200 - one - Charlie.ts"));
        touch(&root.join("20230201 1200 - one - Bravo.ts"));
        fs::create_dir(root.join("series")).expect("mkdir");
        fs::create_dir(root.join("trash")).expect("mkdir");
    }

    fn manager_for(root: &Path) -> MovieListManager {
        let mut config = Config::default();
        config.paths.home_path = root.display().to_string();
        config.paths.trash_path = root.join("trash").display().to_string();
        MovieListManager::new(config, Collaborators::default()).expect("manager should build")
    }

    #[test]
    fn test_reload_directory_pins_nodes_before_sorted_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());

        assert!(manager.reload(&dir.path().to_path_buf()));
        let list = manager.current_list();

        // Unsortable rows first: up, trash, latest recordings, then the
        // series directory from the scan.
        assert_eq!(list[0].kind, EntryKind::Up);
        assert_eq!(list[1].kind, EntryKind::Trash);
        assert_eq!(list[2].kind, EntryKind::LatestRecordings);
        assert_eq!(list[3].kind, EntryKind::Directory);

        let boundary = list
            .iter()
            .position(|entry| entry.sort_keys.is_sortable())
            .expect("files should follow the nodes");
        assert!(list[boundary..].iter().all(|e| e.sort_keys.is_sortable()));
        assert!(list[..boundary].iter().all(|e| !e.sort_keys.is_sortable()));

        // Chronological default: newest first.
        let titles: Vec<&str> = list[boundary..].iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Charlie", "Bravo", "Alpha"]);
    }

    #[test]
    fn test_reload_unknown_virtual_path_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));
        let before = manager.len();

        assert!(!manager.reload(Path::new("/no/such/Virtual Folder")));
        assert_eq!(manager.len(), before);
        assert_eq!(manager.load_path(), dir.path());
    }

    #[test]
    fn test_permanent_sort_override_round_trip_through_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        touch(&dir.path().join("series").join("20230401 1200 - one - Delta.ts"));
        let mut manager = manager_for(dir.path());

        let series = dir.path().join("series");
        manager.set_permanent_sort(&series, SortMode::Alphabetic);

        assert!(manager.reload(&dir.path().to_path_buf()));
        assert_eq!(manager.sort_mode().0, SortMode::Chronological);

        assert!(manager.reload(&series));
        let (mode, permanence) = manager.sort_mode();
        assert_eq!(mode, SortMode::Alphabetic);
        assert_eq!(permanence, Some(true));

        // Leaving for a sibling with no override restores the previous mode.
        assert!(manager.reload(&dir.path().to_path_buf()));
        let (mode, permanence) = manager.sort_mode();
        assert_eq!(mode, SortMode::Chronological);
        assert_eq!(permanence, None);
    }

    #[test]
    fn test_latest_recordings_forces_chronological_and_restores() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut config = Config::default();
        config.paths.home_path = dir.path().display().to_string();
        config.paths.trash_path = dir.path().join("trash").display().to_string();
        config.sort.alphabetic_start = true;
        let mut manager =
            MovieListManager::new(config, Collaborators::default()).expect("manager");

        assert!(manager.reload(&dir.path().to_path_buf()));
        assert_eq!(manager.sort_mode().0, SortMode::Alphabetic);

        let latest = dir.path().join("Latest Recordings");
        assert!(manager.reload(&latest));
        assert_eq!(manager.sort_mode().0, SortMode::Chronological);
        // Only media files, no directory rows except the parent entry.
        assert!(manager
            .current_list()
            .iter()
            .all(|e| e.kind.is_playable() || e.kind == EntryKind::Up));

        assert!(manager.reload(&dir.path().to_path_buf()));
        assert_eq!(manager.sort_mode().0, SortMode::Alphabetic);
    }

    #[test]
    fn test_incremental_reload_appends_and_preserves_cached_length() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));
        let before = manager.len();

        // Cache a length on an existing entry, then reload the same file.
        let existing = dir.path().join("20230101 1200 - one - Alpha.ts");
        let service = manager
            .current_list()
            .iter()
            .find(|entry| entry.path == existing)
            .map(|entry| entry.service.clone())
            .expect("entry");
        manager.update_length(&service, 4321);

        assert!(manager.reload(&existing));
        assert_eq!(manager.len(), before, "existing file must be replaced in place");
        assert_eq!(manager.length_of_service(&service), 4321);
        assert_eq!(manager.load_path(), dir.path(), "incremental reload keeps the load path");

        // A genuinely new file is appended.
        let fresh = dir.path().join("20230501 1200 - one - Echo.ts");
        touch(&fresh);
        assert!(manager.reload(&fresh));
        assert_eq!(manager.len(), before + 1);
    }

    #[test]
    fn test_reload_resets_numeric_selection() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));

        let file_index = manager
            .current_list()
            .iter()
            .position(|entry| entry.kind.is_playable())
            .expect("file row");
        manager.toggle_selection(file_index);
        assert_eq!(manager.selected_count(), 1);

        assert!(manager.reload(&dir.path().to_path_buf()));
        assert_eq!(manager.selected_count(), 0);
        assert!(manager.current_list().iter().all(|e| e.selection_rank == 0));
    }

    #[test]
    fn test_pending_sentinels_survive_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));

        let service = manager
            .current_list()
            .iter()
            .find(|entry| entry.kind.is_playable())
            .map(|entry| entry.service.clone())
            .expect("file row");
        manager.highlight_service(true, PendingMode::Move, &service);
        assert!(manager.service_moving(&service));

        // Hiding moving entries is on by default, so the row disappears.
        assert!(manager.reload(&dir.path().to_path_buf()));
        assert!(manager.index_of_service(&service).is_none());
        assert!(manager.service_moving(&service), "pending state must survive");

        manager.highlight_service(false, PendingMode::Move, &service);
        assert!(manager.reload(&dir.path().to_path_buf()));
        assert!(manager.index_of_service(&service).is_some());
    }

    #[test]
    fn test_next_playable_wraps_once_and_skips_busy() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));

        let first_file = manager
            .current_list()
            .iter()
            .position(|entry| entry.kind.is_playable())
            .expect("file row");
        let busy = manager.current_list()[first_file].service.clone();
        manager.highlight_service(true, PendingMode::Delete, &busy);

        let cursor = first_file + 1;
        let services: Vec<_> = manager.next_playable_from(cursor).cloned().collect();
        assert_eq!(services.len(), 2, "three files minus the busy one");
        assert!(!services.contains(&busy));
    }

    #[test]
    fn test_recording_start_defers_incremental_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));
        let before = manager.len();

        let recording = dir.path().join("20230601 1200 - one - Live.ts");
        touch(&recording);
        let now = Instant::now();
        manager.recording_event(RecordingEvent::Started(recording), now);

        // Nothing happens before the settle delay.
        manager.pump(now);
        assert_eq!(manager.len(), before);

        manager.pump(now + RECORDING_SETTLE_DELAY);
        assert_eq!(manager.len(), before + 1);
    }

    #[test]
    fn test_recording_start_elsewhere_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let other = tempfile::tempdir().expect("tempdir");
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));
        let before = manager.len();

        let now = Instant::now();
        manager.recording_event(
            RecordingEvent::Started(other.path().join("rec.ts")),
            now,
        );
        manager.pump(now + RECORDING_SETTLE_DELAY);
        assert_eq!(manager.len(), before);
    }

    #[test]
    fn test_recording_end_defers_refresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));
        manager.take_events();

        let now = Instant::now();
        manager.recording_event(
            RecordingEvent::Ended(dir.path().join("20230101 1200 - one - Alpha.ts")),
            now,
        );
        manager.pump(now + RECORDING_SETTLE_DELAY);
        assert_eq!(manager.take_events(), vec![ListEvent::AllInvalidated]);
    }

    #[test]
    fn test_toggle_emits_invalidation_events() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));
        manager.take_events();

        let file_index = manager
            .current_list()
            .iter()
            .position(|entry| entry.kind.is_playable())
            .expect("file row");
        manager.toggle_selection(file_index);
        assert_eq!(
            manager.take_events(),
            vec![ListEvent::EntryInvalidated(file_index)]
        );

        // Toggling a directory is a defensive no-op.
        manager.toggle_selection(0);
        assert!(manager.take_events().is_empty());
    }

    #[test]
    fn test_remove_service_drops_single_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixture_tree(dir.path());
        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));
        let before = manager.len();

        let service = manager
            .current_list()
            .iter()
            .find(|entry| entry.kind.is_playable())
            .map(|entry| entry.service.clone())
            .expect("file row");
        manager.remove_service(&service);
        assert_eq!(manager.len(), before - 1);
        assert!(manager.index_of_service(&service).is_none());
    }

    #[test]
    fn test_playable_under_walks_subtree_with_disc_detection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tree = dir.path().join("series");
        fs::create_dir(&tree).expect("mkdir");
        touch(&tree.join("ep1.mkv"));
        let disc = tree.join("My Disc");
        fs::create_dir(&disc).expect("mkdir");
        touch(&disc.join("VIDEO_TS.IFO"));
        touch(&disc.join("ignored.bup"));

        let mut manager = manager_for(dir.path());
        assert!(manager.reload(&dir.path().to_path_buf()));

        let services = manager.playable_under(&tree);
        let paths: Vec<PathBuf> = services.iter().map(|s| s.path.clone()).collect();
        assert!(paths.contains(&tree.join("ep1.mkv")));
        assert!(paths.contains(&disc), "disc folder itself is the playable path");
        assert_eq!(services.len(), 2);
    }
}
