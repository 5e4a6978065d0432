//! Watch and record progress computation.
//!
//! All calculations are done in seconds. Lengths resolved from a live query
//! are cached back into the entry so the next pass skips the lookup; the
//! 90-minute default is deliberately never cached.

use std::path::Path;

use crate::config::ProgressConfig;
use crate::entry::MediaEntry;
use crate::metadata::{CutListReader, RecordingActivityTracker, ServiceLengthProbe};

/// Assumed length when no source can provide one: 90 minutes.
pub const DEFAULT_LENGTH_SECONDS: i64 = 5400;

/// Percentage of the real length a position must reach to count as 100%,
/// so a stop right before the credits still reads as fully watched.
const WATCHED_LENGTH_PERCENT: f64 = 98.0;

/// Watch-state classification of a progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Unwatched,
    Watching,
    Finished,
}

impl WatchState {
    /// Pure threshold classification; ties resolve toward the lower state.
    /// Returns `None` when marking is disabled.
    pub fn classify(progress: i32, config: &ProgressConfig) -> Option<WatchState> {
        if !config.mark_enabled {
            return None;
        }
        if progress < config.watching_percent {
            Some(WatchState::Unwatched)
        } else if progress < config.finished_percent {
            Some(WatchState::Watching)
        } else {
            Some(WatchState::Finished)
        }
    }
}

/// Percent of `length` covered by `last`, against the adjusted length,
/// rounded up and clamped to [0, 100]. A zero length yields 0.
pub fn calculate_progress(last: i64, length: i64) -> i32 {
    if length == 0 {
        return 0;
    }
    let adjusted = length as f64 / 100.0 * WATCHED_LENGTH_PERCENT;
    let progress = (last as f64 / adjusted * 100.0).ceil() as i64;
    progress.clamp(0, 100) as i32
}

/// Resolves watch progress for list entries against the cut data and the
/// playback backend.
pub struct ProgressEngine<'a> {
    cut_list: &'a dyn CutListReader,
    service_lengths: &'a dyn ServiceLengthProbe,
}

impl<'a> ProgressEngine<'a> {
    pub fn new(
        cut_list: &'a dyn CutListReader,
        service_lengths: &'a dyn ServiceLengthProbe,
    ) -> ProgressEngine<'a> {
        ProgressEngine {
            cut_list,
            service_lengths,
        }
    }

    /// Watch progress of one entry.
    ///
    /// `last_override` short-circuits the cut-data position lookup;
    /// `force_recalc` computes a value even without any stored position.
    /// Length resolution: entry cache, backend query, cut-data length, the
    /// 90-minute default. Live query results are written back into
    /// `entry.length_seconds`; the default is not.
    pub fn entry_progress(
        &self,
        entry: &mut MediaEntry,
        last_override: i64,
        force_recalc: bool,
    ) -> i32 {
        let mut last = last_override;
        if last <= 0 {
            last = self.cut_list.last_position(&entry.path);
        }
        if last <= 0 && !force_recalc {
            // No position implies progress is zero.
            return 0;
        }

        let mut length = entry.length_seconds;
        if length <= 0 {
            length = self.service_lengths.length_seconds(&entry.service);
            if length <= 0 {
                length = self.cut_list.total_length(&entry.path);
            }
            if length > 0 {
                entry.length_seconds = length;
            } else {
                length = DEFAULT_LENGTH_SECONDS;
            }
        }

        if length > 0 {
            calculate_progress(last, length)
        } else {
            // Unreachable while the default length stands in.
            100
        }
    }

    /// Progress of a running recording: wall-clock time into the scheduled
    /// window. Cut data is ignored entirely so a reused file never shows
    /// stale viewer positions.
    pub fn record_progress(
        &self,
        activity: &dyn RecordingActivityTracker,
        path: &Path,
        now_unix: i64,
    ) -> i32 {
        match activity.active_window(path) {
            Some((begin, end)) => calculate_progress(now_unix - begin, end - begin),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::config::ProgressConfig;
    use crate::entry::{EntryKind, MediaEntry, ServiceId, ServiceRef, SortKeys};
    use crate::metadata::{
        CutListReader, NoActivity, NoCutData, NoLengths, RecordingActivityTracker,
        ServiceLengthProbe,
    };

    use super::{calculate_progress, ProgressEngine, WatchState, DEFAULT_LENGTH_SECONDS};

    struct FixedCuts {
        last: i64,
        length: i64,
    }

    impl CutListReader for FixedCuts {
        fn last_position(&self, _path: &Path) -> i64 {
            self.last
        }
        fn total_length(&self, _path: &Path) -> i64 {
            self.length
        }
    }

    struct FixedWindow(i64, i64);

    impl RecordingActivityTracker for FixedWindow {
        fn is_recording(&self, _path: &Path) -> bool {
            true
        }
        fn is_remote_recording(&self, _path: &Path) -> bool {
            false
        }
        fn is_being_trimmed(&self, _path: &Path) -> bool {
            false
        }
        fn active_window(&self, _path: &Path) -> Option<(i64, i64)> {
            Some((self.0, self.1))
        }
    }

    struct FixedServiceLength(i64);

    impl ServiceLengthProbe for FixedServiceLength {
        fn length_seconds(&self, _service: &crate::entry::ServiceRef) -> i64 {
            self.0
        }
    }

    fn entry(length: i64) -> MediaEntry {
        let path = PathBuf::from("/m/show.mkv");
        MediaEntry {
            service: ServiceRef::new(ServiceId::Generic, path.clone(), "Show".to_string()),
            sort_keys: SortKeys {
                alpha: Some("show".to_string()),
                date: Some("202301011200".to_string()),
            },
            recorded_at: None,
            title: "Show".to_string(),
            path,
            selection_rank: 0,
            length_seconds: length,
            kind: EntryKind::Video,
        }
    }

    #[test]
    fn test_calculate_progress_endpoints_and_range() {
        assert_eq!(calculate_progress(0, 3600), 0);
        assert_eq!(calculate_progress(3600, 3600), 100);
        assert_eq!(calculate_progress(-10, 3600), 0);
        assert_eq!(calculate_progress(10_000, 3600), 100);
        assert_eq!(calculate_progress(500, 0), 0);
    }

    #[test]
    fn test_calculate_progress_is_monotonic_in_position() {
        let length = 5400;
        let mut previous = 0;
        for last in (0..=length).step_by(60) {
            let progress = calculate_progress(last, length);
            assert!(progress >= previous, "progress regressed at {}", last);
            assert!((0..=100).contains(&progress));
            previous = progress;
        }
    }

    #[test]
    fn test_position_at_adjusted_length_reports_full_watch() {
        // 98% of the runtime counts as watched to the end.
        let length = 6000;
        assert_eq!(calculate_progress(5880, length), 100);
    }

    #[test]
    fn test_entry_progress_without_position_is_zero() {
        let cuts = NoCutData;
        let lengths = NoLengths;
        let engine = ProgressEngine::new(&cuts, &lengths);
        let mut entry = entry(3600);
        assert_eq!(engine.entry_progress(&mut entry, 0, false), 0);
    }

    #[test]
    fn test_entry_progress_uses_default_length_without_caching_it() {
        let cuts = FixedCuts {
            last: 2700,
            length: 0,
        };
        let lengths = NoLengths;
        let engine = ProgressEngine::new(&cuts, &lengths);
        let mut entry = entry(0);

        let progress = engine.entry_progress(&mut entry, 0, false);
        assert_eq!(progress, calculate_progress(2700, DEFAULT_LENGTH_SECONDS));
        assert_eq!(entry.length_seconds, 0, "default length must not be cached");
    }

    #[test]
    fn test_entry_progress_caches_backend_length() {
        let cuts = FixedCuts {
            last: 1800,
            length: 0,
        };
        let lengths = FixedServiceLength(3600);
        let engine = ProgressEngine::new(&cuts, &lengths);
        let mut entry = entry(0);

        let progress = engine.entry_progress(&mut entry, 0, false);
        assert_eq!(progress, calculate_progress(1800, 3600));
        assert_eq!(entry.length_seconds, 3600);
    }

    #[test]
    fn test_entry_progress_falls_back_to_cut_data_length() {
        let cuts = FixedCuts {
            last: 900,
            length: 1800,
        };
        let lengths = NoLengths;
        let engine = ProgressEngine::new(&cuts, &lengths);
        let mut entry = entry(0);

        let progress = engine.entry_progress(&mut entry, 0, false);
        assert_eq!(progress, calculate_progress(900, 1800));
        assert_eq!(entry.length_seconds, 1800);
    }

    #[test]
    fn test_record_progress_uses_wall_clock_window() {
        let cuts = NoCutData;
        let lengths = NoLengths;
        let engine = ProgressEngine::new(&cuts, &lengths);
        let activity = FixedWindow(1000, 1000 + 3600);
        let progress = engine.record_progress(&activity, Path::new("/m/rec.ts"), 1000 + 1800);
        assert_eq!(progress, calculate_progress(1800, 3600));
    }

    #[test]
    fn test_record_progress_without_window_is_zero() {
        let cuts = NoCutData;
        let lengths = NoLengths;
        let engine = ProgressEngine::new(&cuts, &lengths);
        assert_eq!(
            engine.record_progress(&NoActivity, Path::new("/m/rec.ts"), 0),
            0
        );
    }

    #[test]
    fn test_watch_state_ties_resolve_toward_lower_state() {
        let config = ProgressConfig::default();
        assert_eq!(
            WatchState::classify(0, &config),
            Some(WatchState::Unwatched)
        );
        assert_eq!(
            WatchState::classify(config.watching_percent - 1, &config),
            Some(WatchState::Unwatched)
        );
        assert_eq!(
            WatchState::classify(config.watching_percent, &config),
            Some(WatchState::Watching)
        );
        assert_eq!(
            WatchState::classify(config.finished_percent - 1, &config),
            Some(WatchState::Watching)
        );
        assert_eq!(
            WatchState::classify(config.finished_percent, &config),
            Some(WatchState::Finished)
        );
        assert_eq!(
            WatchState::classify(100, &config),
            Some(WatchState::Finished)
        );
    }

    #[test]
    fn test_watch_state_disabled_marking_yields_none() {
        let mut config = ProgressConfig::default();
        config.mark_enabled = false;
        assert_eq!(WatchState::classify(50, &config), None);
    }
}
