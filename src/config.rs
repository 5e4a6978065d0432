//! Persistent application configuration model and defaults.

use std::collections::BTreeMap;

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    /// Scan root, trash location and the navigation limit.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Sort mode, reverse flags and permanent per-directory overrides.
    #[serde(default)]
    pub sort: SortConfig,
    /// Watch-progress thresholds.
    #[serde(default)]
    pub progress: ProgressConfig,
    /// Title decoration and date rendering.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Directory scanning behavior.
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Feature toggles for the synthesized pseudo-folders.
    #[serde(default)]
    pub virtual_folders: VirtualFoldersConfig,
    /// Recording-state driven behavior.
    #[serde(default)]
    pub recordings: RecordingsConfig,
}

/// Filesystem anchor points.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_home_path")]
    pub home_path: String,
    #[serde(default = "default_trash_path")]
    pub trash_path: String,
    /// Topmost path the `..` entry may leave towards; empty means no limit.
    #[serde(default)]
    pub path_limit: String,
}

/// Ordering preferences. The two reverse flags are independent; neither is
/// the mirror of the other.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SortConfig {
    /// Start in alphabetic mode instead of chronological.
    #[serde(default)]
    pub alphabetic_start: bool,
    #[serde(default)]
    pub reverse_alphabetic: bool,
    /// Defaults to true so a fresh list shows newest recordings first.
    #[serde(default = "default_true")]
    pub reverse_chronological: bool,
    /// Permanent per-directory sort overrides, `path -> mode`.
    #[serde(default)]
    pub permanent: BTreeMap<String, SortModeConfig>,
}

/// Persisted form of a forced sort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortModeConfig {
    Alphabetic,
    Chronological,
}

/// Watch-state thresholds in percent; `watching <= finished`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ProgressConfig {
    #[serde(default = "default_watching_percent")]
    pub watching_percent: i32,
    #[serde(default = "default_finished_percent")]
    pub finished_percent: i32,
    /// Master switch for watch-state classification.
    #[serde(default = "default_true")]
    pub mark_enabled: bool,
}

/// Presentation knobs the engine must honor while building titles and dates.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DisplayConfig {
    /// `chrono` format string used for the date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Append the trim counter to decorated titles.
    #[serde(default = "default_true")]
    pub show_cut_number: bool,
    /// Append the container extension to decorated titles.
    #[serde(default)]
    pub show_extension: bool,
    /// Show media counts next to directory and trash rows.
    #[serde(default)]
    pub directory_info_count: bool,
}

/// Directory scanning behavior.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ScannerConfig {
    /// List plain subdirectories at all.
    #[serde(default = "default_true")]
    pub directories_show: bool,
    /// Probe directories for optical-disc structures.
    #[serde(default = "default_true")]
    pub disc_structure_scan: bool,
    /// Skip structure probing on symlinked directories.
    #[serde(default)]
    pub no_scan_linked: bool,
    #[serde(default)]
    pub hide_list_enable: bool,
    #[serde(default = "default_hide_list_path")]
    pub hide_list_path: String,
    #[serde(default)]
    pub no_scan_list_enable: bool,
    #[serde(default = "default_no_scan_list_path")]
    pub no_scan_list_path: String,
}

/// Synthesized pseudo-folder toggles, applied when listing the home path.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VirtualFoldersConfig {
    #[serde(default = "default_true")]
    pub trash: bool,
    #[serde(default = "default_true")]
    pub latest_recordings: bool,
    #[serde(default)]
    pub network_media: bool,
    #[serde(default)]
    pub bookmarks: bool,
    #[serde(default)]
    pub bookmark_paths: Vec<String>,
}

/// Recording-state driven behavior.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RecordingsConfig {
    /// Show recordings running on remote receivers.
    #[serde(default)]
    pub remote_recordings: bool,
    /// Hide entries with a pending move.
    #[serde(default = "default_true")]
    pub hide_moving: bool,
    /// Hide entries with a pending delete.
    #[serde(default = "default_true")]
    pub hide_deleting: bool,
    /// Consult the recorder sidecar metadata for titles and lengths.
    #[serde(default = "default_true")]
    pub metadata_from_recordings: bool,
    /// Consult captured broadcast information as the second fallback.
    #[serde(default = "default_true")]
    pub metadata_from_broadcast: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            home_path: default_home_path(),
            trash_path: default_trash_path(),
            path_limit: String::new(),
        }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            alphabetic_start: false,
            reverse_alphabetic: false,
            reverse_chronological: true,
            permanent: BTreeMap::new(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            watching_percent: default_watching_percent(),
            finished_percent: default_finished_percent(),
            mark_enabled: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            show_cut_number: true,
            show_extension: false,
            directory_info_count: false,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            directories_show: true,
            disc_structure_scan: true,
            no_scan_linked: false,
            hide_list_enable: false,
            hide_list_path: default_hide_list_path(),
            no_scan_list_enable: false,
            no_scan_list_path: default_no_scan_list_path(),
        }
    }
}

impl Default for VirtualFoldersConfig {
    fn default() -> Self {
        Self {
            trash: true,
            latest_recordings: true,
            network_media: false,
            bookmarks: false,
            bookmark_paths: Vec::new(),
        }
    }
}

impl Default for RecordingsConfig {
    fn default() -> Self {
        Self {
            remote_recordings: false,
            hide_moving: true,
            hide_deleting: true,
            metadata_from_recordings: true,
            metadata_from_broadcast: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_home_path() -> String {
    "/media/movies".to_string()
}

fn default_trash_path() -> String {
    "/media/movies/trash".to_string()
}

fn default_watching_percent() -> i32 {
    10
}

fn default_finished_percent() -> i32 {
    80
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

fn default_hide_list_path() -> String {
    "/etc/movierack/hide.cfg".to_string()
}

fn default_no_scan_list_path() -> String {
    "/etc/movierack/noscan.cfg".to_string()
}

/// Clamps the threshold pair so `watching <= finished` and both stay within
/// [0, 100]; out-of-range values come from hand-edited config files.
pub fn sanitize_config(mut config: Config) -> Config {
    config.progress.watching_percent = config.progress.watching_percent.clamp(0, 100);
    config.progress.finished_percent = config.progress.finished_percent.clamp(0, 100);
    if config.progress.watching_percent > config.progress.finished_percent {
        config.progress.watching_percent = config.progress.finished_percent;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::{sanitize_config, Config, SortModeConfig};

    #[test]
    fn test_default_config_has_expected_values() {
        let config = Config::default();

        assert_eq!(config.paths.home_path, "/media/movies");
        assert_eq!(config.paths.trash_path, "/media/movies/trash");
        assert!(config.paths.path_limit.is_empty());
        assert!(!config.sort.alphabetic_start);
        assert!(!config.sort.reverse_alphabetic);
        assert!(config.sort.reverse_chronological);
        assert!(config.sort.permanent.is_empty());
        assert_eq!(config.progress.watching_percent, 10);
        assert_eq!(config.progress.finished_percent, 80);
        assert!(config.progress.mark_enabled);
        assert_eq!(config.display.date_format, "%d.%m.%Y");
        assert!(config.display.show_cut_number);
        assert!(!config.display.show_extension);
        assert!(config.scanner.directories_show);
        assert!(config.scanner.disc_structure_scan);
        assert!(!config.scanner.no_scan_linked);
        assert!(!config.scanner.hide_list_enable);
        assert!(config.virtual_folders.trash);
        assert!(config.virtual_folders.latest_recordings);
        assert!(!config.virtual_folders.network_media);
        assert!(!config.virtual_folders.bookmarks);
        assert!(!config.recordings.remote_recordings);
        assert!(config.recordings.hide_moving);
        assert!(config.recordings.hide_deleting);
        assert!(config.recordings.metadata_from_recordings);
        assert!(config.recordings.metadata_from_broadcast);
    }

    #[test]
    fn test_partial_config_deserialization_fills_defaults() {
        let partial = r#"
[paths]
home_path = "/hdd/movie"

[sort]
alphabetic_start = true
"#;
        let parsed: Config = toml::from_str(partial).expect("config should parse");
        assert_eq!(parsed.paths.home_path, "/hdd/movie");
        assert_eq!(parsed.paths.trash_path, "/media/movies/trash");
        assert!(parsed.sort.alphabetic_start);
        assert!(parsed.sort.reverse_chronological);
        assert_eq!(parsed.progress.finished_percent, 80);
    }

    #[test]
    fn test_permanent_sort_table_round_trips() {
        let mut config = Config::default();
        config
            .sort
            .permanent
            .insert("/hdd/movie/series".to_string(), SortModeConfig::Alphabetic);

        let serialized = toml::to_string(&config).expect("config should serialize");
        let parsed: Config = toml::from_str(&serialized).expect("config should re-parse");
        assert_eq!(
            parsed.sort.permanent.get("/hdd/movie/series"),
            Some(&SortModeConfig::Alphabetic)
        );
    }

    #[test]
    fn test_sanitize_config_orders_thresholds() {
        let mut config = Config::default();
        config.progress.watching_percent = 130;
        config.progress.finished_percent = 60;

        let sanitized = sanitize_config(config);
        assert_eq!(sanitized.progress.finished_percent, 60);
        assert_eq!(sanitized.progress.watching_percent, 60);
    }
}
