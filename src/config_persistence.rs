//! Comment-preserving `config.toml` load and save.
//!
//! Saving re-parses the existing file as a `toml_edit` document and only
//! rewrites values that changed, so hand-written comments and formatting
//! survive every update.

use std::path::{Path, PathBuf};

use log::warn;
use toml_edit::{value, Array, DocumentMut, Item, Table};

use crate::config::{sanitize_config, Config, SortModeConfig};

fn set_table_value_preserving_decor(table: &mut Table, key: &str, item: Item) {
    let existing_value_decor = table
        .get(key)
        .and_then(|current| current.as_value().map(|value| value.decor().clone()));
    table[key] = item;
    if let Some(existing_value_decor) = existing_value_decor {
        if let Some(next_value) = table[key].as_value_mut() {
            *next_value.decor_mut() = existing_value_decor;
        }
    }
}

fn set_table_scalar_if_changed<T, F>(
    table: &mut Table,
    key: &str,
    previous_value: T,
    next_value: T,
    to_item: F,
) where
    T: PartialEq + Copy,
    F: FnOnce(T) -> Item,
{
    if table.contains_key(key) && previous_value == next_value {
        return;
    }
    set_table_value_preserving_decor(table, key, to_item(next_value));
}

fn set_table_string_if_changed(
    table: &mut Table,
    key: &str,
    previous_value: &str,
    next_value: &str,
) {
    if table.contains_key(key) && previous_value == next_value {
        return;
    }
    set_table_value_preserving_decor(table, key, value(next_value));
}

fn ensure_section_table(document: &mut DocumentMut, key: &str) {
    let root = document.as_table_mut();
    let should_replace = !matches!(root.get(key), Some(item) if item.is_table());
    if should_replace {
        root.insert(key, Item::Table(Table::new()));
    }
}

fn sort_mode_str(mode: SortModeConfig) -> &'static str {
    match mode {
        SortModeConfig::Alphabetic => "alphabetic",
        SortModeConfig::Chronological => "chronological",
    }
}

fn write_config_to_document(document: &mut DocumentMut, previous: &Config, config: &Config) {
    ensure_section_table(document, "paths");
    ensure_section_table(document, "sort");
    ensure_section_table(document, "progress");
    ensure_section_table(document, "display");
    ensure_section_table(document, "scanner");
    ensure_section_table(document, "virtual_folders");
    ensure_section_table(document, "recordings");

    {
        let paths = document["paths"]
            .as_table_mut()
            .expect("paths should be a table");
        set_table_string_if_changed(
            paths,
            "home_path",
            &previous.paths.home_path,
            &config.paths.home_path,
        );
        set_table_string_if_changed(
            paths,
            "trash_path",
            &previous.paths.trash_path,
            &config.paths.trash_path,
        );
        set_table_string_if_changed(
            paths,
            "path_limit",
            &previous.paths.path_limit,
            &config.paths.path_limit,
        );
    }

    {
        let sort = document["sort"]
            .as_table_mut()
            .expect("sort should be a table");
        set_table_scalar_if_changed(
            sort,
            "alphabetic_start",
            previous.sort.alphabetic_start,
            config.sort.alphabetic_start,
            value,
        );
        set_table_scalar_if_changed(
            sort,
            "reverse_alphabetic",
            previous.sort.reverse_alphabetic,
            config.sort.reverse_alphabetic,
            value,
        );
        set_table_scalar_if_changed(
            sort,
            "reverse_chronological",
            previous.sort.reverse_chronological,
            config.sort.reverse_chronological,
            value,
        );
        if !sort.contains_key("permanent") || previous.sort.permanent != config.sort.permanent {
            let mut permanent = Table::new();
            permanent.set_implicit(false);
            for (path, mode) in &config.sort.permanent {
                permanent.insert(path, value(sort_mode_str(*mode)));
            }
            sort.insert("permanent", Item::Table(permanent));
        }
    }

    {
        let progress = document["progress"]
            .as_table_mut()
            .expect("progress should be a table");
        set_table_scalar_if_changed(
            progress,
            "watching_percent",
            i64::from(previous.progress.watching_percent),
            i64::from(config.progress.watching_percent),
            value,
        );
        set_table_scalar_if_changed(
            progress,
            "finished_percent",
            i64::from(previous.progress.finished_percent),
            i64::from(config.progress.finished_percent),
            value,
        );
        set_table_scalar_if_changed(
            progress,
            "mark_enabled",
            previous.progress.mark_enabled,
            config.progress.mark_enabled,
            value,
        );
    }

    {
        let display = document["display"]
            .as_table_mut()
            .expect("display should be a table");
        set_table_string_if_changed(
            display,
            "date_format",
            &previous.display.date_format,
            &config.display.date_format,
        );
        set_table_scalar_if_changed(
            display,
            "show_cut_number",
            previous.display.show_cut_number,
            config.display.show_cut_number,
            value,
        );
        set_table_scalar_if_changed(
            display,
            "show_extension",
            previous.display.show_extension,
            config.display.show_extension,
            value,
        );
        set_table_scalar_if_changed(
            display,
            "directory_info_count",
            previous.display.directory_info_count,
            config.display.directory_info_count,
            value,
        );
    }

    {
        let scanner = document["scanner"]
            .as_table_mut()
            .expect("scanner should be a table");
        set_table_scalar_if_changed(
            scanner,
            "directories_show",
            previous.scanner.directories_show,
            config.scanner.directories_show,
            value,
        );
        set_table_scalar_if_changed(
            scanner,
            "disc_structure_scan",
            previous.scanner.disc_structure_scan,
            config.scanner.disc_structure_scan,
            value,
        );
        set_table_scalar_if_changed(
            scanner,
            "no_scan_linked",
            previous.scanner.no_scan_linked,
            config.scanner.no_scan_linked,
            value,
        );
        set_table_scalar_if_changed(
            scanner,
            "hide_list_enable",
            previous.scanner.hide_list_enable,
            config.scanner.hide_list_enable,
            value,
        );
        set_table_string_if_changed(
            scanner,
            "hide_list_path",
            &previous.scanner.hide_list_path,
            &config.scanner.hide_list_path,
        );
        set_table_scalar_if_changed(
            scanner,
            "no_scan_list_enable",
            previous.scanner.no_scan_list_enable,
            config.scanner.no_scan_list_enable,
            value,
        );
        set_table_string_if_changed(
            scanner,
            "no_scan_list_path",
            &previous.scanner.no_scan_list_path,
            &config.scanner.no_scan_list_path,
        );
    }

    {
        let virtual_folders = document["virtual_folders"]
            .as_table_mut()
            .expect("virtual_folders should be a table");
        set_table_scalar_if_changed(
            virtual_folders,
            "trash",
            previous.virtual_folders.trash,
            config.virtual_folders.trash,
            value,
        );
        set_table_scalar_if_changed(
            virtual_folders,
            "latest_recordings",
            previous.virtual_folders.latest_recordings,
            config.virtual_folders.latest_recordings,
            value,
        );
        set_table_scalar_if_changed(
            virtual_folders,
            "network_media",
            previous.virtual_folders.network_media,
            config.virtual_folders.network_media,
            value,
        );
        set_table_scalar_if_changed(
            virtual_folders,
            "bookmarks",
            previous.virtual_folders.bookmarks,
            config.virtual_folders.bookmarks,
            value,
        );
        if !virtual_folders.contains_key("bookmark_paths")
            || previous.virtual_folders.bookmark_paths != config.virtual_folders.bookmark_paths
        {
            let mut paths = Array::new();
            for path in &config.virtual_folders.bookmark_paths {
                paths.push(path.as_str());
            }
            set_table_value_preserving_decor(virtual_folders, "bookmark_paths", value(paths));
        }
    }

    {
        let recordings = document["recordings"]
            .as_table_mut()
            .expect("recordings should be a table");
        set_table_scalar_if_changed(
            recordings,
            "remote_recordings",
            previous.recordings.remote_recordings,
            config.recordings.remote_recordings,
            value,
        );
        set_table_scalar_if_changed(
            recordings,
            "hide_moving",
            previous.recordings.hide_moving,
            config.recordings.hide_moving,
            value,
        );
        set_table_scalar_if_changed(
            recordings,
            "hide_deleting",
            previous.recordings.hide_deleting,
            config.recordings.hide_deleting,
            value,
        );
        set_table_scalar_if_changed(
            recordings,
            "metadata_from_recordings",
            previous.recordings.metadata_from_recordings,
            config.recordings.metadata_from_recordings,
            value,
        );
        set_table_scalar_if_changed(
            recordings,
            "metadata_from_broadcast",
            previous.recordings.metadata_from_broadcast,
            config.recordings.metadata_from_broadcast,
            value,
        );
    }
}

/// Updates an existing config text with the changed values only, leaving
/// comments and formatting in place.
pub fn serialize_config_with_preserved_comments(
    existing_text: &str,
    config: &Config,
) -> Result<String, String> {
    let previous = toml::from_str::<Config>(existing_text)
        .map_err(|err| format!("failed to parse existing config as Config: {}", err))?;
    let mut document = existing_text
        .parse::<DocumentMut>()
        .map_err(|err| format!("failed to parse existing config as TOML document: {}", err))?;
    write_config_to_document(&mut document, &previous, config);
    Ok(document.to_string())
}

/// Writes the config to `path`, preserving comments when the file already
/// exists. Failures are logged, never fatal.
pub fn persist_config_file(config: &Config, path: &Path) {
    let existing_text = std::fs::read_to_string(path).ok();
    let config_text = if let Some(existing_text) = existing_text {
        match serialize_config_with_preserved_comments(&existing_text, config) {
            Ok(updated_text) => Some(updated_text),
            Err(err) => {
                warn!(
                    "Failed to preserve config comments for {} ({}). Falling back to plain serialization.",
                    path.display(),
                    err
                );
                toml::to_string(config).ok()
            }
        }
    } else {
        toml::to_string(config).ok()
    };

    let Some(config_text) = config_text else {
        log::error!("Failed to serialize config for {}", path.display());
        return;
    };

    if let Some(parent) = path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            log::error!("Failed to create {}: {}", parent.display(), err);
            return;
        }
    }
    if let Err(err) = std::fs::write(path, config_text) {
        log::error!("Failed to persist config to {}: {}", path.display(), err);
    }
}

/// Loads and sanitizes the config; a missing or unparseable file yields the
/// defaults.
pub fn load_config_file(path: &Path) -> Config {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return sanitize_config(Config::default()),
    };
    match toml::from_str::<Config>(&text) {
        Ok(config) => sanitize_config(config),
        Err(err) => {
            warn!("Failed to parse {}: {}", path.display(), err);
            sanitize_config(Config::default())
        }
    }
}

/// Default on-disk location: `<config dir>/movierack/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("movierack")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, SortModeConfig};

    use super::{load_config_file, persist_config_file, serialize_config_with_preserved_comments};

    #[test]
    fn test_preserved_serialization_keeps_comments_and_updates_values() {
        let existing = r#"# movierack configuration
[paths]
# where the recordings live
home_path = "/hdd/movie"

[sort]
alphabetic_start = false
"#;

        let mut config = Config::default();
        config.paths.home_path = "/hdd/movie".to_string();
        config.sort.alphabetic_start = true;

        let updated = serialize_config_with_preserved_comments(existing, &config)
            .expect("serialization should succeed");
        assert!(updated.contains("# movierack configuration"));
        assert!(updated.contains("# where the recordings live"));
        assert!(updated.contains("alphabetic_start = true"));

        let parsed: Config = toml::from_str(&updated).expect("updated text should parse");
        assert!(parsed.sort.alphabetic_start);
        assert_eq!(parsed.paths.home_path, "/hdd/movie");
    }

    #[test]
    fn test_permanent_sort_table_is_written_and_read_back() {
        let mut config = Config::default();
        config
            .sort
            .permanent
            .insert("/hdd/movie/series".to_string(), SortModeConfig::Alphabetic);

        let updated = serialize_config_with_preserved_comments("", &config)
            .expect("serialization should succeed");
        let parsed: Config = toml::from_str(&updated).expect("updated text should parse");
        assert_eq!(
            parsed.sort.permanent.get("/hdd/movie/series"),
            Some(&SortModeConfig::Alphabetic)
        );
    }

    #[test]
    fn test_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.paths.home_path = "/hdd/movie".to_string();
        config.progress.finished_percent = 85;
        persist_config_file(&config, &path);

        let loaded = load_config_file(&path);
        assert_eq!(loaded.paths.home_path, "/hdd/movie");
        assert_eq!(loaded.progress.finished_percent, 85);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load_config_file(&dir.path().join("absent.toml"));
        assert_eq!(loaded, crate::config::sanitize_config(Config::default()));
    }
}
