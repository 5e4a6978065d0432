//! Directory and virtual-source scanning.
//!
//! Produces raw `(path, name, tag)` descriptors: real media files and
//! subdirectories from the filesystem, plus the synthesized rows (parent
//! navigation, trash, latest recordings, network root, bookmarks) injected
//! when listing the configured home path. Anything unreadable is skipped and
//! logged; a scan never fails as a whole.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::Config;
use crate::extensions::{extension_of, MediaExtensions};
use crate::filename_parser::decode_filename;

/// Wildcard token in the hide list matching every dot-prefixed name.
const HIDE_ALL_DOTFILES: &str = ".*";

/// Marker file identifying an optical-disc structure.
const DISC_MARKER: &str = "VIDEO_TS.IFO";
const DISC_MARKER_SUBDIR: &str = "VIDEO_TS";

/// Display name of the latest-recordings pseudo-folder, also its virtual
/// path suffix.
pub const LATEST_RECORDINGS_NAME: &str = "Latest Recordings";
/// Display name of the network-media root, also its virtual path suffix.
pub const NETWORK_ROOT_NAME: &str = "VLC servers";

/// Classification attached to each scanned descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTag {
    /// Regular file with its lowercased extension (may be empty).
    Media(String),
    Directory,
    Up,
    Trash,
    LatestRecordings,
    NetworkRoot,
    NetworkServer,
    NetworkDirectory,
    /// File served from a network share; carries no real extension.
    NetworkFile,
    Bookmark,
}

/// One raw scan result, not yet a list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedItem {
    pub path: PathBuf,
    pub name: String,
    pub tag: ScanTag,
}

impl ScannedItem {
    pub fn new(path: PathBuf, name: impl Into<String>, tag: ScanTag) -> ScannedItem {
        ScannedItem {
            path,
            name: name.into(),
            tag,
        }
    }
}

/// Reads a line-oriented config resource: blank lines and lines starting
/// with `#` are ignored, every other line is a literal match target.
pub fn read_basic_cfg_file(path: &Path) -> Vec<String> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("Failed to read {}: {}", path.display(), err);
            return Vec::new();
        }
    };
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Probes a directory for an optical-disc structure. The marker file is
/// accepted at the directory root or one level down in the conventional
/// subdirectory. Symlinked directories are excluded when `no_scan_linked`
/// is set.
pub fn detect_disc_structure(check_path: &Path, no_scan_linked: bool) -> Option<PathBuf> {
    if !check_path.is_dir() {
        return None;
    }
    if no_scan_linked && check_path.is_symlink() {
        return None;
    }
    let marker = check_path.join(DISC_MARKER);
    if marker.is_file() {
        return Some(marker);
    }
    let marker = check_path.join(DISC_MARKER_SUBDIR).join(DISC_MARKER);
    if marker.is_file() {
        return Some(marker);
    }
    None
}

/// Filesystem and virtual-source scanner, configured once per reload.
pub struct Scanner<'a> {
    extensions: &'a MediaExtensions,
    config: &'a Config,
    hide_list: &'a [String],
    no_scan_list: &'a [String],
}

impl<'a> Scanner<'a> {
    pub fn new(
        extensions: &'a MediaExtensions,
        config: &'a Config,
        hide_list: &'a [String],
        no_scan_list: &'a [String],
    ) -> Scanner<'a> {
        Scanner {
            extensions,
            config,
            hide_list,
            no_scan_list,
        }
    }

    fn is_hidden(&self, name: &str) -> bool {
        if self.hide_list.is_empty() {
            return false;
        }
        self.hide_list.iter().any(|item| item == name)
            || (name.starts_with('.')
                && self.hide_list.iter().any(|item| item == HIDE_ALL_DOTFILES))
    }

    /// Lists one real directory: `(subdirectories, files)`.
    ///
    /// Only names whose extension is allowed are considered; hidden names
    /// are suppressed; directories carrying a disc structure are
    /// reclassified as disc files; dead symlinks are skipped.
    pub fn scan_directory(&self, load_path: &Path) -> (Vec<ScannedItem>, Vec<ScannedItem>) {
        let mut subdirs = Vec::new();
        let mut files = Vec::new();

        let entries = match fs::read_dir(load_path) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Failed to read directory {}: {}", load_path.display(), err);
                return (subdirs, files);
            }
        };

        let trash_path = Path::new(&self.config.paths.trash_path);
        let check_disc_struct = self.config.scanner.disc_structure_scan
            && !self
                .no_scan_list
                .iter()
                .any(|dir| Path::new(dir) == load_path);

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(
                        "Failed to read a directory entry in {}: {}",
                        load_path.display(),
                        err
                    );
                    continue;
                }
            };

            let name = match decode_filename(&entry.file_name()) {
                Some(name) => name,
                None => {
                    debug!("Skipping undecodable name in {}", load_path.display());
                    continue;
                }
            };

            let ext = extension_of(&name);
            if !ext.is_empty() && !self.extensions.is_media(&ext) {
                continue;
            }

            if self.is_hidden(&name) {
                continue;
            }

            let pathname = load_path.join(&name);
            if pathname.is_file() {
                files.push(ScannedItem::new(pathname, name, ScanTag::Media(ext)));
            } else if pathname.is_dir() {
                if check_disc_struct {
                    if let Some(marker) = detect_disc_structure(&pathname, self.config.scanner.no_scan_linked) {
                        let marker_ext = extension_of(DISC_MARKER);
                        let disc_path = marker.parent().map(Path::to_path_buf).unwrap_or(pathname);
                        files.push(ScannedItem::new(disc_path, name, ScanTag::Media(marker_ext)));
                        continue;
                    }
                }
                if pathname != trash_path && self.config.scanner.directories_show {
                    subdirs.push(ScannedItem::new(pathname, name, ScanTag::Directory));
                }
            } else {
                // Dead symlink, neither file nor directory after resolution.
                debug!("Skipping dead link {}", pathname.display());
            }
        }

        (subdirs, files)
    }

    /// Synthesized rows for a directory listing: the `..` entry plus, at the
    /// home path, the enabled pseudo-folders and bookmarks.
    pub fn custom_list(&self, load_path: &Path, extend: bool) -> Vec<ScannedItem> {
        let mut custom = Vec::new();

        let path_limit = Path::new(&self.config.paths.path_limit);
        if !load_path.as_os_str().is_empty() && load_path != path_limit {
            custom.push(ScannedItem::new(load_path.join(".."), "..", ScanTag::Up));
        }

        if extend && load_path == Path::new(&self.config.paths.home_path) {
            if self.config.virtual_folders.trash {
                let trash_path = PathBuf::from(&self.config.paths.trash_path);
                let trash_name = trash_path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(capitalize)
                    .unwrap_or_else(|| "Trash".to_string());
                custom.push(ScannedItem::new(trash_path, trash_name, ScanTag::Trash));
            }

            if self.config.virtual_folders.latest_recordings {
                custom.push(ScannedItem::new(
                    load_path.join(LATEST_RECORDINGS_NAME),
                    LATEST_RECORDINGS_NAME,
                    ScanTag::LatestRecordings,
                ));
            }

            if self.config.virtual_folders.network_media {
                custom.push(ScannedItem::new(
                    load_path.join(NETWORK_ROOT_NAME),
                    NETWORK_ROOT_NAME,
                    ScanTag::NetworkRoot,
                ));
            }

            if self.config.virtual_folders.bookmarks {
                for bookmark in &self.config.virtual_folders.bookmark_paths {
                    let path = PathBuf::from(bookmark);
                    let name = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .map(capitalize)
                        .unwrap_or_else(|| bookmark.clone());
                    custom.push(ScannedItem::new(path, name, ScanTag::Bookmark));
                }
            }
        }

        custom
    }

    /// Walks the whole tree below the home path collecting media files for
    /// the latest-recordings pseudo-folder. Honors the same hide-list and
    /// disc-structure rules as a plain listing; the trash directory is
    /// never descended into.
    pub fn latest_recordings(&self) -> Vec<ScannedItem> {
        let mut dir_stack = vec![PathBuf::from(&self.config.paths.home_path)];
        let mut files = Vec::new();

        while let Some(directory) = dir_stack.pop() {
            let (subdirs, mut subfiles) = self.scan_directory(&directory);
            dir_stack.extend(subdirs.into_iter().map(|item| item.path));
            files.append(&mut subfiles);
        }

        files
    }

    /// Count of allowed-extension children, for directory decoration.
    pub fn dir_info(&self, path: &Path) -> usize {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| decode_filename(&entry.file_name()))
            .filter(|name| {
                let ext = extension_of(name);
                ext.is_empty() || self.extensions.is_media(&ext)
            })
            .count()
    }
}

/// Descriptor for a single known file, used by incremental reloads when a
/// recording starts.
pub fn file_info(pathname: &Path) -> Option<ScannedItem> {
    let name = decode_filename(pathname.file_name()?)?;
    let ext = extension_of(&name);
    Some(ScannedItem::new(
        pathname.to_path_buf(),
        name,
        ScanTag::Media(ext),
    ))
}
