//! List ordering: the two sort regimes and permanent per-directory overrides.
//!
//! Unsortable rows (directories and virtual nodes carry no date key) are
//! never compared; they stay in scan order as a contiguous prefix and the
//! sortable remainder is ordered behind them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{SortConfig, SortModeConfig};
use crate::entry::MediaEntry;

/// Active sort regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Alphabetic,
    Chronological,
}

impl From<SortModeConfig> for SortMode {
    fn from(mode: SortModeConfig) -> SortMode {
        match mode {
            SortModeConfig::Alphabetic => SortMode::Alphabetic,
            SortModeConfig::Chronological => SortMode::Chronological,
        }
    }
}

impl From<SortMode> for SortModeConfig {
    fn from(mode: SortMode) -> SortModeConfig {
        match mode {
            SortMode::Alphabetic => SortModeConfig::Alphabetic,
            SortMode::Chronological => SortModeConfig::Chronological,
        }
    }
}

/// Sort state: active mode, the independent reverse flags, the permanent
/// override table and the single-slot mode to restore after leaving an
/// overridden directory.
#[derive(Debug, Clone)]
pub struct SortContext {
    mode: SortMode,
    reverse_alphabetic: bool,
    reverse_chronological: bool,
    permanent: BTreeMap<PathBuf, SortMode>,
    return_mode: Option<SortMode>,
}

impl SortContext {
    pub fn from_config(config: &SortConfig) -> SortContext {
        let mode = if config.alphabetic_start {
            SortMode::Alphabetic
        } else {
            SortMode::Chronological
        };
        let permanent = config
            .permanent
            .iter()
            .map(|(path, mode)| (PathBuf::from(path), SortMode::from(*mode)))
            .collect();
        SortContext {
            mode,
            reverse_alphabetic: config.reverse_alphabetic,
            reverse_chronological: config.reverse_chronological,
            permanent,
            return_mode: None,
        }
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    /// Switches the mode by user request; a pending restore value is
    /// dropped because the user's explicit choice wins.
    pub fn set_mode(&mut self, mode: SortMode) {
        self.return_mode = None;
        self.mode = mode;
    }

    /// Permanent override recorded for a directory, if any.
    pub fn permanent_mode(&self, path: &Path) -> Option<SortMode> {
        self.permanent.get(path).copied()
    }

    /// `(active mode, Some(active == permanent))` for the given directory,
    /// `None` when it has no permanent override.
    pub fn mode_with_permanence(&self, path: &Path) -> (SortMode, Option<bool>) {
        let permanence = self
            .permanent_mode(path)
            .map(|permanent| permanent == self.mode);
        (self.mode, permanence)
    }

    pub fn set_permanent(&mut self, path: &Path, mode: SortMode) {
        self.permanent.insert(path.to_path_buf(), mode);
    }

    pub fn clear_permanent(&mut self, path: &Path) {
        self.permanent.remove(path);
    }

    /// Persisted form of the override table for the config writer.
    pub fn permanent_table(&self) -> BTreeMap<String, SortModeConfig> {
        self.permanent
            .iter()
            .map(|(path, mode)| (path.display().to_string(), SortModeConfig::from(*mode)))
            .collect()
    }

    /// Applies the permanent override for a freshly loaded directory.
    ///
    /// Entering an overridden directory saves the current mode into the
    /// restore slot (only when the slot is free; nested overrides keep the
    /// first saved value). Entering a directory without an override restores
    /// and clears a pending slot.
    pub fn enter_directory(&mut self, path: &Path) {
        match self.permanent_mode(path) {
            Some(forced) => {
                if self.return_mode.is_none() {
                    self.return_mode = Some(self.mode);
                }
                self.mode = forced;
            }
            None => {
                if let Some(restore) = self.return_mode.take() {
                    self.mode = restore;
                }
            }
        }
    }

    /// Forces a mode for a virtual folder (latest recordings is always
    /// chronological) through the same backup slot as a permanent override.
    pub fn force_mode(&mut self, mode: SortMode) {
        if self.return_mode.is_none() {
            self.return_mode = Some(self.mode);
        }
        self.mode = mode;
    }

    /// Orders a freshly built list: unsortable rows first in their original
    /// relative order, sortable rows behind them per the active mode.
    pub fn sort_entries(&self, entries: Vec<MediaEntry>) -> Vec<MediaEntry> {
        let (mut unsortable, mut sortable): (Vec<MediaEntry>, Vec<MediaEntry>) = entries
            .into_iter()
            .partition(|entry| !entry.sort_keys.is_sortable());

        match self.mode {
            SortMode::Alphabetic => {
                sortable.sort_by(|a, b| {
                    let ordering = a.sort_keys.alpha.cmp(&b.sort_keys.alpha);
                    if self.reverse_alphabetic {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                });
            }
            SortMode::Chronological => {
                sortable.sort_by(|a, b| {
                    let ordering = a.sort_keys.date.cmp(&b.sort_keys.date);
                    if self.reverse_chronological {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                });
            }
        }

        unsortable.append(&mut sortable);
        unsortable
    }
}
