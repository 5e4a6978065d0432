//! Selection and highlight state.
//!
//! Files carry a dense 1..=N selection rank; entries handed to an external
//! move or delete job are parked on a sentinel rank and refuse normal
//! toggling until the job clears them. Pending membership is keyed by
//! service identity so it survives list rebuilds.

use crate::entry::{MediaEntry, ServiceRef};

/// Sentinel rank of an entry with an in-flight move.
pub const RANK_PENDING_MOVE: u32 = 9999;
/// Sentinel rank of an entry with an in-flight delete.
pub const RANK_PENDING_DELETE: u32 = 9998;

/// External job kind an entry can be parked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingMode {
    Move,
    Delete,
}

/// Selection ranks and pending highlights for the current list.
#[derive(Debug, Default)]
pub struct SelectionState {
    selection: Vec<ServiceRef>,
    pending_move: Vec<ServiceRef>,
    pending_delete: Vec<ServiceRef>,
}

impl SelectionState {
    pub fn new() -> SelectionState {
        SelectionState::default()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// True while the entry is handed to a move or delete job.
    pub fn is_busy(&self, service: &ServiceRef) -> bool {
        self.is_moving(service) || self.is_deleting(service)
    }

    pub fn is_moving(&self, service: &ServiceRef) -> bool {
        self.pending_move.contains(service)
    }

    pub fn is_deleting(&self, service: &ServiceRef) -> bool {
        self.pending_delete.contains(service)
    }

    /// Toggles the entry at `index`. Illegal toggles (directories, virtual
    /// nodes, busy entries, out-of-range index) are defensive no-ops.
    /// Returns the indices whose display changed.
    pub fn toggle(&mut self, entries: &mut [MediaEntry], index: usize) -> Vec<usize> {
        let Some(entry) = entries.get(index) else {
            return Vec::new();
        };
        if entry.kind.is_node() {
            return Vec::new();
        }
        if self.is_busy(&entry.service) {
            // No toggle while the file is being operated on.
            return Vec::new();
        }

        let mut invalidated = Vec::new();
        let old_rank = entry.selection_rank;
        if old_rank == 0 {
            self.selection.push(entry.service.clone());
            entries[index].selection_rank = self.selection.len() as u32;
            invalidated.push(index);
        } else {
            self.selection.retain(|service| service != &entries[index].service);
            entries[index].selection_rank = 0;
            invalidated.push(index);
            // Close the gap: everything selected after this entry moves up
            // one rank.
            for (i, other) in entries.iter_mut().enumerate() {
                if other.selection_rank > old_rank && other.selection_rank < RANK_PENDING_DELETE {
                    other.selection_rank -= 1;
                    invalidated.push(i);
                }
            }
        }
        invalidated
    }

    /// Parks an entry on the pending sentinel for `mode`, bypassing normal
    /// toggle numbering. A numeric rank is released first so the remaining
    /// ranks stay dense. Returns the entry index when it changed.
    pub fn mark_pending(
        &mut self,
        entries: &mut [MediaEntry],
        service: &ServiceRef,
        mode: PendingMode,
    ) -> Vec<usize> {
        let mut invalidated = Vec::new();
        let index = entries.iter().position(|entry| &entry.service == service);

        if let Some(index) = index {
            if entries[index].selection_rank > 0
                && entries[index].selection_rank < RANK_PENDING_DELETE
            {
                invalidated = self.toggle(entries, index);
            }
        }

        match mode {
            PendingMode::Move => self.pending_move.push(service.clone()),
            PendingMode::Delete => self.pending_delete.push(service.clone()),
        }

        if let Some(index) = index {
            entries[index].selection_rank = match mode {
                PendingMode::Move => RANK_PENDING_MOVE,
                PendingMode::Delete => RANK_PENDING_DELETE,
            };
            if !invalidated.contains(&index) {
                invalidated.push(index);
            }
        }
        invalidated
    }

    /// Returns an entry from the matching pending sentinel back to idle,
    /// never back to a numeric rank. Returns the entry index when found.
    pub fn clear_pending(
        &mut self,
        entries: &mut [MediaEntry],
        service: &ServiceRef,
        mode: PendingMode,
    ) -> Option<usize> {
        match mode {
            PendingMode::Move => {
                self.pending_move.retain(|pending| pending != service);
            }
            PendingMode::Delete => {
                self.pending_delete.retain(|pending| pending != service);
            }
        }

        let index = entries.iter().position(|entry| &entry.service == service)?;
        let sentinel = match mode {
            PendingMode::Move => RANK_PENDING_MOVE,
            PendingMode::Delete => RANK_PENDING_DELETE,
        };
        if entries[index].selection_rank == sentinel {
            entries[index].selection_rank = 0;
        }
        Some(index)
    }

    /// Re-stamps pending sentinels onto a freshly rebuilt list.
    pub fn apply_pending(&self, entries: &mut [MediaEntry]) {
        for entry in entries.iter_mut() {
            if self.is_moving(&entry.service) {
                entry.selection_rank = RANK_PENDING_MOVE;
            } else if self.is_deleting(&entry.service) {
                entry.selection_rank = RANK_PENDING_DELETE;
            }
        }
    }

    /// Drops every numeric rank; pending sentinels stay untouched.
    pub fn reset(&mut self, entries: &mut [MediaEntry]) {
        self.selection.clear();
        for entry in entries.iter_mut() {
            if entry.selection_rank > 0 && entry.selection_rank < RANK_PENDING_DELETE {
                entry.selection_rank = 0;
            }
        }
    }

    /// The working set of an operation: the recorded selection, or the entry
    /// under the cursor when nothing is selected.
    pub fn selected_set(
        &self,
        entries: &[MediaEntry],
        cursor_index: usize,
    ) -> Vec<ServiceRef> {
        if self.selection.is_empty() {
            entries
                .get(cursor_index)
                .map(|entry| vec![entry.service.clone()])
                .unwrap_or_default()
        } else {
            self.selection.clone()
        }
    }
}
