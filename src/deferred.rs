//! Deterministic deferred-call queue.
//!
//! Long-running or event-triggered work (the startup load, reloads after a
//! recording starts or ends) is not run inline; it is queued with a delay
//! and drained by the host on its single UI thread. Draining is FIFO among
//! due calls: earlier due time first, insertion order breaking ties.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::debug;

/// Work the list controller performs when a scheduled call comes due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredCall {
    /// Full or incremental reload of the given path.
    Reload(PathBuf),
    /// Invalidate every row so progress is recomputed.
    Refresh,
}

#[derive(Debug)]
struct ScheduledCall {
    due: Instant,
    seq: u64,
    call: DeferredCall,
}

/// Single-consumer queue of delayed calls.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    scheduled: Vec<ScheduledCall>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> DeferredQueue {
        DeferredQueue::default()
    }

    /// Schedules a call `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, call: DeferredCall) {
        debug!("Deferring {:?} by {:?}", call, delay);
        self.scheduled.push(ScheduledCall {
            due: now + delay,
            seq: self.next_seq,
            call,
        });
        self.next_seq += 1;
    }

    /// Removes and returns every call due at `now`, ordered by due time and
    /// then by scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<DeferredCall> {
        let mut due: Vec<ScheduledCall> = Vec::new();
        let mut remaining = Vec::with_capacity(self.scheduled.len());
        for scheduled in self.scheduled.drain(..) {
            if scheduled.due <= now {
                due.push(scheduled);
            } else {
                remaining.push(scheduled);
            }
        }
        self.scheduled = remaining;

        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|scheduled| scheduled.call).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }
}
