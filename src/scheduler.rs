//! Auto-stop scheduler.
//!
//! Every raise/lower activation leaves behind a pending stop obligation.
//! The scheduler keeps those obligations in creation order and hands the
//! oldest one back once it has aged past the configured active duration,
//! so no motor is left powered indefinitely.
//!
//! ```text
//!   raise/lower ──▶ schedule(mask, now) ──┐
//!                                         ▼
//!   stop ─────────▶ cancel(mask) ──▶ ┌───┬───┬───┬───┐
//!                                    │ A │ B │ ∅ │ C │   FIFO, front only
//!                                    └─┬─┴───┴───┴───┘
//!                                      │ tick(now): front aged ≥ duration?
//!                                      ▼
//!                             Some(mask) → controller force-stops
//! ```
//!
//! ## Ordering
//!
//! Only the front entry is ever inspected, so expiry is strictly FIFO: a
//! later entry is never returned before every earlier one has been popped,
//! even if both are overdue.  Cancellation clears bits in place and never
//! removes entries; an emptied entry still has to reach the front and age
//! out, and `tick` then yields an empty mask that callers treat as a no-op.

use heapless::Deque;
use log::{debug, info, warn};

use crate::channel::ChannelSet;

// ═══════════════════════════════════════════════════════════════
//  Entry
// ═══════════════════════════════════════════════════════════════

/// One pending stop obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStop {
    /// Channels still owed a stop by this entry.
    pub mask: ChannelSet,
    /// Monotonic creation time (milliseconds since boot).
    pub created_at_ms: u64,
}

impl ScheduledStop {
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Queue capacity (stack-allocated).
///
/// Each channel is live in at most one entry, so at most eight entries are
/// non-empty at any time; the rest of the capacity absorbs cancelled ones.
pub const QUEUE_CAPACITY: usize = 16;

/// FIFO of deferred stop operations.
pub struct AutoStopScheduler {
    queue: Deque<ScheduledStop, QUEUE_CAPACITY>,
    active_duration_ms: u64,
}

impl AutoStopScheduler {
    pub fn new(active_duration_ms: u64) -> Self {
        Self {
            queue: Deque::new(),
            active_duration_ms,
        }
    }

    pub fn active_duration_ms(&self) -> u64 {
        self.active_duration_ms
    }

    /// Clear `mask` from every pending entry, keeping all entries in place.
    pub fn cancel(&mut self, mask: ChannelSet) {
        for entry in self.queue.iter_mut() {
            entry.mask = entry.mask.difference(mask);
        }
    }

    /// Cancel `mask` everywhere, then append a fresh entry for it.
    pub fn schedule(&mut self, mask: ChannelSet, now_ms: u64) {
        self.cancel(mask);

        if self.queue.is_full() {
            self.compact();
        }

        let entry = ScheduledStop {
            mask,
            created_at_ms: now_ms,
        };
        if self.queue.push_back(entry).is_err() {
            // Unreachable while QUEUE_CAPACITY exceeds the channel count.
            warn!("Scheduler: queue full, stop for {} not scheduled", mask);
            return;
        }
        debug!(
            "Scheduler: stop for {} due at {}ms ({} pending)",
            mask,
            now_ms.saturating_add(self.active_duration_ms),
            self.queue.len()
        );
    }

    /// Pop the front entry if it is due.
    ///
    /// Returns the channels to force-stop, which may be empty if every
    /// channel of the entry was cancelled in the meantime.
    pub fn tick(&mut self, now_ms: u64) -> Option<ChannelSet> {
        let front = self.queue.front()?;
        if front.elapsed_ms(now_ms) < self.active_duration_ms {
            return None;
        }
        self.queue.pop_front().map(|entry| entry.mask)
    }

    /// Number of entries in the queue, including emptied ones.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Channels that still have a stop pending.
    pub fn pending(&self) -> ChannelSet {
        self.queue
            .iter()
            .fold(ChannelSet::EMPTY, |acc, e| acc.union(e.mask))
    }

    /// Entries in creation order.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduledStop> {
        self.queue.iter()
    }

    /// Drop emptied entries, preserving the order of the rest.
    ///
    /// Only runs when an append finds the queue full.
    fn compact(&mut self) {
        let before = self.queue.len();
        let mut kept: Deque<ScheduledStop, QUEUE_CAPACITY> = Deque::new();
        while let Some(entry) = self.queue.pop_front() {
            if !entry.mask.is_empty() {
                // Cannot fail: `kept` has the same capacity as `queue`.
                let _ = kept.push_back(entry);
            }
        }
        self.queue = kept;
        info!(
            "Scheduler: compacted queue {} -> {} entries",
            before,
            self.queue.len()
        );
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
