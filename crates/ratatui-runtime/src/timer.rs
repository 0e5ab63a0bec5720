use std::{collections::BTreeSet, time::Instant};

/// Identifies a timer scheduled on a [`TimerQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// One-shot timers ordered by deadline.
///
/// Timers with the same deadline expire in the order they were scheduled.
/// A cancelled timer is removed immediately and never expires.
#[derive(Debug, Default, Clone)]
pub struct TimerQueue {
    next_id: u64,
    pending: BTreeSet<(Instant, TimerId)>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a timer expiring at `deadline`.
    pub fn schedule(&mut self, deadline: Instant) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((deadline, id));
        id
    }

    /// Removes a pending timer. Returns `false` if it already expired or was
    /// never scheduled here.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|&(_, pending)| pending != id);
        self.pending.len() != before
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|&(deadline, _)| deadline)
    }

    /// Removes and returns the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerId> {
        let &(deadline, _) = self.pending.first()?;
        if deadline > now {
            return None;
        }
        self.pending.pop_first().map(|(_, id)| id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
