use std::{collections::BTreeSet, time::Duration};

/// Identity of one scheduled tick.
///
/// Handles are issued by a [`TickScheduler`] and must be unique for the
/// lifetime of that scheduler; the engine uses them to tell the tick it is
/// waiting for apart from stale ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// One-shot timer service used by the drop loop.
///
/// The engine never assumes periodic firing: each tick is scheduled
/// explicitly, and when the scheduled delay elapses the owner of the
/// scheduler is expected to call [`Engine::tick`](crate::Engine::tick) with
/// the handle returned here.
pub trait TickScheduler {
    /// Arranges for a single tick after `delay`.
    fn schedule_once(&mut self, delay: Duration) -> TickHandle;

    /// Cancels a pending tick. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Deterministic [`TickScheduler`] driven by a virtual clock.
///
/// Nothing fires on its own. [`VirtualTimer::advance`] jumps the clock to the
/// earliest pending tick and hands its handle back to the caller.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{TickScheduler as _, VirtualTimer};
///
/// let mut timer = VirtualTimer::new();
/// let slow = timer.schedule_once(Duration::from_millis(500));
/// let fast = timer.schedule_once(Duration::from_millis(100));
///
/// assert_eq!(timer.advance(), Some(fast));
/// assert_eq!(timer.now(), Duration::from_millis(100));
/// assert_eq!(timer.advance(), Some(slow));
/// assert_eq!(timer.advance(), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct VirtualTimer {
    now: Duration,
    next_id: u64,
    pending: BTreeSet<(Duration, TickHandle)>,
}

impl VirtualTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of ticks scheduled and not yet fired or cancelled.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Moves the clock to the earliest pending tick and returns its handle.
    ///
    /// Ticks due at the same instant fire in scheduling order.
    pub fn advance(&mut self) -> Option<TickHandle> {
        let (due, handle) = self.pending.pop_first()?;
        self.now = self.now.max(due);
        Some(handle)
    }
}

impl TickScheduler for VirtualTimer {
    fn schedule_once(&mut self, delay: Duration) -> TickHandle {
        let handle = TickHandle::new(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.pending.retain(|&(_, h)| h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut timer = VirtualTimer::new();
        let a = timer.schedule_once(Duration::ZERO);
        let b = timer.schedule_once(Duration::ZERO);
        assert_ne!(a, b);
        assert_eq!(timer.advance(), Some(a));
        assert_eq!(timer.advance(), Some(b));
    }

    #[test]
    fn test_cancelled_tick_never_fires() {
        let mut timer = VirtualTimer::new();
        let a = timer.schedule_once(Duration::from_millis(10));
        let b = timer.schedule_once(Duration::from_millis(20));
        timer.cancel(a);
        assert_eq!(timer.pending_len(), 1);
        assert_eq!(timer.advance(), Some(b));
        assert_eq!(timer.now(), Duration::from_millis(20));
    }

    #[test]
    fn test_delay_is_relative_to_now() {
        let mut timer = VirtualTimer::new();
        timer.schedule_once(Duration::from_millis(100));
        timer.advance();
        let handle = timer.schedule_once(Duration::from_millis(50));
        assert_eq!(timer.advance(), Some(handle));
        assert_eq!(timer.now(), Duration::from_millis(150));
    }

    #[test]
    fn test_cancel_unknown_handle_is_ignored() {
        let mut timer = VirtualTimer::new();
        timer.cancel(TickHandle::new(42));
        assert_eq!(timer.advance(), None);
    }
}
