//! Lifecycle state and shared statistics.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Lifecycle of a merge.
///
/// `Running → Draining → Completed`; `Errored` is reachable from either
/// non-terminal state and `Cancelled` follows a teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeState {
    /// The source may still produce items.
    Running,
    /// The source has completed; active and buffered work remains.
    Draining,
    /// Everything finished and `complete` was delivered.
    Completed,
    /// An error was delivered.
    Errored,
    /// The merge was torn down before reaching another terminal state.
    Cancelled,
}

impl MergeState {
    /// Returns true for `Completed`, `Errored` and `Cancelled`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Cancelled)
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Draining => 1,
            Self::Completed => 2,
            Self::Errored => 3,
            Self::Cancelled => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::Draining,
            2 => Self::Completed,
            3 => Self::Errored,
            _ => Self::Cancelled,
        }
    }
}

/// Point-in-time view of a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeStats {
    /// Inner sequences running or reserved by a deferred start.
    pub active: usize,
    /// Items waiting for a free slot.
    pub buffered: usize,
    /// Inner sequences started so far.
    pub started: usize,
    /// Current lifecycle state.
    pub state: MergeState,
}

/// Counters written by the driving task and read by observers.
#[derive(Debug)]
pub(crate) struct SharedStats {
    active: AtomicUsize,
    buffered: AtomicUsize,
    started: AtomicUsize,
    state: AtomicU8,
}

impl Default for SharedStats {
    fn default() -> Self {
        Self {
            active: AtomicUsize::new(0),
            buffered: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            state: AtomicU8::new(MergeState::Running.to_u8()),
        }
    }
}

impl SharedStats {
    pub(crate) fn snapshot(&self) -> MergeStats {
        MergeStats {
            active: self.active.load(Ordering::Acquire),
            buffered: self.buffered.load(Ordering::Acquire),
            started: self.started.load(Ordering::Acquire),
            state: self.state(),
        }
    }

    pub(crate) fn state(&self) -> MergeState {
        MergeState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn record(&self, active: usize, buffered: usize, started: usize) {
        self.active.store(active, Ordering::Release);
        self.buffered.store(buffered, Ordering::Release);
        self.started.store(started, Ordering::Release);
    }

    /// Move to `next` unless a terminal state was already reached.
    ///
    /// Returns true if the transition happened.
    pub(crate) fn transition(&self, next: MergeState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (!MergeState::from_u8(current).is_terminal()).then_some(next.to_u8())
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_sticky() {
        let stats = SharedStats::default();
        assert!(stats.transition(MergeState::Draining));
        assert!(stats.transition(MergeState::Errored));
        assert!(!stats.transition(MergeState::Cancelled));
        assert_eq!(stats.state(), MergeState::Errored);
    }

    #[test]
    fn snapshot_reflects_recorded_counters() {
        let stats = SharedStats::default();
        stats.record(2, 5, 7);
        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot,
            MergeStats {
                active: 2,
                buffered: 5,
                started: 7,
                state: MergeState::Running,
            }
        );
    }
}
