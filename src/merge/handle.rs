//! Control handle for a spawned merge.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::state::{MergeState, MergeStats, SharedStats};

type FinalizeHook = Box<dyn FnOnce() + Send>;

/// Finalisation hook shared between the driving task and its handle.
///
/// Whichever side calls [`run`](Self::run) first invokes the hook; later
/// calls do nothing.
#[derive(Clone, Default)]
pub(crate) struct Finalizer(Arc<Mutex<Option<FinalizeHook>>>);

impl Finalizer {
    pub(crate) fn new(hook: impl FnOnce() + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Some(Box::new(hook)))))
    }

    pub(crate) fn run(&self) {
        let hook = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl std::fmt::Debug for Finalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Finalizer").finish_non_exhaustive()
    }
}

/// Handle to a merge driven on its own tokio task.
///
/// Dropping the handle detaches the task; the merge keeps running until it
/// reaches a terminal state.
#[derive(Debug)]
pub struct MergeHandle {
    shutdown: CancellationToken,
    stats: Arc<SharedStats>,
    finalizer: Finalizer,
    task: JoinHandle<MergeState>,
}

impl MergeHandle {
    pub(crate) fn new(
        shutdown: CancellationToken,
        stats: Arc<SharedStats>,
        finalizer: Finalizer,
        task: JoinHandle<MergeState>,
    ) -> Self {
        Self {
            shutdown,
            stats,
            finalizer,
            task,
        }
    }

    /// Cancel the merge.
    ///
    /// The source and every active inner sequence are dropped without
    /// further delivery to the destination. The finalisation hook has run by
    /// the time this returns. Calling it again, or after the merge already
    /// finished, only re-runs the idempotent steps.
    pub fn teardown(&self) {
        if self.stats.transition(MergeState::Cancelled) {
            tracing::debug!("merge torn down");
        }
        self.shutdown.cancel();
        self.finalizer.run();
    }

    /// Current counters and lifecycle state.
    #[must_use]
    pub fn stats(&self) -> MergeStats { self.stats.snapshot() }

    /// Returns true once the driving task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool { self.task.is_finished() }

    /// Wait for the driving task and return the terminal state.
    ///
    /// A panicking destination or projection is reported as `Cancelled`.
    pub async fn join(self) -> MergeState {
        match self.task.await {
            Ok(state) => state,
            Err(error) => {
                tracing::warn!(%error, "merge task failed");
                MergeState::Cancelled
            }
        }
    }
}
