//! Bounded-concurrency merge of asynchronous sequences.
//!
//! A [`MergeScheduler`] pulls items from a source stream, projects each item
//! into an inner stream and interleaves the inner outputs into a single
//! [`Destination`]. At most [`MergeConfig::concurrency_limit`] inner streams
//! run at once; further items wait in a FIFO buffer and start as slots free
//! up, optionally paced by a [`Scheduler`].
//!
//! All state lives in one future driven by a biased `select!` loop. Shutdown
//! is checked first, then deferred starts, then inner events and finally the
//! source, so draining work is preferred over accepting new items.
//!
//! ```
//! use eventframe::merge::{MergeConfig, MergeEvent, MergeScheduler};
//! use futures::stream;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = stream::iter([Ok::<u32, ()>(1), Ok(2)]);
//! let config = MergeConfig::with_limit(1).expect("valid limit");
//! let merge = MergeScheduler::merge_map(source, config, |n: u32, _index: usize| {
//!     Ok::<_, ()>(stream::iter([Ok::<u32, ()>(n * 10), Ok(n * 10 + 1)]))
//! });
//!
//! let mut events: Vec<MergeEvent<u32, ()>> = Vec::new();
//! merge.run(&mut events, CancellationToken::new()).await;
//! assert_eq!(
//!     events,
//!     vec![
//!         MergeEvent::Next(10),
//!         MergeEvent::Next(11),
//!         MergeEvent::Next(20),
//!         MergeEvent::Next(21),
//!         MergeEvent::Complete,
//!     ]
//! );
//! # }
//! ```

mod config;
mod destination;
mod handle;
mod routing;
mod scheduler;
mod state;

use std::{collections::VecDeque, sync::Arc};

pub use config::{MAX_CONCURRENCY_LIMIT, MergeConfig, MergeConfigBuilder, MergeConfigError};
pub use destination::{Destination, MergeEvent};
use futures::{
    StreamExt,
    future::{self, BoxFuture},
    stream::{self, BoxStream, FuturesUnordered, SelectAll, Stream},
};
pub use handle::MergeHandle;
use handle::Finalizer;
pub use routing::{Expand, Flatten, Routed, Routing};
pub use scheduler::{DelayScheduler, ImmediateScheduler, RateLimitedScheduler, Scheduler};
pub use state::{MergeState, MergeStats};
use state::SharedStats;
use tokio_util::sync::CancellationToken;

use crate::metrics;

type InnerValueHook<R> = Box<dyn FnMut(&R) + Send>;

/// Merges the inner streams produced from a source stream.
///
/// Built with [`merge_map`](Self::merge_map) or [`expand`](Self::expand) and
/// driven with [`run`](Self::run) or [`spawn`](Self::spawn).
pub struct MergeScheduler<Src, P, Rt, R> {
    source: Src,
    project: P,
    routing: Rt,
    config: MergeConfig,
    scheduler: Option<Arc<dyn Scheduler>>,
    on_inner_value: Option<InnerValueHook<R>>,
    finalizer: Finalizer,
    stats: Arc<SharedStats>,
}

impl<Src, P, R> MergeScheduler<Src, P, Flatten, R> {
    /// Deliver every inner value to the destination.
    ///
    /// `project` receives each source item together with its zero-based start
    /// index.
    #[must_use]
    pub fn merge_map(source: Src, config: MergeConfig, project: P) -> Self {
        Self::with_routing(source, config, project, Flatten)
    }
}

impl<Src, P, T> MergeScheduler<Src, P, Expand, T> {
    /// Recursively expand the source.
    ///
    /// Each item is delivered to the destination as it starts, and every
    /// value an inner stream yields is handled as a new source item.
    #[must_use]
    pub fn expand(source: Src, config: MergeConfig, project: P) -> Self {
        Self::with_routing(source, config, project, Expand)
    }
}

impl<Src, P, Rt, R> MergeScheduler<Src, P, Rt, R> {
    fn with_routing(source: Src, config: MergeConfig, project: P, routing: Rt) -> Self {
        Self {
            source,
            project,
            routing,
            config,
            scheduler: None,
            on_inner_value: None,
            finalizer: Finalizer::default(),
            stats: Arc::new(SharedStats::default()),
        }
    }

    /// Pace the start of buffered items with `scheduler`.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Observe every inner value before it is routed.
    #[must_use]
    pub fn on_inner_value(mut self, hook: impl FnMut(&R) + Send + 'static) -> Self {
        self.on_inner_value = Some(Box::new(hook));
        self
    }

    /// Run `hook` exactly once when the merge ends, however it ends.
    #[must_use]
    pub fn on_finalize(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.finalizer = Finalizer::new(hook);
        self
    }

    /// Current counters and lifecycle state.
    #[must_use]
    pub fn stats(&self) -> MergeStats { self.stats.snapshot() }

    /// Drive the merge on the current task until it completes, fails or
    /// `shutdown` is cancelled.
    ///
    /// Returns the terminal [`MergeState`]. Exactly one of
    /// [`Destination::complete`] or [`Destination::error`] is delivered
    /// unless the merge is cancelled, in which case neither is.
    pub async fn run<T, S, E, D>(self, destination: D, shutdown: CancellationToken) -> MergeState
    where
        Src: Stream<Item = Result<T, E>> + Unpin,
        P: FnMut(T, usize) -> Result<S, E>,
        S: Stream<Item = Result<R, E>> + Send + 'static,
        Rt: Routing<T, R>,
        D: Destination<R, E>,
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
    {
        let Self {
            mut source,
            project,
            routing,
            config,
            scheduler,
            on_inner_value,
            finalizer,
            stats,
        } = self;
        let mut core = Core {
            project,
            routing,
            destination,
            on_inner_value,
            scheduler,
            stats: Arc::clone(&stats),
            limit: config.concurrency_limit(),
            buffer: VecDeque::new(),
            active: 0,
            started: 0,
            source_completed: false,
            inners: SelectAll::new(),
            pending: FuturesUnordered::new(),
        };
        tracing::debug!(limit = core.limit, "merge started");

        let outcome = loop {
            if shutdown.is_cancelled() {
                break MergeState::Cancelled;
            }
            if core.is_done() {
                break MergeState::Completed;
            }
            let step = tokio::select! {
                biased;

                () = shutdown.cancelled() => break MergeState::Cancelled,
                Some(item) = core.pending.next(), if !core.pending.is_empty() => core.start(item),
                Some(event) = core.inners.next(), if !core.inners.is_empty() => match event {
                    InnerEvent::Value(value) => core.on_inner_value(value),
                    InnerEvent::Error(error) => Err(error),
                    InnerEvent::Complete => core.on_inner_complete(),
                },
                item = source.next(), if !core.source_completed => match item {
                    Some(Ok(item)) => core.on_source_item(item),
                    Some(Err(error)) => Err(error),
                    None => {
                        core.on_source_complete();
                        Ok(())
                    }
                },
            };
            if let Err(error) = step {
                if shutdown.is_cancelled() || !stats.transition(MergeState::Errored) {
                    break MergeState::Cancelled;
                }
                core.destination.error(error);
                break MergeState::Errored;
            }
        };

        // A teardown racing the final step has already claimed the terminal
        // state; nothing more reaches the destination.
        let outcome = match outcome {
            MergeState::Completed if !stats.transition(MergeState::Completed) => {
                MergeState::Cancelled
            }
            other => other,
        };
        match outcome {
            MergeState::Completed => {
                core.destination.complete();
                tracing::debug!(started = core.started, "merge completed");
            }
            MergeState::Errored => {
                tracing::debug!(
                    active = core.active,
                    buffered = core.buffer.len(),
                    "merge errored"
                );
            }
            _ => {
                stats.transition(MergeState::Cancelled);
                tracing::debug!(
                    active = core.active,
                    buffered = core.buffer.len(),
                    "merge cancelled"
                );
            }
        }
        drop(core);
        finalizer.run();
        outcome
    }

    /// Drive the merge on a new tokio task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<T, S, E, D>(self, destination: D) -> MergeHandle
    where
        Src: Stream<Item = Result<T, E>> + Unpin + Send + 'static,
        P: FnMut(T, usize) -> Result<S, E> + Send + 'static,
        S: Stream<Item = Result<R, E>> + Send + 'static,
        Rt: Routing<T, R> + Send + 'static,
        D: Destination<R, E> + Send + 'static,
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
    {
        let shutdown = CancellationToken::new();
        let stats = Arc::clone(&self.stats);
        let finalizer = self.finalizer.clone();
        let task = tokio::spawn(self.run(destination, shutdown.clone()));
        MergeHandle::new(shutdown, stats, finalizer, task)
    }
}

enum InnerEvent<R, E> {
    Value(R),
    Error(E),
    Complete,
}

fn inner_events<S, R, E>(inner: S) -> BoxStream<'static, InnerEvent<R, E>>
where
    S: Stream<Item = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    inner
        .map(|result| match result {
            Ok(value) => InnerEvent::Value(value),
            Err(error) => InnerEvent::Error(error),
        })
        .chain(stream::once(future::ready(InnerEvent::Complete)))
        .boxed()
}

/// Mutable merge state owned by the driving loop.
struct Core<T, R, E, P, Rt, D> {
    project: P,
    routing: Rt,
    destination: D,
    on_inner_value: Option<InnerValueHook<R>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    stats: Arc<SharedStats>,
    limit: usize,
    buffer: VecDeque<T>,
    /// Live inner streams plus deferred starts holding a slot.
    active: usize,
    started: usize,
    source_completed: bool,
    inners: SelectAll<BoxStream<'static, InnerEvent<R, E>>>,
    pending: FuturesUnordered<BoxFuture<'static, T>>,
}

impl<T, R, E, P, Rt, D, S> Core<T, R, E, P, Rt, D>
where
    P: FnMut(T, usize) -> Result<S, E>,
    S: Stream<Item = Result<R, E>> + Send + 'static,
    Rt: Routing<T, R>,
    D: Destination<R, E>,
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    fn is_done(&self) -> bool { self.source_completed && self.active == 0 && self.buffer.is_empty() }

    fn on_source_item(&mut self, item: T) -> Result<(), E> {
        if self.active < self.limit {
            self.claim_slot();
            return self.start(item);
        }
        self.buffer.push_back(item);
        tracing::trace!(buffered = self.buffer.len(), "merge item buffered");
        self.publish();
        Ok(())
    }

    fn on_source_complete(&mut self) {
        self.source_completed = true;
        self.stats.transition(MergeState::Draining);
        tracing::debug!(
            active = self.active,
            buffered = self.buffer.len(),
            "merge source completed; draining"
        );
    }

    /// Start `item` in a slot already claimed for it.
    fn start(&mut self, item: T) -> Result<(), E> {
        if let Some(value) = self.routing.forward(&item) {
            self.destination.next(value);
        }
        let index = self.started;
        self.started += 1;
        self.publish();
        let inner = (self.project)(item, index)?;
        tracing::trace!(index, active = self.active, "inner sequence started");
        self.inners.push(inner_events(inner));
        Ok(())
    }

    fn on_inner_value(&mut self, value: R) -> Result<(), E> {
        if let Some(hook) = self.on_inner_value.as_mut() {
            hook(&value);
        }
        match self.routing.route(value) {
            Routed::Emit(value) => {
                self.destination.next(value);
                Ok(())
            }
            Routed::Resubmit(item) => self.on_source_item(item),
        }
    }

    fn on_inner_complete(&mut self) -> Result<(), E> {
        self.release_slot();
        while self.active < self.limit {
            let Some(item) = self.buffer.pop_front() else {
                break;
            };
            self.claim_slot();
            if let Some(scheduler) = self.scheduler.clone() {
                self.pending.push(Box::pin(async move {
                    scheduler.ready().await;
                    item
                }));
            } else {
                self.start(item)?;
            }
        }
        self.publish();
        Ok(())
    }
}

impl<T, R, E, P, Rt, D> Core<T, R, E, P, Rt, D> {
    fn claim_slot(&mut self) {
        self.active += 1;
        metrics::inc_merge_active();
    }

    fn release_slot(&mut self) {
        self.active = self.active.saturating_sub(1);
        metrics::dec_merge_active();
    }

    fn publish(&self) { self.stats.record(self.active, self.buffer.len(), self.started); }
}

impl<T, R, E, P, Rt, D> Drop for Core<T, R, E, P, Rt, D> {
    fn drop(&mut self) {
        while self.active > 0 {
            self.release_slot();
        }
        self.publish();
    }
}
