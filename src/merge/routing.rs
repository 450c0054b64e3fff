//! Where inner values go once produced.

/// Outcome of routing one inner value.
#[derive(Debug)]
pub enum Routed<T, R> {
    /// Deliver to the destination.
    Emit(R),
    /// Treat as a fresh source item.
    Resubmit(T),
}

/// Routing policy for a merge.
///
/// Implemented by [`Flatten`] and [`Expand`]; selected through
/// [`super::MergeScheduler::merge_map`] and [`super::MergeScheduler::expand`].
pub trait Routing<T, R> {
    /// Value delivered to the destination just before `item` starts.
    fn forward(&self, item: &T) -> Option<R>;

    /// Decide what happens to a value produced by an inner sequence.
    fn route(&self, value: R) -> Routed<T, R>;
}

/// Inner values go straight to the destination.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flatten;

impl<T, R> Routing<T, R> for Flatten {
    fn forward(&self, _item: &T) -> Option<R> { None }

    fn route(&self, value: R) -> Routed<T, R> { Routed::Emit(value) }
}

/// Every started item is emitted and every inner value is fed back in as a
/// new item.
#[derive(Clone, Copy, Debug, Default)]
pub struct Expand;

impl<T: Clone> Routing<T, T> for Expand {
    fn forward(&self, item: &T) -> Option<T> { Some(item.clone()) }

    fn route(&self, value: T) -> Routed<T, T> { Routed::Resubmit(value) }
}
