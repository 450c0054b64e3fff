//! Observers receiving the merged output.

use futures::channel::mpsc::UnboundedSender;

/// A single notification delivered to a destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeEvent<R, E> {
    /// An output value.
    Next(R),
    /// The merge failed; no further events follow.
    Error(E),
    /// All work finished; no further events follow.
    Complete,
}

/// Receiver of merged values and the terminal notification.
///
/// At most one of [`error`](Self::error) or [`complete`](Self::complete) is
/// called, and nothing is delivered after it.
pub trait Destination<R, E> {
    /// Deliver an output value.
    fn next(&mut self, value: R);
    /// Deliver the terminal error.
    fn error(&mut self, error: E);
    /// Signal successful completion.
    fn complete(&mut self);
}

impl<R, E, D> Destination<R, E> for &mut D
where
    D: Destination<R, E> + ?Sized,
{
    fn next(&mut self, value: R) { (**self).next(value); }

    fn error(&mut self, error: E) { (**self).error(error); }

    fn complete(&mut self) { (**self).complete(); }
}

/// Records every event in order.
impl<R, E> Destination<R, E> for Vec<MergeEvent<R, E>> {
    fn next(&mut self, value: R) { self.push(MergeEvent::Next(value)); }

    fn error(&mut self, error: E) { self.push(MergeEvent::Error(error)); }

    fn complete(&mut self) { self.push(MergeEvent::Complete); }
}

/// Forwards events over a channel. Events sent after the receiver has been
/// dropped are discarded.
impl<R, E> Destination<R, E> for UnboundedSender<MergeEvent<R, E>> {
    fn next(&mut self, value: R) { send(self, MergeEvent::Next(value)); }

    fn error(&mut self, error: E) { send(self, MergeEvent::Error(error)); }

    fn complete(&mut self) { send(self, MergeEvent::Complete); }
}

fn send<R, E>(tx: &UnboundedSender<MergeEvent<R, E>>, event: MergeEvent<R, E>) {
    if tx.unbounded_send(event).is_err() {
        tracing::trace!("merge destination closed; event discarded");
    }
}
