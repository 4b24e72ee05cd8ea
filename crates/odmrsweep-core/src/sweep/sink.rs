//! Snapshot delivery from the sweep worker
//!
//! The worker's accumulating series never leaves the thread by reference;
//! it escapes only as value snapshots through a [`SweepSink`]. Three
//! implementations ship with the crate: a crossbeam event channel, plain
//! callbacks, and the double buffer from [`super::buffer`].

use crossbeam_channel::{Receiver, Sender};

use super::buffer::SweepPublisher;
use super::result::SweepResult;

/// Events emitted by a sweep worker
#[derive(Debug, Clone)]
pub enum SweepEvent {
    /// Partial snapshot mid-sweep; a monotonically growing prefix of the
    /// final series
    Update(SweepResult),
    /// Final series; emitted exactly once per started sweep, whether it
    /// completed or was cancelled
    Done(SweepResult),
}

/// Consumer boundary for sweep snapshots.
///
/// `on_update` observes monotonically growing prefixes of the final
/// series; `on_done` fires exactly once per started sweep. Neither call
/// may block for long, since the worker invokes them inline between points.
pub trait SweepSink: Send + 'static {
    /// A partial (or final) snapshot of the series acquired so far.
    fn on_update(&mut self, snapshot: SweepResult);

    /// The final series for this run.
    fn on_done(&mut self, result: SweepResult);
}

/// Sink that forwards events over an unbounded crossbeam channel.
///
/// Sending never blocks the worker; events sent after the receiver is
/// dropped are discarded.
pub struct ChannelSink {
    sender: Sender<SweepEvent>,
}

impl ChannelSink {
    /// Create a sink and its receiving end.
    pub fn unbounded() -> (Self, Receiver<SweepEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Wrap an existing sender.
    ///
    /// Pass a sender from an unbounded channel; on a full bounded channel
    /// the done event would be dropped along with updates.
    pub fn new(sender: Sender<SweepEvent>) -> Self {
        Self { sender }
    }
}

impl SweepSink for ChannelSink {
    fn on_update(&mut self, snapshot: SweepResult) {
        let _ = self.sender.send(SweepEvent::Update(snapshot));
    }

    fn on_done(&mut self, result: SweepResult) {
        let _ = self.sender.send(SweepEvent::Done(result));
    }
}

/// Sink that invokes a pair of closures.
pub struct CallbackSink<U, D>
where
    U: FnMut(SweepResult) + Send + 'static,
    D: FnMut(SweepResult) + Send + 'static,
{
    on_update: U,
    on_done: D,
}

impl<U, D> CallbackSink<U, D>
where
    U: FnMut(SweepResult) + Send + 'static,
    D: FnMut(SweepResult) + Send + 'static,
{
    pub fn new(on_update: U, on_done: D) -> Self {
        Self { on_update, on_done }
    }
}

impl<U, D> SweepSink for CallbackSink<U, D>
where
    U: FnMut(SweepResult) + Send + 'static,
    D: FnMut(SweepResult) + Send + 'static,
{
    fn on_update(&mut self, snapshot: SweepResult) {
        (self.on_update)(snapshot);
    }

    fn on_done(&mut self, result: SweepResult) {
        (self.on_done)(result);
    }
}

/// Sink that publishes snapshots into a double buffer.
///
/// The final series is published like any update so a polling consumer
/// always converges on the complete data; completion itself can
/// additionally be signaled over an event channel.
pub struct BufferSink {
    publisher: SweepPublisher,
    done_tx: Option<Sender<SweepEvent>>,
}

impl BufferSink {
    /// Publish into `publisher`, with no separate completion signal.
    pub fn new(publisher: SweepPublisher) -> Self {
        Self {
            publisher,
            done_tx: None,
        }
    }

    /// Also send a [`SweepEvent::Done`] over `sender` when the run ends.
    pub fn with_done_channel(mut self, sender: Sender<SweepEvent>) -> Self {
        self.done_tx = Some(sender);
        self
    }
}

impl SweepSink for BufferSink {
    fn on_update(&mut self, snapshot: SweepResult) {
        self.publisher.publish(snapshot);
    }

    fn on_done(&mut self, result: SweepResult) {
        self.publisher.publish(result.clone());
        if let Some(tx) = &self.done_tx {
            let _ = tx.send(SweepEvent::Done(result));
        }
    }
}
