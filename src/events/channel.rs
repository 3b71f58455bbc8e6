//! Progress channel between the engine and a front end.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Engine side of the channel; clones go to rayon workers
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Events sent after the receiver is gone are dropped
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Front-end side of the channel
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Blocks for each event; ends once every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender for callers that don't report progress
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
