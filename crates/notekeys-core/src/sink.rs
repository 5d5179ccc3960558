use crate::error::InjectError;
use crate::types::InputEvent;
use crossbeam_channel::{Receiver, Sender};

/// Destination of primitive input actions.
pub trait InputSink: Send {
    fn inject(&mut self, event: &InputEvent) -> Result<(), InjectError>;
}

/// Forwards every action over a channel instead of touching the OS.
/// Used for dry runs and as an observation point in tests.
pub struct ChannelSink {
    tx: Sender<InputEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<InputEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl InputSink for ChannelSink {
    fn inject(&mut self, event: &InputEvent) -> Result<(), InjectError> {
        self.tx.send(*event).map_err(|_| InjectError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyEdge;

    #[test]
    fn channel_sink_reports_closed_receiver() {
        let (mut sink, rx) = ChannelSink::new();
        let ev = InputEvent::Unicode('x', KeyEdge::Down);
        sink.inject(&ev).unwrap();
        assert_eq!(rx.try_recv().unwrap(), ev);

        drop(rx);
        assert!(matches!(sink.inject(&ev), Err(InjectError::Closed)));
    }
}
