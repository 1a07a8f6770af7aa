//! Destinations for received words
//!
//! [`UartReceiver::run`](crate::UartReceiver::run) reports every decoded
//! word and every dropped frame to an [`RxSink`]. Implementations are
//! provided for a fixed-capacity buffer, an `embassy-sync` channel sender
//! and a plain closure.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use isobaud_core::FramingError;

use crate::fmt::warn;

/// Something the receiver produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// A frame decoded cleanly
    Word(u16),
    /// A frame was dropped
    FramingError(FramingError),
}

/// Consumer of receiver output
pub trait RxSink {
    /// A word was decoded
    fn on_word(&mut self, word: u16);

    /// A frame was dropped; ignored by default
    fn on_framing_error(&mut self, error: FramingError) {
        let _ = error;
    }
}

impl<S: RxSink + ?Sized> RxSink for &mut S {
    fn on_word(&mut self, word: u16) {
        S::on_word(self, word)
    }

    fn on_framing_error(&mut self, error: FramingError) {
        S::on_framing_error(self, error)
    }
}

/// Collects words until full, then drops them
impl<const N: usize> RxSink for heapless::Vec<u16, N> {
    fn on_word(&mut self, word: u16) {
        if self.push(word).is_err() {
            warn!("RX buffer full, dropping {:?}", word);
        }
    }
}

/// Forwards every event without blocking the receiver
impl<M: RawMutex, const N: usize> RxSink for Sender<'_, M, RxEvent, N> {
    fn on_word(&mut self, word: u16) {
        if self.try_send(RxEvent::Word(word)).is_err() {
            warn!("RX channel full, dropping {:?}", word);
        }
    }

    fn on_framing_error(&mut self, error: FramingError) {
        if self.try_send(RxEvent::FramingError(error)).is_err() {
            warn!("RX channel full, dropping {}", error);
        }
    }
}

/// Adapts a closure taking [`RxEvent`]s
pub struct FnSink<F>(pub F);

impl<F: FnMut(RxEvent)> RxSink for FnSink<F> {
    fn on_word(&mut self, word: u16) {
        (self.0)(RxEvent::Word(word))
    }

    fn on_framing_error(&mut self, error: FramingError) {
        (self.0)(RxEvent::FramingError(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::channel::Channel;

    #[test]
    fn test_buffer_sink_drops_when_full() {
        let mut buffer = heapless::Vec::<u16, 2>::new();
        buffer.on_word(1);
        buffer.on_word(2);
        buffer.on_word(3);
        buffer.on_framing_error(FramingError::Parity);
        assert_eq!(buffer.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_channel_sink_forwards_events() {
        let channel = Channel::<NoopRawMutex, RxEvent, 2>::new();
        let mut sender = channel.sender();

        sender.on_word(0x41);
        sender.on_framing_error(FramingError::StartBit);
        sender.on_word(0x42);

        assert_eq!(channel.try_receive(), Ok(RxEvent::Word(0x41)));
        assert_eq!(
            channel.try_receive(),
            Ok(RxEvent::FramingError(FramingError::StartBit))
        );
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn test_fn_sink_through_reference() {
        fn feed<S: RxSink>(mut sink: S) {
            sink.on_word(7);
            sink.on_framing_error(FramingError::StopBit);
        }

        let mut seen = Vec::new();
        let mut sink = FnSink(|event: RxEvent| seen.push(event));
        feed(&mut sink);
        feed(&mut sink);
        drop(sink);
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], RxEvent::Word(7));
        assert_eq!(seen[1], RxEvent::FramingError(FramingError::StopBit));
    }
}
