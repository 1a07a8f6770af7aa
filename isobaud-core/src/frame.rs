//! Frame encoding and decoding
//!
//! Frame format on the line:
//! - START (1 bit): always 0
//! - DATA (5-9 bits): least significant bit first
//! - PARITY (0-1 bit): present unless parity is `None`
//! - STOP (1-2 bits): always 1
//!
//! The line idles high between frames.

use core::iter;

use heapless::Vec;

use crate::config::{Parity, UartConfig};
use crate::error::FramingError;
use crate::parity::parity_bit;

/// Maximum frame length in bits (START + 9 DATA + PARITY + 2 STOP)
pub const MAX_FRAME_BITS: usize = 1 + 9 + 1 + 2;

/// The line levels of one frame, in transmission order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bits: Vec<bool, MAX_FRAME_BITS>,
}

impl Frame {
    /// Build the frame carrying `word`
    ///
    /// Bits of `word` above the configured data width are ignored.
    pub fn new(config: &UartConfig, word: u16) -> Self {
        let word = word & config.data_mask();
        let data = (0..config.bits()).map(|b| (word >> b) & 0x1 == 1);
        let parity = parity_bit(word, config.bits(), config.parity());
        let stop = iter::repeat(true).take(usize::from(config.stop_bits()));

        // A valid config never exceeds MAX_FRAME_BITS
        let bits = iter::once(false)
            .chain(data)
            .chain(parity)
            .chain(stop)
            .collect();

        Self { bits }
    }

    /// Line levels in transmission order (`true` = high)
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of bits in the frame
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always false: a frame has at least a start and a stop bit
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Iterate over the line levels in transmission order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }
}

/// State machine reconstructing words from sampled bits
///
/// Feed it one sample per bit, taken at the bit centre, starting with the
/// start bit. It resets itself after every complete frame and after every
/// error, so the next sample is treated as a new start bit.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameDecoder {
    bits: u8,
    parity: Parity,
    stop_bits: u8,
    state: DecodeState,
    data: u16,
    index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum DecodeState {
    /// Waiting for the start bit sample
    WaitingForStart,
    /// Sampling data bits
    ReadingData,
    /// Waiting for the parity bit
    WaitingForParity,
    /// Sampling stop bits
    ReadingStop,
}

impl FrameDecoder {
    /// Create a decoder for the given frame format
    pub fn new(config: &UartConfig) -> Self {
        Self {
            bits: config.bits(),
            parity: config.parity(),
            stop_bits: config.stop_bits(),
            state: DecodeState::WaitingForStart,
            data: 0,
            index: 0,
        }
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitingForStart;
        self.data = 0;
        self.index = 0;
    }

    /// Whether the decoder is between frames
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::WaitingForStart
    }

    /// Feed a single sampled bit (`true` = line high)
    ///
    /// Returns `Ok(Some(word))` when the last stop bit completes a valid
    /// frame, `Ok(None)` when more bits are needed, or `Err` on a framing
    /// violation.
    pub fn feed(&mut self, bit: bool) -> Result<Option<u16>, FramingError> {
        match self.state {
            DecodeState::WaitingForStart => {
                if bit {
                    self.reset();
                    return Err(FramingError::StartBit);
                }
                self.data = 0;
                self.index = 0;
                self.state = DecodeState::ReadingData;
                Ok(None)
            }
            DecodeState::ReadingData => {
                if bit {
                    self.data |= 1 << self.index;
                }
                self.index += 1;
                if self.index == self.bits {
                    self.index = 0;
                    self.state = if self.parity.is_enabled() {
                        DecodeState::WaitingForParity
                    } else {
                        DecodeState::ReadingStop
                    };
                }
                Ok(None)
            }
            DecodeState::WaitingForParity => {
                if parity_bit(self.data, self.bits, self.parity) != Some(bit) {
                    self.reset();
                    return Err(FramingError::Parity);
                }
                self.state = DecodeState::ReadingStop;
                Ok(None)
            }
            DecodeState::ReadingStop => {
                if !bit {
                    self.reset();
                    return Err(FramingError::StopBit);
                }
                self.index += 1;
                if self.index < self.stop_bits {
                    return Ok(None);
                }

                let word = self.data;
                self.reset();
                Ok(Some(word))
            }
        }
    }

    /// Feed multiple bits to the decoder
    ///
    /// Returns the first complete word found, if any.
    /// Remaining bits after a complete frame are not consumed.
    pub fn feed_bits(&mut self, bits: &[bool]) -> Result<Option<u16>, FramingError> {
        for &bit in bits {
            if let Some(word) = self.feed(bit)? {
                return Ok(Some(word));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowControl;

    fn config(bits: u8, parity: Parity, stop_bits: u8) -> UartConfig {
        UartConfig::new(bits, parity, stop_bits, 9600, FlowControl::None).unwrap()
    }

    #[test]
    fn test_frame_0x55_8e1() {
        let frame = Frame::new(&config(8, Parity::Even, 1), 0x55);
        assert_eq!(
            frame.bits(),
            &[
                false, // start
                true, false, true, false, true, false, true, false, // data, LSB first
                false, // parity: four set bits
                true,  // stop
            ]
        );
    }

    #[test]
    fn test_frame_length_matches_config() {
        let cfg = config(9, Parity::Odd, 2);
        let frame = Frame::new(&cfg, 0x1FF);
        assert_eq!(frame.len(), MAX_FRAME_BITS);
        assert_eq!(frame.len(), cfg.frame_bits() as usize);

        let cfg = config(5, Parity::None, 1);
        assert_eq!(Frame::new(&cfg, 0).len(), 7);
    }

    #[test]
    fn test_frame_masks_wide_word() {
        let cfg = config(5, Parity::None, 1);
        assert_eq!(Frame::new(&cfg, 0xFF), Frame::new(&cfg, 0x1F));
    }

    #[test]
    fn test_decoder_roundtrip() {
        let cfg = config(8, Parity::Odd, 2);
        let frame = Frame::new(&cfg, 0xA7);

        let mut decoder = FrameDecoder::new(&cfg);
        assert_eq!(decoder.feed_bits(frame.bits()), Ok(Some(0xA7)));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_decoder_needs_all_stop_bits() {
        let cfg = config(5, Parity::None, 2);
        let frame = Frame::new(&cfg, 0x0A);
        let (last, head) = frame.bits().split_last().unwrap();

        let mut decoder = FrameDecoder::new(&cfg);
        assert_eq!(decoder.feed_bits(head), Ok(None));
        assert_eq!(decoder.feed(*last), Ok(Some(0x0A)));
    }

    #[test]
    fn test_decoder_start_bit_error() {
        let mut decoder = FrameDecoder::new(&config(8, Parity::None, 1));
        assert_eq!(decoder.feed(true), Err(FramingError::StartBit));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_decoder_parity_error() {
        let cfg = config(8, Parity::Even, 1);
        let mut bits = Frame::new(&cfg, 0x55).bits().to_vec();
        // Flip the parity bit
        bits[9] = !bits[9];

        let mut decoder = FrameDecoder::new(&cfg);
        assert_eq!(decoder.feed_bits(&bits), Err(FramingError::Parity));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_decoder_stop_bit_error() {
        let cfg = config(8, Parity::None, 2);
        let mut bits = Frame::new(&cfg, 0x3C).bits().to_vec();
        // Second stop bit low
        let last = bits.len() - 1;
        bits[last] = false;

        let mut decoder = FrameDecoder::new(&cfg);
        assert_eq!(decoder.feed_bits(&bits), Err(FramingError::StopBit));
    }

    #[test]
    fn test_decoder_recovers_after_error() {
        let cfg = config(7, Parity::None, 1);
        let mut decoder = FrameDecoder::new(&cfg);
        assert_eq!(decoder.feed(true), Err(FramingError::StartBit));

        let frame = Frame::new(&cfg, 0x41);
        assert_eq!(decoder.feed_bits(frame.bits()), Ok(Some(0x41)));
    }
}
