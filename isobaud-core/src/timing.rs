//! Bit timing
//!
//! The bit period is a whole number of reference clock ticks:
//!
//! ```text
//! divisor      = round(clock_frequency / baud)
//! bit_duration = clock_period * divisor
//! ```
//!
//! Rounding is half-to-even and is computed exactly on integers, so the
//! result never depends on floating point representation.

use isobaud_hal::time::{Duration, STEPS_PER_SECOND};

use crate::config::UartConfig;
use crate::error::ConfigurationError;
use crate::frame::MAX_FRAME_BITS;

/// Bit period derived from a reference clock and a baud rate
///
/// Computed once when a module is built and never updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    clock_period: Duration,
    divisor: u64,
    bit_duration: Duration,
}

impl BitTiming {
    /// Derive the timing for `baud` against a clock
    ///
    /// When `clock_frequency_hz` is `None` the frequency is inferred as
    /// `1 / clock_period`.
    pub fn new(
        clock_period: Duration,
        clock_frequency_hz: Option<u64>,
        baud: u32,
    ) -> Result<Self, ConfigurationError> {
        if baud == 0 {
            return Err(ConfigurationError::InvalidBaud(baud));
        }
        if clock_period.is_zero() {
            return Err(ConfigurationError::InvalidClockPeriod);
        }

        let divisor = match clock_frequency_hz {
            Some(hz) => round_half_even(u128::from(hz), u128::from(baud)),
            None => round_half_even(
                u128::from(STEPS_PER_SECOND),
                u128::from(clock_period.as_steps()) * u128::from(baud),
            ),
        };
        if divisor == 0 {
            return Err(ConfigurationError::DegenerateDivisor);
        }

        let divisor = u64::try_from(divisor).map_err(|_| ConfigurationError::TimingOverflow)?;
        let bit_duration = clock_period
            .checked_mul(divisor)
            .ok_or(ConfigurationError::TimingOverflow)?;
        // The longest frame must fit too, so frame_duration cannot overflow
        bit_duration
            .checked_mul(MAX_FRAME_BITS as u64)
            .ok_or(ConfigurationError::TimingOverflow)?;

        Ok(Self {
            clock_period,
            divisor,
            bit_duration,
        })
    }

    /// Derive the timing for a configuration's baud rate
    pub fn for_config(
        config: &UartConfig,
        clock_period: Duration,
        clock_frequency_hz: Option<u64>,
    ) -> Result<Self, ConfigurationError> {
        Self::new(clock_period, clock_frequency_hz, config.baud())
    }

    /// Reference clock ticks per bit
    pub fn divisor(&self) -> u64 {
        self.divisor
    }

    /// Reference clock period
    pub fn clock_period(&self) -> Duration {
        self.clock_period
    }

    /// Duration of one bit on the line
    pub fn bit_duration(&self) -> Duration {
        self.bit_duration
    }

    /// Offset from a start edge to the centre of the start bit
    ///
    /// Rounded down to a whole step when the bit duration is odd.
    pub fn half_bit_duration(&self) -> Duration {
        self.bit_duration / 2
    }

    /// Time one complete frame occupies on the line
    ///
    /// Construction rejects bit durations whose longest frame would not
    /// fit in a [`Duration`].
    pub fn frame_duration(&self, config: &UartConfig) -> Duration {
        self.bit_duration * u64::from(config.frame_bits())
    }
}

/// `numerator / denominator` rounded to the nearest integer, ties to even
///
/// `denominator` must be non-zero.
pub fn round_half_even(numerator: u128, denominator: u128) -> u128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let twice = remainder * 2;

    if twice > denominator || (twice == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_even_ties() {
        assert_eq!(round_half_even(15, 10), 2); // 1.5 -> 2
        assert_eq!(round_half_even(25, 10), 2); // 2.5 -> 2
        assert_eq!(round_half_even(35, 10), 4); // 3.5 -> 4
        assert_eq!(round_half_even(5, 10), 0); // 0.5 -> 0
    }

    #[test]
    fn test_round_half_even_non_ties() {
        assert_eq!(round_half_even(14, 10), 1);
        assert_eq!(round_half_even(16, 10), 2);
        assert_eq!(round_half_even(100, 10), 10);
    }

    #[test]
    fn test_explicit_frequency() {
        // 100 MHz clock, 115200 baud -> 868.05 -> 868
        let timing = BitTiming::new(Duration::from_ns(10), Some(100_000_000), 115_200).unwrap();
        assert_eq!(timing.divisor(), 868);
        assert_eq!(timing.bit_duration(), Duration::from_ns(8680));
    }

    #[test]
    fn test_inferred_frequency() {
        // 10 ns period -> 100 MHz
        let timing = BitTiming::new(Duration::from_ns(10), None, 115_200).unwrap();
        assert_eq!(timing.divisor(), 868);
    }

    #[test]
    fn test_divisor_ten_at_9600() {
        let timing = BitTiming::new(Duration::from_ps(10_416_667), None, 9600).unwrap();
        assert_eq!(timing.divisor(), 10);
        assert_eq!(timing.bit_duration(), Duration::from_ps(104_166_670));
        assert_eq!(timing.half_bit_duration(), Duration::from_ps(52_083_335));
    }

    #[test]
    fn test_explicit_frequency_tie_rounds_to_even() {
        // 25 Hz / 10 baud = 2.5 -> 2
        let timing = BitTiming::new(Duration::from_ms(40), Some(25), 10).unwrap();
        assert_eq!(timing.divisor(), 2);
        // 15 Hz / 10 baud = 1.5 -> 2
        let timing = BitTiming::new(Duration::from_ms(40), Some(15), 10).unwrap();
        assert_eq!(timing.divisor(), 2);
    }

    #[test]
    fn test_degenerate_divisor() {
        // 1 kHz clock cannot carry 9600 baud
        assert_eq!(
            BitTiming::new(Duration::from_ms(1), None, 9600),
            Err(ConfigurationError::DegenerateDivisor)
        );
        // 0.5 rounds to 0
        assert_eq!(
            BitTiming::new(Duration::from_ms(1), Some(1000), 2000),
            Err(ConfigurationError::DegenerateDivisor)
        );
    }

    #[test]
    fn test_divisor_of_one_is_allowed() {
        let timing = BitTiming::new(Duration::from_us(1), None, 1_000_000).unwrap();
        assert_eq!(timing.divisor(), 1);
        assert_eq!(timing.bit_duration(), Duration::from_us(1));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            BitTiming::new(Duration::from_ns(10), None, 0),
            Err(ConfigurationError::InvalidBaud(0))
        );
        assert_eq!(
            BitTiming::new(Duration::ZERO, None, 9600),
            Err(ConfigurationError::InvalidClockPeriod)
        );
        assert_eq!(
            BitTiming::new(Duration::from_steps(u64::MAX), Some(u64::MAX), 1),
            Err(ConfigurationError::TimingOverflow)
        );
    }

    #[test]
    fn test_bit_too_long_for_a_frame() {
        // One bit fits, thirteen do not
        let period = Duration::from_steps(u64::MAX / 4);
        assert_eq!(
            BitTiming::new(period, Some(1), 1),
            Err(ConfigurationError::TimingOverflow)
        );

        let period = Duration::from_steps(u64::MAX / MAX_FRAME_BITS as u64);
        let timing = BitTiming::new(period, Some(1), 1).unwrap();
        let config = UartConfig::builder()
            .bits(9)
            .parity(crate::config::Parity::Even)
            .stop_bits(2)
            .baud(1)
            .build()
            .unwrap();
        assert_eq!(timing.frame_duration(&config), period * MAX_FRAME_BITS as u64);
    }

    #[test]
    fn test_frame_duration() {
        let config = UartConfig::builder()
            .parity(crate::config::Parity::Even)
            .baud(9600)
            .build()
            .unwrap();
        let timing = BitTiming::for_config(&config, Duration::from_ns(10), Some(96_000)).unwrap();
        assert_eq!(timing.divisor(), 10);
        // 1 start + 8 data + 1 parity + 1 stop
        assert_eq!(timing.frame_duration(&config), Duration::from_ns(10) * 10 * 11);
    }
}
