//! UART serial communication abstractions
//!
//! Word-level traits for serial transfer. A word holds up to 9 data bits,
//! so these traits speak `u16` rather than `u8`. Byte-oriented users can
//! go through `embedded-io-async` instead.

/// UART transmitter
///
/// Async trait for sending data words over a UART interface.
#[allow(async_fn_in_trait)]
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Send a single word
    ///
    /// Completes once the last stop bit has been held for its full duration.
    async fn write_word(&mut self, word: u16) -> Result<(), Self::Error>;

    /// Send a sequence of words back to back
    async fn write_words(&mut self, words: &[u16]) -> Result<(), Self::Error> {
        for &word in words {
            self.write_word(word).await?;
        }
        Ok(())
    }
}

/// UART receiver
///
/// Async trait for receiving data words from a UART interface.
#[allow(async_fn_in_trait)]
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Receive a single word
    async fn read_word(&mut self) -> Result<u16, Self::Error>;

    /// Fill the buffer with received words
    ///
    /// Returns the first error encountered; words already stored are kept.
    async fn read_words(&mut self, buf: &mut [u16]) -> Result<usize, Self::Error> {
        for slot in buf.iter_mut() {
            *slot = self.read_word().await?;
        }
        Ok(buf.len())
    }
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single object.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}
