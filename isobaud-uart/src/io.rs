//! Trait adapters
//!
//! Exposes the two halves through the word-level `isobaud-hal` UART traits
//! and the byte-level `embedded-io-async` traits, so code written against
//! either can drive a modelled UART.

use embedded_io::ErrorType;
use embedded_io_async::{Read, Write};
use isobaud_hal::{ClockSource, RxLine, TxLine, UartRx, UartTx};

use crate::error::Error;
use crate::rx::UartReceiver;
use crate::tx::UartTransmitter;

impl<TX: TxLine, RTS: RxLine, C: ClockSource> UartTx for UartTransmitter<TX, RTS, C> {
    type Error = Error;

    async fn write_word(&mut self, word: u16) -> Result<(), Self::Error> {
        self.send(word).await
    }
}

impl<RX: RxLine, CTS: TxLine, C: ClockSource> UartRx for UartReceiver<RX, CTS, C> {
    type Error = Error;

    async fn read_word(&mut self) -> Result<u16, Self::Error> {
        self.receive().await
    }
}

impl<TX: TxLine, RTS: RxLine, C: ClockSource> ErrorType for UartTransmitter<TX, RTS, C> {
    type Error = Error;
}

impl<TX: TxLine, RTS: RxLine, C: ClockSource> Write for UartTransmitter<TX, RTS, C> {
    /// Sends the whole buffer, one frame per byte
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.send(u16::from(byte)).await?;
        }
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        // a send returns only after its last stop bit
        Ok(())
    }
}

impl<RX: RxLine, CTS: TxLine, C: ClockSource> ErrorType for UartReceiver<RX, CTS, C> {
    type Error = Error;
}

impl<RX: RxLine, CTS: TxLine, C: ClockSource> Read for UartReceiver<RX, CTS, C> {
    /// Receives one frame per call
    ///
    /// Words wider than a byte fail with [`Error::WordTooWide`].
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(slot) = buf.first_mut() else {
            return Ok(0);
        };
        let word = self.receive().await?;
        *slot = u8::try_from(word).map_err(|_| Error::WordTooWide(word))?;
        Ok(1)
    }
}
