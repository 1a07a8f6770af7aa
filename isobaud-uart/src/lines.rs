//! Line bindings
//!
//! The four signals a UART module is wired to. `ctsn` and `rtsn` are
//! active low and optional; leaving them out types them as
//! [`Unconnected`].

use isobaud_hal::Unconnected;

/// Signals bound to one UART module
#[derive(Debug)]
pub struct UartLines<TX, RX, CTS = Unconnected, RTS = Unconnected> {
    /// Transmit line, driven by the transmitter
    pub tx: TX,
    /// Receive line, sampled by the receiver
    pub rx: RX,
    /// Clear-to-send (active low), driven by the receiver toward the peer
    pub ctsn: Option<CTS>,
    /// Request-to-send (active low), driven by the peer, sampled by the
    /// transmitter
    pub rtsn: Option<RTS>,
}

impl<TX, RX> UartLines<TX, RX> {
    /// Bind only the data lines
    pub fn new(tx: TX, rx: RX) -> Self {
        Self {
            tx,
            rx,
            ctsn: None,
            rtsn: None,
        }
    }
}

impl<TX, RX, CTS, RTS> UartLines<TX, RX, CTS, RTS> {
    /// Bind both handshake lines
    pub fn with_flow_control<C, R>(self, ctsn: C, rtsn: R) -> UartLines<TX, RX, C, R> {
        UartLines {
            tx: self.tx,
            rx: self.rx,
            ctsn: Some(ctsn),
            rtsn: Some(rtsn),
        }
    }

    /// Bind the clear-to-send line only
    pub fn with_ctsn<C>(self, ctsn: C) -> UartLines<TX, RX, C, RTS> {
        UartLines {
            tx: self.tx,
            rx: self.rx,
            ctsn: Some(ctsn),
            rtsn: self.rtsn,
        }
    }

    /// Bind the request-to-send line only
    pub fn with_rtsn<R>(self, rtsn: R) -> UartLines<TX, RX, CTS, R> {
        UartLines {
            tx: self.tx,
            rx: self.rx,
            ctsn: self.ctsn,
            rtsn: Some(rtsn),
        }
    }
}
