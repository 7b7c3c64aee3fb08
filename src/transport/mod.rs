//! Server-side transport adapters
//!
//! A transport is responsible only for framing: pulling a complete request
//! PDU (plus its unit id) off the wire and pushing a response PDU back. The
//! dispatcher and handler above this module are transport-agnostic, matching
//! the client half's existing TCP/RTU split at the application layer.

pub mod tcp;

#[cfg(feature = "rtu")]
pub mod rtu;

use crate::error::ModbusResult;

/// A single decoded request: the unit id it targets and its PDU bytes
/// (function code onward, no framing).
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    pub unit: u8,
    pub pdu: Vec<u8>,
}

/// Frames requests in and responses out for one connection.
///
/// Implementations own the underlying socket/serial port; `recv` returns
/// `Ok(None)` on a clean connection close, distinguishing it from a
/// transport-level error.
pub trait RequestTransport: Send {
    fn recv(&mut self) -> impl std::future::Future<Output = ModbusResult<Option<ReceivedFrame>>> + Send;
    fn send(&mut self, unit: u8, pdu: &[u8]) -> impl std::future::Future<Output = ModbusResult<()>> + Send;
}

pub use tcp::{serve_tcp, TcpRequestTransport};

#[cfg(feature = "rtu")]
pub use rtu::RtuRequestTransport;
