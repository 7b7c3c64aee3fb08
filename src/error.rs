//! Error types for the Modbus server handler
//!
//! Mirrors the conventions the client half of this crate already uses:
//! a single `thiserror`-derived enum carrying structured variants, plus a
//! `ModbusResult` alias used throughout.

use thiserror::Error;

/// Errors produced while decoding, validating, or dispatching a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModbusError {
    /// Malformed PDU or frame (too short, oversized, bad framing).
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// A caller supplied a value outside what the operation accepts.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// A Modbus exception response (function code | 0x80) was received or
    /// must be emitted.
    #[error("modbus exception 0x{code:02X} on function 0x{function:02X}: {message}")]
    Exception {
        function: u8,
        code: u8,
        message: String,
    },

    /// An unsupported or unrecognized function code.
    #[error("invalid function code: 0x{code:02X}")]
    InvalidFunction { code: u8 },

    /// The requested unit identifier has no backing register tables.
    #[error("unknown unit id: {unit}")]
    UnknownUnit { unit: u8 },

    /// A processor raised an unexpected fault while touching the store.
    /// Always converted to exception `ServerDeviceFailure` at the dispatch
    /// boundary; never allowed to reach the transport loop.
    #[error("server device failure: {message}")]
    ServerFault { message: String },

    /// The handler's receive loop observed its cancellation signal.
    #[error("handler cancelled")]
    Cancelled,

    /// A fatal transport-level failure (connection reset, buffer exhausted).
    #[error("transport error: {message}")]
    Io { message: String },
}

/// Convenience alias used throughout the crate.
pub type ModbusResult<T> = Result<T, ModbusError>;

impl ModbusError {
    /// Map an internal fault onto the exception code the dispatcher should
    /// emit to the wire. Only protocol-shaped errors carry a direct code;
    /// everything else is a server fault.
    pub fn as_exception_code(&self) -> u8 {
        match self {
            ModbusError::InvalidFunction { .. } => crate::constants::EXCEPTION_ILLEGAL_FUNCTION,
            ModbusError::Exception { code, .. } => *code,
            _ => crate::constants::EXCEPTION_SERVER_DEVICE_FAILURE,
        }
    }
}
