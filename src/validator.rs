//! Request validation hook and exception-code vocabulary
//!
//! A `RequestValidator` is an optional policy callback consulted before any
//! bounds check: `(unit, function, address, quantity) -> Option<exception>`.
//! `None` permits the request to proceed to the standard bounds check;
//! `Some(code)` aborts the request with that exception code.

use crate::constants::{
    EXCEPTION_ILLEGAL_DATA_ADDRESS, EXCEPTION_ILLEGAL_DATA_VALUE, EXCEPTION_ILLEGAL_FUNCTION,
    EXCEPTION_SERVER_DEVICE_FAILURE,
};

/// Modbus exception codes, as returned on the wire in an exception PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    ServerDeviceFailure,
    /// A validator-defined code outside the four standard ones above
    /// (acknowledge, device busy, gateway failures, or an application-specific
    /// code a `RequestValidator` hook chooses to return).
    Other(u8),
}

impl ExceptionCode {
    pub fn code(self) -> u8 {
        match self {
            ExceptionCode::IllegalFunction => EXCEPTION_ILLEGAL_FUNCTION,
            ExceptionCode::IllegalDataAddress => EXCEPTION_ILLEGAL_DATA_ADDRESS,
            ExceptionCode::IllegalDataValue => EXCEPTION_ILLEGAL_DATA_VALUE,
            ExceptionCode::ServerDeviceFailure => EXCEPTION_SERVER_DEVICE_FAILURE,
            ExceptionCode::Other(code) => code,
        }
    }
}

impl From<u8> for ExceptionCode {
    fn from(code: u8) -> Self {
        match code {
            EXCEPTION_ILLEGAL_FUNCTION => ExceptionCode::IllegalFunction,
            EXCEPTION_ILLEGAL_DATA_ADDRESS => ExceptionCode::IllegalDataAddress,
            EXCEPTION_ILLEGAL_DATA_VALUE => ExceptionCode::IllegalDataValue,
            EXCEPTION_SERVER_DEVICE_FAILURE => ExceptionCode::ServerDeviceFailure,
            other => ExceptionCode::Other(other),
        }
    }
}

/// Optional policy hook consulted before the standard bounds check.
///
/// Runs under the server's coarse lock in asynchronous mode (§5); it must
/// not call back into the server's register-mutating methods. Doing so
/// from within `validate` would attempt to re-acquire a lock already held by
/// the calling dispatch and deadlock (or, for an in-process `&mut` borrow,
/// fail to compile).
pub trait RequestValidator: Send + Sync {
    /// Return `Some(code)` to reject the request with that exception code,
    /// or `None` to let the standard bounds check run.
    fn validate(&self, unit: u8, function: u8, address: u16, quantity: u16) -> Option<ExceptionCode>;
}

/// A validator built from a plain closure, for callers who don't need a
/// dedicated type.
pub struct FnValidator<F>(pub F)
where
    F: Fn(u8, u8, u16, u16) -> Option<ExceptionCode> + Send + Sync;

impl<F> RequestValidator for FnValidator<F>
where
    F: Fn(u8, u8, u16, u16) -> Option<ExceptionCode> + Send + Sync,
{
    fn validate(&self, unit: u8, function: u8, address: u16, quantity: u16) -> Option<ExceptionCode> {
        (self.0)(unit, function, address, quantity)
    }
}
