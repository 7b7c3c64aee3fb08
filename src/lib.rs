//! # Voltage Modbus - Server-Side Request Handling for Industrial Modbus
//!
//! **Author:** Evan Liu <liuyifanz.1996@gmail.com>
//! **License:** MIT
//!
//! A transport-agnostic Modbus request handler: decode a PDU, validate it
//! against a register store's bounds, mutate or read that store, and produce
//! a response PDU or exception, independent of whether the frame arrived
//! over TCP (MBAP) or RTU (serial + CRC).
//!
//! ## Supported Function Codes
//!
//! | Code | Function |
//! |------|----------|
//! | 0x01 | Read Coils |
//! | 0x02 | Read Discrete Inputs |
//! | 0x03 | Read Holding Registers |
//! | 0x04 | Read Input Registers |
//! | 0x05 | Write Single Coil |
//! | 0x06 | Write Single Register |
//! | 0x0F | Write Multiple Coils |
//! | 0x10 | Write Multiple Registers |
//! | 0x17 | Read/Write Multiple Registers |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voltage_modbus::{InMemoryStore, ModbusServer, ModbusRequestHandler, ModbusResult};
//!
//! #[tokio::main]
//! async fn main() -> ModbusResult<()> {
//!     let mut store = InMemoryStore::new();
//!     store.add_unit(1, 64, 64, 32, 32);
//!
//!     let server = ModbusServer::new(store).enable_raising_events(true);
//!     let mut handler = ModbusRequestHandler::new(server);
//!
//!     // Read 2 holding registers from unit 1, starting at address 0.
//!     let response = handler.dispatch_one(1, &[0x03, 0x00, 0x00, 0x00, 0x02]).await?;
//!     println!("response: {:?}", response);
//!     Ok(())
//! }
//! ```

/// Core error types and result handling.
pub mod error;

/// Modbus protocol constants based on official specification.
pub mod constants;

/// Fixed-capacity frame buffer with independent reader/writer cursors.
pub mod frame;

/// Device-specific protocol limits configuration.
pub mod device_limits;

/// Register store collaborator interface and the in-memory default.
pub mod store;

/// Request validation hook and exception-code vocabulary.
pub mod validator;

/// Change-event emission.
pub mod events;

/// Function-code processors.
pub mod processors;

/// Top-level request dispatch.
pub mod dispatch;

/// Shared server state under a coarse-grained lock.
pub mod server;

/// Per-connection request handler lifecycle.
pub mod handler;

/// Transport framing adapters (TCP/RTU).
pub mod transport;

/// Callback logging layered over `tracing`.
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use constants::*;
pub use device_limits::{
    DeviceLimits, DEFAULT_INTER_REQUEST_DELAY_MS, DEFAULT_MAX_READ_COILS,
    DEFAULT_MAX_READ_REGISTERS, DEFAULT_MAX_WRITE_COILS, DEFAULT_MAX_WRITE_REGISTERS,
};
pub use error::{ModbusError, ModbusResult};
pub use events::{ChangeEventSink, ChangeSet};
pub use frame::FrameBuffer;
pub use handler::ModbusRequestHandler;
pub use logging::{CallbackLogger, LogCallback, LogLevel, LoggingMode};
pub use processors::ProcessorContext;
pub use server::ModbusServer;
pub use store::{InMemoryStore, RegisterStore};
pub use transport::{serve_tcp, ReceivedFrame, RequestTransport, TcpRequestTransport};
pub use validator::{ExceptionCode, FnValidator, RequestValidator};

#[cfg(feature = "rtu")]
pub use transport::RtuRequestTransport;

/// Modbus TCP default port.
pub const DEFAULT_TCP_PORT: u16 = 502;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information.
pub fn info() -> String {
    format!(
        "Voltage Modbus v{} - industrial Modbus request handling by Evan Liu",
        VERSION
    )
}
