//! Per-connection request handler lifecycle
//!
//! A [`ModbusRequestHandler`] owns the reusable [`FrameBuffer`] for one
//! connection and a handle to the shared [`ModbusServer`]. `dispatch_one`
//! serves a single request/response pair for callers driving their own I/O
//! loop; `run` drives a full receive loop against a [`RequestTransport`]
//! until the connection closes or cancellation is requested.

use tokio_util::sync::CancellationToken;

use crate::error::ModbusResult;
use crate::frame::FrameBuffer;
use crate::server::ModbusServer;
use crate::transport::RequestTransport;

/// Owns one connection's reusable frame buffer and cancellation handle.
pub struct ModbusRequestHandler {
    server: ModbusServer,
    buf: FrameBuffer,
    cancel: CancellationToken,
}

impl ModbusRequestHandler {
    pub fn new(server: ModbusServer) -> Self {
        Self {
            server,
            buf: FrameBuffer::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Share a cancellation token with the caller (e.g. a listener's
    /// shutdown signal), replacing this handler's own token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A clone of this handler's cancellation token, for external shutdown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Dispatch a single request PDU for `unit` and return the response PDU.
    /// Intended for callers that manage their own transport I/O (tests,
    /// synchronous adapters).
    pub async fn dispatch_one(&mut self, unit: u8, request: &[u8]) -> ModbusResult<&[u8]> {
        self.buf.load_request(request)?;
        self.server.dispatch(unit, &mut self.buf).await?;
        Ok(self.buf.response())
    }

    /// Drive the receive loop against `transport` until it closes or
    /// cancellation fires. Each iteration loads one request, dispatches it
    /// through the shared server (acquiring and releasing the coarse lock
    /// once), writes the response, and clears the buffer for reuse.
    pub async fn run<T: RequestTransport>(mut self, mut transport: T) -> ModbusResult<()> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                received = transport.recv() => {
                    let Some(frame) = received? else { return Ok(()) };
                    self.buf.load_request(&frame.pdu)?;
                    self.server.dispatch(frame.unit, &mut self.buf).await?;
                    if crate::dispatch::is_response_required(frame.unit) {
                        transport.send(frame.unit, self.buf.response()).await?;
                    }
                    self.buf.clear();
                }
            }
        }
    }

    /// Signal cancellation and let any in-flight `run` loop observe it on
    /// its next iteration. Does not itself wait for the loop to exit; callers
    /// that spawned `run` as a task should join that task afterward.
    pub async fn shutdown(self) {
        self.cancel.cancel();
    }
}
