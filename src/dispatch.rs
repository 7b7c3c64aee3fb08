//! Top-level request dispatch
//!
//! `dispatch()` is the single entry point a handler calls once a complete
//! request PDU has been loaded into a [`FrameBuffer`]: it reads the function
//! code, selects the matching processor, and guarantees a response is always
//! written, converting any internal fault into a `ServerDeviceFailure`
//! exception rather than letting it escape to the transport loop.

use crate::constants::EXCEPTION_SERVER_DEVICE_FAILURE;
use crate::error::ModbusResult;
use crate::frame::FrameBuffer;
use crate::processors::{self, ProcessorContext};

/// Whether a unit id expects a response at all.
///
/// Unit 0 is the Modbus broadcast address: a request addressed to it is
/// processed by every device on the line but no device replies, so the
/// dispatcher must not produce (or send) a response PDU for it.
pub fn is_response_required(unit: u8) -> bool {
    unit != 0
}

/// Dispatch the request currently loaded in `buf` and return the number of
/// response bytes written.
///
/// The buffer's reader cursor must be at position 0 (i.e. `load_request` was
/// just called); the writer cursor is reset here before invoking the
/// processor, so a processor always starts writing at offset 0. Returns `0`
/// without touching the buffer at all if `ctx.unit` is the broadcast address.
pub fn dispatch(ctx: &mut ProcessorContext<'_>, buf: &mut FrameBuffer) -> ModbusResult<usize> {
    if !is_response_required(ctx.unit) {
        tracing::debug!(unit = ctx.unit, "broadcast request, suppressing response");
        return Ok(0);
    }

    let fc = buf.read_u8()?;
    buf.seek_writer(0);

    match processors::invoke(fc, ctx, buf) {
        Ok(()) => {
            tracing::debug!(
                unit = ctx.unit,
                function = format!("0x{fc:02X}"),
                response_len = buf.response_len(),
                "request dispatched"
            );
        }
        Err(err) => {
            tracing::warn!(
                unit = ctx.unit,
                function = format!("0x{fc:02X}"),
                error = %err,
                "processor fault, returning server device failure"
            );
            buf.seek_writer(0);
            processors::write_exception(buf, fc, EXCEPTION_SERVER_DEVICE_FAILURE)?;
        }
    }

    Ok(buf.response_len())
}
