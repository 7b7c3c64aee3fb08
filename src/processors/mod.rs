//! Function-code processors
//!
//! One processor per supported function code, each following the
//! read/validate/mutate/write-response pattern of spec.md §4.4/§4.5.
//! Dispatch itself is a single tagged match (`invoke`) over the function
//! code, per the "Dispatch via tagged variant" design note, replacing the
//! source's dynamic method-pointer selection.

mod read;
mod read_write;
mod write;

use crate::constants::{
    EXCEPTION_ILLEGAL_DATA_ADDRESS, EXCEPTION_ILLEGAL_DATA_VALUE, EXCEPTION_ILLEGAL_FUNCTION,
    FC_READ_COILS, FC_READ_DISCRETE_INPUTS, FC_READ_HOLDING_REGISTERS, FC_READ_INPUT_REGISTERS,
    FC_READ_WRITE_MULTIPLE_REGISTERS, FC_WRITE_MULTIPLE_COILS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_COIL, FC_WRITE_SINGLE_REGISTER,
};
use crate::device_limits::DeviceLimits;
use crate::error::ModbusResult;
use crate::events::ChangeEventSink;
use crate::frame::FrameBuffer;
use crate::store::RegisterStore;
use crate::validator::RequestValidator;

/// Everything a processor needs to read/validate/mutate/respond, borrowed
/// for the duration of a single dispatch.
pub struct ProcessorContext<'a> {
    pub unit: u8,
    pub store: &'a mut dyn RegisterStore,
    pub validator: Option<&'a dyn RequestValidator>,
    pub event_sink: Option<&'a dyn ChangeEventSink>,
    pub enable_raising_events: bool,
    pub limits: &'a DeviceLimits,
}

/// Select and invoke the processor for `fc`. Unsupported or unrecognized
/// function codes fall through to the illegal-function processor.
pub fn invoke(fc: u8, ctx: &mut ProcessorContext<'_>, buf: &mut FrameBuffer) -> ModbusResult<()> {
    match fc {
        FC_READ_COILS => read::process_read_coils(ctx, buf),
        FC_READ_DISCRETE_INPUTS => read::process_read_discrete_inputs(ctx, buf),
        FC_READ_HOLDING_REGISTERS => read::process_read_holding_registers(ctx, buf),
        FC_READ_INPUT_REGISTERS => read::process_read_input_registers(ctx, buf),
        FC_WRITE_SINGLE_COIL => write::process_write_single_coil(ctx, buf),
        FC_WRITE_SINGLE_REGISTER => write::process_write_single_register(ctx, buf),
        FC_WRITE_MULTIPLE_COILS => write::process_write_multiple_coils(ctx, buf),
        FC_WRITE_MULTIPLE_REGISTERS => write::process_write_multiple_registers(ctx, buf),
        FC_READ_WRITE_MULTIPLE_REGISTERS => read_write::process_read_write_multiple_registers(ctx, buf),
        other => process_illegal_function(other, buf),
    }
}

/// Write a 2-byte exception PDU: `[fc | 0x80][code]`.
pub fn write_exception(buf: &mut FrameBuffer, fc: u8, code: u8) -> ModbusResult<()> {
    buf.write_u8(fc | 0x80)?;
    buf.write_u8(code)
}

/// Any function code outside the supported set: always an `IllegalFunction`
/// exception, never an internal fault.
fn process_illegal_function(fc: u8, buf: &mut FrameBuffer) -> ModbusResult<()> {
    tracing::debug!(function = format!("0x{fc:02X}"), "illegal function code");
    write_exception(buf, fc, EXCEPTION_ILLEGAL_FUNCTION)
}

/// The bounds/validation envelope shared by every processor (spec.md §4.3).
///
/// Returns `Ok(true)` when the request passed and processing should
/// continue; `Ok(false)` when an exception has already been written to
/// `buf` and the processor must return without touching the store.
pub fn check_register_bounds(
    ctx: &ProcessorContext<'_>,
    buf: &mut FrameBuffer,
    fc: u8,
    address: u16,
    max_address: u16,
    quantity: u16,
    max_quantity: u16,
) -> ModbusResult<bool> {
    if let Some(validator) = ctx.validator {
        if let Some(code) = validator.validate(ctx.unit, fc, address, quantity) {
            write_exception(buf, fc, code.code())?;
            return Ok(false);
        }
    }

    if u32::from(address) + u32::from(quantity) > u32::from(max_address) {
        write_exception(buf, fc, EXCEPTION_ILLEGAL_DATA_ADDRESS)?;
        return Ok(false);
    }

    if quantity == 0 || quantity > max_quantity {
        write_exception(buf, fc, EXCEPTION_ILLEGAL_DATA_VALUE)?;
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn ctx<'a>(store: &'a mut InMemoryStore, limits: &'a DeviceLimits) -> ProcessorContext<'a> {
        ProcessorContext {
            unit: 1,
            store,
            validator: None,
            event_sink: None,
            enable_raising_events: false,
            limits,
        }
    }

    #[test]
    fn unsupported_function_is_illegal_function() {
        let mut buf = FrameBuffer::new();
        buf.load_request(&[0x2B]).unwrap();
        let _fc = buf.read_u8().unwrap();
        buf.seek_writer(0);
        process_illegal_function(0x2B, &mut buf).unwrap();
        assert_eq!(buf.response(), &[0xAB, 0x01]);
    }

    #[test]
    fn bounds_check_rejects_zero_quantity() {
        let mut store = InMemoryStore::new();
        store.add_unit(1, 16, 16, 16, 16);
        let limits = DeviceLimits::new();
        let c = ctx(&mut store, &limits);
        let mut buf = FrameBuffer::new();
        buf.seek_writer(0);
        let ok = check_register_bounds(&c, &mut buf, 0x03, 0, 16, 0, 125).unwrap();
        assert!(!ok);
        assert_eq!(buf.response(), &[0x83, 0x03]);
    }

    #[test]
    fn bounds_check_rejects_address_overflow() {
        let mut store = InMemoryStore::new();
        store.add_unit(1, 16, 16, 16, 16);
        let limits = DeviceLimits::new();
        let c = ctx(&mut store, &limits);
        let mut buf = FrameBuffer::new();
        buf.seek_writer(0);
        let ok = check_register_bounds(&c, &mut buf, 0x03, 0xFFFE, 16, 5, 125).unwrap();
        assert!(!ok);
        assert_eq!(buf.response(), &[0x83, 0x02]);
    }
}
