//! Read/Write Multiple Registers (FC23)
//!
//! Both the read and write windows are validated before either is touched;
//! only once both pass does the write happen, followed by the read (which
//! may observe values the same request just wrote, per the overlapping-window
//! contract).

use crate::constants::{EXCEPTION_ILLEGAL_DATA_VALUE, FC_READ_WRITE_MULTIPLE_REGISTERS};
use crate::error::ModbusResult;
use crate::events::{emit_registers_changed, ChangeSet};
use crate::store::write_register_be;

use super::{check_register_bounds, write_exception, ProcessorContext};
use crate::frame::FrameBuffer;

pub fn process_read_write_multiple_registers(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let read_address = buf.read_u16_be()?;
    let read_quantity = buf.read_u16_be()?;
    let write_address = buf.read_u16_be()?;
    let write_quantity = buf.read_u16_be()?;
    let write_byte_count = buf.read_u8()?;

    if write_byte_count as usize != write_quantity as usize * 2 {
        return write_exception(
            buf,
            FC_READ_WRITE_MULTIPLE_REGISTERS,
            EXCEPTION_ILLEGAL_DATA_VALUE,
        );
    }
    let write_payload = buf.read_bytes(write_byte_count as usize)?.to_vec();

    let max_address = ctx.store.max_holding_register_address(ctx.unit)?;

    if !check_register_bounds(
        ctx,
        buf,
        FC_READ_WRITE_MULTIPLE_REGISTERS,
        read_address,
        max_address,
        read_quantity,
        ctx.limits.max_read_registers,
    )? {
        return Ok(());
    }

    if !check_register_bounds(
        ctx,
        buf,
        FC_READ_WRITE_MULTIPLE_REGISTERS,
        write_address,
        max_address,
        write_quantity,
        ctx.limits.max_write_registers,
    )? {
        return Ok(());
    }

    let registers = ctx.store.holding_registers_mut(ctx.unit)?;
    let mut changes = ChangeSet::with_capacity(write_quantity as usize);
    for i in 0..write_quantity {
        let offset = i as usize * 2;
        let value = i16::from_be_bytes([write_payload[offset], write_payload[offset + 1]]);
        if write_register_be(registers, write_address + i, value)? {
            changes.record(write_address + i);
        }
    }
    emit_registers_changed(ctx.event_sink, ctx.enable_raising_events, ctx.unit, changes);

    let registers = ctx.store.holding_registers_mut(ctx.unit)?;
    let read_byte_count = read_quantity as usize * 2;
    let read_offset = read_address as usize * 2;
    let read_slice = &registers[read_offset..read_offset + read_byte_count];

    buf.write_u8(FC_READ_WRITE_MULTIPLE_REGISTERS)?;
    buf.write_u8(read_byte_count as u8)?;
    let read_slice = read_slice.to_vec();
    buf.write_bytes(&read_slice)
}
