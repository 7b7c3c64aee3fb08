//! Write Single Coil / Write Single Register / Write Multiple Coils / Write
//! Multiple Registers (FC05, FC06, FC15, FC16)

use crate::constants::{
    EXCEPTION_ILLEGAL_DATA_VALUE, FC_WRITE_MULTIPLE_COILS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_COIL, FC_WRITE_SINGLE_REGISTER,
};
use crate::error::ModbusResult;
use crate::events::{emit_coils_changed, emit_registers_changed, ChangeSet};
use crate::frame::FrameBuffer;
use crate::store::{write_bit, write_register_be};

use super::{check_register_bounds, write_exception, ProcessorContext};

pub fn process_write_single_coil(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let raw_value = buf.read_u16_raw()?;

    if raw_value != 0x0000 && raw_value != 0xFF00 {
        return write_exception(buf, FC_WRITE_SINGLE_COIL, EXCEPTION_ILLEGAL_DATA_VALUE);
    }

    let max_address = ctx.store.max_coil_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_WRITE_SINGLE_COIL,
        address,
        max_address,
        1,
        1,
    )? {
        return Ok(());
    }

    let value = raw_value == 0xFF00;
    let coils = ctx.store.coils_mut(ctx.unit)?;
    let changed = write_bit(coils, address, value)?;

    if changed {
        let mut changes = ChangeSet::with_capacity(1);
        changes.record(address);
        emit_coils_changed(ctx.event_sink, ctx.enable_raising_events, ctx.unit, changes);
    }

    buf.write_u8(FC_WRITE_SINGLE_COIL)?;
    buf.write_u16_be(address)?;
    buf.write_u16_be(raw_value)
}

pub fn process_write_single_register(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let value = buf.read_i16()?;

    let max_address = ctx.store.max_holding_register_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_WRITE_SINGLE_REGISTER,
        address,
        max_address,
        1,
        1,
    )? {
        return Ok(());
    }

    let registers = ctx.store.holding_registers_mut(ctx.unit)?;
    let changed = write_register_be(registers, address, value)?;

    if changed {
        let mut changes = ChangeSet::with_capacity(1);
        changes.record(address);
        emit_registers_changed(ctx.event_sink, ctx.enable_raising_events, ctx.unit, changes);
    }

    buf.write_u8(FC_WRITE_SINGLE_REGISTER)?;
    buf.write_u16_be(address)?;
    buf.write_i16(value)
}

pub fn process_write_multiple_coils(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let quantity = buf.read_u16_be()?;
    let byte_count = buf.read_u8()?;

    let expected_byte_count = (quantity as usize).div_ceil(8);
    if byte_count as usize != expected_byte_count {
        return write_exception(buf, FC_WRITE_MULTIPLE_COILS, EXCEPTION_ILLEGAL_DATA_VALUE);
    }
    let payload = buf.read_bytes(byte_count as usize)?.to_vec();

    let max_address = ctx.store.max_coil_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_WRITE_MULTIPLE_COILS,
        address,
        max_address,
        quantity,
        ctx.limits.max_write_coils,
    )? {
        return Ok(());
    }

    let coils = ctx.store.coils_mut(ctx.unit)?;
    let mut changes = ChangeSet::with_capacity(quantity as usize);
    for i in 0..quantity {
        let byte = payload[(i as usize) / 8];
        let bit = (byte >> (i % 8)) & 1 != 0;
        if write_bit(coils, address + i, bit)? {
            changes.record(address + i);
        }
    }
    emit_coils_changed(ctx.event_sink, ctx.enable_raising_events, ctx.unit, changes);

    buf.write_u8(FC_WRITE_MULTIPLE_COILS)?;
    buf.write_u16_be(address)?;
    buf.write_u16_be(quantity)
}

pub fn process_write_multiple_registers(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let quantity = buf.read_u16_be()?;
    let byte_count = buf.read_u8()?;

    if byte_count as usize != quantity as usize * 2 {
        return write_exception(buf, FC_WRITE_MULTIPLE_REGISTERS, EXCEPTION_ILLEGAL_DATA_VALUE);
    }
    let payload = buf.read_bytes(byte_count as usize)?.to_vec();

    let max_address = ctx.store.max_holding_register_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_WRITE_MULTIPLE_REGISTERS,
        address,
        max_address,
        quantity,
        ctx.limits.max_write_registers,
    )? {
        return Ok(());
    }

    let registers = ctx.store.holding_registers_mut(ctx.unit)?;
    let mut changes = ChangeSet::with_capacity(quantity as usize);
    for i in 0..quantity {
        let offset = i as usize * 2;
        let value = i16::from_be_bytes([payload[offset], payload[offset + 1]]);
        if write_register_be(registers, address + i, value)? {
            changes.record(address + i);
        }
    }
    emit_registers_changed(ctx.event_sink, ctx.enable_raising_events, ctx.unit, changes);

    buf.write_u8(FC_WRITE_MULTIPLE_REGISTERS)?;
    buf.write_u16_be(address)?;
    buf.write_u16_be(quantity)
}
