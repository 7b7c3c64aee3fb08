//! Read Coils / Read Discrete Inputs / Read Holding Registers / Read Input
//! Registers (FC01-FC04)

use crate::constants::{
    FC_READ_COILS, FC_READ_DISCRETE_INPUTS, FC_READ_HOLDING_REGISTERS, FC_READ_INPUT_REGISTERS,
};
use crate::error::ModbusResult;
use crate::frame::FrameBuffer;
use crate::store::read_bit;

use super::{check_register_bounds, ProcessorContext};

/// Pack `quantity` bits read from `source` starting at `address` into a
/// byte-count-prefixed response: `[fc][byte_count][byte_count bytes]`.
fn respond_with_bits(
    buf: &mut FrameBuffer,
    fc: u8,
    source: &[u8],
    address: u16,
    quantity: u16,
) -> ModbusResult<()> {
    let byte_count = (quantity as usize).div_ceil(8);
    let mut packed = vec![0u8; byte_count];
    for i in 0..quantity {
        if read_bit(source, address + i)? {
            packed[(i as usize) / 8] |= 1 << (i % 8);
        }
    }
    buf.write_u8(fc)?;
    buf.write_u8(byte_count as u8)?;
    buf.write_bytes(&packed)
}

/// Slice `quantity` registers out of `source` (big-endian wire order)
/// starting at `address` and write them verbatim:
/// `[fc][quantity*2][2*quantity bytes]`.
fn respond_with_registers(
    buf: &mut FrameBuffer,
    fc: u8,
    source: &[u8],
    address: u16,
    quantity: u16,
) -> ModbusResult<()> {
    let byte_count = quantity as usize * 2;
    let offset = address as usize * 2;
    let slice = source
        .get(offset..offset + byte_count)
        .ok_or_else(|| crate::error::ModbusError::ServerFault {
            message: format!("register window [{address}, {address}+{quantity}) out of range"),
        })?;
    buf.write_u8(fc)?;
    buf.write_u8(byte_count as u8)?;
    buf.write_bytes(slice)
}

pub fn process_read_coils(ctx: &mut ProcessorContext<'_>, buf: &mut FrameBuffer) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let quantity = buf.read_u16_be()?;
    let max_address = ctx.store.max_coil_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_READ_COILS,
        address,
        max_address,
        quantity,
        ctx.limits.max_read_coils,
    )? {
        return Ok(());
    }
    let coils = ctx.store.coils_mut(ctx.unit)?;
    respond_with_bits(buf, FC_READ_COILS, coils, address, quantity)
}

pub fn process_read_discrete_inputs(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let quantity = buf.read_u16_be()?;
    let max_address = ctx.store.max_discrete_input_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_READ_DISCRETE_INPUTS,
        address,
        max_address,
        quantity,
        ctx.limits.max_read_coils,
    )? {
        return Ok(());
    }
    let inputs = ctx.store.discrete_inputs(ctx.unit)?;
    respond_with_bits(buf, FC_READ_DISCRETE_INPUTS, inputs, address, quantity)
}

pub fn process_read_holding_registers(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let quantity = buf.read_u16_be()?;
    let max_address = ctx.store.max_holding_register_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_READ_HOLDING_REGISTERS,
        address,
        max_address,
        quantity,
        ctx.limits.max_read_registers,
    )? {
        return Ok(());
    }
    let registers = ctx.store.holding_registers_mut(ctx.unit)?;
    respond_with_registers(buf, FC_READ_HOLDING_REGISTERS, registers, address, quantity)
}

pub fn process_read_input_registers(
    ctx: &mut ProcessorContext<'_>,
    buf: &mut FrameBuffer,
) -> ModbusResult<()> {
    let address = buf.read_u16_be()?;
    let quantity = buf.read_u16_be()?;
    let max_address = ctx.store.max_input_register_address(ctx.unit)?;
    if !check_register_bounds(
        ctx,
        buf,
        FC_READ_INPUT_REGISTERS,
        address,
        max_address,
        quantity,
        ctx.limits.max_read_registers,
    )? {
        return Ok(());
    }
    let registers = ctx.store.input_registers(ctx.unit)?;
    respond_with_registers(buf, FC_READ_INPUT_REGISTERS, registers, address, quantity)
}
