//! Register store collaborator interface
//!
//! The handler never owns register data directly; it borrows mutable views
//! from a `RegisterStore` for the duration of a single dispatch. The crate
//! ships `InMemoryStore`, a plain `Vec<u8>`-backed implementation suitable
//! for a single-unit or multi-unit in-process server; production servers
//! backed by real I/O modules implement the trait themselves.
//!
//! Per SPEC_FULL §3, every table is kept in **big-endian wire order** in its
//! backing bytes: bulk register reads (FC03/FC04) hand a byte slice of the
//! store straight to the response buffer, and single-register writes
//! (FC06) convert at the accessor boundary.

use std::collections::HashMap;

use crate::error::{ModbusError, ModbusResult};

/// Accessor the handler calls on the server for a given unit id.
///
/// Implementations must guarantee `coils_mut`/`discrete_inputs` return a
/// bitmap at least `ceil(max_coil_address / 8)` bytes long, and
/// `holding_registers_mut`/`input_registers` return a byte slice at least
/// `2 * max_*_register_address` bytes long, with register words stored
/// big-endian.
pub trait RegisterStore: Send {
    fn coils_mut(&mut self, unit: u8) -> ModbusResult<&mut [u8]>;
    fn discrete_inputs(&self, unit: u8) -> ModbusResult<&[u8]>;
    fn holding_registers_mut(&mut self, unit: u8) -> ModbusResult<&mut [u8]>;
    fn input_registers(&self, unit: u8) -> ModbusResult<&[u8]>;

    fn max_coil_address(&self, unit: u8) -> ModbusResult<u16>;
    fn max_discrete_input_address(&self, unit: u8) -> ModbusResult<u16>;
    fn max_holding_register_address(&self, unit: u8) -> ModbusResult<u16>;
    fn max_input_register_address(&self, unit: u8) -> ModbusResult<u16>;
}

/// Per-unit register tables for [`InMemoryStore`].
#[derive(Debug, Clone)]
struct UnitTables {
    coils: Vec<u8>,
    discrete_inputs: Vec<u8>,
    holding_registers: Vec<u8>,
    input_registers: Vec<u8>,
    max_coil_address: u16,
    max_discrete_input_address: u16,
    max_holding_register_address: u16,
    max_input_register_address: u16,
}

impl UnitTables {
    fn new(num_coils: u16, num_discrete_inputs: u16, num_holding: u16, num_input: u16) -> Self {
        Self {
            coils: vec![0u8; (num_coils as usize).div_ceil(8).max(1)],
            discrete_inputs: vec![0u8; (num_discrete_inputs as usize).div_ceil(8).max(1)],
            holding_registers: vec![0u8; num_holding as usize * 2],
            input_registers: vec![0u8; num_input as usize * 2],
            max_coil_address: num_coils,
            max_discrete_input_address: num_discrete_inputs,
            max_holding_register_address: num_holding,
            max_input_register_address: num_input,
        }
    }
}

/// Simple in-process register store, one table set per unit id.
///
/// # Example
///
/// ```rust
/// use voltage_modbus::store::{InMemoryStore, RegisterStore};
///
/// let mut store = InMemoryStore::new();
/// store.add_unit(1, 64, 64, 32, 32);
/// assert_eq!(store.max_holding_register_address(1).unwrap(), 32);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    units: HashMap<u8, UnitTables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Register a unit with the given table sizes (counts, not bytes).
    pub fn add_unit(
        &mut self,
        unit: u8,
        num_coils: u16,
        num_discrete_inputs: u16,
        num_holding_registers: u16,
        num_input_registers: u16,
    ) {
        self.units.insert(
            unit,
            UnitTables::new(
                num_coils,
                num_discrete_inputs,
                num_holding_registers,
                num_input_registers,
            ),
        );
    }

    /// Read a single holding register as a host `i16`, converting from the
    /// store's big-endian backing bytes. Convenience for callers outside
    /// the dispatcher (tests, demos); the dispatcher itself only ever
    /// touches raw byte slices via [`read_register_be`].
    pub fn holding_register(&self, unit: u8, address: u16) -> ModbusResult<i16> {
        read_register_be(&self.unit(unit)?.holding_registers, address)
    }

    /// Write a single holding register from a host `i16`, converting to the
    /// store's big-endian backing bytes.
    pub fn set_holding_register(&mut self, unit: u8, address: u16, value: i16) -> ModbusResult<()> {
        write_register_be(&mut self.unit_mut(unit)?.holding_registers, address, value)?;
        Ok(())
    }

    /// Read a single coil bit.
    pub fn coil(&self, unit: u8, address: u16) -> ModbusResult<bool> {
        let tables = self.unit(unit)?;
        read_bit(&tables.coils, address)
    }

    /// Set a single coil bit; returns whether the stored value changed.
    pub fn set_coil(&mut self, unit: u8, address: u16, value: bool) -> ModbusResult<bool> {
        let tables = self.unit_mut(unit)?;
        write_bit(&mut tables.coils, address, value)
    }

    fn unit(&self, unit: u8) -> ModbusResult<&UnitTables> {
        self.units
            .get(&unit)
            .ok_or(ModbusError::UnknownUnit { unit })
    }

    fn unit_mut(&mut self, unit: u8) -> ModbusResult<&mut UnitTables> {
        self.units
            .get_mut(&unit)
            .ok_or(ModbusError::UnknownUnit { unit })
    }
}

/// Read bit `address` of a little-endian-bit-order bitmap.
pub fn read_bit(bitmap: &[u8], address: u16) -> ModbusResult<bool> {
    let byte_idx = address as usize / 8;
    let bit_idx = address as usize % 8;
    let byte = bitmap
        .get(byte_idx)
        .ok_or_else(|| ModbusError::ServerFault {
            message: format!("coil address {address} out of range"),
        })?;
    Ok((byte >> bit_idx) & 1 != 0)
}

/// Write bit `address` of a little-endian-bit-order bitmap; returns whether
/// the value actually changed.
pub fn write_bit(bitmap: &mut [u8], address: u16, value: bool) -> ModbusResult<bool> {
    let byte_idx = address as usize / 8;
    let bit_idx = address as usize % 8;
    let byte = bitmap
        .get_mut(byte_idx)
        .ok_or_else(|| ModbusError::ServerFault {
            message: format!("coil address {address} out of range"),
        })?;
    let mask = 1u8 << bit_idx;
    let was_set = *byte & mask != 0;
    if value {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
    Ok(was_set != value)
}

/// Read register `address` from a big-endian-wire-order register byte
/// slice as returned by [`RegisterStore::holding_registers_mut`]/
/// [`RegisterStore::input_registers`].
pub fn read_register_be(registers: &[u8], address: u16) -> ModbusResult<i16> {
    let offset = address as usize * 2;
    let bytes = registers
        .get(offset..offset + 2)
        .ok_or_else(|| ModbusError::ServerFault {
            message: format!("register address {address} out of range"),
        })?;
    Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Write register `address` into a big-endian-wire-order register byte
/// slice; returns whether the stored value changed.
pub fn write_register_be(registers: &mut [u8], address: u16, value: i16) -> ModbusResult<bool> {
    let offset = address as usize * 2;
    let slot = registers
        .get_mut(offset..offset + 2)
        .ok_or_else(|| ModbusError::ServerFault {
            message: format!("register address {address} out of range"),
        })?;
    let new_bytes = value.to_be_bytes();
    let changed = slot[0] != new_bytes[0] || slot[1] != new_bytes[1];
    slot.copy_from_slice(&new_bytes);
    Ok(changed)
}

impl RegisterStore for InMemoryStore {
    fn coils_mut(&mut self, unit: u8) -> ModbusResult<&mut [u8]> {
        Ok(&mut self.unit_mut(unit)?.coils)
    }

    fn discrete_inputs(&self, unit: u8) -> ModbusResult<&[u8]> {
        Ok(&self.unit(unit)?.discrete_inputs)
    }

    fn holding_registers_mut(&mut self, unit: u8) -> ModbusResult<&mut [u8]> {
        Ok(&mut self.unit_mut(unit)?.holding_registers)
    }

    fn input_registers(&self, unit: u8) -> ModbusResult<&[u8]> {
        Ok(&self.unit(unit)?.input_registers)
    }

    fn max_coil_address(&self, unit: u8) -> ModbusResult<u16> {
        Ok(self.unit(unit)?.max_coil_address)
    }

    fn max_discrete_input_address(&self, unit: u8) -> ModbusResult<u16> {
        Ok(self.unit(unit)?.max_discrete_input_address)
    }

    fn max_holding_register_address(&self, unit: u8) -> ModbusResult<u16> {
        Ok(self.unit(unit)?.max_holding_register_address)
    }

    fn max_input_register_address(&self, unit: u8) -> ModbusResult<u16> {
        Ok(self.unit(unit)?.max_input_register_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryStore {
        let mut s = InMemoryStore::new();
        s.add_unit(1, 16, 16, 16, 16);
        s
    }

    #[test]
    fn coil_roundtrip() {
        let mut s = store();
        assert!(!s.coil(1, 4).unwrap());
        let changed = s.set_coil(1, 4, true).unwrap();
        assert!(changed);
        assert!(s.coil(1, 4).unwrap());
        let changed_again = s.set_coil(1, 4, true).unwrap();
        assert!(!changed_again);
    }

    #[test]
    fn holding_register_roundtrip() {
        let mut s = store();
        s.set_holding_register(1, 0, 0x1234).unwrap();
        assert_eq!(s.holding_register(1, 0).unwrap(), 0x1234);
        let bytes = s.holding_registers_mut(1).unwrap();
        assert_eq!(&bytes[0..2], &[0x12, 0x34]);
    }

    #[test]
    fn unknown_unit_errors() {
        let s = store();
        assert!(matches!(
            s.holding_register(2, 0),
            Err(ModbusError::UnknownUnit { unit: 2 })
        ));
        assert!(matches!(
            s.max_coil_address(2),
            Err(ModbusError::UnknownUnit { unit: 2 })
        ));
    }
}
