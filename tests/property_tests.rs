//! Property-based tests for the universally quantified invariants in
//! spec.md §8 — run against the synchronous `dispatch()` entry point
//! directly, since dispatch itself never suspends (only the server's lock
//! acquisition around it is async).

use proptest::prelude::*;

use voltage_modbus::constants::{
    FC_READ_COILS, FC_READ_DISCRETE_INPUTS, FC_READ_HOLDING_REGISTERS, FC_READ_INPUT_REGISTERS,
    FC_READ_WRITE_MULTIPLE_REGISTERS, FC_WRITE_MULTIPLE_COILS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_COIL, FC_WRITE_SINGLE_REGISTER,
};
use voltage_modbus::device_limits::DeviceLimits;
use voltage_modbus::dispatch::dispatch;
use voltage_modbus::frame::FrameBuffer;
use voltage_modbus::processors::ProcessorContext;
use voltage_modbus::store::{InMemoryStore, RegisterStore};

const TABLE_SIZE: u16 = 32;
const UNIT: u8 = 1;

fn fresh_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    store.add_unit(UNIT, TABLE_SIZE, TABLE_SIZE, TABLE_SIZE, TABLE_SIZE);
    store
}

fn run(store: &mut InMemoryStore, limits: &DeviceLimits, request: &[u8]) -> (usize, Vec<u8>) {
    let mut ctx = ProcessorContext {
        unit: UNIT,
        store,
        validator: None,
        event_sink: None,
        enable_raising_events: false,
        limits,
    };
    let mut buf = FrameBuffer::new();
    buf.load_request(request).unwrap();
    let n = dispatch(&mut ctx, &mut buf).unwrap();
    (n, buf.response().to_vec())
}

/// Snapshot every table so "never mutates the store on a violating request"
/// can be checked by plain equality.
fn snapshot(store: &mut InMemoryStore) -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
    (
        store.coils_mut(UNIT).unwrap().to_vec(),
        store.discrete_inputs(UNIT).unwrap().to_vec(),
        store.holding_registers_mut(UNIT).unwrap().to_vec(),
        store.input_registers(UNIT).unwrap().to_vec(),
    )
}

fn supported_function_code() -> impl Strategy<Value = u8> {
    prop_oneof![
        Just(FC_READ_COILS),
        Just(FC_READ_DISCRETE_INPUTS),
        Just(FC_READ_HOLDING_REGISTERS),
        Just(FC_READ_INPUT_REGISTERS),
        Just(FC_WRITE_SINGLE_COIL),
        Just(FC_WRITE_SINGLE_REGISTER),
        Just(FC_WRITE_MULTIPLE_COILS),
        Just(FC_WRITE_MULTIPLE_REGISTERS),
        Just(FC_READ_WRITE_MULTIPLE_REGISTERS),
    ]
}

fn unsupported_function_code() -> impl Strategy<Value = u8> {
    any::<u8>().prop_filter("must not be a supported code", |fc| {
        ![
            FC_READ_COILS,
            FC_READ_DISCRETE_INPUTS,
            FC_READ_HOLDING_REGISTERS,
            FC_READ_INPUT_REGISTERS,
            FC_WRITE_SINGLE_COIL,
            FC_WRITE_SINGLE_REGISTER,
            FC_WRITE_MULTIPLE_COILS,
            FC_WRITE_MULTIPLE_REGISTERS,
            FC_READ_WRITE_MULTIPLE_REGISTERS,
        ]
        .contains(fc)
    })
}

proptest! {
    /// Invariant 6: every function code outside the supported set yields
    /// `IllegalFunction`, first byte `fc | 0x80`, regardless of the trailing
    /// payload bytes.
    #[test]
    fn unsupported_codes_always_yield_illegal_function(
        fc in unsupported_function_code(),
        tail in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let mut store = fresh_store();
        let limits = DeviceLimits::new();
        let mut request = vec![fc];
        request.extend(tail);

        let (n, response) = run(&mut store, &limits, &request);
        prop_assert_eq!(n, 2);
        prop_assert_eq!(response[0], fc | 0x80);
        prop_assert_eq!(response[1], 0x01);
    }

    /// Invariant 1: for any supported function code and arbitrary (possibly
    /// truncated or out-of-range) payload, the response's first byte is
    /// either the original function code or `fc | 0x80` — never anything
    /// else, even when the processor faults internally.
    #[test]
    fn response_first_byte_is_fc_or_exception_fc(
        fc in supported_function_code(),
        payload in prop::collection::vec(any::<u8>(), 0..20),
    ) {
        let mut store = fresh_store();
        let limits = DeviceLimits::new();
        let mut request = vec![fc];
        request.extend(payload);

        let (n, response) = run(&mut store, &limits, &request);
        prop_assert!(n >= 2);
        prop_assert!(response[0] == fc || response[0] == (fc | 0x80));
    }

    /// Invariant 2 + 7: read requests outside `[0, TABLE_SIZE)` are rejected
    /// with `IllegalDataAddress` and never touch the store; requests inside
    /// bounds report a byte-count field consistent with the quantity asked.
    #[test]
    fn read_holding_registers_bounds_and_noop_on_violation(
        address in 0u16..64,
        quantity in 0u16..200,
    ) {
        let mut store = fresh_store();
        let limits = DeviceLimits::new();
        let before = snapshot(&mut store);

        let mut request = vec![FC_READ_HOLDING_REGISTERS];
        request.extend(address.to_be_bytes());
        request.extend(quantity.to_be_bytes());

        let (_n, response) = run(&mut store, &limits, &request);
        let after = snapshot(&mut store);
        prop_assert_eq!(before, after, "a read must never mutate the store");

        let overflows = u32::from(address) + u32::from(quantity) > u32::from(TABLE_SIZE);
        let bad_quantity = quantity == 0 || quantity > limits.max_read_registers;

        if overflows {
            prop_assert_eq!(response, vec![FC_READ_HOLDING_REGISTERS | 0x80, 0x02]);
        } else if bad_quantity {
            prop_assert_eq!(response, vec![FC_READ_HOLDING_REGISTERS | 0x80, 0x03]);
        } else {
            prop_assert_eq!(response[0], FC_READ_HOLDING_REGISTERS);
            prop_assert_eq!(response[1] as u16, quantity * 2);
            prop_assert_eq!(response.len(), 2 + quantity as usize * 2);
        }
    }

    /// Invariant 3: a successful single-register write leaves exactly the
    /// written address changed, and the stored value round-trips exactly.
    #[test]
    fn write_single_register_round_trips_in_bounds(
        address in 0u16..TABLE_SIZE,
        value in any::<i16>(),
    ) {
        let mut store = fresh_store();
        let limits = DeviceLimits::new();

        let mut request = vec![FC_WRITE_SINGLE_REGISTER];
        request.extend(address.to_be_bytes());
        request.extend(value.to_be_bytes());

        let (_n, response) = run(&mut store, &limits, &request);
        prop_assert_eq!(response[0], FC_WRITE_SINGLE_REGISTER);
        prop_assert_eq!(store.holding_register(UNIT, address).unwrap(), value);
    }

    /// Invariant 7 for the single-coil write: any value other than
    /// 0x0000/0xFF00 is rejected as `IllegalDataValue` and the coil is left
    /// untouched.
    #[test]
    fn write_single_coil_rejects_values_other_than_on_off(
        address in 0u16..TABLE_SIZE,
        raw_value in any::<u16>().prop_filter("must not be the two legal values", |v| {
            *v != 0x0000 && *v != 0xFF00
        }),
    ) {
        let mut store = fresh_store();
        let limits = DeviceLimits::new();
        let before = store.coil(UNIT, address).unwrap();

        let mut request = vec![FC_WRITE_SINGLE_COIL];
        request.extend(address.to_be_bytes());
        request.extend(raw_value.to_be_bytes());

        let (_n, response) = run(&mut store, &limits, &request);
        prop_assert_eq!(response, vec![FC_WRITE_SINGLE_COIL | 0x80, 0x03]);
        prop_assert_eq!(store.coil(UNIT, address).unwrap(), before);
    }
}
