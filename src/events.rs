//! Change-event emission
//!
//! Server callbacks fired only when `enable_raising_events` is set and at
//! least one stored value actually changed.
//! Processors collect changed addresses into a [`ChangeSet`] scratch buffer
//! sized to the request's quantity, then materialize exactly one allocation
//! for the outgoing event list.

/// Server-side change notification sink.
pub trait ChangeEventSink: Send + Sync {
    fn on_coils_changed(&self, unit: u8, addresses: &[u16]);
    fn on_registers_changed(&self, unit: u8, addresses: &[u16]);
}

/// Scratch collector for addresses whose value changed during a single
/// processor invocation.
#[derive(Debug, Default)]
pub struct ChangeSet {
    addresses: Vec<u16>,
}

impl ChangeSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            addresses: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, address: u16) {
        self.addresses.push(address);
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn into_addresses(self) -> Vec<u16> {
        self.addresses
    }
}

/// Emit a coil-change event through `sink` iff events are enabled and the
/// change set is non-empty.
pub fn emit_coils_changed(
    sink: Option<&dyn ChangeEventSink>,
    enabled: bool,
    unit: u8,
    changes: ChangeSet,
) {
    if !enabled || changes.is_empty() {
        return;
    }
    if let Some(sink) = sink {
        sink.on_coils_changed(unit, &changes.into_addresses());
    }
}

/// Emit a register-change event through `sink` iff events are enabled and
/// the change set is non-empty.
pub fn emit_registers_changed(
    sink: Option<&dyn ChangeEventSink>,
    enabled: bool,
    unit: u8,
    changes: ChangeSet,
) {
    if !enabled || changes.is_empty() {
        return;
    }
    if let Some(sink) = sink {
        sink.on_registers_changed(unit, &changes.into_addresses());
    }
}
