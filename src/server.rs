//! Server state: register store, validator, and event sink under a single
//! coarse-grained async lock
//!
//! A [`ModbusServer`] is the shared handle every connection's
//! [`crate::handler::ModbusRequestHandler`] dispatches through. It wraps the
//! collaborators behind one `tokio::sync::Mutex`, held for the duration of a
//! single dispatch (read + validate + mutate + write-response) and never
//! across an `.await` suspension point beyond that, per the coarse-grained
//! locking model.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::device_limits::DeviceLimits;
use crate::error::ModbusResult;
use crate::events::ChangeEventSink;
use crate::frame::FrameBuffer;
use crate::processors::ProcessorContext;
use crate::store::RegisterStore;
use crate::validator::RequestValidator;

/// Shared, cloneable handle to a server's register store and policy hooks.
///
/// Cloning a `ModbusServer` is cheap (it clones the `Arc`s) and yields a
/// handle to the same underlying state, letting multiple connection handlers
/// share one device image.
#[derive(Clone)]
pub struct ModbusServer {
    store: Arc<Mutex<dyn RegisterStore>>,
    validator: Option<Arc<dyn RequestValidator>>,
    event_sink: Option<Arc<dyn ChangeEventSink>>,
    limits: DeviceLimits,
    enable_raising_events: bool,
}

impl ModbusServer {
    /// Build a server over an existing store implementation.
    pub fn new(store: impl RegisterStore + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            validator: None,
            event_sink: None,
            limits: DeviceLimits::new(),
            enable_raising_events: false,
        }
    }

    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_validator(mut self, validator: impl RequestValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_event_sink(mut self, sink: impl ChangeEventSink + 'static) -> Self {
        self.event_sink = Some(Arc::new(sink));
        self
    }

    /// Enable change-event emission. Disabled by default, per the
    /// opt-in-events invariant.
    pub fn enable_raising_events(mut self, enabled: bool) -> Self {
        self.enable_raising_events = enabled;
        self
    }

    /// Dispatch one request for `unit` against the shared store, holding the
    /// lock for the duration of the call and releasing it immediately after.
    ///
    /// This is the only place the coarse lock is acquired; callers must not
    /// hold it across their own suspension points.
    pub async fn dispatch(&self, unit: u8, buf: &mut FrameBuffer) -> ModbusResult<usize> {
        let mut store = self.store.lock().await;
        let mut ctx = ProcessorContext {
            unit,
            store: &mut *store,
            validator: self.validator.as_deref(),
            event_sink: self.event_sink.as_deref(),
            enable_raising_events: self.enable_raising_events,
            limits: &self.limits,
        };
        crate::dispatch::dispatch(&mut ctx, buf)
    }
}
