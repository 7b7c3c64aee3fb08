//! Optional callback logging layered over `tracing`
//!
//! Every log-worthy event in this crate (dispatch, processor faults,
//! transport errors) goes through `tracing`'s macros directly. This module
//! exists for embedders that want those same events mirrored into their own
//! logging sink (a GUI console, a ring buffer, a custom file format) without
//! installing a `tracing` subscriber.

use std::fmt;
use std::sync::Arc;

/// Severity of a logged event, ordered least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// A user-supplied sink invoked for every event at or above a
/// [`CallbackLogger`]'s configured level.
pub type LogCallback = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Which sinks a [`CallbackLogger`] feeds, independent of whatever `tracing`
/// subscriber (if any) the host process has installed.
#[derive(Clone, Default)]
pub enum LoggingMode {
    /// Only emit through `tracing`; any callback is ignored.
    #[default]
    TracingOnly,
    /// Emit through both `tracing` and the callback.
    Both,
    /// Emit only through the callback, bypassing `tracing`.
    CallbackOnly,
}

/// Minimum-level callback logger, bridging this crate's internal
/// `tracing`-based logging to a user callback.
#[derive(Clone, Default)]
pub struct CallbackLogger {
    callback: Option<LogCallback>,
    min_level: Option<LogLevel>,
    mode: LoggingMode,
}

impl CallbackLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a callback, invoked for every event at or above `min_level`.
    pub fn with_callback(mut self, min_level: LogLevel, callback: LogCallback) -> Self {
        self.callback = Some(callback);
        self.min_level = Some(min_level);
        self
    }

    pub fn with_mode(mut self, mode: LoggingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Route one event: emits through `tracing` (unless `CallbackOnly`) and
    /// through the callback, if installed and `level` clears its threshold.
    pub fn log(&self, level: LogLevel, message: &str) {
        if !matches!(self.mode, LoggingMode::CallbackOnly) {
            match level {
                LogLevel::Trace => tracing::trace!("{message}"),
                LogLevel::Debug => tracing::debug!("{message}"),
                LogLevel::Info => tracing::info!("{message}"),
                LogLevel::Warn => tracing::warn!("{message}"),
                LogLevel::Error => tracing::error!("{message}"),
            }
        }

        if matches!(self.mode, LoggingMode::TracingOnly) {
            return;
        }

        if let (Some(callback), Some(min_level)) = (&self.callback, self.min_level) {
            if level >= min_level {
                callback(level, message);
            }
        }
    }
}
