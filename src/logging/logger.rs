//! # Logging hook
//!
//! `EmitLogger` is the extension point the emitter calls on every registration,
//! removal and delivery whose [`LogKind`] is enabled in the emitter's
//! [`DebugSwitch`](crate::DebugSwitch).
//!
//! ## Contract
//! - Called synchronously on the emitting thread, after the listener returned.
//! - Must not panic; a logger has no way to fail the operation it observes.
//! - Functions and closures `Fn(&LogRecord<'_, T>)` implement the trait.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bufferbus::{BufferedEmitter, DebugStatus, EmitLogger, EmitterConfig, LogRecord};
//!
//! struct Stderr;
//!
//! impl EmitLogger<u32> for Stderr {
//!     fn log(&self, r: &LogRecord<'_, u32>) {
//!         eprintln!("{} {}", r.kind, r.event);
//!     }
//! }
//!
//! let emitter = BufferedEmitter::<u32>::with_logger(EmitterConfig::default(), Arc::new(Stderr));
//! emitter.enable_debug(DebugStatus::all());
//! ```

use std::fmt;

use crate::listeners::{Delivery, ListenerId};

/// Operation being logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogKind {
    /// A listener received a delivery.
    Emit,
    /// A listener was registered.
    On,
    /// A listener was removed.
    Off,
}

impl LogKind {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            LogKind::Emit => "emit",
            LogKind::On => "on",
            LogKind::Off => "off",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Operation-specific part of a record.
#[derive(Debug)]
pub enum LogDetail<'a, T> {
    /// The listener registered or removed.
    Listener(ListenerId),
    /// The payload a listener just received.
    Delivery(&'a Delivery<T>),
}

/// One logged operation.
#[derive(Debug)]
pub struct LogRecord<'a, T> {
    /// Operation.
    pub kind: LogKind,
    /// Event name.
    pub event: &'a str,
    /// Listener or payload.
    pub detail: LogDetail<'a, T>,
}

/// Logging hook invoked by the emitter.
pub trait EmitLogger<T>: Send + Sync + 'static {
    /// Handles one record.
    fn log(&self, record: &LogRecord<'_, T>);
}

impl<T, F> EmitLogger<T> for F
where
    F: Fn(&LogRecord<'_, T>) + Send + Sync + 'static,
{
    fn log(&self, record: &LogRecord<'_, T>) {
        self(record)
    }
}

/// Logger that drops every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl<T> EmitLogger<T> for NoopLogger {
    fn log(&self, _record: &LogRecord<'_, T>) {}
}
