//! # Logging for emitter operations.
//!
//! Two layers:
//! - [`DebugSwitch`] decides **whether** an operation is logged (`emit`, `on`, `off`).
//! - [`EmitLogger`] decides **how** (default: [`TracingLogger`]).
//!
//! ```text
//! on/once ─┐
//! off ─────┼──► switch.allows(kind)? ──► logger.log(&LogRecord { kind, event, detail })
//! deliver ─┘
//! ```
//!
//! Internal diagnostics (missing runtime, panicking listeners, timer
//! bookkeeping) go straight to `tracing` and ignore the switch.

mod debug;
mod logger;
mod tracing_logger;

pub use debug::{DebugStatus, DebugSwitch};
pub use logger::{EmitLogger, LogDetail, LogKind, LogRecord, NoopLogger};
pub use tracing_logger::{render_payload, TracingLogger};
