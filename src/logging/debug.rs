//! # Debug switch shared by emitters that opt in.
//!
//! [`DebugSwitch`] decides which operations reach the logging hook. It lives in
//! [`EmitterConfig`](crate::EmitterConfig); emitters built from clones of one
//! switch share its flags, so flipping it affects all of them at once.
//!
//! ```rust
//! use bufferbus::{DebugStatus, DebugSwitch, EmitterConfig};
//!
//! let switch = DebugSwitch::new();
//! let a = EmitterConfig { debug: switch.clone(), ..EmitterConfig::default() };
//! let b = EmitterConfig { debug: switch.clone(), ..EmitterConfig::default() };
//!
//! switch.enable(DebugStatus::all());
//! assert!(a.debug.status().emit && b.debug.status().on);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::logger::LogKind;

/// Snapshot of which operations are logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugStatus {
    /// Log deliveries.
    pub emit: bool,
    /// Log registrations.
    pub on: bool,
    /// Log removals.
    pub off: bool,
}

impl DebugStatus {
    /// Everything enabled.
    pub fn all() -> Self {
        Self {
            emit: true,
            on: true,
            off: true,
        }
    }

    /// Whether records of `kind` are enabled.
    #[inline]
    pub fn allows(&self, kind: LogKind) -> bool {
        match kind {
            LogKind::Emit => self.emit,
            LogKind::On => self.on,
            LogKind::Off => self.off,
        }
    }
}

#[derive(Debug, Default)]
struct Flags {
    emit: AtomicBool,
    on: AtomicBool,
    off: AtomicBool,
}

/// Shared, cloneable set of debug flags (all off by default).
#[derive(Clone, Debug, Default)]
pub struct DebugSwitch {
    flags: Arc<Flags>,
}

impl DebugSwitch {
    /// Creates a switch with every flag off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current flags.
    pub fn enable(&self, status: DebugStatus) {
        self.flags.emit.store(status.emit, Ordering::Relaxed);
        self.flags.on.store(status.on, Ordering::Relaxed);
        self.flags.off.store(status.off, Ordering::Relaxed);
    }

    /// Turns every flag off.
    pub fn reset(&self) {
        self.enable(DebugStatus::default());
    }

    /// Current flags.
    pub fn status(&self) -> DebugStatus {
        DebugStatus {
            emit: self.flags.emit.load(Ordering::Relaxed),
            on: self.flags.on.load(Ordering::Relaxed),
            off: self.flags.off.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn allows(&self, kind: LogKind) -> bool {
        let flag = match kind {
            LogKind::Emit => &self.flags.emit,
            LogKind::On => &self.flags.on,
            LogKind::Off => &self.flags.off,
        };
        flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flags() {
        let a = DebugSwitch::new();
        let b = a.clone();
        a.enable(DebugStatus {
            emit: true,
            on: false,
            off: true,
        });
        assert!(b.allows(LogKind::Emit));
        assert!(!b.allows(LogKind::On));
        assert!(b.allows(LogKind::Off));

        b.reset();
        assert_eq!(a.status(), DebugStatus::default());
    }

    #[test]
    fn test_separate_switches_are_independent() {
        let a = DebugSwitch::new();
        let b = DebugSwitch::new();
        a.enable(DebugStatus::all());
        assert_eq!(b.status(), DebugStatus::default());
    }
}
