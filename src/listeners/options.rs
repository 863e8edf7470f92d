//! # Per-listener options.
//!
//! Every field is optional. An unset field falls back to the emitter's
//! [`EmitterConfig`](crate::EmitterConfig). Two option sets are equal when the
//! same fields are set to the same values; this equality decides dedup on
//! `on`/`once` and targeting for `off`/`flush`.
//!
//! ```rust
//! use std::time::Duration;
//! use bufferbus::ListenerOptions;
//!
//! let opts = ListenerOptions::new()
//!     .with_buffer_capacity(10)
//!     .with_inactivity_timeout(Duration::from_millis(250));
//!
//! assert_eq!(opts.buffered, Some(true));
//! assert_ne!(opts, ListenerOptions::new().with_buffer_capacity(10));
//! ```

use std::time::Duration;

use super::control::ControlGroup;

/// Options attached to one listener registration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Accumulate payloads and deliver them in batches.
    pub buffered: Option<bool>,
    /// Bucket size that triggers a capacity flush (min 1).
    pub buffer_capacity: Option<usize>,
    /// Quiet period after the last accumulated payload that triggers a flush.
    /// `Duration::ZERO` disables the timer for this listener.
    pub buffer_inactivity_timeout: Option<Duration>,
    /// Group used for bulk `off`/`flush`.
    pub control: Option<ControlGroup>,
}

impl ListenerOptions {
    /// Options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a buffered listener with the given capacity.
    pub fn buffered(capacity: usize) -> Self {
        Self::new().with_buffer_capacity(capacity)
    }

    /// Sets `buffered`.
    #[inline]
    pub fn with_buffered(mut self, buffered: bool) -> Self {
        self.buffered = Some(buffered);
        self
    }

    /// Sets the capacity and marks the listener as buffered.
    #[inline]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffered = Some(true);
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Sets the inactivity timeout and marks the listener as buffered.
    #[inline]
    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.buffered = Some(true);
        self.buffer_inactivity_timeout = Some(timeout);
        self
    }

    /// Tags the registration with a control group.
    #[inline]
    pub fn with_control(mut self, group: &ControlGroup) -> Self {
        self.control = Some(group.clone());
        self
    }
}
