//! # Emitter configuration.
//!
//! Provides [`EmitterConfig`], the instance-wide defaults of a
//! [`BufferedEmitter`](crate::BufferedEmitter).
//!
//! Config is used in two ways:
//! 1. **Emitter creation**: `BufferedEmitter::new(config)`
//! 2. **Listener defaults**: unset [`ListenerOptions`](crate::ListenerOptions)
//!    fields fall back to the config when a listener is registered.
//!
//! ## Sentinel values
//! - `buffer_inactivity_timeout = 0s` → no inactivity flush
//! - `buffer_capacity = 0` / `cache_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::listeners::ListenerOptions;
use crate::logging::DebugSwitch;

/// Default bucket size for buffered listeners.
pub const DEFAULT_BUFFER_CAPACITY: usize = 5;
/// Default number of deliveries kept per event when caching is on.
pub const DEFAULT_CACHE_CAPACITY: usize = 20;

/// Instance-wide configuration of an emitter.
///
/// ## Field semantics
/// - `buffered`: register listeners as buffered unless their options say otherwise
/// - `buffer_capacity`: bucket size that triggers a flush (min 1)
/// - `buffer_inactivity_timeout`: quiet period before a partial bucket is flushed (`0s` = never)
/// - `cache`: keep a per-event history of deliveries
/// - `cache_capacity`: history length per event (min 1)
/// - `debug`: which operations reach the logging hook
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct EmitterConfig {
    /// Default for [`ListenerOptions::buffered`].
    pub buffered: bool,

    /// Default for [`ListenerOptions::buffer_capacity`].
    pub buffer_capacity: usize,

    /// Default for [`ListenerOptions::buffer_inactivity_timeout`].
    ///
    /// - `Duration::ZERO` = partial buckets wait for capacity or an explicit flush
    /// - `> 0` = debounce timer, restarted by every accumulated payload
    pub buffer_inactivity_timeout: Duration,

    /// Record deliveries in the per-event cache.
    pub cache: bool,

    /// Maximum deliveries kept per event; the oldest is evicted first.
    pub cache_capacity: usize,

    /// Debug flags consulted before calling the logging hook.
    ///
    /// Clone one switch into several configs to control their emitters together.
    pub debug: DebugSwitch,
}

impl EmitterConfig {
    /// Returns the default inactivity timeout as an `Option`.
    ///
    /// - `None` → no timer
    /// - `Some(d)` → flush partial buckets after `d` of quiet
    #[inline]
    pub fn inactivity_timeout(&self) -> Option<Duration> {
        non_zero(self.buffer_inactivity_timeout)
    }

    /// Returns the default bucket size clamped to a minimum of 1.
    #[inline]
    pub fn buffer_capacity_clamped(&self) -> usize {
        self.buffer_capacity.max(1)
    }

    /// Returns the cache length clamped to a minimum of 1.
    #[inline]
    pub fn cache_capacity_clamped(&self) -> usize {
        self.cache_capacity.max(1)
    }

    /// Resolves the buffering policy of a new registration.
    ///
    /// Returns `None` for unbuffered registrations.
    pub(crate) fn buffer_policy(&self, options: Option<&ListenerOptions>) -> Option<BufferPolicy> {
        let buffered = options
            .and_then(|o| o.buffered)
            .unwrap_or(self.buffered);
        if !buffered {
            return None;
        }

        let capacity = options
            .and_then(|o| o.buffer_capacity)
            .map(|c| c.max(1))
            .unwrap_or_else(|| self.buffer_capacity_clamped());
        let inactivity = match options.and_then(|o| o.buffer_inactivity_timeout) {
            Some(d) => non_zero(d),
            None => self.inactivity_timeout(),
        };

        Some(BufferPolicy {
            capacity,
            inactivity,
        })
    }
}

impl Default for EmitterConfig {
    /// Default configuration:
    ///
    /// - `buffered = false`
    /// - `buffer_capacity = 5`
    /// - `buffer_inactivity_timeout = 0s` (disabled)
    /// - `cache = false`
    /// - `cache_capacity = 20`
    /// - `debug` = fresh switch, everything off
    fn default() -> Self {
        Self {
            buffered: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            buffer_inactivity_timeout: Duration::ZERO,
            cache: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            debug: DebugSwitch::new(),
        }
    }
}

/// Effective buffering of one registration, fixed at registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BufferPolicy {
    pub(crate) capacity: usize,
    pub(crate) inactivity: Option<Duration>,
}

#[inline]
fn non_zero(d: Duration) -> Option<Duration> {
    if d == Duration::ZERO {
        None
    } else {
        Some(d)
    }
}
