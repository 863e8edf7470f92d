//! # Pause state and the emission queue.
//!
//! [`PauseOptions`] describe a call to
//! [`BufferedEmitter::pause`](crate::BufferedEmitter::pause). Internally the
//! emitter keeps one optional global config plus one config per paused event,
//! and a FIFO of emissions captured while paused.
//!
//! ## Rules
//! - A global pause discards per-event configs; while it is active every event
//!   is paused.
//! - Events can still be paused individually under a global pause; those
//!   configs outlive the global one.
//! - An emission to a paused event is queued if the global config or the
//!   event's own config asks for it.
//! - Queued entries keep enqueue order; resuming removes only the entries of
//!   events that are no longer paused, in place.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use bufferbus::PauseOptions;
//!
//! let opts = PauseOptions::event("chat").with_interval(Duration::from_millis(100));
//! assert_eq!(opts.event.as_deref(), Some("chat"));
//! assert!(opts.queue_emissions);
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// How to pause emissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PauseOptions {
    /// Event to pause; `None` pauses every event.
    pub event: Option<String>,
    /// Queue emissions for replay on resume (`true`), or drop them (`false`).
    pub queue_emissions: bool,
    /// Delay before each replayed emission; `0s` replays synchronously.
    pub emission_interval: Duration,
}

impl Default for PauseOptions {
    /// Global pause, queuing, synchronous replay.
    fn default() -> Self {
        Self {
            event: None,
            queue_emissions: true,
            emission_interval: Duration::ZERO,
        }
    }
}

impl PauseOptions {
    /// Pause every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Pause one event.
    pub fn event(name: impl Into<String>) -> Self {
        Self {
            event: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets whether emissions are queued.
    #[inline]
    pub fn with_queue(mut self, queue: bool) -> Self {
        self.queue_emissions = queue;
        self
    }

    /// Sets the replay interval.
    #[inline]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.emission_interval = interval;
        self
    }
}

/// Active pause for one scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PauseConfig {
    pub(crate) queue: bool,
    pub(crate) interval: Duration,
}

impl From<&PauseOptions> for PauseConfig {
    fn from(opts: &PauseOptions) -> Self {
        Self {
            queue: opts.queue_emissions,
            interval: opts.emission_interval,
        }
    }
}

#[derive(Default)]
pub(crate) struct PauseTable {
    global: Option<PauseConfig>,
    events: HashMap<String, PauseConfig>,
}

impl PauseTable {
    pub(crate) fn pause(&mut self, opts: &PauseOptions) {
        let cfg = PauseConfig::from(opts);
        match &opts.event {
            Some(name) => {
                self.events.insert(name.clone(), cfg);
            }
            None => {
                self.events.clear();
                self.global = Some(cfg);
            }
        }
    }

    /// Effective pause of `event`, if any.
    ///
    /// Queues when either scope queues; the interval comes from the global
    /// config when there is one.
    pub(crate) fn lookup(&self, event: &str) -> Option<PauseConfig> {
        match (self.global, self.events.get(event)) {
            (Some(global), Some(own)) => Some(PauseConfig {
                queue: global.queue || own.queue,
                interval: global.interval,
            }),
            (Some(global), None) => Some(global),
            (None, own) => own.copied(),
        }
    }

    pub(crate) fn is_paused(&self, event: &str) -> bool {
        self.global.is_some() || self.events.contains_key(event)
    }

    /// Removes the config of `event`.
    pub(crate) fn resume_event(&mut self, event: &str) -> Option<PauseConfig> {
        self.events.remove(event)
    }

    /// Removes the global config. Per-event configs stay.
    pub(crate) fn resume_all(&mut self) -> Option<PauseConfig> {
        self.global.take()
    }

    /// Drops the per-event config of `event` (used by `off_all`).
    pub(crate) fn forget(&mut self, event: &str) {
        self.events.remove(event);
    }

    pub(crate) fn clear(&mut self) {
        self.global = None;
        self.events.clear();
    }
}

/// Emission captured while paused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Queued<T> {
    pub(crate) event: String,
    pub(crate) data: T,
}

pub(crate) struct EmissionQueue<T> {
    entries: VecDeque<Queued<T>>,
}

impl<T> EmissionQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, event: &str, data: T) {
        self.entries.push_back(Queued {
            event: event.to_string(),
            data,
        });
    }

    /// Removes and returns the entries of `event`, keeping both orders.
    pub(crate) fn drain_event(&mut self, event: &str) -> Vec<Queued<T>> {
        self.drain_where(|name| name == event)
    }

    /// Removes and returns the entries whose event satisfies `take`, keeping both orders.
    pub(crate) fn drain_where<F>(&mut self, mut take: F) -> Vec<Queued<T>>
    where
        F: FnMut(&str) -> bool,
    {
        let (taken, kept): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|q| take(&q.event));
        self.entries = kept.into();
        taken
    }

    /// Discards the entries of `event`.
    pub(crate) fn purge(&mut self, event: &str) {
        self.entries.retain(|q| q.event != event);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
