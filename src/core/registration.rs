//! # One listener registration and its bucket.
//!
//! A [`Registration`] is created by `on`/`once` and shared (`Arc`) between the
//! registry, dispatch snapshots, and the inactivity timer of its bucket.
//!
//! ## Bucket state
//! ```text
//!            push (len < capacity)             timer fires / flush
//!  empty ───────────────────────────► partial ─────────────────────► empty
//!    ▲        schedule timer (if any)    │  ▲                         (deliver batch)
//!    │                                   │  │ push: cancel + reschedule
//!    └────── push (len == capacity) ◄────┘──┘
//!             cancel timer, deliver batch
//! ```
//!
//! ## Rules
//! - The bucket exists iff the registration is buffered.
//! - A timer token is stored only while the bucket is non-empty.
//! - Timers are cancelled under the bucket lock, and a firing timer re-checks its
//!   token under the same lock, so a cancelled timer never delivers.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::config::BufferPolicy;
use crate::listeners::{Listener, ListenerOptions};

struct Bucket<T> {
    items: Vec<T>,
    timer: Option<CancellationToken>,
}

impl<T> Bucket<T> {
    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}

/// Accumulation state of a buffered registration.
pub(crate) struct Buffer<T> {
    policy: BufferPolicy,
    bucket: Mutex<Bucket<T>>,
}

impl<T> Buffer<T> {
    fn new(policy: BufferPolicy) -> Self {
        Self {
            policy,
            bucket: Mutex::new(Bucket {
                items: Vec::new(),
                timer: None,
            }),
        }
    }

    /// Appends `item`.
    ///
    /// Returns the full bucket when capacity is reached. Otherwise restarts the
    /// inactivity timer through `schedule` (when the policy has one) and returns `None`.
    pub(crate) fn push<F>(&self, item: T, schedule: F) -> Option<Vec<T>>
    where
        F: FnOnce(Duration) -> Option<CancellationToken>,
    {
        let mut bucket = self.bucket.lock();
        bucket.items.push(item);
        bucket.cancel_timer();

        if bucket.items.len() >= self.policy.capacity {
            return Some(mem::take(&mut bucket.items));
        }
        if let Some(after) = self.policy.inactivity {
            bucket.timer = schedule(after);
        }
        None
    }

    /// Cancels the timer and takes the bucket, if non-empty.
    pub(crate) fn take(&self) -> Option<Vec<T>> {
        let mut bucket = self.bucket.lock();
        bucket.cancel_timer();
        non_empty(mem::take(&mut bucket.items))
    }

    /// Takes the bucket on behalf of the timer holding `token`.
    ///
    /// Returns `None` if that timer was cancelled in the meantime.
    pub(crate) fn take_expired(&self, token: &CancellationToken) -> Option<Vec<T>> {
        let mut bucket = self.bucket.lock();
        if token.is_cancelled() {
            return None;
        }
        bucket.timer = None;
        non_empty(mem::take(&mut bucket.items))
    }

    pub(crate) fn cancel_timer(&self) {
        self.bucket.lock().cancel_timer();
    }

    #[cfg(test)]
    pub(crate) fn has_timer(&self) -> bool {
        self.bucket.lock().timer.is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.bucket.lock().items.len()
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Listener registration for one event.
pub(crate) struct Registration<T> {
    pub(crate) event: String,
    pub(crate) listener: Listener<T>,
    pub(crate) once: bool,
    pub(crate) options: Option<ListenerOptions>,
    pub(crate) buffer: Option<Buffer<T>>,
    /// Set when a one-shot registration delivered (or is delivering).
    fired: AtomicBool,
    /// Set when removed from the registry; no timers are scheduled afterwards.
    retired: AtomicBool,
}

impl<T> Registration<T> {
    pub(crate) fn new(
        event: &str,
        listener: Listener<T>,
        once: bool,
        options: Option<ListenerOptions>,
        policy: Option<BufferPolicy>,
    ) -> Self {
        Self {
            event: event.to_string(),
            listener,
            once,
            options,
            buffer: policy.map(Buffer::new),
            fired: AtomicBool::new(false),
            retired: AtomicBool::new(false),
        }
    }

    /// Dedup identity: same callback and equal options (both unset counts as equal).
    pub(crate) fn same_as(
        &self,
        listener: &Listener<T>,
        options: Option<&ListenerOptions>,
    ) -> bool {
        self.listener == *listener && self.options.as_ref() == options
    }

    /// `off` target: same callback, and equal options when options are given.
    pub(crate) fn matches(
        &self,
        listener: &Listener<T>,
        options: Option<&ListenerOptions>,
    ) -> bool {
        match options {
            Some(_) => self.same_as(listener, options),
            None => self.listener == *listener,
        }
    }

    /// `flush` target: every registration, every registration of a callback,
    /// or one exact registration. Options without a callback select nothing.
    pub(crate) fn flush_target(
        &self,
        listener: Option<&Listener<T>>,
        options: Option<&ListenerOptions>,
    ) -> bool {
        match (listener, options) {
            (None, None) => true,
            (Some(l), _) => self.matches(l, options),
            (None, Some(_)) => false,
        }
    }

    /// Reserves the right to deliver. Always succeeds for persistent listeners;
    /// succeeds once for one-shot listeners.
    pub(crate) fn claim(&self) -> bool {
        !self.once
            || self
                .fired
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// Gives back a claim whose delivery failed.
    pub(crate) fn unclaim(&self) {
        if self.once {
            self.fired.store(false, Ordering::Release);
        }
    }

    /// One-shot registration that already delivered.
    pub(crate) fn is_spent(&self) -> bool {
        self.once && self.fired.load(Ordering::Acquire)
    }

    /// Marks the registration as removed and cancels its pending timer.
    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
        if let Some(buffer) = &self.buffer {
            buffer.cancel_timer();
        }
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}
