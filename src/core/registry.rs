//! # Listener registry.
//!
//! Maps event names to registrations in insertion order.
//!
//! ## Rules
//! - Dedup on add: `(event, listener, options)` is registered at most once,
//!   regardless of the one-shot flag.
//! - Dispatch works on [`Registry::snapshot`] copies; the registry itself is only
//!   mutated under the emitter's state lock and never while a listener runs.
//! - An event whose last registration goes away is dropped from the map.
//! - Removed registrations are handed back to the caller, which retires them
//!   (cancels timers) after releasing the lock.

use std::collections::HashMap;
use std::sync::Arc;

use super::registration::Registration;
use crate::listeners::{Listener, ListenerOptions};

type Registrations<T> = Vec<Arc<Registration<T>>>;

pub(crate) struct Registry<T> {
    events: HashMap<String, Registrations<T>>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Appends `reg` unless an identical registration exists.
    pub(crate) fn add(&mut self, reg: Arc<Registration<T>>) -> bool {
        let regs = self.events.entry(reg.event.clone()).or_default();
        if regs
            .iter()
            .any(|r| r.same_as(&reg.listener, reg.options.as_ref()))
        {
            return false;
        }
        regs.push(reg);
        true
    }

    /// Copy of the registrations of `event`, or `None` if there are none.
    pub(crate) fn snapshot(&self, event: &str) -> Option<Registrations<T>> {
        self.events
            .get(event)
            .filter(|regs| !regs.is_empty())
            .cloned()
    }

    /// Removes the first registration matching `listener` (and `options`, when given).
    pub(crate) fn remove_first(
        &mut self,
        event: &str,
        listener: &Listener<T>,
        options: Option<&ListenerOptions>,
    ) -> Option<Arc<Registration<T>>> {
        let regs = self.events.get_mut(event)?;
        let idx = regs.iter().position(|r| r.matches(listener, options))?;
        let removed = regs.remove(idx);
        self.drop_if_empty(event);
        Some(removed)
    }

    /// Removes `reg` itself, if still registered.
    pub(crate) fn remove_exact(&mut self, reg: &Arc<Registration<T>>) -> bool {
        let Some(regs) = self.events.get_mut(&reg.event) else {
            return false;
        };
        let before = regs.len();
        regs.retain(|r| !Arc::ptr_eq(r, reg));
        let removed = regs.len() != before;
        self.drop_if_empty(&reg.event);
        removed
    }

    /// Removes one-shot registrations of `event` that already delivered.
    pub(crate) fn prune_spent(&mut self, event: &str) -> Registrations<T> {
        let Some(regs) = self.events.get_mut(event) else {
            return Vec::new();
        };
        let (spent, kept): (Registrations<T>, Registrations<T>) =
            regs.drain(..).partition(|r| r.is_spent());
        *regs = kept;
        self.drop_if_empty(event);
        spent
    }

    /// Removes every registration of `event`.
    pub(crate) fn remove_event(&mut self, event: &str) -> Registrations<T> {
        self.events.remove(event).unwrap_or_default()
    }

    /// Removes every registration.
    pub(crate) fn drain(&mut self) -> Registrations<T> {
        self.events.drain().flat_map(|(_, regs)| regs).collect()
    }

    /// Callbacks registered for `event`, in order.
    pub(crate) fn listeners(&self, event: &str) -> Vec<Listener<T>> {
        self.events
            .get(event)
            .map(|regs| regs.iter().map(|r| r.listener.clone()).collect())
            .unwrap_or_default()
    }

    /// Callbacks of every event.
    pub(crate) fn all_listeners(&self) -> HashMap<String, Vec<Listener<T>>> {
        self.events
            .iter()
            .map(|(event, regs)| {
                let listeners = regs.iter().map(|r| r.listener.clone()).collect();
                (event.clone(), listeners)
            })
            .collect()
    }

    /// Payloads currently held in the buckets of `event`.
    pub(crate) fn buffered_len(&self, event: &str) -> usize {
        self.events
            .get(event)
            .map(|regs| {
                regs.iter()
                    .filter_map(|r| r.buffer.as_ref())
                    .map(|b| b.len())
                    .sum()
            })
            .unwrap_or(0)
    }

    fn drop_if_empty(&mut self, event: &str) {
        if self.events.get(event).is_some_and(|regs| regs.is_empty()) {
            self.events.remove(event);
        }
    }
}
