//! # Bounded per-event delivery history.
//!
//! Stores what listeners actually received: a [`Delivery::Batch`] per flushed
//! bucket, a [`Delivery::Single`] per unbuffered call. Raw emissions that did
//! not reach a listener are never recorded.
//!
//! ## Capacity behavior
//! Each event keeps at most `capacity` deliveries. When full, the oldest is
//! evicted before the new one is appended.

use std::collections::{HashMap, VecDeque};

use crate::listeners::Delivery;

pub(crate) struct CacheStore<T> {
    enabled: bool,
    capacity: usize,
    entries: HashMap<String, VecDeque<Delivery<T>>>,
}

impl<T: Clone> CacheStore<T> {
    /// A disabled store ignores every write.
    pub(crate) fn new(enabled: bool, capacity: usize) -> Self {
        Self {
            enabled,
            capacity: capacity.max(1),
            entries: HashMap::new(),
        }
    }

    pub(crate) fn record(&mut self, event: &str, delivery: Delivery<T>) {
        if !self.enabled {
            return;
        }
        let history = self
            .entries
            .entry(event.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        while history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(delivery);
    }

    /// History of `event`, oldest first.
    pub(crate) fn get(&self, event: &str) -> Vec<Delivery<T>> {
        self.entries
            .get(event)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn remove(&mut self, event: &str) {
        self.entries.remove(event);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
