//! # Listener callbacks and delivered payloads.
//!
//! A [`Listener`] wraps a callback in an `Arc`. Identity is the allocation, not
//! the closure body: clones of one `Listener` are "the same listener" for dedup,
//! `off` and `flush`, while two `Listener::new` calls over identical closures are
//! different listeners.
//!
//! ```rust
//! use bufferbus::{Delivery, Listener};
//!
//! let a: Listener<u32> = Listener::new(|d: &Delivery<u32>| println!("{d:?}"));
//! let b = a.clone();
//! assert_eq!(a, b);
//! assert_eq!(a.id(), b.id());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Bound on emitted payloads.
///
/// Payloads are cloned once per receiving registration and may be handed to
/// timer and replay tasks on the tokio runtime.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}

/// What a listener receives for one call.
///
/// Unbuffered registrations get every emission as [`Delivery::Single`];
/// buffered registrations get their accumulated bucket as [`Delivery::Batch`].
/// The cache stores deliveries in this same shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Delivery<T> {
    /// One emitted payload.
    Single(T),
    /// A flushed bucket, in emission order.
    Batch(Vec<T>),
}

impl<T> Delivery<T> {
    /// Number of payloads carried by this delivery.
    pub fn len(&self) -> usize {
        match self {
            Delivery::Single(_) => 1,
            Delivery::Batch(items) => items.len(),
        }
    }

    /// True for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the single payload, if this is not a batch.
    pub fn as_single(&self) -> Option<&T> {
        match self {
            Delivery::Single(v) => Some(v),
            Delivery::Batch(_) => None,
        }
    }

    /// Returns the batch, if this is a buffered delivery.
    pub fn as_batch(&self) -> Option<&[T]> {
        match self {
            Delivery::Single(_) => None,
            Delivery::Batch(items) => Some(items),
        }
    }

    /// Flattens the delivery into its payloads.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Delivery::Single(v) => vec![v],
            Delivery::Batch(items) => items,
        }
    }
}

/// Callback signature shared by all listeners.
pub type ListenerFn<T> = dyn Fn(&Delivery<T>) + Send + Sync;

/// Stable identity of a [`Listener`], usable in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(usize);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener@{:#x}", self.0)
    }
}

/// Cloneable handle to a listener callback.
pub struct Listener<T> {
    f: Arc<ListenerFn<T>>,
}

impl<T> Listener<T> {
    /// Wraps a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Delivery<T>) + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Identity of the underlying allocation.
    #[inline]
    pub fn id(&self) -> ListenerId {
        ListenerId(Arc::as_ptr(&self.f) as *const () as usize)
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self, delivery: &Delivery<T>) {
        (self.f)(delivery)
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T> Eq for Listener<T> {}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let a: Listener<i32> = Listener::new(|_| {});
        let b = a.clone();
        let c: Listener<i32> = Listener::new(|_| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_delivery_accessors() {
        let single = Delivery::Single(7);
        let batch = Delivery::Batch(vec![1, 2, 3]);
        assert_eq!(single.len(), 1);
        assert_eq!(single.as_single(), Some(&7));
        assert_eq!(batch.as_batch(), Some(&[1, 2, 3][..]));
        assert_eq!(batch.into_vec(), vec![1, 2, 3]);
        assert!(Delivery::<i32>::Batch(vec![]).is_empty());
    }

    #[test]
    fn test_delivery_serializes_untagged() {
        let single = serde_json::to_string(&Delivery::Single("a")).unwrap();
        let batch = serde_json::to_string(&Delivery::Batch(vec![1, 2])).unwrap();
        assert_eq!(single, "\"a\"");
        assert_eq!(batch, "[1,2]");
    }
}
