//! Listener-side types: callbacks, delivered payloads, options and control groups.
//!
//! ## Contents
//! - [`Listener`], [`ListenerId`] callback handle and its identity
//! - [`Delivery`] what a callback receives (single payload or batch)
//! - [`ListenerOptions`] per-registration buffering knobs
//! - [`ControlGroup`] bulk `off`/`flush` handle
//!
//! ## Identity
//! A registration is identified by `(event, listener, options)`:
//! ```text
//! listener  → Arc allocation (clones are the same listener)
//! options   → field-wise equality; control groups compare by identity
//! ```

mod control;
mod listener;
mod options;

pub(crate) use control::GroupMember;

pub use control::ControlGroup;
pub use listener::{Delivery, Listener, ListenerFn, ListenerId, Payload};
pub use options::ListenerOptions;
