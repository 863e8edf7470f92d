//! Dispatch engine: registry, buffering, pause/resume and cache.
//!
//! The public API from this module is [`BufferedEmitter`], configured with
//! [`EmitterConfig`] and paused with [`PauseOptions`].
//!
//! Internal modules:
//! - [`emitter`]: the engine; owns one state lock and never holds it across listener calls;
//! - [`registration`]: one registration with its bucket and inactivity timer;
//! - [`registry`]: per-event registration lists with dedup;
//! - [`pause`]: pause table and the queue replayed on resume;
//! - [`replay`]: completion handle of an interval replay;
//! - [`cache`]: bounded per-event delivery history;
//! - [`config`]: instance-wide defaults.

mod cache;
mod config;
mod emitter;
mod pause;
mod registration;
mod registry;
mod replay;


pub use config::{EmitterConfig, DEFAULT_BUFFER_CAPACITY, DEFAULT_CACHE_CAPACITY};
pub use emitter::BufferedEmitter;
pub use pause::PauseOptions;
pub use replay::Replay;
