//! # bufferbus
//!
//! **Bufferbus** is an in-process event emitter with listener-side buffering.
//!
//! On top of the classic "register a callback for a named event" pattern it
//! adds three independent capabilities:
//! - **batching**: a buffered listener receives consecutive emissions as one
//!   batch, either when its bucket is full or after a quiet period;
//! - **pause/resume**: delivery can be suspended globally or per event, with
//!   emissions optionally queued and replayed in order (optionally spaced out);
//! - **cache**: a bounded per-event history of what listeners actually received.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer                       BufferedEmitter<T>
//!  ──────────                ┌──────────────────────────────────────────┐
//!  emit(ev, data) ─────────► │ PauseTable ── paused? ──► EmissionQueue  │
//!                            │     │ live                     ▲ resume  │
//!                            │     ▼                          │         │
//!                            │ Registry: ev → [Registration]  │         │
//!                            │     │ snapshot (lock released) ┘         │
//!                            │     ├─► unbuffered ─► Delivery::Single   │
//!                            │     └─► Bucket ─┬─ full ─────┐           │
//!                            │                 └─ timer ────┤           │
//!                            │                              ▼           │
//!                            │                      Delivery::Batch     │
//!                            └──────────────┬───────────────────────────┘
//!                                           ▼
//!                      listener(&delivery) ─► EmitLogger ─► CacheStore
//! ```
//!
//! ### Bucket lifecycle
//! ```text
//! emit ──► push(data)
//!   ├─ len == capacity ─► cancel timer ─► deliver batch
//!   └─ len <  capacity ─► cancel timer ─► schedule timer (if inactivity > 0)
//!
//! timer fires ─► still current? ─► deliver batch
//! flush / off / off_all / cleanup ─► cancel timer (flush also delivers)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Emitter**       | Register, emit, flush, pause/resume, inspect the cache.      | [`BufferedEmitter`]                         |
//! | **Listeners**     | Callbacks, delivered payloads and per-listener buffering.    | [`Listener`], [`Delivery`], [`ListenerOptions`] |
//! | **Control groups**| Bulk `off`/`flush` over tagged registrations.                | [`ControlGroup`]                            |
//! | **Pause**         | Global or per-event suspension with queued replay.           | [`PauseOptions`], [`Replay`]                |
//! | **Logging**       | Injectable hook gated by shared debug flags.                 | [`EmitLogger`], [`DebugSwitch`], [`TracingLogger`] |
//! | **Errors**        | Typed failures of interval replays.                          | [`ReplayError`]                             |
//! | **Configuration** | Instance-wide defaults.                                      | [`EmitterConfig`]                           |
//!
//! ## Runtime
//! Emitting, flushing and pausing are synchronous and work without a runtime.
//! Inactivity timers and interval replays are spawned on the ambient tokio
//! runtime; without one, timers are skipped and replays run synchronously.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use bufferbus::{BufferedEmitter, Delivery, EmitterConfig, Listener, ListenerOptions, PauseOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let emitter: BufferedEmitter<String> = BufferedEmitter::new(EmitterConfig {
//!         cache: true,
//!         ..EmitterConfig::default()
//!     });
//!
//!     let print = Listener::new(|d: &Delivery<String>| println!("got {d:?}"));
//!     let opts = ListenerOptions::buffered(10).with_inactivity_timeout(Duration::from_millis(50));
//!     emitter.on("chat", &print, Some(opts));
//!
//!     emitter.pause(PauseOptions::event("chat").with_interval(Duration::from_millis(10)));
//!     emitter.emit("chat", "hello".to_string());
//!     emitter.emit("chat", "world".to_string());
//!
//!     // Replays both messages, 10ms apart, into the listener's bucket.
//!     let replayed = emitter.resume(Some("chat")).await?;
//!     assert_eq!(replayed, 2);
//!
//!     // The bucket is flushed 50ms after the last message.
//!     tokio::time::sleep(Duration::from_millis(100)).await;
//!     assert_eq!(emitter.get_cache("chat").len(), 1);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod listeners;
mod logging;

// ---- Public re-exports ----

pub use core::{
    BufferedEmitter, EmitterConfig, PauseOptions, Replay, DEFAULT_BUFFER_CAPACITY,
    DEFAULT_CACHE_CAPACITY,
};
pub use error::ReplayError;
pub use listeners::{
    ControlGroup, Delivery, Listener, ListenerFn, ListenerId, ListenerOptions, Payload,
};
pub use logging::{
    render_payload, DebugStatus, DebugSwitch, EmitLogger, LogDetail, LogKind, LogRecord,
    NoopLogger, TracingLogger,
};
