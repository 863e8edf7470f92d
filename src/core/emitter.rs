//! # BufferedEmitter: the dispatch engine.
//!
//! Owns the listener registry, the pause table and queue, and the delivery
//! cache of one emitter instance. Cloning a `BufferedEmitter` clones a handle to
//! the same instance.
//!
//! ## Dispatch
//! ```text
//! emit(ev, data)
//!   ├─► no registrations ─────────────────────────────► false
//!   ├─► paused (global or ev) ─► queue? push(ev, data) ─► false
//!   └─► snapshot registrations (lock released)
//!         for reg in snapshot:
//!           ├─ buffered   ─► bucket.push(data)
//!           │                ├─ full    ─► deliver(Batch)
//!           │                └─ partial ─► restart inactivity timer
//!           └─ unbuffered ─► deliver(Single)
//!         prune one-shot registrations that delivered
//!         return "any listener called"
//!
//! deliver(reg, delivery)
//!   ├─► claim (one-shot: first delivery only)
//!   ├─► listener(&delivery)       (panic isolated, counts as not delivered)
//!   ├─► logging hook (if enabled)
//!   └─► cache.record(ev, delivery)
//! ```
//!
//! ## Rules
//! - No lock is held while a listener runs; listeners may call back into the
//!   emitter (`on`, `off`, `emit`, `flush`, `pause`, ...).
//! - Registry changes made during a pass affect the next pass only.
//! - Every path that empties a bucket or removes a registration cancels its
//!   inactivity timer in the same call.

use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::cache::CacheStore;
use super::config::EmitterConfig;
use super::pause::{EmissionQueue, PauseOptions, PauseTable, Queued};
use super::registration::Registration;
use super::registry::Registry;
use super::replay::Replay;
use crate::error::panic_message;
use crate::listeners::{Delivery, GroupMember, Listener, ListenerOptions, Payload};
use crate::logging::{DebugStatus, EmitLogger, LogDetail, LogKind, LogRecord, TracingLogger};

struct State<T> {
    registry: Registry<T>,
    pauses: PauseTable,
    queue: EmissionQueue<T>,
    cache: CacheStore<T>,
    /// Parent of every running interval replay; replaced on `cleanup`.
    replays: CancellationToken,
}

struct Inner<T> {
    config: EmitterConfig,
    logger: Arc<dyn EmitLogger<T>>,
    state: Mutex<State<T>>,
}

impl<T: Payload> Inner<T> {
    fn log(&self, kind: LogKind, event: &str, detail: LogDetail<'_, T>) {
        if self.config.debug.allows(kind) {
            self.logger.log(&LogRecord {
                kind,
                event,
                detail,
            });
        }
    }
}

/// Event emitter with listener-side buffering, pause/resume and a delivery cache.
///
/// # Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use bufferbus::{BufferedEmitter, Delivery, EmitterConfig, Listener, ListenerOptions};
///
/// let emitter: BufferedEmitter<u32> = BufferedEmitter::new(EmitterConfig::default());
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// let listener = Listener::new(move |d: &Delivery<u32>| sink.lock().unwrap().push(d.clone()));
/// emitter.on("bar", &listener, Some(ListenerOptions::buffered(2)));
///
/// assert!(!emitter.emit("bar", 1));
/// assert!(emitter.emit("bar", 2));
/// assert_eq!(*seen.lock().unwrap(), vec![Delivery::Batch(vec![1, 2])]);
/// ```
pub struct BufferedEmitter<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for BufferedEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Payload + Serialize> BufferedEmitter<T> {
    /// Creates an emitter that logs through [`TracingLogger`].
    pub fn new(config: EmitterConfig) -> Self {
        Self::with_logger(config, Arc::new(TracingLogger::new()))
    }
}

impl<T: Payload + Serialize> Default for BufferedEmitter<T> {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

impl<T: Payload> BufferedEmitter<T> {
    /// Creates an emitter with a custom logging hook.
    pub fn with_logger(config: EmitterConfig, logger: Arc<dyn EmitLogger<T>>) -> Self {
        let cache = CacheStore::new(config.cache, config.cache_capacity_clamped());
        Self {
            inner: Arc::new(Inner {
                config,
                logger,
                state: Mutex::new(State {
                    registry: Registry::new(),
                    pauses: PauseTable::default(),
                    queue: EmissionQueue::new(),
                    cache,
                    replays: CancellationToken::new(),
                }),
            }),
        }
    }

    /// Configuration this emitter was built with.
    pub fn config(&self) -> &EmitterConfig {
        &self.inner.config
    }

    // ---------------------------
    // Registry
    // ---------------------------

    /// Registers `listener` for `event`.
    ///
    /// Returns `false` (and changes nothing) if the same listener is already
    /// registered for `event` with equal options.
    pub fn on(
        &self,
        event: &str,
        listener: &Listener<T>,
        options: Option<ListenerOptions>,
    ) -> bool {
        self.register(event, listener, options, false)
    }

    /// Alias for [`on`](Self::on).
    pub fn add_listener(
        &self,
        event: &str,
        listener: &Listener<T>,
        options: Option<ListenerOptions>,
    ) -> bool {
        self.on(event, listener, options)
    }

    /// Registers `listener` for its first delivery only.
    pub fn once(
        &self,
        event: &str,
        listener: &Listener<T>,
        options: Option<ListenerOptions>,
    ) -> bool {
        self.register(event, listener, options, true)
    }

    /// Removes the first registration of `listener` for `event`.
    ///
    /// With `options`, only a registration with equal options matches; without,
    /// any registration of `listener` does. A pending inactivity flush of the
    /// removed registration is cancelled.
    pub fn off(
        &self,
        event: &str,
        listener: &Listener<T>,
        options: Option<&ListenerOptions>,
    ) -> bool {
        let removed = self
            .inner
            .state
            .lock()
            .registry
            .remove_first(event, listener, options);
        let Some(reg) = removed else {
            return false;
        };
        reg.retire();
        self.inner
            .log(LogKind::Off, event, LogDetail::Listener(listener.id()));
        true
    }

    /// Alias for [`off`](Self::off).
    pub fn remove_listener(
        &self,
        event: &str,
        listener: &Listener<T>,
        options: Option<&ListenerOptions>,
    ) -> bool {
        self.off(event, listener, options)
    }

    /// Removes every registration of `event`, together with its queued
    /// emissions, pause config and cache.
    ///
    /// Returns `false` (and touches nothing) if `event` has no registrations.
    pub fn off_all(&self, event: &str) -> bool {
        let removed = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            let removed = state.registry.remove_event(event);
            if removed.is_empty() {
                return false;
            }
            state.queue.purge(event);
            state.pauses.forget(event);
            state.cache.remove(event);
            removed
        };
        for reg in &removed {
            reg.retire();
        }
        true
    }

    /// Callbacks registered for `event`, in registration order.
    pub fn listeners(&self, event: &str) -> Vec<Listener<T>> {
        self.inner.state.lock().registry.listeners(event)
    }

    /// Callbacks of every event.
    pub fn all_listeners(&self) -> HashMap<String, Vec<Listener<T>>> {
        self.inner.state.lock().registry.all_listeners()
    }

    /// Cancels every timer and running replay, and clears registrations, queue,
    /// pause state and cache.
    ///
    /// A [`Replay`] stopped this way resolves to the number of entries it
    /// re-emitted before `cleanup`.
    pub fn cleanup(&self) {
        let (removed, replays) = {
            let mut state = self.inner.state.lock();
            state.pauses.clear();
            state.queue.clear();
            state.cache.clear();
            let replays = mem::replace(&mut state.replays, CancellationToken::new());
            (state.registry.drain(), replays)
        };
        replays.cancel();
        for reg in &removed {
            reg.retire();
        }
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Emits `data` to the listeners of `event`.
    ///
    /// Returns `true` if at least one listener was called during this pass.
    /// Emissions to an event without listeners are dropped, even while paused.
    pub fn emit(&self, event: &str, data: T) -> bool {
        let snapshot = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            let Some(snapshot) = state.registry.snapshot(event) else {
                return false;
            };
            if let Some(pause) = state.pauses.lookup(event) {
                if pause.queue {
                    state.queue.push(event, data);
                }
                return false;
            }
            snapshot
        };

        let mut delivered = false;
        let mut spent = false;
        for reg in &snapshot {
            if reg.is_spent() {
                continue;
            }
            let fired = match &reg.buffer {
                Some(buffer) => {
                    match buffer.push(data.clone(), |after| self.schedule_flush(reg, after)) {
                        Some(batch) => self.deliver(reg, Delivery::Batch(batch)),
                        None => false,
                    }
                }
                None => self.deliver(reg, Delivery::Single(data.clone())),
            };
            delivered |= fired;
            spent |= fired && reg.once;
        }

        if spent {
            self.prune_spent(event);
        }
        delivered
    }

    /// Delivers buffered payloads now, regardless of capacity and timers.
    ///
    /// - `flush(ev, None, None)`: every buffered registration of `ev`
    /// - `flush(ev, Some(l), None)`: every buffered registration of `l`
    /// - `flush(ev, Some(l), Some(o))`: the registration of `l` with options `o`
    ///
    /// Returns `true` if at least one non-empty bucket was delivered.
    pub fn flush(
        &self,
        event: &str,
        listener: Option<&Listener<T>>,
        options: Option<&ListenerOptions>,
    ) -> bool {
        let Some(snapshot) = self.inner.state.lock().registry.snapshot(event) else {
            return false;
        };

        let mut flushed = false;
        let mut spent = false;
        for reg in snapshot.iter().filter(|r| r.flush_target(listener, options)) {
            let Some(batch) = reg.buffer.as_ref().and_then(|b| b.take()) else {
                continue;
            };
            let fired = self.deliver(reg, Delivery::Batch(batch));
            flushed |= fired;
            spent |= fired && reg.once;
        }

        if spent {
            self.prune_spent(event);
        }
        flushed
    }

    // ---------------------------
    // Pause / resume
    // ---------------------------

    /// Suspends delivery for one event or for all of them.
    ///
    /// A global pause replaces every per-event pause.
    pub fn pause(&self, options: PauseOptions) {
        tracing::debug!(
            event = options.event.as_deref().unwrap_or("*"),
            queue = options.queue_emissions,
            interval_ms = options.emission_interval.as_millis() as u64,
            "pausing emissions"
        );
        self.inner.state.lock().pauses.pause(&options);
    }

    /// Resumes `event` (or everything, with `None`) and replays what was queued.
    ///
    /// - `Some(ev)`: lifts the pause of `ev` and replays its queued emissions.
    ///   Does nothing if `ev` has no pause of its own; replays nothing while a
    ///   global pause still holds `ev`.
    /// - `None`: lifts the global pause and replays the queued emissions of every
    ///   event that is no longer paused, using the global pause's interval.
    ///   Events paused on their own stay paused and keep their entries.
    ///
    /// Replay goes through [`emit`](Self::emit), so buffered listeners keep
    /// accumulating across the pause. With a non-zero interval the replay runs on
    /// the current tokio runtime and the returned [`Replay`] completes after the
    /// last entry; without a runtime it falls back to a synchronous replay.
    pub fn resume(&self, event: Option<&str>) -> Replay {
        let (entries, interval) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            match event {
                Some(name) => match state.pauses.resume_event(name) {
                    Some(_) if state.pauses.is_paused(name) => return Replay::done(0),
                    Some(cfg) => (state.queue.drain_event(name), cfg.interval),
                    None => return Replay::done(0),
                },
                None => {
                    let interval = state
                        .pauses
                        .resume_all()
                        .map_or(Duration::ZERO, |cfg| cfg.interval);
                    let pauses = &state.pauses;
                    let entries = state.queue.drain_where(|name| !pauses.is_paused(name));
                    (entries, interval)
                }
            }
        };
        self.replay(entries, interval)
    }

    /// Whether emissions to `event` are currently suspended.
    pub fn is_paused(&self, event: &str) -> bool {
        self.inner.state.lock().pauses.is_paused(event)
    }

    /// Number of emissions waiting for a resume.
    pub fn queued_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    // ---------------------------
    // Cache / introspection
    // ---------------------------

    /// Recent deliveries of `event`, oldest first. Empty when caching is off.
    pub fn get_cache(&self, event: &str) -> Vec<Delivery<T>> {
        self.inner.state.lock().cache.get(event)
    }

    /// Payloads of `event` sitting in buckets, waiting for a flush.
    pub fn buffered_len(&self, event: &str) -> usize {
        self.inner.state.lock().registry.buffered_len(event)
    }

    /// Replaces the flags of this emitter's [`DebugSwitch`](crate::DebugSwitch),
    /// which affects every emitter sharing that switch.
    pub fn enable_debug(&self, status: DebugStatus) {
        self.inner.config.debug.enable(status);
    }

    /// Current debug flags.
    pub fn debug_status(&self) -> DebugStatus {
        self.inner.config.debug.status()
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn register(
        &self,
        event: &str,
        listener: &Listener<T>,
        options: Option<ListenerOptions>,
        once: bool,
    ) -> bool {
        let policy = self.inner.config.buffer_policy(options.as_ref());
        let group = options.as_ref().and_then(|o| o.control.clone());

        let reg = Arc::new(Registration::new(event, listener.clone(), once, options, policy));
        if !self.inner.state.lock().registry.add(Arc::clone(&reg)) {
            return false;
        }

        if let Some(group) = group {
            group.attach(Arc::new(Tagged {
                emitter: Arc::downgrade(&self.inner),
                registration: Arc::downgrade(&reg),
            }));
        }
        self.inner
            .log(LogKind::On, event, LogDetail::Listener(listener.id()));
        true
    }

    /// Calls the listener and records the delivery. Returns whether it was delivered.
    fn deliver(&self, reg: &Registration<T>, delivery: Delivery<T>) -> bool {
        if !reg.claim() {
            return false;
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| reg.listener.call(&delivery)));
        if let Err(payload) = outcome {
            reg.unclaim();
            tracing::error!(
                event = %reg.event,
                listener = %reg.listener.id(),
                items = delivery.len(),
                reason = %panic_message(payload.as_ref()),
                "listener panicked; delivery dropped"
            );
            return false;
        }

        self.inner
            .log(LogKind::Emit, &reg.event, LogDetail::Delivery(&delivery));
        if self.inner.config.cache {
            self.inner.state.lock().cache.record(&reg.event, delivery);
        }
        true
    }

    /// Starts the inactivity timer of `reg`'s bucket.
    fn schedule_flush(
        &self,
        reg: &Arc<Registration<T>>,
        after: Duration,
    ) -> Option<CancellationToken> {
        if reg.is_retired() {
            return None;
        }
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    event = %reg.event,
                    listener = %reg.listener.id(),
                    "no tokio runtime; inactivity flush disabled for this bucket"
                );
                return None;
            }
        };

        tracing::debug!(
            event = %reg.event,
            listener = %reg.listener.id(),
            after_ms = after.as_millis() as u64,
            "inactivity flush scheduled"
        );
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let emitter = Arc::downgrade(&self.inner);
        let reg = Arc::clone(reg);
        runtime.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => return,
                _ = time::sleep(after) => {}
            }
            if let Some(inner) = emitter.upgrade() {
                BufferedEmitter { inner }.flush_inactive(&reg, &cancelled);
            }
        });
        Some(token)
    }

    /// Removes `reg` itself, if still registered.
    fn remove_registration(&self, reg: &Arc<Registration<T>>) -> bool {
        if !self.inner.state.lock().registry.remove_exact(reg) {
            return false;
        }
        reg.retire();
        self.inner
            .log(LogKind::Off, &reg.event, LogDetail::Listener(reg.listener.id()));
        true
    }

    /// Flushes the bucket of `reg` alone.
    fn flush_registration(&self, reg: &Arc<Registration<T>>) -> bool {
        let Some(batch) = reg.buffer.as_ref().and_then(|b| b.take()) else {
            return false;
        };
        let fired = self.deliver(reg, Delivery::Batch(batch));
        if fired && reg.once {
            self.prune_spent(&reg.event);
        }
        fired
    }

    /// Timer side of the inactivity flush.
    fn flush_inactive(&self, reg: &Arc<Registration<T>>, token: &CancellationToken) {
        let Some(batch) = reg.buffer.as_ref().and_then(|b| b.take_expired(token)) else {
            return;
        };
        tracing::debug!(event = %reg.event, items = batch.len(), "inactivity flush");
        if self.deliver(reg, Delivery::Batch(batch)) && reg.once {
            let removed = self.inner.state.lock().registry.remove_exact(reg);
            if removed {
                reg.retire();
            }
        }
    }

    fn prune_spent(&self, event: &str) {
        let spent = self.inner.state.lock().registry.prune_spent(event);
        for reg in &spent {
            reg.retire();
        }
    }

    fn replay(&self, entries: Vec<Queued<T>>, interval: Duration) -> Replay {
        if entries.is_empty() {
            return Replay::done(0);
        }
        if interval.is_zero() {
            return Replay::done(self.replay_now(entries));
        }

        match Handle::try_current() {
            Ok(runtime) => {
                let emitter = self.clone();
                let stop = self.inner.state.lock().replays.child_token();
                Replay::running(runtime.spawn(async move {
                    let mut replayed = 0;
                    for q in entries {
                        tokio::select! {
                            biased;
                            _ = stop.cancelled() => break,
                            _ = time::sleep(interval) => {}
                        }
                        emitter.emit(&q.event, q.data);
                        replayed += 1;
                    }
                    replayed
                }))
            }
            Err(_) => {
                tracing::warn!(
                    entries = entries.len(),
                    "no tokio runtime; replaying queued emissions synchronously"
                );
                Replay::done(self.replay_now(entries))
            }
        }
    }

    fn replay_now(&self, entries: Vec<Queued<T>>) -> usize {
        let replayed = entries.len();
        for q in entries {
            self.emit(&q.event, q.data);
        }
        replayed
    }
}

impl<T> fmt::Debug for BufferedEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedEmitter")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Registration recorded against a [`ControlGroup`](crate::ControlGroup).
///
/// Holds both ends weakly so the group keeps nothing alive.
struct Tagged<T> {
    emitter: Weak<Inner<T>>,
    registration: Weak<Registration<T>>,
}

impl<T> Tagged<T> {
    fn resolve(&self) -> Option<(BufferedEmitter<T>, Arc<Registration<T>>)> {
        let reg = self.registration.upgrade().filter(|r| !r.is_retired())?;
        let inner = self.emitter.upgrade()?;
        Some((BufferedEmitter { inner }, reg))
    }
}

impl<T: Payload> GroupMember for Tagged<T> {
    fn off(&self) -> bool {
        self.resolve()
            .is_some_and(|(emitter, reg)| emitter.remove_registration(&reg))
    }

    fn flush(&self) -> bool {
        self.resolve()
            .is_some_and(|(emitter, reg)| emitter.flush_registration(&reg))
    }

    fn is_live(&self) -> bool {
        self.emitter.strong_count() > 0
            && self.registration.upgrade().is_some_and(|r| !r.is_retired())
    }
}
