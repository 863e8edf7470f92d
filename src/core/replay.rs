//! # Handle returned by `resume`.
//!
//! With a zero emission interval the queued entries are re-emitted before
//! `resume` returns and the handle is already complete. With a non-zero interval
//! they are re-emitted by a task on the ambient tokio runtime, one per interval,
//! and the handle completes when the last one has been emitted.
//!
//! Dropping the handle does not stop the replay; use [`Replay::abort`], or
//! `cleanup` on the emitter, which stops it after the current entry.
//!
//! ```text
//! resume(ev) ─┬─ interval == 0 ──► emit(q1) emit(q2) ... ──► Replay::Done(n)
//!             └─ interval  > 0 ──► spawn { sleep; emit(q1); sleep; emit(q2) ... } ──► Replay::Running
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::ReplayError;

enum State {
    Done(usize),
    Running(JoinHandle<usize>),
}

/// Completion handle of a resume.
///
/// Resolves to the number of queued emissions that were replayed.
pub struct Replay {
    state: State,
}

impl Replay {
    pub(crate) fn done(replayed: usize) -> Self {
        Self {
            state: State::Done(replayed),
        }
    }

    pub(crate) fn running(join: JoinHandle<usize>) -> Self {
        Self {
            state: State::Running(join),
        }
    }

    /// True once every entry was replayed (or the replay ended early).
    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Done(_) => true,
            State::Running(join) => join.is_finished(),
        }
    }

    /// Stops a running replay. Entries not yet re-emitted are lost.
    pub fn abort(&self) {
        if let State::Running(join) = &self.state {
            join.abort();
        }
    }
}

impl Future for Replay {
    type Output = Result<usize, ReplayError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Done(n) => Poll::Ready(Ok(*n)),
            State::Running(join) => Pin::new(join).poll(cx).map_err(ReplayError::from),
        }
    }
}

impl std::fmt::Debug for Replay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            State::Done(n) => f.debug_tuple("Replay::Done").field(n).finish(),
            State::Running(_) => f
                .debug_struct("Replay::Running")
                .field("finished", &self.is_finished())
                .finish(),
        }
    }
}
