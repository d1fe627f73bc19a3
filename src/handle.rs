//! Result handles for submitted tasks.
//!
//! Each submission pairs the queued task with a one-shot channel. The worker
//! that runs the task fulfills the channel exactly once with the callable's
//! value or captured panic; the handle is the consumer end. If the pool is
//! torn down before the task runs, the producer end is dropped unfulfilled
//! and the handle reports [`Error::Abandoned`] instead of blocking forever.

use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, TryRecvError};

/// Consumer end of a task's completion channel.
///
/// The outcome can be consumed at most once, by either [`wait`](Self::wait)
/// or [`try_wait`](Self::try_wait).
#[derive(Debug)]
pub struct JobHandle<T> {
    rx: Receiver<Result<T>>,
    done: bool,
}

impl<T> JobHandle<T> {
    pub(crate) fn new(rx: Receiver<Result<T>>) -> Self {
        Self { rx, done: false }
    }

    /// Block until the task finishes and return its outcome.
    ///
    /// Returns the callable's value, [`Error::TaskPanicked`] if it panicked,
    /// or [`Error::Abandoned`] if the pool shut down before it ran.
    pub fn wait(self) -> Result<T> {
        if self.done {
            return Err(Error::ResultTaken);
        }

        match self.rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Abandoned),
        }
    }

    /// Non-blocking poll. `None` while the task has not finished.
    pub fn try_wait(&mut self) -> Option<Result<T>> {
        if self.done {
            return Some(Err(Error::ResultTaken));
        }

        match self.rx.try_recv() {
            Ok(outcome) => {
                self.done = true;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                Some(Err(Error::Abandoned))
            }
        }
    }
}
