//! taskmill - a fixed-size worker pool over a two-lock FIFO queue.
//!
//! A pool of background threads executes arbitrary zero-argument callables
//! submitted from any thread. Submission returns a [`JobHandle`] through
//! which the caller later retrieves the result or the propagated failure.
//! Producers and consumers meet in an unbounded FIFO queue whose head and
//! tail are protected by independent locks, so a push and a pop typically
//! proceed without contending.
//!
//! # Quick Start
//!
//! ```no_run
//! use taskmill::prelude::*;
//!
//! let pool = WorkerPool::new().unwrap();
//!
//! let handle = pool.submit(|| 6 * 7);
//! assert_eq!(handle.wait().unwrap(), 42);
//! ```
//!
//! # Features
//!
//! - **Two-lock queue**: producers serialize only on the tail lock,
//!   consumers only on the head lock
//! - **Type-erased tasks**: heterogeneous callables, one queue item type,
//!   move-only so a task can never run twice
//! - **Panic isolation**: a panicking task surfaces through its handle and
//!   never takes a worker down
//! - **Explicit abandonment**: handles for tasks the pool never ran report
//!   [`Error::Abandoned`] instead of blocking forever

// Lint configuration
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod handle;
pub mod metrics;
pub mod prelude;
pub mod queue;

// Re-export key types at crate root
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::WorkerPool;
pub use handle::JobHandle;
pub use queue::TwoLockQueue;
