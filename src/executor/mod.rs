//! Task execution infrastructure.
//!
//! This module provides the worker pool, its worker threads, and the
//! type-erased task unit they consume.

pub mod pool;
pub mod task;
pub mod worker;

pub use pool::WorkerPool;
