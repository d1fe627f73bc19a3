//! Convenience re-exports.

pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::WorkerPool;
pub use crate::handle::JobHandle;
pub use crate::metrics::MetricsSnapshot;
pub use crate::queue::TwoLockQueue;
