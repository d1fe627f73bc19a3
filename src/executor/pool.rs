use super::task::Task;
use super::worker::{Worker, WorkerId};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle::JobHandle;
use crate::metrics::{MetricsSnapshot, PoolMetrics};
use crate::queue::TwoLockQueue;
use crossbeam_channel::bounded;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[cfg(target_os = "linux")]
fn pin_thread_to_core(core_id: usize) {
    unsafe {
        let mut cpuset: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(core_id, &mut cpuset);
        let result = libc::sched_setaffinity(
            0, // current thread
            std::mem::size_of::<libc::cpu_set_t>(),
            &cpuset,
        );
        if result != 0 {
            eprintln!(
                "Failed to pin thread {} to core {}",
                std::thread::current().name().unwrap_or("unknown"),
                core_id
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fixed-size worker pool over a shared [`TwoLockQueue`].
///
/// Workers are spawned at construction and live until [`shutdown`]
/// (or drop). Tasks still queued at shutdown are dropped; their handles
/// report [`Error::Abandoned`].
///
/// [`shutdown`]: WorkerPool::shutdown
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    queue: Arc<TwoLockQueue<Task>>,
    shutdown: Arc<AtomicBool>,
    num_threads: usize,
    pending_tasks: Arc<AtomicUsize>,
    metrics: Arc<PoolMetrics>,
    wake_cursor: AtomicUsize,
}

struct WorkerHandle {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
    unparker: thread::Thread,
}

impl WorkerPool {
    /// Create a pool with the default configuration: one worker per
    /// detected hardware execution context.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Create a pool from an explicit configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let num_threads = config.worker_threads();
        let queue = Arc::new(TwoLockQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let pending_tasks = Arc::new(AtomicUsize::new(0));
        let metrics = Arc::new(PoolMetrics::new());

        let mut handles: Vec<WorkerHandle> = Vec::with_capacity(num_threads);

        for id in 0..num_threads {
            let worker = Worker::new(id, metrics.clone());
            let queue_clone = queue.clone();
            let shutdown_clone = shutdown.clone();
            let pending_clone = pending_tasks.clone();
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);

            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let pin_workers = config.pin_workers;
            let spawned = builder.spawn(move || {
                #[cfg(target_os = "linux")]
                if pin_workers {
                    pin_thread_to_core(id);
                }

                worker.run(queue_clone, shutdown_clone, pending_clone);
            });

            let thread = match spawned {
                Ok(thread) => thread,
                Err(e) => {
                    // Stop the workers that did start before reporting the
                    // failure; the half-built pool is never returned.
                    shutdown.store(true, Ordering::Release);
                    for handle in &handles {
                        handle.unparker.unpark();
                    }
                    for handle in &mut handles {
                        if let Some(thread) = handle.thread.take() {
                            let _ = thread.join();
                        }
                    }
                    return Err(Error::executor(format!("spawn failed: {}", e)));
                }
            };

            let unparker = thread.thread().clone();

            handles.push(WorkerHandle {
                id,
                thread: Some(thread),
                unparker,
            });
        }

        Ok(Self {
            workers: handles,
            queue,
            shutdown,
            num_threads,
            pending_tasks,
            metrics,
            wake_cursor: AtomicUsize::new(0),
        })
    }

    /// Queue `job` for execution and return the handle for its outcome.
    ///
    /// Never blocks; the push is O(1). The callable runs on some worker
    /// thread, and its return value or captured panic travels through the
    /// handle, not the queue. Submitting after [`shutdown`](Self::shutdown)
    /// yields a handle that reports [`Error::Abandoned`] immediately.
    pub fn submit<F, R>(&self, job: F) -> JobHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let metrics = self.metrics.clone();

        let task = Task::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(job)).map_err(|payload| {
                metrics.record_panicked();
                Error::TaskPanicked(panic_message(payload.as_ref()))
            });
            let _ = tx.send(outcome);
        });

        self.metrics.record_submitted();

        if self.shutdown.load(Ordering::Acquire) {
            // Dropping the task here drops its sender, which is the
            // abandonment signal the handle understands.
            return JobHandle::new(rx);
        }

        self.pending_tasks.fetch_add(1, Ordering::Relaxed);
        self.queue.push(task);
        self.wake_one();

        JobHandle::new(rx)
    }

    /// Fire-and-forget submission with no result handle. A panic in `f` is
    /// contained by the worker loop and counted.
    pub fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.metrics.record_submitted();

        if self.shutdown.load(Ordering::Acquire) {
            return;
        }

        self.pending_tasks.fetch_add(1, Ordering::Relaxed);
        self.queue.push(Task::new(f));
        self.wake_one();
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.num_threads
    }

    /// Tasks queued or executing right now.
    pub fn pending_tasks(&self) -> usize {
        self.pending_tasks.load(Ordering::Relaxed)
    }

    /// Snapshot of the pool's task counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn wake_one(&self) {
        let idx = self.wake_cursor.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers[idx].unparker.unpark();
    }

    /// Stop the pool: set the flag, wake every worker, join every worker.
    ///
    /// Each worker finishes the task it already holds, then exits; the
    /// remaining backlog is dropped when the pool is. Idempotent.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        // wake everyone up to check the shutdown flag
        for worker in &self.workers {
            worker.unparker.unpark();
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    eprintln!("taskmill: worker {} terminated abnormally", worker.id);
                }
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.num_threads)
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}
