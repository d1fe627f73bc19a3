// worker thread stuff
use super::task::Task;
use crate::metrics::PoolMetrics;
use crate::queue::TwoLockQueue;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub type WorkerId = usize;

pub(crate) struct Worker {
    pub id: WorkerId,
    pub metrics: Arc<PoolMetrics>,
}

impl Worker {
    pub fn new(id: WorkerId, metrics: Arc<PoolMetrics>) -> Self {
        Self { id, metrics }
    }

    // main loop: the shutdown flag is checked once per iteration, before the
    // pop attempt, so a task already picked up always runs to completion
    pub fn run(
        &self,
        queue: Arc<TwoLockQueue<Task>>,
        shutdown: Arc<AtomicBool>,
        pending_tasks: Arc<AtomicUsize>,
    ) {
        let mut backoff_cnt = 0u32;

        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            if let Some(task) = queue.try_pop() {
                backoff_cnt = 0;
                self.run_task(task);
                pending_tasks.fetch_sub(1, Ordering::Relaxed);
            } else {
                // nothing to do, back off; an unpark from submit or
                // shutdown cuts the park short
                Self::backoff(&mut backoff_cnt);
            }
        }
    }

    fn run_task(&self, task: Task) {
        let tid = task.id;

        let result = catch_unwind(AssertUnwindSafe(|| {
            task.run();
        }));

        if result.is_err() {
            eprintln!("taskmill: worker {} caught panicking task {:?}", self.id, tid);
            self.metrics.record_panicked();
        }

        self.metrics.record_executed();
    }

    fn backoff(count: &mut u32) {
        const MAX_SPINS: u32 = 10;
        const MAX_YIELDS: u32 = 20;

        *count += 1;

        if *count <= MAX_SPINS {
            let spins = (*count).min(6);
            for _ in 0..(1 << spins) {
                std::hint::spin_loop();
            }
        } else if *count <= MAX_YIELDS {
            thread::yield_now();
        } else {
            thread::park_timeout(Duration::from_micros(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panicking_task_is_contained() {
        let metrics = Arc::new(PoolMetrics::new());
        let worker = Worker::new(0, metrics.clone());

        worker.run_task(Task::new(|| panic!("boom")));
        worker.run_task(Task::new(|| {}));

        let snap = metrics.snapshot();
        assert_eq!(snap.tasks_executed, 2);
        assert_eq!(snap.tasks_panicked, 1);
    }

    #[test]
    fn test_worker_drains_queue_until_shutdown() {
        let queue = Arc::new(TwoLockQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let pending = Arc::new(AtomicUsize::new(0));
        let metrics = Arc::new(PoolMetrics::new());

        for _ in 0..10 {
            queue.push(Task::new(|| {}));
            pending.fetch_add(1, Ordering::Relaxed);
        }

        let worker = Worker::new(0, metrics.clone());
        let handle = {
            let queue = queue.clone();
            let shutdown = shutdown.clone();
            let pending = pending.clone();
            thread::spawn(move || worker.run(queue, shutdown, pending))
        };

        while pending.load(Ordering::Relaxed) > 0 {
            thread::yield_now();
        }

        shutdown.store(true, Ordering::Release);
        handle.thread().unpark();
        handle.join().unwrap();

        assert_eq!(metrics.snapshot().tasks_executed, 10);
    }
}
