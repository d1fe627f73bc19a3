//! Concurrency tests for the two-lock queue.

use taskmill::TwoLockQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_no_loss_no_duplication_under_contention() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: usize = 10_000;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = Arc::new(TwoLockQueue::new());
    let popped = Arc::new(AtomicUsize::new(0));

    let mut collected: Vec<Vec<usize>> = Vec::new();

    thread::scope(|s| {
        for p in 0..PRODUCERS {
            let queue = queue.clone();
            s.spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push(p * PER_PRODUCER + i);
                }
            });
        }

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let queue = queue.clone();
                let popped = popped.clone();
                s.spawn(move || {
                    let mut seen = Vec::new();
                    loop {
                        if let Some(item) = queue.try_pop() {
                            popped.fetch_add(1, Ordering::SeqCst);
                            seen.push(item);
                        } else if popped.load(Ordering::SeqCst) >= TOTAL {
                            break;
                        } else {
                            thread::yield_now();
                        }
                    }
                    seen
                })
            })
            .collect();

        for consumer in consumers {
            collected.push(consumer.join().unwrap());
        }
    });

    let mut all: Vec<usize> = collected.into_iter().flatten().collect();
    all.sort_unstable();

    // Every pushed item came out exactly once.
    assert_eq!(all.len(), TOTAL);
    for (expected, item) in all.into_iter().enumerate() {
        assert_eq!(item, expected);
    }

    assert!(queue.is_empty());
}

#[test]
fn test_single_producer_order_survives_concurrent_pop() {
    const ITEMS: usize = 50_000;

    let queue = Arc::new(TwoLockQueue::new());

    thread::scope(|s| {
        let producer_queue = queue.clone();
        s.spawn(move || {
            for i in 0..ITEMS {
                producer_queue.push(i);
            }
        });

        let consumer = {
            let queue = queue.clone();
            s.spawn(move || {
                let mut received = Vec::with_capacity(ITEMS);
                for _ in 0..ITEMS {
                    received.push(queue.wait_pop());
                }
                received
            })
        };

        let received = consumer.join().unwrap();
        for (expected, item) in received.into_iter().enumerate() {
            assert_eq!(item, expected);
        }
    });
}

#[test]
fn test_blocked_consumer_wakes_on_push() {
    let queue = Arc::new(TwoLockQueue::new());

    let consumer = {
        let queue = queue.clone();
        thread::spawn(move || {
            let start = Instant::now();
            let item = queue.wait_pop();
            (item, start.elapsed())
        })
    };

    // Let the consumer reach its wait before the push lands.
    thread::sleep(Duration::from_millis(100));
    queue.push(42);

    let (item, waited) = consumer.join().unwrap();
    assert_eq!(item, 42);
    assert!(waited < Duration::from_secs(5));
}

#[test]
fn test_try_pop_never_blocks_on_empty() {
    let queue: TwoLockQueue<u64> = TwoLockQueue::new();

    let start = Instant::now();
    for _ in 0..1_000 {
        assert_eq!(queue.try_pop(), None);
    }
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_push_pop_churn() {
    let queue = Arc::new(TwoLockQueue::new());
    let popped = Arc::new(AtomicUsize::new(0));

    const TOTAL: usize = 1_000_000;

    thread::scope(|s| {
        for _ in 0..2 {
            let queue = queue.clone();
            s.spawn(move || {
                for i in 0..TOTAL / 2 {
                    queue.push(i);
                }
            });
        }

        for _ in 0..2 {
            let queue = queue.clone();
            let popped = popped.clone();
            s.spawn(move || loop {
                if queue.try_pop().is_some() {
                    popped.fetch_add(1, Ordering::SeqCst);
                } else if popped.load(Ordering::SeqCst) >= TOTAL {
                    break;
                } else {
                    thread::yield_now();
                }
            });
        }
    });

    assert_eq!(popped.load(Ordering::SeqCst), TOTAL);
}
