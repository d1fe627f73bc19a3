//! Two-lock concurrent FIFO queue.
//!
//! The queue is a singly linked chain of nodes ending in a sentinel node
//! that carries no item. `head` owns the chain and is protected by its own
//! mutex; `tail` is a non-owning pointer to the sentinel, protected by a
//! second mutex. A push touches only the tail lock and a pop only the head
//! lock (plus a brief tail-lock read), so one producer and one consumer
//! typically run without contending on the same lock.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::ptr;
use std::time::Duration;

/// Re-check interval for blocked consumers. A push never takes the head
/// lock, so its notify can land in the gap between a waiter's emptiness
/// check and its sleep; the timed wait bounds that window.
const EMPTY_RECHECK: Duration = Duration::from_millis(10);

struct Node<T> {
    item: Option<T>,
    next: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn sentinel() -> Box<Self> {
        Box::new(Node {
            item: None,
            next: None,
        })
    }
}

/// Unbounded MPMC FIFO queue with separate head and tail locks.
///
/// `head == tail` (pointer identity) exactly when the queue is logically
/// empty. Every node ahead of the sentinel carries an item, and exactly one
/// popper ever takes ownership of a given node.
pub struct TwoLockQueue<T> {
    head: Mutex<Box<Node<T>>>,
    tail: Mutex<*mut Node<T>>,
    ready: Condvar,
}

// The tail pointer always aims into the chain owned by `head`, and both
// sides are lock-protected; the queue carries its items' `Send`.
unsafe impl<T: Send> Send for TwoLockQueue<T> {}
unsafe impl<T: Send> Sync for TwoLockQueue<T> {}

impl<T> TwoLockQueue<T> {
    /// Create an empty queue holding a single sentinel node.
    pub fn new() -> Self {
        let mut sentinel = Node::sentinel();
        let tail = &mut *sentinel as *mut Node<T>;

        Self {
            head: Mutex::new(sentinel),
            tail: Mutex::new(tail),
            ready: Condvar::new(),
        }
    }

    /// Append `item` and wake one blocked consumer. O(1); only the tail
    /// lock is taken.
    pub fn push(&self, item: T) {
        let mut new_sentinel = Node::sentinel();
        let new_tail = &mut *new_sentinel as *mut Node<T>;

        {
            let mut tail = self.tail.lock();
            let sentinel = *tail;

            // The item and link are in place before `tail` advances, so a
            // popper that sees `head != tail` always finds a complete node.
            unsafe {
                (*sentinel).item = Some(item);
                (*sentinel).next = Some(new_sentinel);
            }

            *tail = new_tail;
        }

        self.ready.notify_one();
    }

    /// Pop the oldest item, or return `None` immediately if the queue is
    /// empty. Never blocks beyond the two brief lock acquisitions.
    pub fn try_pop(&self) -> Option<T> {
        let mut head = self.head.lock();

        if self.reached_tail(&head) {
            return None;
        }

        let mut node = Self::unlink_head(&mut head);
        drop(head);

        node.item.take()
    }

    /// Pop the oldest item, blocking until one is available.
    pub fn wait_pop(&self) -> T {
        let mut head = self.head.lock();

        while self.reached_tail(&head) {
            let _ = self.ready.wait_for(&mut head, EMPTY_RECHECK);
        }

        let mut node = Self::unlink_head(&mut head);
        drop(head);

        node.item
            .take()
            .expect("queue invariant: non-sentinel node carries an item")
    }

    /// Point-in-time emptiness snapshot. Stale as soon as it returns under
    /// concurrency; not a synchronization primitive.
    pub fn is_empty(&self) -> bool {
        let head = self.head.lock();
        self.reached_tail(&head)
    }

    /// Current tail pointer, read under the tail lock. Callers hold the
    /// head lock, never the reverse, so the lock order is fixed.
    fn reached_tail(&self, head: &MutexGuard<'_, Box<Node<T>>>) -> bool {
        let tail = *self.tail.lock() as *const Node<T>;
        ptr::eq(&***head, tail)
    }

    /// Take ownership of the head node and advance `head` to its successor.
    /// Caller has verified `head != tail` under the head lock.
    fn unlink_head(head: &mut MutexGuard<'_, Box<Node<T>>>) -> Box<Node<T>> {
        let next = head
            .next
            .take()
            .expect("queue invariant: non-tail head has a successor");
        std::mem::replace(&mut **head, next)
    }
}

impl<T> Default for TwoLockQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TwoLockQueue<T> {
    fn drop(&mut self) {
        // Unlink iteratively; the default recursive Box drop would overflow
        // the stack on a deep backlog.
        let mut node = std::mem::replace(self.head.get_mut(), Node::sentinel());
        while let Some(next) = node.next.take() {
            node = next;
        }
    }
}

impl<T> std::fmt::Debug for TwoLockQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoLockQueue")
            .field("empty", &self.is_empty())
            .finish()
    }
}
