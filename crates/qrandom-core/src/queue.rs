//! Internally synchronized FIFO of raw bytes.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Unbounded, thread-safe byte FIFO.
///
/// Appended by the refill thread, drained by any number of consumers.
/// Every operation holds the lock for its whole duration, so a single
/// [`take_up_to`](Self::take_up_to) always returns a contiguous run of the
/// queue and no byte is ever handed out twice.
#[derive(Debug, Default)]
pub struct ByteQueue {
    inner: Mutex<VecDeque<u8>>,
}

impl ByteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Each mutation completes before the guard is released, so the data
    // behind a poisoned lock is still a valid queue.
    fn lock(&self) -> MutexGuard<'_, VecDeque<u8>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append bytes to the back, preserving their order.
    pub fn push_all(&self, bytes: &[u8]) {
        self.lock().extend(bytes.iter().copied());
    }

    /// Remove and return up to `n` bytes from the front.
    ///
    /// Returns fewer than `n` bytes (possibly none) when the queue is short.
    pub fn take_up_to(&self, n: usize) -> Vec<u8> {
        if n == 0 {
            return Vec::new();
        }
        let mut q = self.lock();
        let take = q.len().min(n);
        q.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_queue_is_empty() {
        let q = ByteQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert!(q.take_up_to(8).is_empty());
    }

    #[test]
    fn test_short_read_drains_queue() {
        let q = ByteQueue::new();
        q.push_all(&[0x01, 0x02, 0x03]);
        assert_eq!(q.take_up_to(5), vec![0x01, 0x02, 0x03]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_take_zero_leaves_queue_untouched() {
        let q = ByteQueue::new();
        q.push_all(&[9, 8, 7]);
        assert!(q.take_up_to(0).is_empty());
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_fifo_across_pushes() {
        let q = ByteQueue::new();
        q.push_all(&[1, 2]);
        q.push_all(&[3, 4, 5]);
        assert_eq!(q.take_up_to(3), vec![1, 2, 3]);
        q.push_all(&[6]);
        assert_eq!(q.take_up_to(10), vec![4, 5, 6]);
    }

    #[test]
    fn test_concurrent_consumers_see_each_byte_once() {
        let q = Arc::new(ByteQueue::new());
        let total: usize = 40_000;
        let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();

        let writer = {
            let q = Arc::clone(&q);
            let data = data.clone();
            std::thread::spawn(move || {
                for chunk in data.chunks(1000) {
                    q.push_all(chunk);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&q);
                std::thread::spawn(move || {
                    let mut got = Vec::new();
                    for _ in 0..20_000 {
                        got.push(q.take_up_to(7));
                    }
                    got
                })
            })
            .collect();

        writer.join().unwrap();
        let mut taken: usize = 0;
        for r in readers {
            for piece in r.join().unwrap() {
                taken += piece.len();
            }
        }
        taken += q.take_up_to(total).len();
        assert_eq!(taken, total, "bytes lost or duplicated");
    }

    #[test]
    fn test_single_consumer_order_under_concurrent_writes() {
        let q = Arc::new(ByteQueue::new());
        let total: usize = 10_000;

        let writer = {
            let q = Arc::clone(&q);
            std::thread::spawn(move || {
                for i in 0..total {
                    q.push_all(&[(i % 256) as u8]);
                }
            })
        };

        let mut seen = Vec::with_capacity(total);
        while seen.len() < total {
            seen.extend(q.take_up_to(64));
        }
        writer.join().unwrap();

        for (i, b) in seen.iter().enumerate() {
            assert_eq!(*b, (i % 256) as u8, "out of order at {i}");
        }
    }
}
