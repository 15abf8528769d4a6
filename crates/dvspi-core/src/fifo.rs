//! Receive FIFO
//!
//! Bounded byte queue holding words captured by the write path for later
//! delivery through `read` in [`ReadMode::Buffered`](crate::ReadMode).
//! Producer and consumer may run in different contexts, so every access
//! goes through a spin lock and all methods take `&self`.
//!
//! Overflow does not evict old bytes: once the queue has reached capacity the
//! next insert empties it and the incoming bytes are discarded.

use heapless::Deque;
use spin::Mutex;

use crate::MAX_BUF_SIZE;

/// Outcome of [`RxFifo::put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// This many bytes were queued (may be fewer than offered near capacity)
    Stored(usize),
    /// The queue was full and has been emptied; nothing was stored
    Reset,
}

/// Bounded receive queue of [`MAX_BUF_SIZE`] bytes
pub struct RxFifo {
    inner: Mutex<Deque<u8, MAX_BUF_SIZE>>,
}

impl RxFifo {
    /// Create an empty FIFO
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Deque::new()),
        }
    }

    /// Queue `data`, or empty the queue if it is already full
    pub fn put(&self, data: &[u8]) -> PutOutcome {
        let mut queue = self.inner.lock();
        if queue.is_full() {
            queue.clear();
            log::debug!("rx fifo overflow, dropped {} buffered bytes", MAX_BUF_SIZE);
            return PutOutcome::Reset;
        }

        let mut stored = 0;
        for &byte in data {
            if queue.push_back(byte).is_err() {
                break;
            }
            stored += 1;
        }
        PutOutcome::Stored(stored)
    }

    /// Move up to `out.len()` bytes into `out`, returning how many were moved
    pub fn get(&self, out: &mut [u8]) -> usize {
        let mut queue = self.inner.lock();
        let mut count = 0;
        for slot in out.iter_mut() {
            match queue.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no bytes are buffered
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Discard all buffered bytes
    pub fn reset(&self) {
        self.inner.lock().clear();
    }
}

impl Default for RxFifo {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for RxFifo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RxFifo").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_in_order() {
        let fifo = RxFifo::new();
        assert_eq!(fifo.put(&[1, 2, 3]), PutOutcome::Stored(3));

        let mut out = [0u8; 2];
        assert_eq!(fifo.get(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(fifo.len(), 1);

        let mut out = [0u8; 4];
        assert_eq!(fifo.get(&mut out), 1);
        assert_eq!(out[0], 3);
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_partial_store_near_capacity() {
        let fifo = RxFifo::new();
        let chunk = [0xAAu8; MAX_BUF_SIZE - 1];
        assert_eq!(fifo.put(&chunk), PutOutcome::Stored(MAX_BUF_SIZE - 1));
        assert_eq!(fifo.put(&[1, 2]), PutOutcome::Stored(1));
        assert_eq!(fifo.len(), MAX_BUF_SIZE);
    }

    #[test]
    fn test_overflow_resets_instead_of_evicting() {
        let fifo = RxFifo::new();
        let chunk = [0x55u8; MAX_BUF_SIZE];
        assert_eq!(fifo.put(&chunk), PutOutcome::Stored(MAX_BUF_SIZE));

        assert_eq!(fifo.put(&[9, 9]), PutOutcome::Reset);
        assert!(fifo.is_empty());

        assert_eq!(fifo.put(&[7]), PutOutcome::Stored(1));
        let mut out = [0u8; 1];
        fifo.get(&mut out);
        assert_eq!(out, [7]);
    }

    #[test]
    fn test_reset_clears() {
        let fifo = RxFifo::new();
        fifo.put(&[1, 2, 3]);
        fifo.reset();
        assert!(fifo.is_empty());
    }
}
