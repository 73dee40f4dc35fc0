//! Bounded pool of recyclable pixel buffers.
//!
//! Decoding churns through large `Vec<u8>` pixel buffers as the user browses
//! images. The pool keeps a bounded free-list of released buffers so the
//! allocator is not hit on every decode; releases beyond the cap are dropped
//! rather than growing the list.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Thread-safe free-list of reusable byte buffers.
///
/// # Example
///
/// ```
/// use annotator_memory::BufferPool;
///
/// let pool = BufferPool::new(4);
/// let buf = pool.acquire(1024);
/// pool.release(buf);
/// assert_eq!(pool.pooled(), 1);
/// ```
pub struct BufferPool {
    state: Mutex<PoolState>,
}

struct PoolState {
    buffers: VecDeque<Vec<u8>>,
    max_pooled: usize,
}

impl BufferPool {
    /// Create a pool that retains at most `max_pooled` released buffers.
    pub fn new(max_pooled: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                buffers: VecDeque::new(),
                max_pooled,
            }),
        }
    }

    /// Get an empty buffer with at least `capacity` bytes reserved.
    ///
    /// Reuses a pooled buffer when one is available, otherwise allocates.
    pub fn acquire(&self, capacity: usize) -> Vec<u8> {
        let recycled = {
            let mut state = self.state.lock().unwrap();
            state.buffers.pop_front()
        };

        match recycled {
            Some(mut buf) => {
                buf.clear();
                if buf.capacity() < capacity {
                    buf.reserve(capacity - buf.capacity());
                }
                buf
            }
            None => Vec::with_capacity(capacity),
        }
    }

    /// Return a buffer to the pool.
    ///
    /// If the pool is already at its cap the buffer is dropped instead.
    pub fn release(&self, mut buf: Vec<u8>) {
        buf.clear();
        let mut state = self.state.lock().unwrap();
        if state.buffers.len() < state.max_pooled {
            state.buffers.push_back(buf);
        }
    }

    /// Number of buffers currently held in the free-list.
    pub fn pooled(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.buffers.len()
    }

    /// Total bytes of capacity currently held in the free-list.
    pub fn pooled_bytes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.buffers.iter().map(|b| b.capacity()).sum()
    }

    /// Drop every pooled buffer, returning the number of bytes released
    /// back to the allocator.
    pub fn drain(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let freed: usize = state.buffers.iter().map(|b| b.capacity()).sum();
        state.buffers.clear();
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_allocates_when_empty() {
        let pool = BufferPool::new(4);
        let buf = pool.acquire(128);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 128);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn test_release_then_acquire_reuses_buffer() {
        let pool = BufferPool::new(4);
        let mut buf = pool.acquire(128);
        buf.extend_from_slice(&[1, 2, 3]);
        pool.release(buf);
        assert_eq!(pool.pooled(), 1);

        // The recycled buffer comes back empty.
        let reused = pool.acquire(64);
        assert!(reused.is_empty());
        assert!(reused.capacity() >= 128);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn test_acquire_grows_small_recycled_buffer() {
        let pool = BufferPool::new(4);
        pool.release(Vec::with_capacity(16));

        let buf = pool.acquire(1024);
        assert!(buf.capacity() >= 1024);
    }

    #[test]
    fn test_releases_beyond_cap_are_dropped() {
        let pool = BufferPool::new(2);
        pool.release(vec![0u8; 10]);
        pool.release(vec![0u8; 10]);
        pool.release(vec![0u8; 10]);

        assert_eq!(pool.pooled(), 2);
    }

    #[test]
    fn test_drain_reports_freed_bytes() {
        let pool = BufferPool::new(4);
        pool.release(Vec::with_capacity(100));
        pool.release(Vec::with_capacity(200));

        let freed = pool.drain();
        assert!(freed >= 300);
        assert_eq!(pool.pooled(), 0);
        assert_eq!(pool.drain(), 0);
    }

    #[test]
    fn test_pooled_bytes_tracks_capacity() {
        let pool = BufferPool::new(4);
        assert_eq!(pool.pooled_bytes(), 0);
        pool.release(Vec::with_capacity(256));
        assert!(pool.pooled_bytes() >= 256);
    }
}
