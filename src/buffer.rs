//! Pool of reusable line buffers.
//!
//! Every rendered line is assembled in a `Vec<u8>` taken from a
//! [`BufferPool`] and handed back once it has been written. Buffers that
//! grew past [`MAX_POOLED_CAPACITY`] are dropped instead of pooled so a
//! single huge record cannot pin memory for the life of the process.

use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Capacity of freshly allocated buffers, enough for a typical line.
pub const INITIAL_CAPACITY: usize = 1024;

/// Buffers with a larger capacity are not returned to the pool.
pub const MAX_POOLED_CAPACITY: usize = 16 * 1024;

/// Number of idle buffers kept by [`BufferPool::default`].
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Lock-free bounded pool of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    idle: ArrayQueue<Vec<u8>>,
    allocations: AtomicUsize,
}

impl BufferPool {
    /// Create a pool retaining at most `max_idle` buffers.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: ArrayQueue::new(max_idle.max(1)),
            allocations: AtomicUsize::new(0),
        }
    }

    /// Take an idle buffer, or allocate a new one if none is available.
    pub fn alloc(&self) -> Vec<u8> {
        self.idle.pop().unwrap_or_else(|| {
            self.allocations.fetch_add(1, Ordering::Relaxed);
            Vec::with_capacity(INITIAL_CAPACITY)
        })
    }

    /// Return `buf` to the pool. Oversized buffers, and buffers that do not
    /// fit because the pool is full, are dropped.
    pub fn free(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        buf.clear();
        let _ = self.idle.push(buf);
    }

    /// Number of buffers this pool has allocated so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Number of buffers currently waiting to be reused.
    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}
