//! Reusable byte buffers for the shift/copy loops.
//!
//! A lent buffer may be longer than requested. Callers slice to the length
//! they need; the buffer goes back to the pool when the guard drops, on every
//! exit path.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

use crate::conf::{N_POOL_BUFFERS_RETAINED_MAX, N_SIZE_POOL_BUFFER_MIN};

/// Shared free-list of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    l_free: Mutex<Vec<Vec<u8>>>,
    n_buffers_retained_max: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(N_POOL_BUFFERS_RETAINED_MAX)
    }
}

impl BufferPool {
    /// Pool that keeps at most `n_buffers_retained_max` idle buffers.
    pub fn new(n_buffers_retained_max: usize) -> Self {
        Self {
            l_free: Mutex::new(Vec::new()),
            n_buffers_retained_max,
        }
    }

    /// Lend a buffer of at least `n_size` bytes.
    pub fn acquire(&self, n_size: usize) -> PooledBuffer<'_> {
        let buffer = {
            let mut l_free = self.lock_free();
            match l_free.iter().position(|b| b.len() >= n_size) {
                Some(idx) => l_free.swap_remove(idx),
                None => vec![0_u8; _derive_alloc_size(n_size)],
            }
        };
        PooledBuffer {
            pool: self,
            buffer: Some(buffer),
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle_count(&self) -> usize {
        self.lock_free().len()
    }

    fn release(&self, buffer: Vec<u8>) {
        let mut l_free = self.lock_free();
        if l_free.len() < self.n_buffers_retained_max {
            l_free.push(buffer);
        }
    }

    fn lock_free(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        // A panic while holding the lock cannot leave the free-list half-updated.
        self.l_free.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn _derive_alloc_size(n_size: usize) -> usize {
    n_size.max(N_SIZE_POOL_BUFFER_MIN).next_power_of_two()
}

/// Buffer on loan from a [`BufferPool`]; returned on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buffer: Option<Vec<u8>>,
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buffer.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buffer.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release(buffer);
        }
    }
}
