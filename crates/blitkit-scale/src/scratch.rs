//! Scratch buffer pool
//!
//! Multi-round jobs need working buffers for the source region and the
//! intermediate rounds. Buffers are borrowed from the pool for the length
//! of one job and given back when it ends, so concurrent jobs never share
//! one.

use std::sync::{Mutex, PoisonError};

/// Pool of reusable `u32` buffers
#[derive(Debug)]
pub struct ScratchPool {
    free: Mutex<Vec<Vec<u32>>>,
    retain: usize,
}

impl ScratchPool {
    /// Pool keeping at most `retain` idle buffers.
    pub fn new(retain: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            retain,
        }
    }

    /// Borrow a zeroed buffer of exactly `len` elements.
    pub fn take(&self, len: usize) -> Vec<u32> {
        let reused = {
            let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
            // prefer the smallest buffer that already fits
            let best = free
                .iter()
                .enumerate()
                .filter(|(_, b)| b.capacity() >= len)
                .min_by_key(|(_, b)| b.capacity())
                .map(|(i, _)| i);
            best.or_else(|| free.len().checked_sub(1))
                .map(|i| free.swap_remove(i))
        };
        let mut buf = reused.unwrap_or_default();
        buf.clear();
        buf.resize(len, 0);
        buf
    }

    /// Return a buffer to the pool.
    pub fn give(&self, buf: Vec<u32>) {
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.retain {
            free.push(buf);
        }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SCRATCH_RETAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuse_and_retain() {
        let pool = ScratchPool::new(1);
        let mut a = pool.take(16);
        a[3] = 9;
        let b = pool.take(8);
        pool.give(a);
        pool.give(b);
        assert_eq!(pool.idle(), 1);

        let c = pool.take(12);
        assert_eq!(c.len(), 12);
        assert!(c.iter().all(|&v| v == 0));
        assert_eq!(pool.idle(), 0);
    }
}
