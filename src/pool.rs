//! BufferPool: shared free lists of byte and char buffers.
//!
//! Checkout is first-fit by minimum capacity; a returned buffer is cleared
//! and kept unless the free list is full or the buffer is oversized. The
//! pool is the only shared state in the crate and is `Send + Sync`; writers
//! hold it through an `Arc`.

use core::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::config::{ConfigError, PoolConfig};

struct FreeList<T> {
    slots: Mutex<Vec<Vec<T>>>,
}

impl<T> FreeList<T> {
    fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    fn take(&self, min_capacity: usize) -> Option<Vec<T>> {
        let mut list = self.slots.lock();
        let index = list.iter().position(|b| b.capacity() >= min_capacity)?;
        Some(list.swap_remove(index))
    }

    fn offer(&self, buf: Vec<T>, max_retained: usize) -> bool {
        let mut list = self.slots.lock();
        if list.len() >= max_retained {
            return false;
        }
        list.push(buf);
        true
    }

    fn len(&self) -> usize {
        self.slots.lock().len()
    }

    fn clear(&self) -> usize {
        let mut list = self.slots.lock();
        let n = list.len();
        list.clear();
        n
    }
}

#[derive(Default)]
struct PoolMetrics {
    allocations: AtomicU64,
    reused: AtomicU64,
    returned: AtomicU64,
    discarded: AtomicU64,
}

/// Point-in-time counters of a `BufferPool`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Checkouts served by a fresh allocation.
    pub allocations: u64,
    /// Checkouts served from a free list.
    pub reused: u64,
    /// Buffers accepted back into a free list.
    pub returned: u64,
    /// Buffers handed back but dropped (full list or oversized).
    pub discarded: u64,
    pub free_byte_buffers: usize,
    pub free_char_buffers: usize,
}

pub struct BufferPool {
    config: PoolConfig,
    bytes: FreeList<u8>,
    chars: FreeList<char>,
    metrics: PoolMetrics,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::with_valid_config(PoolConfig::default())
    }
}

impl BufferPool {
    pub fn new(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: PoolConfig) -> Self {
        Self {
            config,
            bytes: FreeList::new(),
            chars: FreeList::new(),
            metrics: PoolMetrics::default(),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// An empty byte buffer with at least `min_capacity` capacity.
    pub fn checkout_bytes(&self, min_capacity: usize) -> Vec<u8> {
        self.checkout(&self.bytes, min_capacity, "bytes")
    }

    pub fn return_bytes(&self, buf: Vec<u8>) {
        self.give_back(&self.bytes, buf, "bytes");
    }

    /// An empty char buffer with at least `min_capacity` capacity.
    pub fn checkout_chars(&self, min_capacity: usize) -> Vec<char> {
        self.checkout(&self.chars, min_capacity, "chars")
    }

    pub fn return_chars(&self, buf: Vec<char>) {
        self.give_back(&self.chars, buf, "chars");
    }

    fn checkout<T>(&self, list: &FreeList<T>, min_capacity: usize, kind: &'static str) -> Vec<T> {
        match list.take(min_capacity) {
            Some(buf) => {
                self.metrics.reused.fetch_add(1, Ordering::Relaxed);
                trace!(kind, min_capacity, capacity = buf.capacity(), "reused pooled buffer");
                buf
            }
            None => {
                self.metrics.allocations.fetch_add(1, Ordering::Relaxed);
                trace!(kind, min_capacity, "allocated pooled buffer");
                Vec::with_capacity(min_capacity)
            }
        }
    }

    fn give_back<T>(&self, list: &FreeList<T>, mut buf: Vec<T>, kind: &'static str) {
        let capacity = buf.capacity();
        if capacity == 0 {
            return;
        }
        buf.clear();
        let kept = capacity <= self.config.max_buffer_capacity
            && list.offer(buf, self.config.max_retained);
        if kept {
            self.metrics.returned.fetch_add(1, Ordering::Relaxed);
        } else {
            self.metrics.discarded.fetch_add(1, Ordering::Relaxed);
        }
        trace!(kind, capacity, kept, "buffer handed back");
    }

    /// Drop every free buffer; returns how many were released.
    pub fn shrink_to_fit(&self) -> usize {
        self.bytes.clear() + self.chars.clear()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocations: self.metrics.allocations.load(Ordering::Relaxed),
            reused: self.metrics.reused.load(Ordering::Relaxed),
            returned: self.metrics.returned.load(Ordering::Relaxed),
            discarded: self.metrics.discarded.load(Ordering::Relaxed),
            free_byte_buffers: self.bytes.len(),
            free_char_buffers: self.chars.len(),
        }
    }
}
