use super::SharedDeque;
use std::mem;
use std::sync::Arc;

/// A thread-local deque attached to a [`SharedDeque`].
pub struct LocalDeque<T> {
    pool: Arc<SharedDeque<T>>,
    buffer: Vec<T>,
    capacity: usize,
}

impl<T> LocalDeque<T> {
    pub fn new(pool: Arc<SharedDeque<T>>, capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        LocalDeque {
            pool,
            buffer: vec![],
            capacity,
        }
    }

    /// Push an entry. When the local buffer is full it is handed to the pool first.
    #[inline(always)]
    pub fn push(&mut self, v: T) {
        if self.buffer.len() >= self.capacity {
            self.spill();
        }
        if self.buffer.is_empty() {
            self.buffer.reserve(self.capacity);
        }
        self.buffer.push(v);
    }

    #[cold]
    fn spill(&mut self) {
        let block = mem::take(&mut self.buffer);
        self.pool.push(block);
    }

    /// Move every local entry to the pool. The local buffer is empty afterwards.
    pub fn flush_local(&mut self) {
        if !self.buffer.is_empty() {
            self.spill();
        }
        debug_assert!(self.is_flushed());
    }

    /// Pop an entry for processing, taking blocks from the pool once the local buffer is empty.
    /// Returns `None` when this thread and every other consumer of the pool are out of work.
    pub fn dequeue(&mut self) -> Option<T> {
        loop {
            if let Some(v) = self.buffer.pop() {
                return Some(v);
            }
            self.buffer = self.pool.spin()?;
        }
    }

    /// Pop a local entry, never touching the pool.
    pub fn pop_local(&mut self) -> Option<T> {
        self.buffer.pop()
    }

    /// Is the local buffer empty?
    pub fn is_flushed(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Are both the local buffer and the pool empty?
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.pool.is_empty()
    }

    pub fn local_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn pool(&self) -> &Arc<SharedDeque<T>> {
        &self.pool
    }

    /// Drop all local entries.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
