//! Queues for tracing, i.e. visiting the reachable objects by traversing the object graph.

/// A LIFO work queue backed by a `Vec`. The backup trace uses it as its mark stack.
pub struct VectorQueue<T> {
    /// Enqueued nodes.
    buffer: Vec<T>,
}

impl<T> VectorQueue<T> {
    /// Reserve a capacity of this on first enqueue to avoid frequent resizing.
    const CAPACITY: usize = 4096;

    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn push(&mut self, v: T) {
        if self.buffer.is_empty() {
            self.buffer.reserve(Self::CAPACITY);
        }
        self.buffer.push(v);
    }

    /// Pop the most recently pushed entry.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        self.buffer.pop()
    }
}

impl<T> Default for VectorQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
