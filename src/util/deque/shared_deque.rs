use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicUsize, Ordering};

type Block<T> = Vec<T>;

/// A global pool of blocks shared by all the local deques attached to it.
pub struct SharedDeque<T> {
    name: &'static str,
    blocks: SegQueue<Block<T>>,
    /// Number of collector threads that drain this pool during a phase.
    consumers: AtomicUsize,
    /// Consumers that found the pool empty and are waiting for more work or for termination.
    waiting: AtomicUsize,
}

impl<T> SharedDeque<T> {
    pub fn new(name: &'static str) -> Self {
        SharedDeque {
            name,
            blocks: SegQueue::new(),
            consumers: AtomicUsize::new(1),
            waiting: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Add a block to the pool. Empty blocks are dropped.
    pub fn push(&self, block: Block<T>) {
        if !block.is_empty() {
            self.blocks.push(block);
        }
    }

    /// Take a block without taking part in termination detection.
    pub fn pop(&self) -> Option<Block<T>> {
        self.blocks.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of entries in the pool. Only meaningful when no thread is pushing or popping.
    pub fn len(&self) -> usize {
        let mut blocks = vec![];
        let mut len = 0;
        while let Some(b) = self.blocks.pop() {
            len += b.len();
            blocks.push(b);
        }
        for b in blocks {
            self.blocks.push(b);
        }
        len
    }

    /// Discard every entry in the pool.
    pub fn clear(&self) {
        while self.blocks.pop().is_some() {}
    }

    /// Reset termination detection for a phase drained by `consumers` threads. This must happen
    /// before any of them calls [`SharedDeque::spin`].
    pub fn prepare_consumers(&self, consumers: usize) {
        debug_assert!(consumers > 0);
        self.consumers.store(consumers, Ordering::SeqCst);
        self.waiting.store(0, Ordering::SeqCst);
    }

    /// Take a block, waiting while other consumers may still produce work. Returns `None` once
    /// the pool is empty and every consumer is waiting, at which point nobody can push again.
    pub fn spin(&self) -> Option<Block<T>> {
        if let Some(block) = self.blocks.pop() {
            return Some(block);
        }
        // We are locally done
        self.waiting.fetch_add(1, Ordering::SeqCst);
        loop {
            if !self.blocks.is_empty() {
                self.waiting.fetch_sub(1, Ordering::SeqCst);
                if let Some(block) = self.blocks.pop() {
                    return Some(block);
                }
                // Someone else took it
                self.waiting.fetch_add(1, Ordering::SeqCst);
                continue;
            }
            if self.waiting.load(Ordering::SeqCst) == self.consumers.load(Ordering::SeqCst) {
                // Everyone is quiet
                return None;
            }
            std::hint::spin_loop();
        }
    }
}
