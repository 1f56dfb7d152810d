use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// The struct is used for page usage of a page resource.
pub struct PageAccounting {
    /// The reserved pages. This is incremented when pages are handed out, and decremented when
    /// they are given back.
    reserved: AtomicUsize,
    /// The highest number of pages reserved at any time.
    peak: AtomicUsize,
}

impl PageAccounting {
    pub fn new() -> Self {
        Self {
            reserved: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Inform of reserving a certain number of pages.
    pub fn reserve(&self, pages: usize) {
        let now = self.reserved.fetch_add(pages, Ordering::Relaxed) + pages;
        self.peak.fetch_max(now, Ordering::Relaxed);
    }

    /// Inform of releasing a certain number of pages.
    pub fn release(&self, pages: usize) {
        let _prev_reserved = self.reserved.fetch_sub(pages, Ordering::Relaxed);
        debug_assert!(_prev_reserved >= pages);
    }

    /// Set the reserved pages to zero. This is only used when we completely clear a space.
    pub fn reset(&self) {
        self.reserved.store(0, Ordering::Relaxed);
    }

    pub fn get_reserved_pages(&self) -> usize {
        self.reserved.load(Ordering::Relaxed)
    }

    pub fn get_peak_pages(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

impl Default for PageAccounting {
    fn default() -> Self {
        Self::new()
    }
}
