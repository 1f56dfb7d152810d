use std::ops::Range;

use crate::util::Address;

/// Source of pages for a space. The host owns virtual memory management; each space is given
/// one page resource that hands out pages from a fixed, contiguous address range.
pub trait PageResource: Send + Sync {
    /// The address range all pages of this resource come from. Space membership of an object
    /// is decided by this range.
    fn range(&self) -> Range<Address>;

    /// Acquire `pages` contiguous, page-aligned pages. `None` if the resource is exhausted.
    fn acquire_pages(&self, pages: usize) -> Option<Address>;

    /// Give back pages previously returned by [`PageResource::acquire_pages`].
    fn release_pages(&self, start: Address, pages: usize);

    /// Pages currently handed out.
    fn reserved_pages(&self) -> usize;

    fn contains(&self, addr: Address) -> bool {
        self.range().contains(&addr)
    }
}
