use std::collections::BTreeMap;
use std::ops::Range;

use super::accounting::PageAccounting;
use super::PageResource;
use crate::util::constants::BYTES_IN_PAGE;
use crate::util::conversions;
use crate::util::Address;

struct FreeListSync {
    /// Pages at or above the cursor have never been handed out.
    cursor: Address,
    /// Runs of released pages, by start address.
    free: BTreeMap<Address, usize>,
}

/// A page resource over one contiguous, page-aligned address range given by the host.
///
/// Fresh pages are bumped off a cursor. Released runs go on a free list and are reused first
/// fit, splitting a larger run when needed. Adjacent free runs are coalesced, and a free run
/// that ends at the cursor is given back to it.
pub struct FreeListPageResource {
    range: Range<Address>,
    sync: spin::Mutex<FreeListSync>,
    accounting: PageAccounting,
}

impl FreeListPageResource {
    pub fn new(range: Range<Address>) -> Self {
        debug_assert!(conversions::is_page_aligned(range.start));
        debug_assert!(conversions::is_page_aligned(range.end));
        FreeListPageResource {
            sync: spin::Mutex::new(FreeListSync {
                cursor: range.start,
                free: BTreeMap::new(),
            }),
            range,
            accounting: PageAccounting::new(),
        }
    }

    /// A resource of `pages` pages starting at `start`.
    pub fn with_pages(start: Address, pages: usize) -> Self {
        Self::new(start..start + conversions::pages_to_bytes(pages))
    }

    pub fn peak_pages(&self) -> usize {
        self.accounting.get_peak_pages()
    }
}

impl PageResource for FreeListPageResource {
    fn range(&self) -> Range<Address> {
        self.range.clone()
    }

    fn acquire_pages(&self, pages: usize) -> Option<Address> {
        debug_assert!(pages > 0);
        let bytes = conversions::pages_to_bytes(pages);
        let mut sync = self.sync.lock();
        let reuse = sync
            .free
            .iter()
            .find(|(_, run)| **run >= pages)
            .map(|(start, run)| (*start, *run));
        let start = match reuse {
            Some((start, run)) => {
                sync.free.remove(&start);
                if run > pages {
                    sync.free.insert(start + bytes, run - pages);
                }
                start
            }
            None => {
                if self.range.end - sync.cursor < bytes {
                    return None;
                }
                let start = sync.cursor;
                sync.cursor = start + bytes;
                start
            }
        };
        self.accounting.reserve(pages);
        Some(start)
    }

    fn release_pages(&self, start: Address, pages: usize) {
        debug_assert!(self.range.contains(&start));
        let mut sync = self.sync.lock();
        let mut start = start;
        let mut run = pages;
        // Merge with the run before
        let before = sync
            .free
            .range(..start)
            .next_back()
            .map(|(s, r)| (*s, *r));
        if let Some((prev, prev_run)) = before {
            if prev + prev_run * BYTES_IN_PAGE == start {
                sync.free.remove(&prev);
                start = prev;
                run += prev_run;
            }
        }
        // Merge with the run after
        let end = start + run * BYTES_IN_PAGE;
        if let Some(next_run) = sync.free.remove(&end) {
            run += next_run;
        }
        if start + run * BYTES_IN_PAGE == sync.cursor {
            sync.cursor = start;
        } else {
            sync.free.insert(start, run);
        }
        self.accounting.release(pages);
    }

    fn reserved_pages(&self) -> usize {
        self.accounting.get_reserved_pages()
    }
}
