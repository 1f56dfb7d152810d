use std::sync::Arc;

use crate::policy::rcspace::{size_class, RcSpace, NUM_SIZE_CLASSES};
use crate::util::alloc::allocator::{align_allocation, get_maximum_aligned_size};
use crate::util::alloc::Allocator;
use crate::util::Address;
use crate::vm::VMBinding;

/// Cells taken from the space per refill.
const CELLS_PER_REFILL: usize = 32;

/// A segregated free list allocator over the RC space. Each size class has a thread-local
/// cache of free cells, refilled in batches from the space's global class lists.
pub struct FreeListAllocator<VM: VMBinding> {
    space: Arc<RcSpace<VM>>,
    caches: [Vec<Address>; NUM_SIZE_CLASSES],
}

impl<VM: VMBinding> FreeListAllocator<VM> {
    pub fn new(space: Arc<RcSpace<VM>>) -> Self {
        FreeListAllocator {
            space,
            caches: std::array::from_fn(|_| vec![]),
        }
    }

    #[cold]
    fn refill(&mut self, class: usize) -> bool {
        let cells = self.space.acquire_cells(class, CELLS_PER_REFILL);
        if cells.is_empty() {
            return false;
        }
        self.caches[class] = cells;
        true
    }
}

impl<VM: VMBinding> Allocator<VM> for FreeListAllocator<VM> {
    fn alloc(&mut self, size: usize, align: usize, offset: usize) -> Address {
        let bytes = get_maximum_aligned_size::<VM>(size, align);
        let Some(class) = size_class(bytes) else {
            panic!("{} bytes is too large for the free list allocator", size);
        };
        let cell = match self.caches[class].pop() {
            Some(cell) => cell,
            None => {
                if !self.refill(class) {
                    return Address::ZERO;
                }
                match self.caches[class].pop() {
                    Some(cell) => cell,
                    None => return Address::ZERO,
                }
            }
        };
        align_allocation::<VM>(cell, align, offset)
    }

    /// Return the cached cells, so that cells freed in this increment are not stranded in a
    /// thread that stops allocating.
    fn release(&mut self) {
        for (class, cache) in self.caches.iter_mut().enumerate() {
            self.space.return_cells(class, std::mem::take(cache));
        }
    }
}
