use std::sync::Arc;

use crate::policy::immortalspace::ImmortalSpace;
use crate::policy::space::Space;
use crate::util::alloc::allocator::align_allocation;
use crate::util::alloc::Allocator;
use crate::util::constants::BYTES_IN_PAGE;
use crate::util::conversions::bytes_to_pages_up;
use crate::util::Address;
use crate::vm::VMBinding;

const BLOCK_SIZE: usize = 8 * BYTES_IN_PAGE;
const BLOCK_MASK: usize = BLOCK_SIZE - 1;

/// A bump pointer allocator over blocks of the immortal space.
pub struct BumpAllocator<VM: VMBinding> {
    cursor: Address,
    limit: Address,
    space: Arc<ImmortalSpace<VM>>,
}

impl<VM: VMBinding> BumpAllocator<VM> {
    pub fn new(space: Arc<ImmortalSpace<VM>>) -> Self {
        BumpAllocator {
            cursor: Address::ZERO,
            limit: Address::ZERO,
            space,
        }
    }

    pub fn set_limit(&mut self, cursor: Address, limit: Address) {
        self.cursor = cursor;
        self.limit = limit;
    }

    pub fn reset(&mut self) {
        self.cursor = Address::ZERO;
        self.limit = Address::ZERO;
    }

    fn alloc_slow(&mut self, size: usize, align: usize, offset: usize) -> Address {
        trace!("alloc_slow");
        let block_size = (size + align + BLOCK_MASK) & !BLOCK_MASK;
        match self.space.acquire(bytes_to_pages_up(block_size)) {
            None => {
                trace!("Failed to acquire a new block");
                Address::ZERO
            }
            Some(start) => {
                trace!(
                    "Acquired a new block of size {} with start address {}",
                    block_size,
                    start
                );
                self.set_limit(start, start + block_size);
                self.alloc(size, align, offset)
            }
        }
    }
}

impl<VM: VMBinding> Allocator<VM> for BumpAllocator<VM> {
    fn alloc(&mut self, size: usize, align: usize, offset: usize) -> Address {
        if self.cursor.is_zero() {
            return self.alloc_slow(size, align, offset);
        }
        let result = align_allocation::<VM>(self.cursor, align, offset);
        let new_cursor = result + size;
        if new_cursor > self.limit {
            trace!("Thread local buffer used up, go to alloc slow path");
            self.alloc_slow(size, align, offset)
        } else {
            self.cursor = new_cursor;
            trace!(
                "Bump allocation size: {}, result: {}, new_cursor: {}, limit: {}",
                size,
                result,
                self.cursor,
                self.limit
            );
            result
        }
    }
}
