use std::sync::Arc;

use crate::policy::largeobjectspace::LargeObjectSpace;
use crate::util::alloc::allocator::{align_allocation, get_maximum_aligned_size};
use crate::util::alloc::Allocator;
use crate::util::conversions::bytes_to_pages_up;
use crate::util::Address;
use crate::vm::VMBinding;

/// Allocates each object its own page-granular cell of the large object space. The object is
/// put on the cell list later, by `post_alloc`.
pub struct LargeObjectAllocator<VM: VMBinding> {
    space: Arc<LargeObjectSpace<VM>>,
}

impl<VM: VMBinding> LargeObjectAllocator<VM> {
    pub fn new(space: Arc<LargeObjectSpace<VM>>) -> Self {
        LargeObjectAllocator { space }
    }
}

impl<VM: VMBinding> Allocator<VM> for LargeObjectAllocator<VM> {
    fn alloc(&mut self, size: usize, align: usize, offset: usize) -> Address {
        let maxbytes = get_maximum_aligned_size::<VM>(size, align);
        let pages = bytes_to_pages_up(maxbytes);
        let cell = self.space.allocate_pages(pages);
        if cell.is_zero() {
            return cell;
        }
        align_allocation::<VM>(cell, align, offset)
    }
}
