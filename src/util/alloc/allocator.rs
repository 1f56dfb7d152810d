use crate::util::Address;
use crate::vm::VMBinding;

use downcast_rs::Downcast;

/// Reasons an allocation can fail. Reported to [`crate::vm::Collection::out_of_memory`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationError {
    /// The page resource backing the space is exhausted.
    HeapOutOfMemory,
}

/// Align `region` so that `region + offset` is aligned to `align`.
#[inline(always)]
pub fn align_allocation<VM: VMBinding>(region: Address, align: usize, offset: usize) -> Address {
    debug_assert!(align >= VM::MIN_ALIGNMENT && align <= VM::MAX_ALIGNMENT);
    debug_assert!(align.is_power_of_two());
    debug_assert!(region.is_aligned_to(VM::MIN_ALIGNMENT));

    let region_isize = region.as_usize() as isize;
    let mask = (align - 1) as isize; // fromIntSignExtend
    let neg_off = -(offset as isize); // fromIntSignExtend
    let delta = (neg_off - region_isize) & mask;

    region + delta as usize
}

/// The worst-case number of bytes needed to fit `size` bytes at alignment `align`.
#[inline(always)]
pub fn get_maximum_aligned_size<VM: VMBinding>(size: usize, align: usize) -> usize {
    if align <= VM::MIN_ALIGNMENT {
        size
    } else {
        size + align - VM::MIN_ALIGNMENT
    }
}

/// A thread-local allocator. Returns `Address::ZERO` when its space cannot provide memory;
/// the caller reports the failure to the binding.
pub trait Allocator<VM: VMBinding>: Downcast + Send {
    /// Allocate `size` bytes so that `result + offset` is aligned to `align`.
    fn alloc(&mut self, size: usize, align: usize, offset: usize) -> Address;

    /// Called at the `Prepare` phase of each increment.
    fn prepare(&mut self) {}

    /// Called at the `Release` phase of each increment.
    fn release(&mut self) {}
}

downcast_rs::impl_downcast!(Allocator<VM> where VM: VMBinding);
