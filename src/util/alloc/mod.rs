//! Thread-local allocators and the mapping from allocation semantics to allocators.

pub(crate) mod allocator;
pub use allocator::AllocationError;
pub use allocator::Allocator;

pub(crate) mod allocators;
pub use allocators::AllocatorSelector;
pub use allocators::Allocators;

mod bumpallocator;
pub use bumpallocator::BumpAllocator;

mod free_list_allocator;
pub use free_list_allocator::FreeListAllocator;

mod large_object_allocator;
pub use large_object_allocator::LargeObjectAllocator;
