use crate::plan::rc::RC;
use crate::util::alloc::{Allocator, BumpAllocator, FreeListAllocator, LargeObjectAllocator};
use crate::vm::VMBinding;

/// The allocators owned by each mutator. The RC plan uses one of each kind.
pub struct Allocators<VM: VMBinding> {
    pub bump_pointer: BumpAllocator<VM>,
    pub large_object: LargeObjectAllocator<VM>,
    pub free_list: FreeListAllocator<VM>,
}

impl<VM: VMBinding> Allocators<VM> {
    pub fn new(plan: &RC<VM>) -> Self {
        Allocators {
            bump_pointer: BumpAllocator::new(plan.immortal.clone()),
            large_object: LargeObjectAllocator::new(plan.los.clone()),
            free_list: FreeListAllocator::new(plan.rc_space.clone()),
        }
    }

    /// # Panics
    /// Panics on [`AllocatorSelector::None`].
    pub fn get_allocator(&self, selector: AllocatorSelector) -> &dyn Allocator<VM> {
        match selector {
            AllocatorSelector::BumpPointer => &self.bump_pointer,
            AllocatorSelector::LargeObject => &self.large_object,
            AllocatorSelector::FreeList => &self.free_list,
            AllocatorSelector::None => panic!("Allocator mapping is not initialized"),
        }
    }

    /// # Panics
    /// Panics on [`AllocatorSelector::None`].
    pub fn get_allocator_mut(&mut self, selector: AllocatorSelector) -> &mut dyn Allocator<VM> {
        match selector {
            AllocatorSelector::BumpPointer => &mut self.bump_pointer,
            AllocatorSelector::LargeObject => &mut self.large_object,
            AllocatorSelector::FreeList => &mut self.free_list,
            AllocatorSelector::None => panic!("Allocator mapping is not initialized"),
        }
    }

    /// Visit every allocator, e.g. for `Prepare` and `Release`.
    pub fn for_each_mut<F: FnMut(&mut dyn Allocator<VM>)>(&mut self, mut f: F) {
        f(&mut self.bump_pointer);
        f(&mut self.large_object);
        f(&mut self.free_list);
    }
}

/// This type describes allocator selection. It is used to map allocation semantics to
/// allocators.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AllocatorSelector {
    BumpPointer,
    LargeObject,
    FreeList,
    /// The plan does not understand this semantics.
    #[default]
    None,
}
