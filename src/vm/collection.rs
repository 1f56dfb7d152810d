use crate::util::alloc::AllocationError;
use crate::vm::VMBinding;

/// VM-specific methods for collection-related events.
pub trait Collection<VM: VMBinding> {
    /// Inform the binding that an allocation failed. The default implementation panics. A
    /// binding that returns normally gets a zero address from the failed allocation.
    fn out_of_memory(err_kind: AllocationError) {
        panic!("Out of memory with {:?}!", err_kind);
    }
}
