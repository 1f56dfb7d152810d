use crate::util::ObjectReference;
use crate::vm::slot::Slot;
use crate::vm::VMBinding;

/// Callback trait of scanning functions that report slots.
pub trait SlotVisitor<SL: Slot> {
    /// Call this function for each slot.
    fn visit_slot(&mut self, slot: SL);
}

/// This lets us use closures as SlotVisitor.
impl<SL: Slot, F: FnMut(SL)> SlotVisitor<SL> for F {
    fn visit_slot(&mut self, slot: SL) {
        self(slot)
    }
}

/// VM-specific methods for scanning objects and roots.
pub trait Scanning<VM: VMBinding> {
    /// Report every reference-bearing slot of `object`, including null slots.
    fn scan_object<SV: SlotVisitor<VM::VMSlot>>(object: ObjectReference, slot_visitor: &mut SV);

    /// The slot of element `index` of a reference array.
    fn array_element_slot(array: ObjectReference, index: usize) -> VM::VMSlot;

    /// Report the objects directly referenced by roots (stacks, globals and other references
    /// held outside the heap). Each root reference counts once towards its referent. A binding
    /// that keeps its roots alive by other means may report nothing.
    fn scan_roots<F: FnMut(ObjectReference)>(_report: F) {}
}
