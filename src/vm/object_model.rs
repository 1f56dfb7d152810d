use std::sync::atomic::Ordering;

use crate::util::{Address, ObjectReference};
use crate::vm::VMBinding;

/// Identifies a reference field for the field-granularity barrier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldMeta {
    /// A scalar field, described by host-defined metadata (for example a field offset or a
    /// field number).
    Scalar(usize),
    /// An element of a reference array.
    ArrayElement(usize),
}

/// VM-specific methods for the object model. The collector owns one header word per object
/// and a set of per-field marks; this trait gives it atomic access to both. It never reads or
/// writes object memory by any other means.
pub trait ObjectModel<VM: VMBinding> {
    /// Load the header word used by the collector.
    fn prepare_available_bits(object: ObjectReference, order: Ordering) -> usize;

    /// Atomically replace the header word if it still holds `old`. Returns the value that was
    /// observed, as [`std::sync::atomic::AtomicUsize::compare_exchange`] does.
    fn attempt_available_bits(
        object: ObjectReference,
        old: usize,
        new: usize,
        success: Ordering,
        failure: Ordering,
    ) -> Result<usize, usize>;

    /// Unconditionally store the header word. Only used while the object is not yet visible to
    /// other threads.
    fn write_available_bits(object: ObjectReference, value: usize, order: Ordering);

    /// Is the field identified by `meta` unlogged (not yet logged in this increment)?
    fn is_field_unlogged(object: ObjectReference, meta: FieldMeta) -> bool;

    /// Mark the field as logged and return the address of its mark. The barrier calls this while
    /// it holds the object's logging lock, so the store need not be atomic.
    fn mark_field_as_logged(object: ObjectReference, meta: FieldMeta) -> Address;

    /// Clear a mark previously returned by [`ObjectModel::mark_field_as_logged`].
    fn mark_field_as_unlogged(mark: Address);

    /// Clear every field mark of the object.
    fn mark_all_fields_as_unlogged(object: ObjectReference);

    /// Is the object a reference array?
    fn is_array(object: ObjectReference) -> bool;

    /// Number of elements of a reference array.
    fn array_length(object: ObjectReference) -> usize;

    /// Size of the object in bytes.
    fn get_current_size(object: ObjectReference) -> usize;

    /// Start of the allocation holding the object, i.e. the address returned by
    /// [`crate::memory_manager::alloc`].
    fn ref_to_object_start(object: ObjectReference) -> Address;
}
