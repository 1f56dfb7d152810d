//! This module provides the trait [`Slot`], which allows a binding to customize how object
//! references are loaded from and stored into slots.

use std::fmt::Debug;
use std::hash::Hash;

use crate::util::ObjectReference;

/// `Slot` is an abstraction for the collector to load and update object references in memory.
///
/// A slot can be a field of an object, an element of a reference array, or a root. A `Slot`
/// value *points to* a slot, and is not the slot itself: a copied `Slot` points to the same
/// slot.
///
/// The barrier reads the old referent of a slot before the store, and the collector loads
/// referents from logged slots when it reconciles counts. A slot that holds no reference
/// (null, or a tagged non-reference value) loads as `None`.
///
/// # Performance notes
///
/// `load` is called on the barrier slow path and on every edge the collector visits.
pub trait Slot: Copy + Send + Sync + Debug + PartialEq + Eq + Hash + 'static {
    /// Load the object reference from the slot, or `None` if it holds no reference.
    fn load(&self) -> Option<ObjectReference>;

    /// Store `object` into the slot. `None` stores the null reference.
    fn store(&self, object: Option<ObjectReference>);

    /// Atomically replace `old` with `new`. Returns whether the slot held `old`.
    fn compare_exchange(&self, old: Option<ObjectReference>, new: Option<ObjectReference>)
        -> bool;
}
