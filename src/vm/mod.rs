//! Traits that a host runtime implements to use the collector.
//!
//! The collector is generic over a [`VMBinding`], which bundles the binding's object model,
//! scanning and collection hooks with its slot type. Every access to object memory goes
//! through these traits.

mod collection;
mod object_model;
mod scanning;
pub mod slot;

pub use self::collection::Collection;
pub use self::object_model::{FieldMeta, ObjectModel};
pub use self::scanning::{Scanning, SlotVisitor};
pub use self::slot::Slot;

#[cfg(test)]
mod tests;

/// Default min alignment 4 bytes
const DEFAULT_LOG_MIN_ALIGNMENT: usize = 2;
/// Default max alignment 8 bytes
const DEFAULT_LOG_MAX_ALIGNMENT: usize = 3;

/// The `VMBinding` trait associates the binding's implementations of each trait, and provides
/// VM-specific constants.
pub trait VMBinding
where
    Self: Sized + 'static + Send + Sync + Default,
{
    type VMObjectModel: ObjectModel<Self>;
    type VMScanning: Scanning<Self>;
    type VMCollection: Collection<Self>;
    /// The type of slots in this VM.
    type VMSlot: Slot;

    /// Allowed minimal alignment in bytes.
    const MIN_ALIGNMENT: usize = 1 << DEFAULT_LOG_MIN_ALIGNMENT;
    /// Allowed maximum alignment in bytes.
    const MAX_ALIGNMENT: usize = 1 << DEFAULT_LOG_MAX_ALIGNMENT;
}
