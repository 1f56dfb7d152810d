//! The deferred buffers filled by the barriers and drained by the collectors.

use std::sync::Arc;

use crate::util::deque::{LocalDeque, SharedDeque};
use crate::util::{Address, ObjectReference};
use crate::vm::{Scanning, Slot, VMBinding};

/// The slots covered by one entry of the modified-field buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoggedSlots<SL: Slot> {
    /// A single field or array element.
    Field(SL),
    /// `len` adjacent elements of a reference array, starting at element `first`.
    Quantum {
        array: ObjectReference,
        first: usize,
        len: usize,
    },
}

impl<SL: Slot> LoggedSlots<SL> {
    pub fn for_each<VM, F>(&self, mut f: F)
    where
        VM: VMBinding<VMSlot = SL>,
        F: FnMut(SL),
    {
        match *self {
            LoggedSlots::Field(slot) => f(slot),
            LoggedSlots::Quantum { array, first, len } => {
                for index in first..first + len {
                    f(VM::VMScanning::array_element_slot(array, index))
                }
            }
        }
    }
}

/// An entry of the modified-field buffer: the logged slots and the address of the field mark
/// to clear when the entry is processed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModifiedField<SL: Slot> {
    pub slots: LoggedSlots<SL>,
    pub mark: Address,
}

/// The global pools of the plan. Every thread-local buffer spills into one of these.
pub struct RcPools<VM: VMBinding> {
    pub mod_objects: Arc<SharedDeque<ObjectReference>>,
    pub mod_fields: Arc<SharedDeque<ModifiedField<VM::VMSlot>>>,
    pub decs: Arc<SharedDeque<ObjectReference>>,
    /// Referents of modified objects and fields, queued for the backup trace instead of being
    /// incremented.
    pub trace_roots: Arc<SharedDeque<ObjectReference>>,
}

impl<VM: VMBinding> RcPools<VM> {
    pub fn new() -> Self {
        RcPools {
            mod_objects: Arc::new(SharedDeque::new("mod_objects")),
            mod_fields: Arc::new(SharedDeque::new("mod_fields")),
            decs: Arc::new(SharedDeque::new("decs")),
            trace_roots: Arc::new(SharedDeque::new("trace_roots")),
        }
    }

    pub fn prepare_consumers(&self, consumers: usize) {
        self.mod_objects.prepare_consumers(consumers);
        self.mod_fields.prepare_consumers(consumers);
        self.decs.prepare_consumers(consumers);
        self.trace_roots.prepare_consumers(consumers);
    }

    pub fn is_empty(&self) -> bool {
        self.mod_objects.is_empty()
            && self.mod_fields.is_empty()
            && self.decs.is_empty()
            && self.trace_roots.is_empty()
    }
}

impl<VM: VMBinding> Default for RcPools<VM> {
    fn default() -> Self {
        Self::new()
    }
}

/// The three thread-local buffers of a mutator: modified objects, modified fields and
/// decrements.
pub struct RemSet<VM: VMBinding> {
    pub mod_objects: LocalDeque<ObjectReference>,
    pub mod_fields: LocalDeque<ModifiedField<VM::VMSlot>>,
    pub decs: LocalDeque<ObjectReference>,
}

impl<VM: VMBinding> RemSet<VM> {
    pub fn new(pools: &RcPools<VM>, capacity: usize) -> Self {
        RemSet {
            mod_objects: LocalDeque::new(pools.mod_objects.clone(), capacity),
            mod_fields: LocalDeque::new(pools.mod_fields.clone(), capacity),
            decs: LocalDeque::new(pools.decs.clone(), capacity),
        }
    }

    pub fn flush_mod_buffers(&mut self) {
        self.mod_objects.flush_local();
        self.mod_fields.flush_local();
    }

    pub fn flush_decs(&mut self) {
        self.decs.flush_local();
    }

    pub fn flush(&mut self) {
        self.flush_mod_buffers();
        self.flush_decs();
    }

    /// Are all three local buffers empty?
    pub fn is_flushed(&self) -> bool {
        self.mod_objects.is_flushed() && self.mod_fields.is_flushed() && self.decs.is_flushed()
    }

    /// Are all three local buffers and their pools empty?
    pub fn is_empty(&self) -> bool {
        self.mod_objects.is_empty() && self.mod_fields.is_empty() && self.decs.is_empty()
    }
}
