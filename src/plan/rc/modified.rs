//! Processing of the modified buffers: every referent of a logged object or field gets the
//! increment for the reference the mutator installed.

use crate::plan::rc::buffers::ModifiedField;
use crate::plan::rc::header::{self, IncResult};
use crate::plan::rc::RC;
use crate::util::deque::LocalDeque;
use crate::util::ObjectReference;
use crate::vm::{ObjectModel, Scanning, Slot, VMBinding};

/// The closure of one collector over the modified buffers.
///
/// In a cycle collection increments are not applied. Referents are queued as roots of the
/// backup trace instead, which recounts every reachable object from scratch.
pub struct ProcessModBuf<'a, VM: VMBinding> {
    plan: &'a RC<VM>,
    cycle: bool,
    field_barrier: bool,
    mod_objects: &'a mut LocalDeque<ObjectReference>,
    trace_roots: &'a mut LocalDeque<ObjectReference>,
}

impl<'a, VM: VMBinding> ProcessModBuf<'a, VM> {
    pub fn new(
        plan: &'a RC<VM>,
        cycle: bool,
        mod_objects: &'a mut LocalDeque<ObjectReference>,
        trace_roots: &'a mut LocalDeque<ObjectReference>,
    ) -> Self {
        ProcessModBuf {
            plan,
            cycle,
            field_barrier: plan.options.field_barrier(),
            mod_objects,
            trace_roots,
        }
    }

    fn increment(&mut self, object: ObjectReference) {
        if !self.plan.is_rc_object(object) {
            return;
        }
        if self.cycle {
            self.trace_roots.push(object);
            return;
        }
        if header::inc_rc::<VM>(object) == IncResult::IncNew {
            // First reference to a new object: its own referents are counted now.
            self.mod_objects.push(object);
        }
    }

    /// Count the current referents of a logged field, and reset its mark.
    pub fn process_field(&mut self, entry: ModifiedField<VM::VMSlot>) {
        VM::VMObjectModel::mark_field_as_unlogged(entry.mark);
        entry.slots.for_each::<VM, _>(|slot| {
            if let Some(target) = slot.load() {
                self.increment(target);
            }
        });
    }

    /// Count the current referents of a logged or new object, and make it loggable again.
    pub fn process_object(&mut self, object: ObjectReference) {
        header::make_unlogged::<VM>(object);
        if self.field_barrier {
            VM::VMObjectModel::mark_all_fields_as_unlogged(object);
        }
        let mut referents = vec![];
        VM::VMScanning::scan_object(object, &mut |slot: VM::VMSlot| {
            if let Some(target) = slot.load() {
                referents.push(target);
            }
        });
        for target in referents {
            self.increment(target);
        }
    }

    /// A root reference counts like any heap reference.
    pub fn process_root(&mut self, object: ObjectReference) {
        self.increment(object);
    }

    /// Drain the modified-field pool. Returns the number of entries processed.
    pub fn drain_fields(&mut self, fields: &mut LocalDeque<ModifiedField<VM::VMSlot>>) -> usize {
        let mut n = 0;
        while let Some(entry) = fields.dequeue() {
            self.process_field(entry);
            n += 1;
        }
        n
    }

    /// Drain the modified-object pool, including the new objects found on the way. Returns the
    /// number of objects processed.
    pub fn drain_objects(&mut self) -> usize {
        let mut n = 0;
        while let Some(object) = self.mod_objects.dequeue() {
            self.process_object(object);
            n += 1;
        }
        n
    }
}
