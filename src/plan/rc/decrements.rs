//! Processing of the decrement buffer, and recursive reclamation of dead objects.

use crate::plan::rc::header::{self, DecResult};
use crate::plan::rc::RC;
use crate::util::deque::LocalDeque;
use crate::util::ObjectReference;
use crate::vm::{Scanning, Slot, VMBinding};

pub struct ProcessDecBuf<'a, VM: VMBinding> {
    plan: &'a RC<VM>,
    decs: &'a mut LocalDeque<ObjectReference>,
    freed: usize,
}

impl<'a, VM: VMBinding> ProcessDecBuf<'a, VM> {
    pub fn new(plan: &'a RC<VM>, decs: &'a mut LocalDeque<ObjectReference>) -> Self {
        ProcessDecBuf {
            plan,
            decs,
            freed: 0,
        }
    }

    /// Apply one decrement. An object whose count drops to zero is freed here, and its
    /// referents with a nonzero count are decremented in turn. A new object never counted its
    /// referents, so they are not decremented.
    pub fn process(&mut self, object: ObjectReference) {
        if !self.plan.is_rc_object(object) {
            return;
        }
        if header::dec_rc::<VM>(object) != DecResult::DecToZero {
            return;
        }
        if !header::is_new::<VM>(object) {
            let plan = self.plan;
            let decs = &mut *self.decs;
            VM::VMScanning::scan_object(object, &mut |slot: VM::VMSlot| {
                if let Some(target) = slot.load() {
                    // Edges the backup trace left uncounted have nothing to give back.
                    if plan.is_rc_object(target) && header::read_count::<VM>(target) != 0 {
                        decs.push(target);
                    }
                }
            });
        }
        trace!("free {}", object);
        self.plan.free(object);
        self.freed += 1;
    }

    /// Drain the decrement pool. Returns the number of objects freed.
    pub fn drain(&mut self) -> usize {
        while let Some(object) = self.decs.dequeue() {
            self.process(object);
        }
        self.freed
    }
}
