//! The backup trace: a stop-the-world mark-sweep over the RC heap that reclaims garbage cycles
//! and objects with stuck counts.
//!
//! Marking an object for the first time resets its count, and every traced edge from a marked
//! object or a root adds one back, so a marked object ends the trace with its exact count.
//! Unmarked objects are freed without touching their referents: every referent is either
//! unmarked too, or its recount does not include the dead edge.

use crate::plan::rc::header;
use crate::plan::rc::RC;
use crate::plan::tracing::VectorQueue;
use crate::util::ObjectReference;
use crate::vm::{Scanning, Slot, VMBinding};

pub struct BackupTrace<'a, VM: VMBinding> {
    plan: &'a RC<VM>,
    mark_stack: VectorQueue<ObjectReference>,
    marked: usize,
}

/// Outcome of one backup trace.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub marked: usize,
    pub freed: usize,
}

impl<'a, VM: VMBinding> BackupTrace<'a, VM> {
    pub fn new(plan: &'a RC<VM>) -> Self {
        BackupTrace {
            plan,
            mark_stack: VectorQueue::new(),
            marked: 0,
        }
    }

    fn trace_object(&mut self, object: ObjectReference, counted: bool) {
        if !self.plan.is_rc_object(object) {
            return;
        }
        if header::test_and_mark::<VM>(object) {
            header::reset_count_for_trace::<VM>(object);
            self.mark_stack.push(object);
            self.marked += 1;
        }
        if counted {
            header::inc_rc::<VM>(object);
        }
    }

    fn scan(&mut self, object: ObjectReference) {
        let mut referents = vec![];
        VM::VMScanning::scan_object(object, &mut |slot: VM::VMSlot| {
            if let Some(target) = slot.load() {
                referents.push(target);
            }
        });
        for target in referents {
            self.trace_object(target, true);
        }
    }

    /// Mark from the immortal objects, the roots of this increment and the queued trace roots,
    /// then sweep.
    pub fn run(mut self, roots: &[ObjectReference]) -> TraceStats {
        let plan = self.plan;
        plan.immortal.linear_scan(|object| {
            header::test_and_mark::<VM>(object);
            self.scan(object);
        });
        for root in roots {
            self.trace_object(*root, true);
        }
        while let Some(block) = plan.pools.trace_roots.pop() {
            for object in block {
                self.trace_object(object, false);
            }
        }
        while let Some(object) = self.mark_stack.pop() {
            self.scan(object);
        }
        debug!("backup trace marked {} objects", self.marked);

        let mut sweeper = |object: ObjectReference| {
            if header::is_marked::<VM>(object) {
                header::clear_mark::<VM>(object);
                false
            } else {
                true
            }
        };
        let mut freed = plan.rc_space.sweep(&mut sweeper);
        freed += plan.los.sweep(&mut sweeper);
        plan.immortal
            .linear_scan(|object| header::clear_mark::<VM>(object));
        debug!("backup trace freed {} objects", freed);
        TraceStats {
            marked: self.marked,
            freed,
        }
    }
}
