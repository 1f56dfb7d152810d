//! Collector context for each collector thread.

use std::sync::Arc;

use crate::mmtk::MMTK;
use crate::plan::phase::Phase;
use crate::plan::rc::buffers::ModifiedField;
use crate::plan::rc::decrements::ProcessDecBuf;
use crate::plan::rc::modified::ProcessModBuf;
use crate::util::deque::LocalDeque;
use crate::util::ObjectReference;
use crate::vm::{Scanning, VMBinding};

/// A collector thread's view of the plan's pools. Collector 0 is the primary: it also runs the
/// global and mutator steps of each phase, and handles the roots.
pub struct Collector<VM: VMBinding> {
    ordinal: usize,
    mmtk: Arc<MMTK<VM>>,
    mod_objects: LocalDeque<ObjectReference>,
    mod_fields: LocalDeque<ModifiedField<VM::VMSlot>>,
    decs: LocalDeque<ObjectReference>,
    trace_roots: LocalDeque<ObjectReference>,
}

impl<VM: VMBinding> Collector<VM> {
    pub fn new(ordinal: usize, mmtk: Arc<MMTK<VM>>) -> Self {
        let pools = &mmtk.plan.pools;
        let capacity = mmtk.options.buffer_capacity;
        Collector {
            ordinal,
            mod_objects: LocalDeque::new(pools.mod_objects.clone(), capacity),
            mod_fields: LocalDeque::new(pools.mod_fields.clone(), capacity),
            decs: LocalDeque::new(pools.decs.clone(), capacity),
            trace_roots: LocalDeque::new(pools.trace_roots.clone(), capacity),
            mmtk,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn is_primary(&self) -> bool {
        self.ordinal == 0
    }

    fn is_flushed(&self) -> bool {
        self.mod_objects.is_flushed()
            && self.mod_fields.is_flushed()
            && self.decs.is_flushed()
            && self.trace_roots.is_flushed()
    }

    fn process_mod_buffer(&mut self) {
        let plan = &self.mmtk.plan;
        let cycle = self.mmtk.state.is_cycle_collection();
        let mut roots = vec![];
        if self.is_primary() {
            VM::VMScanning::scan_roots(|object| roots.push(object));
            plan.record_roots(&roots);
        }
        let mut closure =
            ProcessModBuf::new(plan, cycle, &mut self.mod_objects, &mut self.trace_roots);
        if !cycle {
            for root in roots.iter() {
                closure.process_root(*root);
            }
        }
        let fields = closure.drain_fields(&mut self.mod_fields);
        let objects = closure.drain_objects();
        self.trace_roots.flush_local();
        debug!(
            "Collector {}: {} roots, {} fields, {} objects",
            self.ordinal,
            roots.len(),
            fields,
            objects
        );
    }

    fn process_dec_buffer(&mut self) {
        let plan = &self.mmtk.plan;
        if self.mmtk.state.is_cycle_collection() {
            // The backup trace recounts everything, so pending decrements are void.
            if self.is_primary() {
                plan.take_old_roots();
                plan.pools.decs.clear();
            }
            self.decs.reset();
            return;
        }
        if self.is_primary() {
            for root in plan.take_old_roots() {
                self.decs.push(root);
            }
        }
        let freed = ProcessDecBuf::new(plan, &mut self.decs).drain();
        debug!("Collector {}: {} objects freed", self.ordinal, freed);
    }

    /// The per-collector part of a phase.
    pub fn collection_phase(&mut self, phase: Phase) {
        match phase {
            Phase::Prepare => debug_assert!(self.is_flushed()),
            Phase::ProcessModBuffer => self.process_mod_buffer(),
            Phase::ProcessDecBuffer => self.process_dec_buffer(),
            Phase::Release => {
                assert!(
                    self.is_flushed(),
                    "Collector {} buffers are not empty at Release",
                    self.ordinal
                );
            }
            _ => panic!("Per-collector phase not handled: {}", phase),
        }
    }
}
