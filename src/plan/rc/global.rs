use std::sync::Arc;

use crate::global_state::GlobalState;
use crate::mmtk::HeapResources;
use crate::plan::phase::{self, Phase};
use crate::plan::rc::backup_trace::BackupTrace;
use crate::plan::rc::buffers::RcPools;
use crate::policy::immortalspace::ImmortalSpace;
use crate::policy::largeobjectspace::LargeObjectSpace;
use crate::policy::rcspace::RcSpace;
use crate::policy::space::Space;
use crate::util::options::Options;
use crate::util::ObjectReference;
use crate::vm::VMBinding;

/// The deferred reference counting plan.
///
/// Small objects live in the [`RcSpace`] and large ones in the [`LargeObjectSpace`]; both are
/// reference counted. Objects in the [`ImmortalSpace`] are never freed. Mutators log writes into
/// the plan's pools between increments, and the collectors reconcile counts at each increment.
pub struct RC<VM: VMBinding> {
    pub rc_space: Arc<RcSpace<VM>>,
    pub los: Arc<LargeObjectSpace<VM>>,
    pub immortal: Arc<ImmortalSpace<VM>>,
    pub pools: RcPools<VM>,
    /// Roots counted in the previous increment. Their counts are dropped in this one.
    old_roots: spin::Mutex<Vec<ObjectReference>>,
    /// Roots counted in this increment.
    new_roots: spin::Mutex<Vec<ObjectReference>>,
    pub options: Arc<Options>,
}

impl<VM: VMBinding> RC<VM> {
    pub fn new(options: Arc<Options>, resources: HeapResources) -> Self {
        RC {
            rc_space: Arc::new(RcSpace::new("rc", resources.rc)),
            los: Arc::new(LargeObjectSpace::new("los", resources.los, options.verbose)),
            immortal: Arc::new(ImmortalSpace::new("immortal", resources.immortal)),
            pools: RcPools::new(),
            old_roots: spin::Mutex::new(vec![]),
            new_roots: spin::Mutex::new(vec![]),
            options,
        }
    }

    /// Is the object reference counted, i.e. in the RC space or the large object space?
    #[inline(always)]
    pub fn is_rc_object(&self, object: ObjectReference) -> bool {
        self.rc_space.in_space(object) || self.los.in_space(object)
    }

    pub fn is_immortal(&self, object: ObjectReference) -> bool {
        self.immortal.in_space(object)
    }

    /// Has the object been allocated and not freed yet?
    pub fn is_live_object(&self, object: ObjectReference) -> bool {
        if self.rc_space.in_space(object) {
            self.rc_space.is_live(object)
        } else if self.los.in_space(object) {
            self.los.contains(object)
        } else {
            self.is_immortal(object)
        }
    }

    /// Return a dead object's memory to its space.
    pub fn free(&self, object: ObjectReference) {
        if self.rc_space.in_space(object) {
            self.rc_space.free(object)
        } else {
            debug_assert!(self.los.in_space(object));
            self.los.free(object)
        }
    }

    pub fn get_reserved_pages(&self) -> usize {
        self.rc_space.reserved_pages() + self.los.reserved_pages() + self.immortal.reserved_pages()
    }

    /// Add the roots found in this increment.
    pub(crate) fn record_roots(&self, roots: &[ObjectReference]) {
        self.new_roots.lock().extend_from_slice(roots);
    }

    /// Take the roots of the previous increment, to decrement them.
    pub(crate) fn take_old_roots(&self) -> Vec<ObjectReference> {
        std::mem::take(&mut *self.old_roots.lock())
    }

    /// The global part of a phase. Runs on the primary collector only.
    pub fn collection_phase(&self, state: &GlobalState, phase: Phase) {
        match phase {
            Phase::Prepare => {
                self.pools.prepare_consumers(state.collectors());
                self.los.prepare();
                self.new_roots.lock().clear();
            }
            Phase::BackupTrace => {
                if state.is_cycle_collection() {
                    let roots = self.new_roots.lock().clone();
                    let stats = BackupTrace::new(self).run(&roots);
                    info!(
                        "Cycle collection: {} objects marked, {} freed",
                        stats.marked, stats.freed
                    );
                }
            }
            Phase::Release => {
                self.los.release();
                let roots = std::mem::take(&mut *self.new_roots.lock());
                *self.old_roots.lock() = roots;
                assert!(
                    self.pools.is_empty(),
                    "Buffers are not empty at the end of the increment"
                );
            }
            _ => phase::stop_the_world_phase(state, &self.options, phase),
        }
    }
}
