//! Mutator context for each application thread.

use std::sync::Arc;

use enum_map::{enum_map, EnumMap};

use crate::mmtk::MMTK;
use crate::plan::barriers::{BarrierConfig, RCBarrier};
use crate::plan::phase::Phase;
use crate::plan::rc::header;
use crate::plan::AllocationSemantics;
use crate::policy::rcspace::MAX_CELL_SIZE;
use crate::policy::space::Space;
use crate::util::alloc::allocator::get_maximum_aligned_size;
use crate::util::alloc::{AllocationError, AllocatorSelector, Allocators};
use crate::util::options::RcFlavor;
use crate::util::{Address, ObjectReference};
use crate::vm::{Collection, VMBinding};

lazy_static! {
    pub static ref ALLOCATOR_MAPPING: EnumMap<AllocationSemantics, AllocatorSelector> = enum_map! {
        AllocationSemantics::Default | AllocationSemantics::NonMoving => AllocatorSelector::FreeList,
        AllocationSemantics::Immortal | AllocationSemantics::Code => AllocatorSelector::BumpPointer,
        AllocationSemantics::Los | AllocationSemantics::LargeCode | AllocationSemantics::PrimitiveLos => AllocatorSelector::LargeObject,
        AllocationSemantics::ReadOnly => AllocatorSelector::None,
    };
}

/// How a mutator allocates and initializes objects. Frozen when the mutator is bound.
pub struct MutatorConfig {
    /// Mapping between allocation semantics and allocator selector
    pub allocator_mapping: &'static EnumMap<AllocationSemantics, AllocatorSelector>,
    /// How new objects enter the reference counted heap.
    pub flavor: RcFlavor,
}

impl std::fmt::Debug for MutatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MutatorConfig:\n")?;
        f.write_str("Semantics mapping:\n")?;
        for (semantic, selector) in self.allocator_mapping.iter() {
            writeln!(f, "- {:?} = {:?}", semantic, selector)?;
        }
        writeln!(f, "Flavor: {}", self.flavor)
    }
}

/// A mutator instance for each application thread. It owns the thread's allocators and its
/// write barrier, and thus its deferred buffers. A mutator is only used by one thread at a
/// time, and the collectors only touch it while it is stopped.
pub struct Mutator<VM: VMBinding> {
    pub(crate) allocators: Allocators<VM>,
    pub(crate) barrier: RCBarrier<VM>,
    pub(crate) config: MutatorConfig,
    pub(crate) mmtk: Arc<MMTK<VM>>,
}

impl<VM: VMBinding> Mutator<VM> {
    pub fn new(mmtk: Arc<MMTK<VM>>) -> Self {
        let options = &mmtk.options;
        let barrier = RCBarrier::new(
            BarrierConfig::new(options),
            &mmtk.plan.pools,
            options.buffer_capacity,
            mmtk.barrier_stats.clone(),
        );
        let config = MutatorConfig {
            allocator_mapping: &ALLOCATOR_MAPPING,
            flavor: options.rc_flavor,
        };
        trace!("New mutator: {:?}", config);
        Mutator {
            allocators: Allocators::new(&mmtk.plan),
            barrier,
            config,
            mmtk,
        }
    }

    fn selector_for(
        &self,
        size: usize,
        align: usize,
        semantics: AllocationSemantics,
    ) -> AllocatorSelector {
        match self.config.allocator_mapping[semantics] {
            AllocatorSelector::FreeList
                if get_maximum_aligned_size::<VM>(size, align) > MAX_CELL_SIZE =>
            {
                AllocatorSelector::LargeObject
            }
            AllocatorSelector::None => panic!("Allocator not understood by RC: {:?}", semantics),
            selector => selector,
        }
    }

    /// Allocate memory for an object. Reports a failure to the binding and returns
    /// `Address::ZERO` if the binding does not panic.
    pub fn alloc(
        &mut self,
        size: usize,
        align: usize,
        offset: usize,
        semantics: AllocationSemantics,
    ) -> Address {
        let selector = self.selector_for(size, align, semantics);
        let addr = self
            .allocators
            .get_allocator_mut(selector)
            .alloc(size, align, offset);
        if addr.is_zero() {
            warn!("Failed to allocate {} bytes with {:?}", size, semantics);
            VM::VMCollection::out_of_memory(AllocationError::HeapOutOfMemory);
        }
        addr
    }

    /// Initialize the collector's metadata of a new object.
    ///
    /// A new reference counted object starts with a count of one, balanced by a decrement
    /// buffered right away, so it is freed at the next increment unless a reference to it
    /// is found. In the base flavor the object is `NEW`: writes to it are not logged, and its
    /// referents are only counted once the object itself is first counted. In the generational
    /// flavor it is logged, as if it had been written, so its referents are counted at the
    /// next increment.
    pub fn post_alloc(
        &mut self,
        object: ObjectReference,
        _bytes: usize,
        semantics: AllocationSemantics,
    ) {
        let plan = &self.mmtk.plan;
        if plan.is_immortal(object) {
            plan.immortal.initialize_object_metadata(object);
            header::init_header::<VM>(object, 1, true, false);
            self.barrier.buffers.mod_objects.push(object);
            return;
        }
        if plan.los.in_space(object) {
            plan.los.initialize_header(object);
        } else if plan.rc_space.in_space(object) {
            plan.rc_space.set_live(object);
        } else {
            panic!("{} ({:?}) is not in any space", object, semantics);
        }
        match self.config.flavor {
            RcFlavor::Base => header::init_header::<VM>(object, 1, false, true),
            RcFlavor::Generational => {
                header::init_header::<VM>(object, 1, true, false);
                self.barrier.buffers.mod_objects.push(object);
            }
        }
        self.barrier.buffers.decs.push(object);
    }

    /// The per-mutator part of a phase.
    pub fn collection_phase(&mut self, phase: Phase) {
        match phase {
            Phase::Prepare => self.allocators.for_each_mut(|a| a.prepare()),
            Phase::ProcessModBuffer => self.barrier.flush_mod_buffers(),
            Phase::ProcessDecBuffer => self.barrier.flush_decs(),
            Phase::Release => {
                self.allocators.for_each_mut(|a| a.release());
                if !self.barrier.is_flushed() {
                    panic!("Mutator buffers are not flushed at Release");
                }
            }
            _ => panic!("Per-mutator phase not handled: {}", phase),
        }
    }

    /// Push every local buffer to the global pools.
    pub fn flush(&mut self) {
        self.barrier.flush();
    }

    pub fn flush_remembered_sets(&mut self) {
        self.flush();
        self.assert_remsets_flushed();
    }

    pub fn assert_remsets_flushed(&self) {
        assert!(
            self.barrier.is_flushed(),
            "Mutator remembered sets are not flushed"
        );
    }

    pub fn barrier(&mut self) -> &mut RCBarrier<VM> {
        &mut self.barrier
    }

    pub fn config(&self) -> &MutatorConfig {
        &self.config
    }
}
