//! VM-to-MMTk interface: safe Rust APIs.
//!
//! This module provides a safe Rust API for the reference counting collector.
//! We expect the VM binding to inherit and extend this API by:
//! 1. adding their VM-specific functions
//! 2. exposing the functions to native if necessary. And the VM binding needs to manage the
//!    unsafety for exposing this safe API to FFI.
//!
//! For mutators, this API provides a `Box<Mutator>`, and requires a `&mut Mutator` for
//! allocation and for the write barriers. Increments are driven by [`collect`], which takes
//! every mutator: the binding is responsible for stopping them first.

use std::sync::Arc;

use crate::mmtk::{HeapResources, MMTKBuilder, MMTK};
use crate::plan::phase::{self, Phase};
use crate::plan::rc::header;
use crate::plan::{AllocationSemantics, CollectionKind, Collector, Mutator};
use crate::util::statistics::BarrierStats;
use crate::util::{Address, ObjectReference};
use crate::vm::{FieldMeta, VMBinding};

/// Initialize an MMTk instance.
///
/// We expect a binding to initialize MMTk in the following steps:
///
/// 1. Create an [`MMTKBuilder`] instance.
/// 2. Set options for the builder with [`MMTKBuilder::set_option`], or through `MMTK_*`
///    environment variables.
/// 3. Call this function with the page resources of the three spaces.
///
/// Note that this method will attempt to initialize a logger. If the VM would like to use its
/// own logger, it should initialize the logger before calling this method.
pub fn mmtk_init<VM: VMBinding>(
    builder: &MMTKBuilder,
    resources: HeapResources,
) -> Arc<MMTK<VM>> {
    match crate::util::logger::try_init() {
        Ok(_) => debug!("MMTk initialized the logger."),
        Err(_) => debug!(
            "MMTk failed to initialize the logger. Possibly a logger has been initialized by user."
        ),
    }
    let mmtk = builder.build(resources);
    info!(
        "Initialized RC collector {} (flavor {}, {} collector threads)",
        *crate::build_info::MMTK_RC_FULL_VERSION,
        mmtk.options.rc_flavor,
        mmtk.options.threads
    );
    debug!("Options: {:?}", mmtk.options);
    Arc::new(mmtk)
}

/// Request MMTk to create a mutator for the given thread. The mutator is only used by that
/// thread, and by the collectors while the thread is stopped.
pub fn bind_mutator<VM: VMBinding>(mmtk: &Arc<MMTK<VM>>) -> Box<Mutator<VM>> {
    let mutator = Box::new(Mutator::new(mmtk.clone()));

    const LOG_ALLOCATOR_MAPPING: bool = false;
    if LOG_ALLOCATOR_MAPPING {
        info!("{:?}", mutator.config());
    }
    mutator
}

/// Reclaim a mutator that is no longer needed. Its buffers are flushed to the global pools
/// first, so that the next increment processes them.
pub fn destroy_mutator<VM: VMBinding>(mut mutator: Box<Mutator<VM>>) {
    mutator.flush();
    drop(mutator);
}

/// Flush the mutator's local buffers to the global pools.
pub fn flush<VM: VMBinding>(mutator: &mut Mutator<VM>) {
    mutator.flush()
}

/// Flush the mutator's local buffers, and check that they are empty afterwards.
pub fn flush_remembered_sets<VM: VMBinding>(mutator: &mut Mutator<VM>) {
    mutator.flush_remembered_sets()
}

/// Check that the mutator's local buffers are empty.
///
/// # Panics
/// Panics if any of them holds an entry.
pub fn assert_remsets_flushed<VM: VMBinding>(mutator: &Mutator<VM>) {
    mutator.assert_remsets_flushed()
}

/// Allocate memory for an object.
///
/// Arguments:
/// * `mutator`: The mutator to perform this allocation request.
/// * `size`: The number of bytes required for the object.
/// * `align`: Required alignment for the object.
/// * `offset`: Offset associated with the alignment.
/// * `semantics`: The allocation semantic required for the allocation.
///
/// Returns `Address::ZERO` if the heap is exhausted and the binding's
/// [`crate::vm::Collection::out_of_memory`] returns.
#[inline(always)]
pub fn alloc<VM: VMBinding>(
    mutator: &mut Mutator<VM>,
    size: usize,
    align: usize,
    offset: usize,
    semantics: AllocationSemantics,
) -> Address {
    mutator.alloc(size, align, offset, semantics)
}

/// Perform post-allocation actions: initialize the object's header and register it with its
/// space. The binding must have initialized the object's fields (to null or to valid
/// references) before this call.
///
/// Arguments:
/// * `mutator`: The mutator to perform post-alloc actions.
/// * `object`: The newly allocated object.
/// * `bytes`: The size of the space allocated for the object (in bytes).
/// * `semantics`: The allocation semantics used for the allocation.
pub fn post_alloc<VM: VMBinding>(
    mutator: &mut Mutator<VM>,
    object: ObjectReference,
    bytes: usize,
    semantics: AllocationSemantics,
) {
    mutator.post_alloc(object, bytes, semantics);
}

/// The *subsuming* write barrier: log the write if needed, then store `target` into `slot`.
///
/// Arguments:
/// * `mutator`: The mutator for the current thread.
/// * `src`: The modified source object.
/// * `slot`: The location of the field to be modified.
/// * `target`: The target for the write operation. `None` stores null.
/// * `meta`: Identifies the field, for the field barrier.
#[inline(always)]
pub fn object_reference_write<VM: VMBinding>(
    mutator: &mut Mutator<VM>,
    src: ObjectReference,
    slot: VM::VMSlot,
    target: Option<ObjectReference>,
    meta: FieldMeta,
) {
    mutator.barrier().object_reference_write(src, slot, target, meta);
}

/// The barrier for a compare-and-swap of a reference field. Returns whether the swap happened.
#[inline(always)]
pub fn object_reference_try_compare_and_swap<VM: VMBinding>(
    mutator: &mut Mutator<VM>,
    src: ObjectReference,
    slot: VM::VMSlot,
    old: Option<ObjectReference>,
    new: Option<ObjectReference>,
    meta: FieldMeta,
) -> bool {
    mutator
        .barrier()
        .object_reference_try_compare_and_swap(src, slot, old, new, meta)
}

/// The barrier for an array copy. Offsets and `bytes` are in bytes. Always returns false: the
/// binding performs the copy itself after the call.
pub fn object_reference_bulk_copy<VM: VMBinding>(
    mutator: &mut Mutator<VM>,
    src: ObjectReference,
    src_offset: usize,
    dst: ObjectReference,
    dst_offset: usize,
    bytes: usize,
) -> bool {
    mutator
        .barrier()
        .object_reference_bulk_copy(src, src_offset, dst, dst_offset, bytes)
}

/// Run one increment. Every mutator of the instance must be stopped and passed in.
pub fn collect<VM: VMBinding>(
    mmtk: &Arc<MMTK<VM>>,
    mutators: &mut [&mut Mutator<VM>],
    kind: CollectionKind,
) {
    phase::collect(mmtk, mutators, kind)
}

/// Create the collector context for a collector thread. Collector 0 is the primary.
///
/// Together with [`request_collection`], [`global_collection_phase`] and
/// [`Mutator::collection_phase`], this lets a binding drive the phases with its own threads
/// instead of calling [`collect`].
pub fn bind_collector<VM: VMBinding>(
    mmtk: &Arc<MMTK<VM>>,
    ordinal: usize,
) -> Box<Collector<VM>> {
    Box::new(Collector::new(ordinal, mmtk.clone()))
}

/// Set the kind of the next increment, and the number of collectors that will run it.
pub fn request_collection<VM: VMBinding>(
    mmtk: &MMTK<VM>,
    kind: CollectionKind,
    collectors: usize,
) {
    mmtk.state.request_collection(kind, collectors)
}

/// Run the global part of a phase.
pub fn global_collection_phase<VM: VMBinding>(mmtk: &MMTK<VM>, phase: Phase) {
    mmtk.plan.collection_phase(&mmtk.state, phase)
}

/// The current count of an object. [`crate::plan::rc::header::MAX_REF_COUNT`] means stuck.
pub fn reference_count<VM: VMBinding>(object: ObjectReference) -> usize {
    header::read_count::<VM>(object)
}

/// Has the object been logged in this increment?
pub fn is_logged<VM: VMBinding>(object: ObjectReference) -> bool {
    header::is_logged::<VM>(object)
}

/// Has the object been allocated, and not been freed yet?
pub fn is_live_object<VM: VMBinding>(mmtk: &MMTK<VM>, object: ObjectReference) -> bool {
    mmtk.plan.is_live_object(object)
}

/// The barrier counters of the instance. Only counted with the `barrier_stats` option.
pub fn barrier_stats<VM: VMBinding>(mmtk: &MMTK<VM>) -> &BarrierStats {
    &mmtk.barrier_stats
}

/// Pages currently reserved by all spaces.
pub fn get_reserved_pages<VM: VMBinding>(mmtk: &MMTK<VM>) -> usize {
    mmtk.get_reserved_pages()
}
