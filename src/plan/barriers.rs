//! Write barriers of the reference counting plan.
//!
//! Every reference store, compare-and-swap and bulk copy performed by a mutator goes through an
//! [`RCBarrier`]. The barrier logs the first write to an object (or, in field mode, to a field)
//! in each increment: it remembers the written location in the modified buffers and pushes the
//! location's old referents to the decrement buffer. The store itself happens after the
//! barrier.

use std::sync::Arc;

use crate::plan::rc::buffers::{LoggedSlots, ModifiedField, RcPools, RemSet};
use crate::plan::rc::header;
use crate::util::conversions::bytes_to_words;
use crate::util::options::Options;
use crate::util::statistics::BarrierStats;
use crate::util::ObjectReference;
use crate::vm::{FieldMeta, ObjectModel, Scanning, Slot, VMBinding};

/// Barrier settings, frozen from [`Options`] when a mutator is bound.
#[derive(Copy, Clone, Debug)]
pub struct BarrierConfig {
    pub field_barrier_for_putfield: bool,
    pub field_barrier_for_aastore: bool,
    pub aastore_threshold: usize,
    pub log_array_quantum: usize,
    pub putfield_out_of_line: bool,
    pub aastore_out_of_line: bool,
    pub verbose: bool,
}

impl BarrierConfig {
    pub fn new(options: &Options) -> Self {
        BarrierConfig {
            field_barrier_for_putfield: options.field_barrier_for_putfield,
            field_barrier_for_aastore: options.field_barrier_for_aastore,
            aastore_threshold: options.field_barrier_aastore_threshold,
            log_array_quantum: options.log_array_quantum(),
            putfield_out_of_line: options.putfield_barrier_out_of_line,
            aastore_out_of_line: options.aastore_barrier_out_of_line,
            verbose: options.verbose,
        }
    }

    pub fn array_quantum(&self) -> usize {
        1 << self.log_array_quantum
    }
}

/// The granularity a write is logged at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BarrierKind {
    /// Log the array element (or its quantum).
    ArrayField,
    /// Log the scalar field.
    ScalarField,
    /// Log the whole object.
    Object,
}

/// The write barrier of one mutator. It owns the mutator's deferred buffers.
pub struct RCBarrier<VM: VMBinding> {
    config: BarrierConfig,
    pub(crate) buffers: RemSet<VM>,
    stats: Arc<BarrierStats>,
}

impl<VM: VMBinding> RCBarrier<VM> {
    pub fn new(
        config: BarrierConfig,
        pools: &RcPools<VM>,
        capacity: usize,
        stats: Arc<BarrierStats>,
    ) -> Self {
        RCBarrier {
            config,
            buffers: RemSet::new(pools, capacity),
            stats,
        }
    }

    pub fn config(&self) -> &BarrierConfig {
        &self.config
    }

    /// Does `array` use the field barrier for its elements?
    #[inline(always)]
    fn array_in_field_mode(&self, array: ObjectReference) -> bool {
        self.config.field_barrier_for_aastore
            && VM::VMObjectModel::array_length(array) >= self.config.aastore_threshold
    }

    /// The single dispatch at the top of every barrier entry point.
    #[inline(always)]
    pub fn select(&self, src: ObjectReference, meta: FieldMeta) -> BarrierKind {
        match meta {
            FieldMeta::ArrayElement(_) if self.array_in_field_mode(src) => BarrierKind::ArrayField,
            FieldMeta::Scalar(_) if self.config.field_barrier_for_putfield => {
                BarrierKind::ScalarField
            }
            _ => BarrierKind::Object,
        }
    }

    /// The barrier for a store of a reference into `slot` of `src`, run before the store.
    #[inline(always)]
    pub fn object_reference_write_pre(
        &mut self,
        src: ObjectReference,
        slot: VM::VMSlot,
        meta: FieldMeta,
    ) {
        match (self.select(src, meta), meta) {
            (BarrierKind::ArrayField, FieldMeta::ArrayElement(index)) => {
                if self.config.aastore_out_of_line {
                    self.array_field_barrier_out_of_line(src, index)
                } else {
                    self.array_field_barrier(src, index)
                }
            }
            (BarrierKind::ScalarField, _) => {
                if self.config.putfield_out_of_line {
                    self.scalar_field_barrier_out_of_line(src, slot, meta)
                } else {
                    self.scalar_field_barrier(src, slot, meta)
                }
            }
            _ => {
                if header::log_required::<VM>(src) {
                    self.object_reference_write_slow(src)
                }
            }
        }
    }

    /// Store `target` into `slot` of `src`.
    #[inline(always)]
    pub fn object_reference_write(
        &mut self,
        src: ObjectReference,
        slot: VM::VMSlot,
        target: Option<ObjectReference>,
        meta: FieldMeta,
    ) {
        self.object_reference_write_pre(src, slot, meta);
        slot.store(target);
    }

    /// Replace `old` with `new` in `slot` of `src`. The barrier runs whether or not the
    /// exchange succeeds.
    #[inline(always)]
    pub fn object_reference_try_compare_and_swap(
        &mut self,
        src: ObjectReference,
        slot: VM::VMSlot,
        old: Option<ObjectReference>,
        new: Option<ObjectReference>,
        meta: FieldMeta,
    ) -> bool {
        self.object_reference_write_pre(src, slot, meta);
        slot.compare_exchange(old, new)
    }

    /// The barrier for copying `bytes` bytes of references from `src` to `dst`. Offsets are in
    /// bytes from the first element. Returns false: the caller performs the copy.
    pub fn object_reference_bulk_copy(
        &mut self,
        src: ObjectReference,
        src_offset: usize,
        dst: ObjectReference,
        dst_offset: usize,
        bytes: usize,
    ) -> bool {
        trace!(
            "bulk copy {} words from {}+{} to {}+{}",
            bytes_to_words(bytes),
            src,
            src_offset,
            dst,
            dst_offset
        );
        if self.array_in_field_mode(dst) {
            let first = bytes_to_words(dst_offset);
            let words = bytes_to_words(bytes);
            for index in first..first + words {
                self.array_field_barrier(dst, index);
            }
        } else if header::log_required::<VM>(dst) {
            self.object_reference_write_slow(dst);
        }
        false
    }

    #[inline(always)]
    fn scalar_field_barrier(&mut self, src: ObjectReference, slot: VM::VMSlot, meta: FieldMeta) {
        if self.stats.is_enabled() {
            self.stats.putfield_fast.inc();
        }
        if VM::VMObjectModel::is_field_unlogged(src, meta) {
            self.field_slow(src, meta, LoggedSlots::Field(slot));
        }
    }

    #[inline(never)]
    fn scalar_field_barrier_out_of_line(
        &mut self,
        src: ObjectReference,
        slot: VM::VMSlot,
        meta: FieldMeta,
    ) {
        self.scalar_field_barrier(src, slot, meta)
    }

    /// The element barrier. The mark of a quantum is the mark of its first element.
    #[inline(always)]
    fn array_field_barrier(&mut self, src: ObjectReference, index: usize) {
        if self.stats.is_enabled() {
            self.stats.aastore_fast.inc();
        }
        let first = (index >> self.config.log_array_quantum) << self.config.log_array_quantum;
        let meta = FieldMeta::ArrayElement(first);
        if VM::VMObjectModel::is_field_unlogged(src, meta) {
            let slots = if self.config.log_array_quantum == 0 {
                LoggedSlots::Field(VM::VMScanning::array_element_slot(src, index))
            } else {
                let len = VM::VMObjectModel::array_length(src);
                LoggedSlots::Quantum {
                    array: src,
                    first,
                    len: self.config.array_quantum().min(len - first),
                }
            };
            self.field_slow(src, meta, slots);
        }
    }

    #[inline(never)]
    fn array_field_barrier_out_of_line(&mut self, src: ObjectReference, index: usize) {
        self.array_field_barrier(src, index)
    }

    /// Log one field, or one quantum of array elements, under the object's logging lock.
    #[cold]
    fn field_slow(
        &mut self,
        src: ObjectReference,
        meta: FieldMeta,
        slots: LoggedSlots<VM::VMSlot>,
    ) {
        if !header::prepare_to_log_field_in_object::<VM>(src) {
            return;
        }
        // Another thread may have logged the field while we were waiting for the lock.
        if VM::VMObjectModel::is_field_unlogged(src, meta) {
            let decs = &mut self.buffers.decs;
            let mut words = 0;
            slots.for_each::<VM, _>(|slot| {
                if let Some(old) = slot.load() {
                    decs.push(old);
                    words += 1;
                }
            });
            let mark = VM::VMObjectModel::mark_field_as_logged(src, meta);
            self.buffers.mod_fields.push(ModifiedField { slots, mark });
            if self.stats.is_enabled() {
                self.stats.slow.inc();
                self.stats.words_logged.inc_by(words);
            }
            if self.config.verbose {
                info!("log field {:?} of {} ({:?}), mark {}", meta, src, slots, mark);
            } else {
                trace!("log field {:?} of {}, mark {}", meta, src, mark);
            }
        }
        header::finish_logging::<VM>(src);
    }

    /// Log a whole object: remember it, and push every current referent as a decrement.
    #[cold]
    pub fn object_reference_write_slow(&mut self, src: ObjectReference) {
        if !header::attempt_to_log_object::<VM>(src) {
            return;
        }
        self.buffers.mod_objects.push(src);
        let decs = &mut self.buffers.decs;
        let mut words = 0;
        VM::VMScanning::scan_object(src, &mut |slot: VM::VMSlot| {
            if let Some(old) = slot.load() {
                decs.push(old);
                words += 1;
            }
        });
        header::make_logged::<VM>(src);
        if self.stats.is_enabled() {
            self.stats.slow.inc();
            self.stats.words_logged.inc_by(words);
        }
        trace!("log object {} ({} referents)", src, words);
    }

    /// Flush the modified-object and modified-field buffers into their pools.
    pub fn flush_mod_buffers(&mut self) {
        self.buffers.flush_mod_buffers();
    }

    pub fn flush_decs(&mut self) {
        self.buffers.flush_decs();
    }

    pub fn flush(&mut self) {
        self.buffers.flush();
    }

    pub fn is_flushed(&self) -> bool {
        self.buffers.is_flushed()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
