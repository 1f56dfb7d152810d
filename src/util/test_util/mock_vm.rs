//! A mock binding for tests and benchmarks.
//!
//! Objects live in a simulated heap of atomic words, so that the collector can be exercised
//! without mapping memory. An object with `n` reference slots occupies `2 + 2n` words:
//!
//! ```text
//! +--------+------------+---------+-----+-------------+------------+-----+--------------+
//! | header | descriptor | slot[0] | ... | slot[n - 1] | mark[0]    | ... | mark[n - 1]  |
//! +--------+------------+---------+-----+-------------+------------+-----+--------------+
//! ```
//!
//! The descriptor is `n << 1 | is_array`. The marks are the per-field logged marks of the field
//! barrier. An object reference is the address of the header word.
//!
//! The hooks a test may want to replace (roots and out-of-memory handling) are [`MockMethod`]s
//! on the [`MockVM`] instance installed by [`with_mockvm`].

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::mock_method::*;
use crate::memory_manager;
use crate::mmtk::HeapResources;
use crate::plan::{AllocationSemantics, Mutator};
use crate::util::alloc::AllocationError;
use crate::util::constants::BYTES_IN_WORD;
use crate::util::heap::FreeListPageResource;
use crate::util::{Address, ObjectReference};
use crate::vm::{FieldMeta, ObjectModel, Scanning, Slot, SlotVisitor, VMBinding};

/// Start of the simulated heap.
pub const HEAP_START: usize = 0x1000_0000;
const MB: usize = 1 << 20;
const HEAP_BYTES: usize = 8 * MB;
const HEAP_WORDS: usize = HEAP_BYTES / BYTES_IN_WORD;

const fn range(start_mb: usize, mb: usize) -> Range<Address> {
    let start = HEAP_START + start_mb * MB;
    Address::from_usize(start)..Address::from_usize(start + mb * MB)
}

/// Pages of the RC space.
pub const RC_RANGE: Range<Address> = range(0, 3);
/// Pages of the large object space.
pub const LOS_RANGE: Range<Address> = range(3, 3);
/// Pages of the immortal space.
pub const IMMORTAL_RANGE: Range<Address> = range(6, 1);
/// Memory for objects that belong to no space, see [`scratch_object`].
pub const SCRATCH_RANGE: Range<Address> = range(7, 1);

static_assertions::const_assert!(SCRATCH_RANGE.end.as_usize() == HEAP_START + HEAP_BYTES);

lazy_static! {
    static ref MEMORY: Box<[AtomicUsize]> = (0..HEAP_WORDS).map(|_| AtomicUsize::new(0)).collect();
    // The mutex may get poisoned any time. Accessing this mutex needs to deal with the poisoned
    // case. One can use read/write_mockvm to access mock vm.
    static ref MOCK_VM_INSTANCE: Mutex<MockVM> = Mutex::new(MockVM::default());
    static ref ROOTS: Mutex<Vec<ObjectReference>> = Mutex::new(vec![]);
}

static SCRATCH_CURSOR: AtomicUsize = AtomicUsize::new(0);

macro_rules! mock {
    ($fn: ident($($arg:expr),*)) => {
        write_mockvm(|mock| mock.$fn.call(($($arg),*)))
    };
}

pub fn read_mockvm<F, R>(func: F) -> R
where
    F: FnOnce(&MockVM) -> R,
{
    let lock = MOCK_VM_INSTANCE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    func(&lock)
}

pub fn write_mockvm<F, R>(func: F) -> R
where
    F: FnOnce(&mut MockVM) -> R,
{
    let mut lock = MOCK_VM_INSTANCE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    func(&mut lock)
}

/// Run a test with a fresh mock VM, serially with every other test that uses the simulated
/// heap.
pub fn with_mockvm<S, T, C>(setup: S, test: T, cleanup: C)
where
    S: FnOnce() -> MockVM,
    T: FnOnce() + std::panic::UnwindSafe,
    C: FnOnce(),
{
    super::serial_test(|| {
        // Setup
        write_mockvm(|mock| *mock = setup());
        set_roots(vec![]);
        super::with_cleanup(test, cleanup);
    })
}

pub fn default_setup() -> MockVM {
    MockVM::default()
}

pub fn no_cleanup() {}

pub struct MockVM {
    pub scan_roots: MockMethod<(), Vec<ObjectReference>>,
    pub out_of_memory: MockMethod<AllocationError, ()>,
}

impl Default for MockVM {
    fn default() -> Self {
        Self {
            scan_roots: MockMethod::new_fixed(Box::new(|()| {
                ROOTS
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone()
            })),
            out_of_memory: MockMethod::new_fixed(Box::new(|err| {
                panic!("Out of memory with {:?}!", err)
            })),
        }
    }
}

impl VMBinding for MockVM {
    type VMObjectModel = MockVM;
    type VMScanning = MockVM;
    type VMCollection = MockVM;
    type VMSlot = MockSlot;
}

/// Replace the roots reported by the default `scan_roots` hook.
pub fn set_roots(roots: Vec<ObjectReference>) {
    *ROOTS.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = roots;
}

fn word(addr: Address) -> &'static AtomicUsize {
    let index = (addr - Address::from_usize(HEAP_START)) / BYTES_IN_WORD;
    assert!(index < HEAP_WORDS, "{} is outside the mock heap", addr);
    &MEMORY[index]
}

fn word_of(object: ObjectReference, index: usize) -> &'static AtomicUsize {
    word(object.to_raw_address() + index * BYTES_IN_WORD)
}

fn load_reference(addr: Address) -> Option<ObjectReference> {
    ObjectReference::from_raw_address(Address::from_usize(word(addr).load(Ordering::SeqCst)))
}

fn raw(object: Option<ObjectReference>) -> usize {
    object.map_or(0, |o| o.to_raw_address().as_usize())
}

/// A reference slot in the simulated heap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MockSlot(pub Address);

impl Slot for MockSlot {
    fn load(&self) -> Option<ObjectReference> {
        load_reference(self.0)
    }

    fn store(&self, object: Option<ObjectReference>) {
        word(self.0).store(raw(object), Ordering::SeqCst)
    }

    fn compare_exchange(&self, old: Option<ObjectReference>, new: Option<ObjectReference>) -> bool {
        word(self.0)
            .compare_exchange(raw(old), raw(new), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Bytes of an object with `slots` reference slots.
pub const fn object_size(slots: usize) -> usize {
    (2 + 2 * slots) * BYTES_IN_WORD
}

/// Number of reference slots of an object, or the length of an array.
pub fn num_slots(object: ObjectReference) -> usize {
    word_of(object, 1).load(Ordering::SeqCst) >> 1
}

fn field_index(meta: FieldMeta) -> usize {
    match meta {
        FieldMeta::Scalar(i) | FieldMeta::ArrayElement(i) => i,
    }
}

fn mark_address(object: ObjectReference, index: usize) -> Address {
    debug_assert!(index < num_slots(object));
    object.to_raw_address() + (2 + num_slots(object) + index) * BYTES_IN_WORD
}

impl ObjectModel<MockVM> for MockVM {
    fn prepare_available_bits(object: ObjectReference, order: Ordering) -> usize {
        word_of(object, 0).load(order)
    }

    fn attempt_available_bits(
        object: ObjectReference,
        old: usize,
        new: usize,
        success: Ordering,
        failure: Ordering,
    ) -> Result<usize, usize> {
        word_of(object, 0).compare_exchange(old, new, success, failure)
    }

    fn write_available_bits(object: ObjectReference, value: usize, order: Ordering) {
        word_of(object, 0).store(value, order)
    }

    fn is_field_unlogged(object: ObjectReference, meta: FieldMeta) -> bool {
        word(mark_address(object, field_index(meta))).load(Ordering::SeqCst) == 0
    }

    fn mark_field_as_logged(object: ObjectReference, meta: FieldMeta) -> Address {
        let mark = mark_address(object, field_index(meta));
        word(mark).store(1, Ordering::SeqCst);
        mark
    }

    fn mark_field_as_unlogged(mark: Address) {
        word(mark).store(0, Ordering::SeqCst)
    }

    fn mark_all_fields_as_unlogged(object: ObjectReference) {
        for i in 0..num_slots(object) {
            word(mark_address(object, i)).store(0, Ordering::SeqCst)
        }
    }

    fn is_array(object: ObjectReference) -> bool {
        word_of(object, 1).load(Ordering::SeqCst) & 1 != 0
    }

    fn array_length(object: ObjectReference) -> usize {
        num_slots(object)
    }

    fn get_current_size(object: ObjectReference) -> usize {
        object_size(num_slots(object))
    }

    fn ref_to_object_start(object: ObjectReference) -> Address {
        object.to_raw_address()
    }
}

impl Scanning<MockVM> for MockVM {
    fn scan_object<SV: SlotVisitor<MockSlot>>(object: ObjectReference, slot_visitor: &mut SV) {
        for i in 0..num_slots(object) {
            slot_visitor.visit_slot(slot(object, i));
        }
    }

    fn array_element_slot(array: ObjectReference, index: usize) -> MockSlot {
        slot(array, index)
    }

    fn scan_roots<F: FnMut(ObjectReference)>(mut report: F) {
        for root in mock!(scan_roots()) {
            report(root)
        }
    }
}

impl crate::vm::Collection<MockVM> for MockVM {
    fn out_of_memory(err_kind: AllocationError) {
        mock!(out_of_memory(err_kind))
    }
}

/// The page resources of the three spaces.
pub fn heap_resources() -> HeapResources {
    HeapResources {
        rc: Box::new(FreeListPageResource::new(RC_RANGE)),
        los: Box::new(FreeListPageResource::new(LOS_RANGE)),
        immortal: Box::new(FreeListPageResource::new(IMMORTAL_RANGE)),
    }
}

/// Write an empty object layout at `start`.
fn format_object(start: Address, slots: usize, is_array: bool) -> ObjectReference {
    for i in 0..object_size(slots) / BYTES_IN_WORD {
        word(start + i * BYTES_IN_WORD).store(0, Ordering::SeqCst);
    }
    word(start + BYTES_IN_WORD).store((slots << 1) | is_array as usize, Ordering::SeqCst);
    ObjectReference::from_raw_address_nonzero(start)
}

/// An object outside every space, for tests of the header protocol. The scratch area is
/// reused from its start once it is full.
pub fn scratch_object(slots: usize) -> ObjectReference {
    let bytes = object_size(slots);
    let extent = SCRATCH_RANGE.end - SCRATCH_RANGE.start;
    assert!(bytes <= extent);
    let offset = loop {
        let cursor = SCRATCH_CURSOR.load(Ordering::SeqCst);
        let (offset, next) = if cursor + bytes > extent {
            (0, bytes)
        } else {
            (cursor, cursor + bytes)
        };
        if SCRATCH_CURSOR
            .compare_exchange(cursor, next, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            break offset;
        }
    };
    format_object(SCRATCH_RANGE.start + offset, slots, false)
}

fn try_allocate(
    mutator: &mut Mutator<MockVM>,
    slots: usize,
    is_array: bool,
    semantics: AllocationSemantics,
) -> Option<ObjectReference> {
    let bytes = object_size(slots);
    let start = memory_manager::alloc(mutator, bytes, BYTES_IN_WORD, 0, semantics);
    if start.is_zero() {
        return None;
    }
    let object = format_object(start, slots, is_array);
    memory_manager::post_alloc(mutator, object, bytes, semantics);
    Some(object)
}

/// Allocate and initialize an object with `slots` null reference fields. `None` if the
/// allocation failed and the `out_of_memory` hook returned.
pub fn try_new_object(
    mutator: &mut Mutator<MockVM>,
    slots: usize,
    semantics: AllocationSemantics,
) -> Option<ObjectReference> {
    try_allocate(mutator, slots, false, semantics)
}

pub fn new_object(
    mutator: &mut Mutator<MockVM>,
    slots: usize,
    semantics: AllocationSemantics,
) -> ObjectReference {
    try_new_object(mutator, slots, semantics).expect("allocation failed")
}

/// Allocate and initialize a reference array of `length` null elements.
pub fn new_array(
    mutator: &mut Mutator<MockVM>,
    length: usize,
    semantics: AllocationSemantics,
) -> ObjectReference {
    try_allocate(mutator, length, true, semantics).expect("allocation failed")
}

/// Slot `index` of an object, or element `index` of an array.
pub fn slot(object: ObjectReference, index: usize) -> MockSlot {
    MockSlot(object.to_raw_address() + (2 + index) * BYTES_IN_WORD)
}

/// Store `target` into field `index` of `src` through the write barrier.
pub fn write_field(
    mutator: &mut Mutator<MockVM>,
    src: ObjectReference,
    index: usize,
    target: Option<ObjectReference>,
) {
    let meta = if MockVM::is_array(src) {
        FieldMeta::ArrayElement(index)
    } else {
        FieldMeta::Scalar(index)
    };
    memory_manager::object_reference_write(mutator, src, slot(src, index), target, meta);
}

/// Load field `index` of `object`, without any barrier.
pub fn read_field(object: ObjectReference, index: usize) -> Option<ObjectReference> {
    slot(object, index).load()
}
