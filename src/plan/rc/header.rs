//! The per-object header word of the reference counting plan.
//!
//! ```text
//!  BITS_IN_ADDRESS-1          COUNT_SHIFT+COUNT_BITS  COUNT_SHIFT        3      2     1       0
//! +------------------------+----------------------+-----------+------+-----+-------+--------+
//! |        (unused)        |    reference count   | (unused)  | MARK | NEW | BEING | LOGGED |
//! +------------------------+----------------------+-----------+------+-----+-------+--------+
//! ```
//!
//! The binding stores the word wherever it likes and exposes it through the `*_available_bits`
//! methods of [`crate::vm::ObjectModel`]. Every mutation in this module is a compare-and-swap
//! retry loop on that word, and nothing else in the crate interprets its bits.
//!
//! `LOGGED` is only ever set by the thread holding `BEING_LOGGED`, and `BEING_LOGGED` is only
//! cleared by the thread that set it, after it finished pushing to the buffers. A thread that
//! finds `BEING_LOGGED` set waits until the holder is done, so that the holder's scan of the
//! old referents happens before any other thread overwrites them.

use std::sync::atomic::Ordering;

use crate::util::constants::BITS_IN_ADDRESS;
use crate::util::ObjectReference;
use crate::vm::{ObjectModel, VMBinding};

/// The object was logged in this increment.
pub const LOGGED: usize = 1 << 0;
/// A thread is logging the object, or one of its fields.
pub const BEING_LOGGED: usize = 1 << 1;
/// The object was allocated in this increment and has not been scanned for increments yet.
pub const NEW: usize = 1 << 2;
/// Backup trace mark.
pub const MARK: usize = 1 << 3;

pub const COUNT_SHIFT: usize = 8;
pub const COUNT_BITS: usize = 16;
/// A count at this value is stuck: it is never incremented, decremented or reclaimed by
/// counting. Only the backup trace can free a stuck object.
pub const MAX_REF_COUNT: usize = (1 << COUNT_BITS) - 1;
const INCREMENT: usize = 1 << COUNT_SHIFT;
const COUNT_MASK: usize = MAX_REF_COUNT << COUNT_SHIFT;

static_assertions::const_assert!(MARK < INCREMENT);
static_assertions::const_assert!(COUNT_SHIFT + COUNT_BITS <= BITS_IN_ADDRESS);

/// Result of [`inc_rc`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IncResult {
    /// The count was incremented.
    Inc,
    /// The count was incremented, and this was the first increment of a new object. The
    /// object's own referents have not been counted yet.
    IncNew,
}

/// Result of [`dec_rc`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecResult {
    /// The count was decremented, or the object is stuck.
    Dec,
    /// The count dropped to zero. The caller owns the object's reclamation.
    DecToZero,
}

#[inline(always)]
fn load<VM: VMBinding>(object: ObjectReference) -> usize {
    VM::VMObjectModel::prepare_available_bits(object, Ordering::SeqCst)
}

#[inline(always)]
fn count_of(header: usize) -> usize {
    (header & COUNT_MASK) >> COUNT_SHIFT
}

/// Apply `f` to the header word until the compare-and-swap succeeds, like
/// [`std::sync::atomic::AtomicUsize::fetch_update`]. `f` returning `None` leaves the word
/// unchanged and yields `Err` with the current value.
#[inline(always)]
fn fetch_update<VM: VMBinding, F>(object: ObjectReference, mut f: F) -> Result<usize, usize>
where
    F: FnMut(usize) -> Option<usize>,
{
    let mut old = load::<VM>(object);
    while let Some(new) = f(old) {
        match VM::VMObjectModel::attempt_available_bits(
            object,
            old,
            new,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => return Ok(old),
            Err(actual) => old = actual,
        }
    }
    Err(old)
}

/// Initialize the header of a freshly allocated object. The object must not be visible to
/// other threads yet.
pub fn init_header<VM: VMBinding>(object: ObjectReference, count: usize, logged: bool, new: bool) {
    debug_assert!(count <= MAX_REF_COUNT);
    let mut header = count << COUNT_SHIFT;
    if logged {
        header |= LOGGED;
    }
    if new {
        header |= NEW;
    }
    VM::VMObjectModel::write_available_bits(object, header, Ordering::SeqCst);
}

pub fn read_count<VM: VMBinding>(object: ObjectReference) -> usize {
    count_of(load::<VM>(object))
}

pub fn is_stuck<VM: VMBinding>(object: ObjectReference) -> bool {
    read_count::<VM>(object) == MAX_REF_COUNT
}

pub fn is_new<VM: VMBinding>(object: ObjectReference) -> bool {
    load::<VM>(object) & NEW != 0
}

pub fn is_logged<VM: VMBinding>(object: ObjectReference) -> bool {
    load::<VM>(object) & LOGGED != 0
}

/// Increment the count and consume the `NEW` bit.
pub fn inc_rc<VM: VMBinding>(object: ObjectReference) -> IncResult {
    let old = fetch_update::<VM, _>(object, |h| {
        if count_of(h) == MAX_REF_COUNT {
            // stuck
            (h & NEW != 0).then_some(h & !NEW)
        } else {
            Some((h + INCREMENT) & !NEW)
        }
    });
    match old {
        Ok(h) if h & NEW != 0 => IncResult::IncNew,
        _ => IncResult::Inc,
    }
}

/// Decrement the count. Stuck objects are left alone.
pub fn dec_rc<VM: VMBinding>(object: ObjectReference) -> DecResult {
    let old = fetch_update::<VM, _>(object, |h| match count_of(h) {
        0 | MAX_REF_COUNT => None,
        _ => Some(h - INCREMENT),
    });
    match old {
        Ok(h) if count_of(h) == 1 => DecResult::DecToZero,
        Ok(_) => DecResult::Dec,
        Err(h) => {
            debug_assert!(count_of(h) != 0, "decrement of {} with a zero count", object);
            DecResult::Dec
        }
    }
}

/// The barrier fast path test: does a write to this object need logging?
#[inline(always)]
pub fn log_required<VM: VMBinding>(object: ObjectReference) -> bool {
    load::<VM>(object) & (LOGGED | NEW) == 0
}

/// Set `BEING_LOGGED` on an object that is neither logged nor new. Spins while another thread
/// holds the lock. Returns false once the object turns out to be logged or new.
fn acquire_logging_lock<VM: VMBinding>(object: ObjectReference) -> bool {
    loop {
        let old = load::<VM>(object);
        if old & (LOGGED | NEW) != 0 {
            return false;
        }
        if old & BEING_LOGGED != 0 {
            std::hint::spin_loop();
            continue;
        }
        if VM::VMObjectModel::attempt_available_bits(
            object,
            old,
            old | BEING_LOGGED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        )
        .is_ok()
        {
            return true;
        }
    }
}

/// Try to take the logging lock of an unlogged object. Returns true if the caller now holds
/// `BEING_LOGGED` and must log the object, then call [`make_logged`]. Returns false if the
/// object is logged, or is new and needs no logging. While another thread holds the lock this
/// spins until that thread is done, and then tries again.
pub fn attempt_to_log_object<VM: VMBinding>(object: ObjectReference) -> bool {
    acquire_logging_lock::<VM>(object)
}

/// Set `LOGGED` and release the logging lock.
pub fn make_logged<VM: VMBinding>(object: ObjectReference) {
    let old = fetch_update::<VM, _>(object, |h| Some((h | LOGGED) & !BEING_LOGGED));
    debug_assert!(
        old.is_ok_and(|h| h & BEING_LOGGED != 0),
        "{} logged without holding the lock",
        object
    );
}

/// Take the logging lock of an object to log one of its fields. Returns false, without taking
/// the lock, if the object is new or logged as a whole: every field of such an object is
/// scanned at the next increment anyway.
pub fn prepare_to_log_field_in_object<VM: VMBinding>(object: ObjectReference) -> bool {
    acquire_logging_lock::<VM>(object)
}

/// Release the logging lock without setting `LOGGED`.
pub fn finish_logging<VM: VMBinding>(object: ObjectReference) {
    let old = fetch_update::<VM, _>(object, |h| Some(h & !BEING_LOGGED));
    debug_assert!(old.is_ok_and(|h| h & BEING_LOGGED != 0));
}

/// Clear `LOGGED`. Returns whether it was set.
pub fn make_unlogged<VM: VMBinding>(object: ObjectReference) -> bool {
    fetch_update::<VM, _>(object, |h| (h & LOGGED != 0).then_some(h & !LOGGED)).is_ok()
}

/// Set the mark bit. Returns true if this call marked the object.
pub fn test_and_mark<VM: VMBinding>(object: ObjectReference) -> bool {
    fetch_update::<VM, _>(object, |h| (h & MARK == 0).then_some(h | MARK)).is_ok()
}

pub fn clear_mark<VM: VMBinding>(object: ObjectReference) {
    let _ = fetch_update::<VM, _>(object, |h| (h & MARK != 0).then_some(h & !MARK));
}

pub fn is_marked<VM: VMBinding>(object: ObjectReference) -> bool {
    load::<VM>(object) & MARK != 0
}

/// Zero the count and clear `NEW`, so that the backup trace can recount the object. Stuck
/// objects keep their count.
pub fn reset_count_for_trace<VM: VMBinding>(object: ObjectReference) {
    let _ = fetch_update::<VM, _>(object, |h| {
        if count_of(h) == MAX_REF_COUNT {
            Some(h & !NEW)
        } else {
            Some(h & !(COUNT_MASK | NEW))
        }
    });
}
