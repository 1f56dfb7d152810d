use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use atomic::Atomic;

use crate::plan::CollectionKind;

/// This stores some global states for an MMTK instance.
/// The plan and the collector contexts read it to decide what the current increment does.
pub struct GlobalState {
    /// Is an increment in progress? Set at `Initiate`, cleared at `Complete`.
    pub(crate) gc_in_progress: AtomicBool,
    /// The kind requested for the next increment.
    pub(crate) requested_kind: Atomic<CollectionKind>,
    /// Does the current increment run the backup trace? Elected at `SetCollectionKind`.
    pub(crate) cycle_collection: AtomicBool,
    /// Completed increments.
    pub(crate) increments: AtomicUsize,
    /// Completed increments that ran the backup trace.
    pub(crate) cycle_collections: AtomicUsize,
    /// Number of collector contexts that drain the pools in the current increment.
    pub(crate) collectors: AtomicUsize,
}

impl GlobalState {
    /// Record a collection request. `collectors` contexts will run the collector phases.
    pub fn request_collection(&self, kind: CollectionKind, collectors: usize) {
        debug_assert!(collectors > 0);
        self.requested_kind.store(kind, Ordering::SeqCst);
        self.collectors.store(collectors, Ordering::SeqCst);
    }

    /// Decide whether the next increment collects cycles: it does if it was requested, or if
    /// the increment is due by `interval` (0 disables the periodic election).
    pub(crate) fn elect_collection_kind(&self, interval: usize) -> bool {
        let requested = self.requested_kind.load(Ordering::SeqCst) == CollectionKind::Cycle;
        let due = interval != 0 && (self.increments() + 1) % interval == 0;
        let cycle = requested || due;
        self.cycle_collection.store(cycle, Ordering::SeqCst);
        cycle
    }

    pub fn is_cycle_collection(&self) -> bool {
        self.cycle_collection.load(Ordering::SeqCst)
    }

    pub fn is_gc_in_progress(&self) -> bool {
        self.gc_in_progress.load(Ordering::SeqCst)
    }

    pub fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    pub fn cycle_collections(&self) -> usize {
        self.cycle_collections.load(Ordering::SeqCst)
    }

    pub fn collectors(&self) -> usize {
        self.collectors.load(Ordering::SeqCst)
    }

    pub(crate) fn begin_increment(&self) {
        let was = self.gc_in_progress.swap(true, Ordering::SeqCst);
        assert!(!was, "An increment is already in progress");
    }

    pub(crate) fn end_increment(&self) {
        self.increments.fetch_add(1, Ordering::SeqCst);
        if self.cycle_collection.swap(false, Ordering::SeqCst) {
            self.cycle_collections.fetch_add(1, Ordering::SeqCst);
        }
        self.requested_kind
            .store(CollectionKind::Increment, Ordering::SeqCst);
        self.gc_in_progress.store(false, Ordering::SeqCst);
    }
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            gc_in_progress: AtomicBool::new(false),
            requested_kind: Atomic::new(CollectionKind::Increment),
            cycle_collection: AtomicBool::new(false),
            increments: AtomicUsize::new(0),
            cycle_collections: AtomicUsize::new(0),
            collectors: AtomicUsize::new(1),
        }
    }
}
