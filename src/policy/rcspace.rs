use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use crate::policy::space::Space;
use crate::util::constants::BYTES_IN_PAGE;
use crate::util::conversions::page_align_down;
use crate::util::heap::PageResource;
use crate::util::{Address, ObjectReference};
use crate::vm::VMBinding;

/// log2 of the smallest cell.
pub const LOG_MIN_CELL_SIZE: usize = 4;
/// log2 of the largest cell. Anything larger goes to the large object space.
pub const LOG_MAX_CELL_SIZE: usize = 11;
pub const MAX_CELL_SIZE: usize = 1 << LOG_MAX_CELL_SIZE;
pub const NUM_SIZE_CLASSES: usize = LOG_MAX_CELL_SIZE - LOG_MIN_CELL_SIZE + 1;

const LOG_LIVE_SHARDS: usize = 4;
const LIVE_SHARDS: usize = 1 << LOG_LIVE_SHARDS;

static_assertions::const_assert!(MAX_CELL_SIZE <= BYTES_IN_PAGE);

/// The size class serving `bytes`, or `None` if `bytes` exceeds [`MAX_CELL_SIZE`].
pub fn size_class(bytes: usize) -> Option<usize> {
    if bytes > MAX_CELL_SIZE {
        return None;
    }
    let log = bytes
        .max(1 << LOG_MIN_CELL_SIZE)
        .next_power_of_two()
        .trailing_zeros() as usize;
    Some(log - LOG_MIN_CELL_SIZE)
}

pub const fn cell_size(class: usize) -> usize {
    1 << (class + LOG_MIN_CELL_SIZE)
}

/// The space of reference counted small objects.
///
/// Pages are carved into cells of one power-of-two size class each, and free cells sit on one
/// global list per class. Thread-local allocators take cells in batches (see
/// [`crate::util::alloc::FreeListAllocator`]). A freed cell goes straight back to its class
/// list: reference counting frees objects one at a time, so there is no bulk sweep of blocks.
///
/// The space also keeps the set of live objects. The backup trace sweeps that set, and tests
/// use it to check that nothing leaks and nothing is freed twice.
pub struct RcSpace<VM: VMBinding> {
    name: &'static str,
    pr: Box<dyn PageResource>,
    free_lists: [spin::Mutex<Vec<Address>>; NUM_SIZE_CLASSES],
    page_classes: spin::Mutex<HashMap<Address, usize>>,
    live: [spin::Mutex<HashSet<ObjectReference>>; LIVE_SHARDS],
    _p: PhantomData<VM>,
}

impl<VM: VMBinding> Space<VM> for RcSpace<VM> {
    fn get_name(&self) -> &'static str {
        self.name
    }

    fn get_page_resource(&self) -> &dyn PageResource {
        self.pr.as_ref()
    }

    fn is_rc_space(&self) -> bool {
        true
    }
}

impl<VM: VMBinding> RcSpace<VM> {
    pub fn new(name: &'static str, pr: Box<dyn PageResource>) -> Self {
        RcSpace {
            name,
            pr,
            free_lists: std::array::from_fn(|_| spin::Mutex::new(vec![])),
            page_classes: spin::Mutex::new(HashMap::new()),
            live: std::array::from_fn(|_| spin::Mutex::new(HashSet::new())),
            _p: PhantomData,
        }
    }

    fn live_shard(&self, object: ObjectReference) -> &spin::Mutex<HashSet<ObjectReference>> {
        let index = (object.to_raw_address() >> LOG_MIN_CELL_SIZE) & (LIVE_SHARDS - 1);
        &self.live[index]
    }

    /// Take up to `max` free cells of the given class. Carves a fresh page if the class list is
    /// empty. Returns an empty vector if the page resource is exhausted.
    pub fn acquire_cells(&self, class: usize, max: usize) -> Vec<Address> {
        debug_assert!(class < NUM_SIZE_CLASSES);
        {
            let mut list = self.free_lists[class].lock();
            if !list.is_empty() {
                let keep = list.len().saturating_sub(max);
                return list.split_off(keep);
            }
        }
        let Some(page) = self.acquire(1) else {
            return vec![];
        };
        self.page_classes.lock().insert(page, class);
        let size = cell_size(class);
        let mut cells: Vec<Address> = (0..BYTES_IN_PAGE / size)
            .rev()
            .map(|i| page + i * size)
            .collect();
        if cells.len() > max {
            let rest = cells.split_off(max);
            self.free_lists[class].lock().extend(rest);
        }
        trace!(
            "{}: carved page {} into {} cells of {} bytes",
            self.name,
            page,
            BYTES_IN_PAGE / size,
            size
        );
        cells
    }

    /// Give unused cells back, e.g. the cache of an allocator at `Release`.
    pub fn return_cells(&self, class: usize, cells: Vec<Address>) {
        if !cells.is_empty() {
            self.free_lists[class].lock().extend(cells);
        }
    }

    /// The size class of the page holding `addr`.
    fn class_of(&self, addr: Address) -> Option<usize> {
        self.page_classes.lock().get(&page_align_down(addr)).copied()
    }

    /// Record a freshly allocated object.
    pub fn set_live(&self, object: ObjectReference) {
        let fresh = self.live_shard(object).lock().insert(object);
        debug_assert!(fresh, "{} is already live", object);
    }

    pub fn is_live(&self, object: ObjectReference) -> bool {
        self.live_shard(object).lock().contains(&object)
    }

    /// Return the object's cell to its size class.
    ///
    /// # Panics
    /// Panics if the object is not live. An object is freed exactly once.
    pub fn free(&self, object: ObjectReference) {
        if !self.live_shard(object).lock().remove(&object) {
            panic!("{}: free of {} which is not live", self.name, object);
        }
        let start = object.to_object_start::<VM>();
        let Some(class) = self.class_of(start) else {
            panic!("{}: {} is not in a carved page", self.name, object);
        };
        let cell = start.align_down(cell_size(class));
        trace!("{}: free {} (cell {})", self.name, object, cell);
        self.free_lists[class].lock().push(cell);
    }

    /// Snapshot of the live set.
    pub fn live_objects(&self) -> Vec<ObjectReference> {
        self.live
            .iter()
            .flat_map(|shard| shard.lock().iter().copied().collect::<Vec<_>>())
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.live.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Free every live object the predicate selects. Returns the number freed.
    pub fn sweep<F: FnMut(ObjectReference) -> bool>(&self, mut reclaim: F) -> usize {
        let mut freed = 0;
        for object in self.live_objects() {
            if reclaim(object) {
                self.free(object);
                freed += 1;
            }
        }
        debug!("{}: sweep freed {} objects", self.name, freed);
        freed
    }

    /// Number of free cells of a class. Used by tests.
    pub fn free_cells(&self, class: usize) -> usize {
        self.free_lists[class].lock().len()
    }
}
