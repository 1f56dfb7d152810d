use std::collections::HashMap;
use std::marker::PhantomData;

use crate::policy::space::Space;
use crate::util::constants::LOG_BYTES_IN_PAGE;
use crate::util::doubly_linked_list::DoublyLinkedList;
use crate::util::heap::PageResource;
use crate::util::{Address, ObjectReference};
use crate::vm::VMBinding;

/// Cells are page granular: an object's cell is its allocation start rounded down to a page.
pub const LOG_CELL_GRANULARITY: usize = LOG_BYTES_IN_PAGE as usize;
pub const CELL_MASK: usize = !((1 << LOG_CELL_GRANULARITY) - 1);

/// Decides, for each large object visited by [`LargeObjectSpace::sweep`], whether it is
/// reclaimed.
pub trait Sweeper {
    /// Return true to free the object.
    fn sweep_large_object(&mut self, object: ObjectReference) -> bool;
}

impl<F: FnMut(ObjectReference) -> bool> Sweeper for F {
    fn sweep_large_object(&mut self, object: ObjectReference) -> bool {
        self(object)
    }
}

#[derive(Debug)]
struct LargeObjectCell {
    object: ObjectReference,
    pages: usize,
}

/// Large objects are allocated a page-granular cell each, straight from the page resource.
/// Every initialized object is on a doubly linked cell list. An object leaves the list when it
/// is freed, either because its count dropped to zero or because a sweep reclaimed it, and its
/// pages go back to the page resource.
pub struct LargeObjectSpace<VM: VMBinding> {
    name: &'static str,
    pr: Box<dyn PageResource>,
    /// Cells handed to allocators whose objects have not been initialized yet.
    pending: spin::Mutex<HashMap<Address, usize>>,
    cells: spin::Mutex<DoublyLinkedList<LargeObjectCell>>,
    verbose: bool,
    _p: PhantomData<VM>,
}

impl<VM: VMBinding> Space<VM> for LargeObjectSpace<VM> {
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

pub fn get_cell<VM: VMBinding>(object: ObjectReference) -> Address {
    Address::from_usize(object.to_object_start::<VM>() & CELL_MASK)
}

impl<VM: VMBinding> LargeObjectSpace<VM> {
    pub fn new(name: &'static str, pr: Box<dyn PageResource>, verbose: bool) -> Self {
        LargeObjectSpace {
            name,
            pr,
            pending: spin::Mutex::new(HashMap::new()),
            cells: spin::Mutex::new(DoublyLinkedList::new()),
            verbose,
            _p: PhantomData,
        }
    }

    pub fn prepare(&self) {}

    pub fn release(&self) {}

    /// Acquire a cell of `pages` pages. Returns `Address::ZERO` if the page resource is
    /// exhausted.
    pub fn allocate_pages(&self, pages: usize) -> Address {
        match self.acquire(pages) {
            Some(start) => {
                self.pending.lock().insert(start, pages);
                start
            }
            None => Address::ZERO,
        }
    }

    /// Put a freshly allocated object on the cell list.
    pub fn initialize_header(&self, object: ObjectReference) {
        let cell = get_cell::<VM>(object);
        let pages = match self.pending.lock().remove(&cell) {
            Some(pages) => pages,
            None => panic!("{}: {} was not allocated in this space", self.name, object),
        };
        trace!("{}: add {} (cell {}, {} pages)", self.name, object, cell, pages);
        self.cells.lock().add(cell, LargeObjectCell { object, pages });
    }

    /// Unlink the object's cell and release its pages.
    pub fn free(&self, object: ObjectReference) {
        let cell = get_cell::<VM>(object);
        let removed = self.cells.lock().remove(cell);
        let Some(LargeObjectCell { object: o, pages }) = removed else {
            panic!("{}: free of {} which is not on the cell list", self.name, object);
        };
        debug_assert_eq!(o, object);
        if self.verbose {
            info!("{}: free {} (cell {}, {} pages)", self.name, object, cell, pages);
        } else {
            trace!("{}: free {} (cell {}, {} pages)", self.name, object, cell, pages);
        }
        self.pr.release_pages(cell, pages);
    }

    /// Walk the cell list once and free every object the sweeper selects. Returns the number of
    /// objects freed.
    pub fn sweep<S: Sweeper>(&self, sweeper: &mut S) -> usize {
        let mut freed = 0;
        let mut cursor = self.cells.lock().head();
        while let Some(cell) = cursor {
            // Find the successor before the cell can be unlinked by `free`.
            let (object, next) = {
                let cells = self.cells.lock();
                (cells.get(cell).map(|c| c.object), cells.next(cell))
            };
            cursor = next;
            let Some(object) = object else {
                continue;
            };
            if sweeper.sweep_large_object(object) {
                self.free(object);
                freed += 1;
            } else {
                trace!("{}: retain {}", self.name, object);
            }
        }
        debug!("{}: sweep freed {} objects", self.name, freed);
        freed
    }

    /// Large objects are only ever reclaimed explicitly, by `free` or a sweep.
    pub fn is_live(&self, _object: ObjectReference) -> bool {
        true
    }

    /// Is the object on the cell list?
    pub fn contains(&self, object: ObjectReference) -> bool {
        self.cells
            .lock()
            .get(get_cell::<VM>(object))
            .is_some_and(|c| c.object == object)
    }

    /// Number of objects on the cell list.
    pub fn len(&self) -> usize {
        self.cells.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the objects on the cell list, from head to tail.
    pub fn objects(&self) -> Vec<ObjectReference> {
        self.cells.lock().iter().map(|(_, c)| c.object).collect()
    }
}
