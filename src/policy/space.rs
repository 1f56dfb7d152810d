use crate::util::heap::PageResource;
use crate::util::{Address, ObjectReference};
use crate::vm::VMBinding;

/// A region of the heap managed by one policy. Every space draws its pages from its own
/// [`PageResource`], so membership is an address range check.
pub trait Space<VM: VMBinding>: Send + Sync {
    fn get_name(&self) -> &'static str;

    fn get_page_resource(&self) -> &dyn PageResource;

    /// Are objects in this space reference counted?
    fn is_rc_space(&self) -> bool;

    /// Acquire pages for an allocator. Returns `None` if the page resource is exhausted.
    fn acquire(&self, pages: usize) -> Option<Address> {
        let start = self.get_page_resource().acquire_pages(pages);
        match start {
            Some(start) => trace!("{}: acquired {} pages at {}", self.get_name(), pages, start),
            None => debug!("{}: failed to acquire {} pages", self.get_name(), pages),
        }
        start
    }

    fn address_in_space(&self, start: Address) -> bool {
        self.get_page_resource().contains(start)
    }

    fn in_space(&self, object: ObjectReference) -> bool {
        self.address_in_space(object.to_object_start::<VM>())
    }

    fn reserved_pages(&self) -> usize {
        self.get_page_resource().reserved_pages()
    }
}
