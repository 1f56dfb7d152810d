use std::marker::PhantomData;

use crate::policy::space::Space;
use crate::util::heap::PageResource;
use crate::util::ObjectReference;
use crate::vm::VMBinding;

/// Objects in this space are never freed. They are not reference counted, but they act as
/// roots: their referents are counted like any other heap reference, and the backup trace
/// starts from every immortal object.
pub struct ImmortalSpace<VM: VMBinding> {
    name: &'static str,
    pr: Box<dyn PageResource>,
    /// Every object allocated in this space, for linear scanning.
    objects: spin::Mutex<Vec<ObjectReference>>,
    _p: PhantomData<VM>,
}

impl<VM: VMBinding> Space<VM> for ImmortalSpace<VM> {
    fn get_name(&self) -> &'static str {
        self.name
    }

    fn get_page_resource(&self) -> &dyn PageResource {
        self.pr.as_ref()
    }

    fn is_rc_space(&self) -> bool {
        false
    }
}

impl<VM: VMBinding> ImmortalSpace<VM> {
    pub fn new(name: &'static str, pr: Box<dyn PageResource>) -> Self {
        ImmortalSpace {
            name,
            pr,
            objects: spin::Mutex::new(vec![]),
            _p: PhantomData,
        }
    }

    pub fn initialize_object_metadata(&self, object: ObjectReference) {
        self.objects.lock().push(object);
    }

    /// Visit every object allocated in this space.
    pub fn linear_scan<F: FnMut(ObjectReference)>(&self, mut f: F) {
        // Snapshot, so the callback may allocate.
        let objects = self.objects.lock().clone();
        for object in objects {
            f(object)
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
