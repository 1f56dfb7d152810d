// Some tests are conditionally compiled. So not all the code in this module will be used.
// We simply allow dead code in this module.
#![allow(dead_code)]

use std::sync::Arc;

use crate::memory_manager;
use crate::plan::Mutator;
use crate::util::test_util::mock_vm::{heap_resources, MockVM};
use crate::MMTKBuilder;
use crate::MMTK;

/// An MMTk instance over the mock heap, with one bound mutator.
pub struct MutatorFixture {
    pub mmtk: Arc<MMTK<MockVM>>,
    pub mutator: Box<Mutator<MockVM>>,
}

impl MutatorFixture {
    /// Two collector threads, default options otherwise.
    pub fn create() -> Self {
        Self::create_with_builder(|_| {})
    }

    pub fn create_with_builder<F>(with_builder: F) -> Self
    where
        F: FnOnce(&mut MMTKBuilder),
    {
        let mut builder = MMTKBuilder::new_no_env_vars();
        builder.options.threads = 2;
        with_builder(&mut builder);
        let mmtk = memory_manager::mmtk_init::<MockVM>(&builder, heap_resources());
        let mutator = memory_manager::bind_mutator(&mmtk);
        MutatorFixture { mmtk, mutator }
    }

    /// Bind another mutator to the same instance.
    pub fn bind_mutator(&self) -> Box<Mutator<MockVM>> {
        memory_manager::bind_mutator(&self.mmtk)
    }

    /// Run one increment with the fixture's mutator as the only mutator.
    pub fn collect(&mut self, kind: crate::CollectionKind) {
        memory_manager::collect(&self.mmtk, &mut [&mut *self.mutator], kind);
    }
}
