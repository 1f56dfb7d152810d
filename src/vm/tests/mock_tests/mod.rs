// Mock tests can be placed anywhere in the source directory `src` or the test directory `tests`.
// * They need to be conditionally compiled for tests. Otherwise they cannot access `MockVM`.
// * They should have the prefix 'mock_test_' in their file name so they will be picked up by the
//   CI testing scripts.

// Common includes for mock tests.
pub(crate) mod mock_test_prelude {
    pub use crate::memory_manager;
    pub use crate::plan::phase::Phase;
    pub use crate::util::test_util::fixtures::*;
    pub use crate::util::test_util::mock_method::*;
    pub use crate::util::test_util::mock_vm::*;
    pub use crate::util::ObjectReference;
    pub use crate::vm::*;
    pub use crate::{AllocationSemantics, CollectionKind};
}

mod mock_test_barrier_log_once;
mod mock_test_bulk_copy;
mod mock_test_compare_and_swap;
mod mock_test_conservation;
mod mock_test_field_barrier;
mod mock_test_generational;
mod mock_test_increment_scenario;
mod mock_test_large_object;
mod mock_test_manual_phases;
mod mock_test_mutator_release;
mod mock_test_out_of_memory;
mod mock_test_roots;
mod mock_test_unknown_phase;
