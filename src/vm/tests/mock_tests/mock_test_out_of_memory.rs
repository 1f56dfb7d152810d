use super::mock_test_prelude::*;
use crate::util::alloc::AllocationError;

/// Larger than the large object space.
const HUGE: usize = 1 << 19;

#[test]
pub fn out_of_memory_is_reported() {
    with_mockvm(
        || -> MockVM {
            MockVM {
                out_of_memory: MockMethod::new_fixed(Box::new(|err| {
                    assert_eq!(err, AllocationError::HeapOutOfMemory)
                })),
                ..MockVM::default()
            }
        },
        || {
            let mut fixture = MutatorFixture::create();
            let o = try_new_object(&mut fixture.mutator, HUGE, AllocationSemantics::Default);
            assert!(o.is_none());
            // The heap is still usable.
            let o = try_new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            assert!(o.is_some());
        },
        || {
            read_mockvm(|mock| assert_eq!(mock.out_of_memory.call_count(), 1));
        },
    )
}

#[test]
#[should_panic(expected = "Out of memory with HeapOutOfMemory!")]
pub fn out_of_memory_panics_by_default() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            try_new_object(&mut fixture.mutator, HUGE, AllocationSemantics::Los);
        },
        no_cleanup,
    )
}

#[test]
#[should_panic(expected = "Allocator not understood by RC: ReadOnly")]
pub fn read_only_semantics() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            memory_manager::alloc(&mut fixture.mutator, 16, 8, 0, AllocationSemantics::ReadOnly);
        },
        no_cleanup,
    )
}
