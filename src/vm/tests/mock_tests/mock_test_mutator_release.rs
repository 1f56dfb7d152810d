use super::mock_test_prelude::*;

/// A mutator whose buffers still hold entries at `Release` missed a flush.
#[test]
#[should_panic(expected = "Mutator buffers are not flushed at Release")]
pub fn release_with_pending_entries() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            fixture.mutator.collection_phase(Phase::Release);
        },
        no_cleanup,
    )
}

#[test]
#[should_panic(expected = "Mutator remembered sets are not flushed")]
pub fn remsets_not_flushed() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            memory_manager::assert_remsets_flushed(&fixture.mutator);
        },
        no_cleanup,
    )
}

#[test]
pub fn destroy_flushes() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let mut mutator = fixture.bind_mutator();
            let o = new_object(&mut mutator, 0, AllocationSemantics::Default);
            memory_manager::flush_remembered_sets(&mut fixture.mutator);
            memory_manager::destroy_mutator(mutator);
            // The dead mutator's decrement is processed by the next increment.
            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, o));
        },
        no_cleanup,
    )
}
