use super::mock_test_prelude::*;

#[test]
#[should_panic(expected = "Per-mutator phase not handled: BackupTrace")]
pub fn mutator_rejects_global_phase() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            fixture.mutator.collection_phase(Phase::BackupTrace);
        },
        no_cleanup,
    )
}

#[test]
#[should_panic(expected = "Per-collector phase not handled: Initiate")]
pub fn collector_rejects_global_phase() {
    with_mockvm(
        default_setup,
        || {
            let fixture = MutatorFixture::create();
            let mut collector = memory_manager::bind_collector(&fixture.mmtk, 1);
            collector.collection_phase(Phase::Initiate);
        },
        no_cleanup,
    )
}

#[test]
#[should_panic(expected = "Global phase not handled: ProcessModBuffer")]
pub fn plan_rejects_collector_phase() {
    with_mockvm(
        default_setup,
        || {
            let fixture = MutatorFixture::create();
            memory_manager::global_collection_phase(&fixture.mmtk, Phase::ProcessModBuffer);
        },
        no_cleanup,
    )
}
