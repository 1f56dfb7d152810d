use super::mock_test_prelude::*;
use crate::plan::phase::{Schedule, RC_SCHEDULE};

/// A binding can drive the schedule itself, one step at a time, instead of calling `collect`.
#[test]
pub fn drive_schedule_by_hand() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let x = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            let y = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            write_field(&mut fixture.mutator, x, 0, Some(y));
            set_roots(vec![x]);

            let mmtk = fixture.mmtk.clone();
            let mut collector = memory_manager::bind_collector(&mmtk, 0);
            assert!(collector.is_primary());
            memory_manager::request_collection(&mmtk, CollectionKind::Increment, 1);
            for (schedule, phase) in RC_SCHEDULE {
                match schedule {
                    Schedule::Global => memory_manager::global_collection_phase(&mmtk, *phase),
                    Schedule::Mutator => fixture.mutator.collection_phase(*phase),
                    Schedule::Collector => collector.collection_phase(*phase),
                }
                if *phase == Phase::Initiate {
                    assert!(mmtk.state().is_gc_in_progress());
                }
            }
            assert!(!mmtk.state().is_gc_in_progress());
            assert_eq!(mmtk.state().increments(), 1);
            assert_eq!(memory_manager::reference_count::<MockVM>(x), 1);
            assert_eq!(memory_manager::reference_count::<MockVM>(y), 1);
        },
        no_cleanup,
    )
}

#[test]
#[should_panic(expected = "An increment is already in progress")]
pub fn nested_initiate() {
    with_mockvm(
        default_setup,
        || {
            let fixture = MutatorFixture::create();
            memory_manager::global_collection_phase(&fixture.mmtk, Phase::Initiate);
            memory_manager::global_collection_phase(&fixture.mmtk, Phase::Initiate);
        },
        no_cleanup,
    )
}
