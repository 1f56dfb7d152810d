use super::mock_test_prelude::*;
use crate::policy::rcspace::MAX_CELL_SIZE;
use crate::policy::space::Space;

/// Large enough to spill out of the size classes of the RC space.
const LENGTH: usize = 1000;

/// Large objects are reference counted like small ones, and their pages are released when
/// they die.
#[test]
pub fn large_array_lifecycle() {
    with_mockvm(
        default_setup,
        || {
            assert!(object_size(LENGTH) > MAX_CELL_SIZE);
            let mut fixture = MutatorFixture::create();
            let mmtk = fixture.mmtk.clone();
            let plan = mmtk.get_plan();
            let big = new_array(&mut fixture.mutator, LENGTH, AllocationSemantics::Default);
            assert!(plan.los.contains(big));
            assert!(plan.is_rc_object(big));
            let pages = memory_manager::get_reserved_pages(&fixture.mmtk);
            assert!(pages >= 4);

            let small = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            write_field(&mut fixture.mutator, big, LENGTH - 1, Some(small));
            set_roots(vec![big]);
            fixture.collect(CollectionKind::Increment);
            assert_eq!(memory_manager::reference_count::<MockVM>(big), 1);
            assert_eq!(memory_manager::reference_count::<MockVM>(small), 1);

            set_roots(vec![]);
            fixture.collect(CollectionKind::Increment);
            assert!(!plan.los.contains(big));
            assert!(plan.los.is_empty());
            assert!(!memory_manager::is_live_object(&fixture.mmtk, small));
            assert_eq!(plan.los.reserved_pages(), 0);
        },
        no_cleanup,
    )
}

/// The `Los` semantics put even a small object in the large object space.
#[test]
pub fn small_object_in_los() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let o = new_object(&mut fixture.mutator, 1, AllocationSemantics::Los);
            let mmtk = fixture.mmtk.clone();
            let plan = mmtk.get_plan();
            assert!(plan.los.contains(o));
            assert_eq!(plan.los.len(), 1);
            fixture.collect(CollectionKind::Increment);
            assert!(plan.los.is_empty());
        },
        no_cleanup,
    )
}
