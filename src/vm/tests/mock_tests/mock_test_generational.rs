use super::mock_test_prelude::*;
use crate::util::options::RcFlavor;

fn create() -> MutatorFixture {
    MutatorFixture::create_with_builder(|builder| {
        builder.options.rc_flavor = RcFlavor::Generational;
    })
}

/// New objects are born logged, so writes to them skip the barrier, and their referents are
/// counted at the next increment whether or not they survive.
#[test]
pub fn new_objects_are_logged() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = create();
            let a = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            let b = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            assert!(memory_manager::is_logged::<MockVM>(a));
            assert!(!crate::plan::rc::header::is_new::<MockVM>(a));
            write_field(&mut fixture.mutator, a, 0, Some(b));

            memory_manager::flush(&mut fixture.mutator);
            let pools = &fixture.mmtk.get_plan().pools;
            assert_eq!(pools.mod_objects.len(), 2);
            assert_eq!(pools.decs.len(), 2);

            set_roots(vec![a]);
            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_logged::<MockVM>(a));
            assert_eq!(memory_manager::reference_count::<MockVM>(a), 1);
            assert_eq!(memory_manager::reference_count::<MockVM>(b), 1);
        },
        no_cleanup,
    )
}

/// A dead new object still decrements what it referenced.
#[test]
pub fn dead_new_object_releases_referents() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = create();
            let a = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            let b = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            write_field(&mut fixture.mutator, a, 0, Some(b));
            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, a));
            assert!(!memory_manager::is_live_object(&fixture.mmtk, b));
        },
        no_cleanup,
    )
}
