use super::mock_test_prelude::*;

fn count(object: ObjectReference) -> usize {
    memory_manager::reference_count::<MockVM>(object)
}

/// A root is counted once per report, and only until the next increment.
#[test]
pub fn roots_are_deferred() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let o = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            set_roots(vec![o, o]);
            fixture.collect(CollectionKind::Increment);
            assert_eq!(count(o), 2);

            set_roots(vec![o]);
            fixture.collect(CollectionKind::Increment);
            assert_eq!(count(o), 1);

            set_roots(vec![]);
            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, o));
        },
        no_cleanup,
    )
}

/// The roots are scanned once per increment, by the primary collector.
#[test]
pub fn roots_scanned_once() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create_with_builder(|builder| {
                builder.options.threads = 4;
            });
            fixture.collect(CollectionKind::Increment);
            fixture.collect(CollectionKind::Cycle);
        },
        || read_mockvm(|mock| assert_eq!(mock.scan_roots.call_count(), 2)),
    )
}

/// Immortal objects are never freed, and the references they hold are counted like any other
/// heap reference.
#[test]
pub fn immortal_references() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let boot = new_object(&mut fixture.mutator, 2, AllocationSemantics::Immortal);
            let a = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            // The immortal object is born logged.
            write_field(&mut fixture.mutator, boot, 0, Some(a));
            fixture.collect(CollectionKind::Increment);
            assert_eq!(count(a), 1);
            assert!(!memory_manager::is_logged::<MockVM>(boot));
            assert_eq!(fixture.mmtk.get_plan().immortal.len(), 1);

            write_field(&mut fixture.mutator, boot, 0, None);
            assert!(memory_manager::is_logged::<MockVM>(boot));
            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, a));
            assert!(memory_manager::is_live_object(&fixture.mmtk, boot));
        },
        no_cleanup,
    )
}
