use super::mock_test_prelude::*;

fn count(object: ObjectReference) -> usize {
    memory_manager::reference_count::<MockVM>(object)
}

/// X is a root and references Y. X is dropped from the roots in the second increment, and
/// both die in the third.
#[test]
pub fn root_to_child() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let x = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            let y = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            write_field(&mut fixture.mutator, x, 0, Some(y));
            // Both are new: the write is not logged.
            assert!(!memory_manager::is_logged::<MockVM>(x));

            set_roots(vec![x]);
            fixture.collect(CollectionKind::Increment);
            assert_eq!(count(x), 1);
            assert_eq!(count(y), 1);
            assert!(memory_manager::is_live_object(&fixture.mmtk, y));

            // X is still a root. The root decrement of the previous increment is balanced.
            fixture.collect(CollectionKind::Increment);
            assert_eq!(count(x), 1);
            assert_eq!(count(y), 1);

            set_roots(vec![]);
            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, x));
            assert!(!memory_manager::is_live_object(&fixture.mmtk, y));
            assert_eq!(fixture.mmtk.state().increments(), 3);
        },
        no_cleanup,
    )
}

/// An old object overwrites its only reference to Y with Z. Y dies at the next increment and
/// Z takes its place.
#[test]
pub fn overwrite_in_old_object() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let x = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            let y = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            write_field(&mut fixture.mutator, x, 0, Some(y));
            set_roots(vec![x]);
            fixture.collect(CollectionKind::Increment);

            let z = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            write_field(&mut fixture.mutator, x, 0, Some(z));
            assert!(memory_manager::is_logged::<MockVM>(x));
            // The second write to the same object takes the fast path.
            write_field(&mut fixture.mutator, x, 0, Some(z));

            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_logged::<MockVM>(x));
            assert!(!memory_manager::is_live_object(&fixture.mmtk, y));
            assert_eq!(count(x), 1);
            assert_eq!(count(z), 1);
            assert_eq!(read_field(x, 0), Some(z));
        },
        no_cleanup,
    )
}

/// A new object that is never referenced dies at the first increment.
#[test]
pub fn unreferenced_new_object() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let before = memory_manager::get_reserved_pages(&fixture.mmtk);
            let o = new_object(&mut fixture.mutator, 2, AllocationSemantics::Default);
            assert_eq!(count(o), 1);
            assert!(memory_manager::get_reserved_pages(&fixture.mmtk) > before);
            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, o));
        },
        no_cleanup,
    )
}
