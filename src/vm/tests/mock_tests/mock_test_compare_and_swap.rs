use super::mock_test_prelude::*;

fn count(object: ObjectReference) -> usize {
    memory_manager::reference_count::<MockVM>(object)
}

fn swap(
    fixture: &mut MutatorFixture,
    src: ObjectReference,
    old: Option<ObjectReference>,
    new: Option<ObjectReference>,
) -> bool {
    memory_manager::object_reference_try_compare_and_swap(
        &mut fixture.mutator,
        src,
        slot(src, 0),
        old,
        new,
        FieldMeta::Scalar(0),
    )
}

/// An old root object X holding Y, after one increment.
fn old_holder(fixture: &mut MutatorFixture) -> (ObjectReference, ObjectReference) {
    let x = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
    let y = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
    write_field(&mut fixture.mutator, x, 0, Some(y));
    set_roots(vec![x]);
    fixture.collect(CollectionKind::Increment);
    assert_eq!(count(y), 1);
    assert!(!memory_manager::is_logged::<MockVM>(x));
    (x, y)
}

/// The barrier runs even when the exchange fails. Y is decremented once and counted again
/// from the logged object, so nothing changes.
#[test]
pub fn failed_swap_logs_object() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let (x, y) = old_holder(&mut fixture);
            let w = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            assert!(!swap(&mut fixture, x, None, Some(w)));
            assert!(memory_manager::is_logged::<MockVM>(x));
            assert_eq!(read_field(x, 0), Some(y));

            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_logged::<MockVM>(x));
            assert_eq!(count(y), 1);
            assert!(memory_manager::is_live_object(&fixture.mmtk, y));
            assert!(!memory_manager::is_live_object(&fixture.mmtk, w));
        },
        no_cleanup,
    )
}

/// A successful exchange leaves the old referent in the decrement buffer, and it dies at the
/// next increment. The new referent is counted.
#[test]
pub fn successful_swap_moves_count() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let (x, y) = old_holder(&mut fixture);
            let z = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            assert!(swap(&mut fixture, x, Some(y), Some(z)));
            assert_eq!(read_field(x, 0), Some(z));

            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, y));
            assert_eq!(count(z), 1);
            assert_eq!(count(x), 1);
        },
        no_cleanup,
    )
}

/// The same exchange through the scalar field barrier.
#[test]
pub fn successful_swap_with_field_barrier() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create_with_builder(|builder| {
                builder.options.field_barrier_for_putfield = true;
            });
            let (x, y) = old_holder(&mut fixture);
            let z = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            assert!(!swap(&mut fixture, x, None, Some(z)));
            assert!(swap(&mut fixture, x, Some(y), Some(z)));
            // Field logging does not log the object as a whole.
            assert!(!memory_manager::is_logged::<MockVM>(x));

            fixture.collect(CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, y));
            assert_eq!(count(z), 1);
            assert_eq!(read_field(x, 0), Some(z));
        },
        no_cleanup,
    )
}
