use super::mock_test_prelude::*;
use crate::util::constants::BYTES_IN_WORD;

const LENGTH: usize = 16;

/// Copy `len` elements from `src[from..]` to `dst[to..]` through the bulk copy barrier. The
/// barrier never copies itself.
fn bulk_copy(
    fixture: &mut MutatorFixture,
    src: ObjectReference,
    from: usize,
    dst: ObjectReference,
    to: usize,
    len: usize,
) {
    let copied = memory_manager::object_reference_bulk_copy(
        &mut fixture.mutator,
        src,
        from * BYTES_IN_WORD,
        dst,
        to * BYTES_IN_WORD,
        len * BYTES_IN_WORD,
    );
    assert!(!copied);
    let values: Vec<_> = (from..from + len).map(|i| read_field(src, i)).collect();
    for (i, v) in values.into_iter().enumerate() {
        slot(dst, to + i).store(v);
    }
}

fn setup(fixture: &mut MutatorFixture) -> (ObjectReference, ObjectReference, ObjectReference) {
    let src = new_array(&mut fixture.mutator, LENGTH, AllocationSemantics::Default);
    let dst = new_array(&mut fixture.mutator, LENGTH, AllocationSemantics::Default);
    let target = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
    for i in 0..LENGTH {
        write_field(&mut fixture.mutator, src, i, Some(target));
    }
    set_roots(vec![src, dst]);
    fixture.collect(CollectionKind::Increment);
    assert_eq!(
        memory_manager::reference_count::<MockVM>(target),
        LENGTH
    );
    (src, dst, target)
}

#[test]
pub fn bulk_copy_object_barrier() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let (src, dst, target) = setup(&mut fixture);
            bulk_copy(&mut fixture, src, 0, dst, 4, 8);
            assert!(memory_manager::is_logged::<MockVM>(dst));
            assert!(!memory_manager::is_logged::<MockVM>(src));
            fixture.collect(CollectionKind::Increment);
            assert_eq!(
                memory_manager::reference_count::<MockVM>(target),
                LENGTH + 8
            );
        },
        no_cleanup,
    )
}

#[test]
pub fn bulk_copy_field_barrier() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create_with_builder(|builder| {
                builder.options.field_barrier_for_aastore = true;
                builder.options.array_quantum = 4;
            });
            let (src, dst, target) = setup(&mut fixture);
            bulk_copy(&mut fixture, src, 2, dst, 6, 4);
            assert!(!memory_manager::is_logged::<MockVM>(dst));
            // Elements 6..10 span the quanta starting at 4 and 8.
            assert!(MockVM::is_field_unlogged(dst, FieldMeta::ArrayElement(0)));
            assert!(!MockVM::is_field_unlogged(dst, FieldMeta::ArrayElement(4)));
            assert!(!MockVM::is_field_unlogged(dst, FieldMeta::ArrayElement(8)));
            assert!(MockVM::is_field_unlogged(dst, FieldMeta::ArrayElement(12)));
            memory_manager::flush(&mut fixture.mutator);
            assert_eq!(fixture.mmtk.get_plan().pools.mod_fields.len(), 2);

            // The old elements were null: the copied references are only counted.
            fixture.collect(CollectionKind::Increment);
            assert_eq!(
                memory_manager::reference_count::<MockVM>(target),
                LENGTH + 4
            );
        },
        no_cleanup,
    )
}
