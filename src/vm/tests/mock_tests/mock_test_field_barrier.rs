use super::mock_test_prelude::*;

fn old_object(fixture: &mut MutatorFixture, slots: usize) -> ObjectReference {
    let o = new_object(&mut fixture.mutator, slots, AllocationSemantics::Default);
    set_roots(vec![o]);
    fixture.collect(CollectionKind::Increment);
    o
}

/// With the field barrier, each field is logged on its first write only, and the object
/// itself is never logged.
#[test]
pub fn log_each_field_once() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create_with_builder(|builder| {
                builder.options.field_barrier_for_putfield = true;
                builder.options.barrier_stats = true;
            });
            let src = old_object(&mut fixture, 3);
            let a = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            let b = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            fixture.mutator.flush();
            let pools = &fixture.mmtk.get_plan().pools;
            pools.decs.clear();

            write_field(&mut fixture.mutator, src, 0, Some(a));
            write_field(&mut fixture.mutator, src, 0, Some(b));
            write_field(&mut fixture.mutator, src, 2, Some(a));
            assert!(!memory_manager::is_logged::<MockVM>(src));
            assert!(!MockVM::is_field_unlogged(src, FieldMeta::Scalar(0)));
            assert!(MockVM::is_field_unlogged(src, FieldMeta::Scalar(1)));
            assert!(!MockVM::is_field_unlogged(src, FieldMeta::Scalar(2)));

            fixture.mutator.flush();
            assert_eq!(pools.mod_fields.len(), 2);
            assert!(pools.mod_objects.is_empty());
            // Both fields held null.
            assert!(pools.decs.is_empty());

            let stats = memory_manager::barrier_stats(&fixture.mmtk);
            assert_eq!(stats.putfield_fast.get(), 3);
            assert_eq!(stats.slow.get(), 2);
            assert_eq!(stats.words_logged.get(), 0);
            pools.mod_fields.clear();
        },
        no_cleanup,
    )
}

/// Many mutators race to write the same field. It is logged once, and its old referent is
/// decremented once.
#[test]
pub fn concurrent_field_logging() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create_with_builder(|builder| {
                builder.options.field_barrier_for_putfield = true;
                builder.options.putfield_barrier_out_of_line = true;
            });
            let src = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            let old = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            let new = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            write_field(&mut fixture.mutator, src, 0, Some(old));
            set_roots(vec![src, new]);
            fixture.collect(CollectionKind::Increment);

            let mut mutators: Vec<_> = (0..8).map(|_| fixture.bind_mutator()).collect();
            std::thread::scope(|s| {
                for mutator in mutators.iter_mut() {
                    s.spawn(move || {
                        for _ in 0..100 {
                            write_field(mutator, src, 0, Some(new));
                        }
                    });
                }
            });
            for mutator in mutators.iter_mut() {
                memory_manager::flush(mutator);
            }
            let pools = &fixture.mmtk.get_plan().pools;
            assert_eq!(pools.mod_fields.len(), 1);
            assert_eq!(pools.decs.len(), 1);

            let mut all: Vec<&mut crate::plan::Mutator<MockVM>> = vec![&mut *fixture.mutator];
            all.extend(mutators.iter_mut().map(|m| &mut **m));
            memory_manager::collect(&fixture.mmtk, &mut all, CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, old));
            assert_eq!(memory_manager::reference_count::<MockVM>(new), 2);
            assert!(MockVM::is_field_unlogged(src, FieldMeta::Scalar(0)));
        },
        no_cleanup,
    )
}
