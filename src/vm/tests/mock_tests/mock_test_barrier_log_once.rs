use super::mock_test_prelude::*;

const THREADS: usize = 8;
const WRITES: usize = 100;

/// Many mutators race to write into the same old object. The object is logged exactly once:
/// one modified-object entry, and one decrement per old referent.
#[test]
pub fn concurrent_object_logging() {
    with_mockvm(
        default_setup,
        || {
            let mut fixture = MutatorFixture::create();
            let src = new_object(&mut fixture.mutator, 2, AllocationSemantics::Default);
            let old = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
            let targets: Vec<ObjectReference> = (0..THREADS)
                .map(|_| new_object(&mut fixture.mutator, 0, AllocationSemantics::Default))
                .collect();
            write_field(&mut fixture.mutator, src, 0, Some(old));
            write_field(&mut fixture.mutator, src, 1, Some(old));
            let mut roots = vec![src];
            roots.extend_from_slice(&targets);
            set_roots(roots);
            fixture.collect(CollectionKind::Increment);
            assert_eq!(memory_manager::reference_count::<MockVM>(old), 2);

            let mut mutators: Vec<_> = (0..THREADS).map(|_| fixture.bind_mutator()).collect();
            std::thread::scope(|s| {
                for (mutator, target) in mutators.iter_mut().zip(targets.iter()) {
                    let target = *target;
                    s.spawn(move || {
                        for i in 0..WRITES {
                            write_field(mutator, src, i % 2, Some(target));
                        }
                    });
                }
            });
            for mutator in mutators.iter_mut() {
                memory_manager::flush_remembered_sets(mutator);
            }
            assert!(memory_manager::is_logged::<MockVM>(src));
            let pools = &fixture.mmtk.get_plan().pools;
            assert_eq!(pools.mod_objects.len(), 1);
            assert_eq!(pools.decs.len(), 2);
            assert!(pools.mod_fields.is_empty());

            let mut all: Vec<&mut crate::plan::Mutator<MockVM>> = vec![&mut *fixture.mutator];
            all.extend(mutators.iter_mut().map(|m| &mut **m));
            memory_manager::collect(&fixture.mmtk, &mut all, CollectionKind::Increment);
            assert!(!memory_manager::is_live_object(&fixture.mmtk, old));
            let total: usize = targets
                .iter()
                .map(|t| memory_manager::reference_count::<MockVM>(*t))
                .sum();
            // Each target is a root, and the two fields reference one or two of them.
            assert_eq!(total, THREADS + 2);
        },
        no_cleanup,
    )
}
