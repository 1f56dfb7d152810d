//! Random mutator workloads. After every increment the count of each live object must equal
//! the number of references to it from live objects, plus the number of times it was reported
//! as a root.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::mock_test_prelude::*;
use crate::util::options::RcFlavor;
use crate::MMTKBuilder;

const ROUNDS: usize = 12;
const OPS_PER_ROUND: usize = 200;
const MAX_SLOTS: usize = 4;

fn check_counts(mmtk: &crate::MMTK<MockVM>, live: &[ObjectReference], roots: &[ObjectReference]) {
    let mut expected: HashMap<ObjectReference, usize> = live.iter().map(|o| (*o, 0)).collect();
    for src in live {
        for i in 0..num_slots(*src) {
            if let Some(target) = read_field(*src, i) {
                *expected
                    .get_mut(&target)
                    .unwrap_or_else(|| panic!("{} references freed object {}", src, target)) += 1;
            }
        }
    }
    for root in roots {
        *expected.get_mut(root).unwrap() += 1;
    }
    for o in live {
        assert!(memory_manager::is_live_object(mmtk, *o));
        assert!(expected[o] > 0, "{} has no references but was not freed", o);
        assert_eq!(
            memory_manager::reference_count::<MockVM>(*o),
            expected[o],
            "wrong count for {}",
            o
        );
    }
}

fn run<F: FnOnce(&mut MMTKBuilder)>(seed: u64, with_builder: F) {
    let mut fixture = MutatorFixture::create_with_builder(with_builder);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut handles: Vec<ObjectReference> = vec![];

    for _ in 0..ROUNDS {
        for _ in 0..OPS_PER_ROUND {
            if handles.is_empty() || rng.random_bool(0.3) {
                let slots = rng.random_range(0..=MAX_SLOTS);
                let o = new_object(&mut fixture.mutator, slots, AllocationSemantics::Default);
                handles.push(o);
                continue;
            }
            let src = handles[rng.random_range(0..handles.len())];
            let slots = num_slots(src);
            if slots == 0 {
                continue;
            }
            let target = if rng.random_bool(0.2) {
                None
            } else {
                Some(handles[rng.random_range(0..handles.len())])
            };
            write_field(&mut fixture.mutator, src, rng.random_range(0..slots), target);
        }

        let roots: Vec<ObjectReference> = handles
            .iter()
            .copied()
            .filter(|_| rng.random_bool(0.1))
            .collect();
        set_roots(roots.clone());
        fixture.collect(CollectionKind::Increment);

        handles.retain(|o| memory_manager::is_live_object(&fixture.mmtk, *o));
        check_counts(&fixture.mmtk, &handles, &roots);
    }

    // Dropping every root frees everything that is not part of a garbage cycle.
    set_roots(vec![]);
    fixture.collect(CollectionKind::Increment);
    handles.retain(|o| memory_manager::is_live_object(&fixture.mmtk, *o));
    check_counts(&fixture.mmtk, &handles, &[]);
}

#[test]
pub fn conservation_object_barrier() {
    with_mockvm(default_setup, || run(42, |_| {}), no_cleanup)
}

#[test]
pub fn conservation_generational() {
    with_mockvm(
        default_setup,
        || run(7, |builder| builder.options.rc_flavor = RcFlavor::Generational),
        no_cleanup,
    )
}

#[test]
pub fn conservation_field_barrier() {
    with_mockvm(
        default_setup,
        || {
            run(1234, |builder| {
                builder.options.field_barrier_for_putfield = true;
                builder.options.barrier_stats = true;
            })
        },
        no_cleanup,
    )
}

#[test]
pub fn conservation_small_buffers_many_collectors() {
    with_mockvm(
        default_setup,
        || {
            run(99, |builder| {
                builder.options.buffer_capacity = 3;
                builder.options.threads = 4;
            })
        },
        no_cleanup,
    )
}
