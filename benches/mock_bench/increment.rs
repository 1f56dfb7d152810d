use criterion::Criterion;

use mmtk_rc::memory_manager;
use mmtk_rc::util::test_util::fixtures::*;
use mmtk_rc::util::test_util::mock_vm::*;
use mmtk_rc::{AllocationSemantics, CollectionKind};

const CHAIN: usize = 256;

/// Allocate a chain, keep it alive for one increment, and let it die in the next.
pub fn bench(c: &mut Criterion) {
    let mut fixture = MutatorFixture::create();
    c.bench_function("increment_chain", |b| {
        b.iter(|| {
            let head = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
            let mut last = head;
            for _ in 1..CHAIN {
                let next = new_object(&mut fixture.mutator, 1, AllocationSemantics::Default);
                write_field(&mut fixture.mutator, last, 0, Some(next));
                last = next;
            }
            set_roots(vec![head]);
            fixture.collect(CollectionKind::Increment);
            set_roots(vec![]);
            fixture.collect(CollectionKind::Increment);
            debug_assert!(!memory_manager::is_live_object(&fixture.mmtk, head));
        })
    });
}
