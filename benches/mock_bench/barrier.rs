use criterion::Criterion;

use mmtk_rc::plan::rc::header;
use mmtk_rc::util::test_util::fixtures::*;
use mmtk_rc::util::test_util::mock_vm::*;
use mmtk_rc::{AllocationSemantics, CollectionKind};

pub fn bench(c: &mut Criterion) {
    let mut fixture = MutatorFixture::create();
    let src = new_object(&mut fixture.mutator, 4, AllocationSemantics::Default);
    let target = new_object(&mut fixture.mutator, 0, AllocationSemantics::Default);
    set_roots(vec![src, target]);
    fixture.collect(CollectionKind::Increment);

    // The first write logs the object. Every later write only tests the header.
    write_field(&mut fixture.mutator, src, 0, Some(target));
    c.bench_function("barrier_fast_path", |b| {
        b.iter(|| write_field(&mut fixture.mutator, src, 1, Some(target)))
    });

    let mmtk = fixture.mmtk.clone();
    let pools = &mmtk.get_plan().pools;
    c.bench_function("barrier_slow_path", |b| {
        b.iter(|| {
            header::make_unlogged::<MockVM>(src);
            write_field(&mut fixture.mutator, src, 1, Some(target));
            if !pools.decs.is_empty() {
                pools.mod_objects.clear();
                pools.decs.clear();
            }
        })
    });
}
