use criterion::Criterion;

pub mod barrier;
pub mod increment;

pub fn bench(c: &mut Criterion) {
    barrier::bench(c);
    increment::bench(c);
}
