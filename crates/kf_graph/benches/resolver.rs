use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

use kf_graph::PseudoknotResolver;
use kf_structure::Pair;
use kf_structure::PairSet;

pub fn pk_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("PseudoknotResolver");

    // a ladder of mutually crossing pairs plus a nested helix
    let mut pairs = PairSet::new(240);
    for d in 0..40 {
        pairs.insert(Pair::new(1 + d, 120 + d));
    }
    for d in 0..35 {
        pairs.insert(Pair::new(41 + d, 119 - d));
    }
    let resolver = PseudoknotResolver::new();

    group.bench_function("Exact resolution, 75 pairs over 240 nt.", |b| {
        b.iter(|| {
            let _ = resolver.resolve(&pairs);
        });
    });
}

criterion_group!(benches, pk_resolution);
criterion_main!(benches);
