use criterion::{black_box, criterion_group, Criterion};
use jxl_entropy::{BitStreamReader, EntropyStream};
use pprof::criterion::{Output, PProfProfiler};

use crate::benchmarks::{flat_ans_header, stream_bytes};

/// Number of contexts, each in its own cluster, of the parsed header.
const NUM_CLUSTERS: usize = 8;

fn header_benchmark(c: &mut Criterion) {
    let data = stream_bytes(|w| flat_ans_header(w, NUM_CLUSTERS, 139)).unwrap();

    let mut group = c.benchmark_group("header benchmark");
    group.sample_size(50);
    group.bench_function("ANS header parsing", |b| {
        b.iter(|| {
            let mut reader = BitStreamReader::new(&data);
            black_box(EntropyStream::new(&mut reader, NUM_CLUSTERS, false).unwrap())
        })
    });
    group.finish();
}

criterion_group! {
    name = header_benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = header_benchmark
}
