use criterion::{black_box, criterion_group, BatchSize, Criterion, Throughput};
use dsi_bitstream::traits::BitWrite;
use jxl_entropy::{BitStreamReader, EntropyStream};
use pprof::criterion::{Output, PProfProfiler};

use crate::benchmarks::{flat_ans_header, stream_bytes, NUM_SYMBOLS};

fn ans_decode_benchmark(c: &mut Criterion) {
    let data = stream_bytes(|w| flat_ans_header(w, 1, 128)).unwrap();

    let mut group = c.benchmark_group("decoder benchmark");
    group.measurement_time(std::time::Duration::from_secs(10));
    group.throughput(Throughput::Elements(NUM_SYMBOLS as u64));
    group.sample_size(10);
    group.bench_function("ANS decoding", |b| {
        b.iter_batched(
            || {
                let mut reader = BitStreamReader::new(&data);
                let stream = EntropyStream::new(&mut reader, 1, false).unwrap();
                (reader, stream)
            },
            |(mut reader, mut stream)| {
                for _ in 0..NUM_SYMBOLS {
                    black_box(stream.read_symbol(&mut reader, 0).unwrap());
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn prefix_decode_benchmark(c: &mut Criterion) {
    let data = stream_bytes(|w| {
        // no LZ77, prefix codes, tokens are values
        w.write_bits(0, 1)?;
        w.write_bits(1, 1)?;
        w.write_bits(15, 4)?;
        // 17 symbols, simple code of four of them
        w.write_bits(1, 1)?;
        w.write_bits(4, 4)?;
        w.write_bits(0, 4)?;
        w.write_bits(1, 2)?;
        w.write_bits(3, 2)?;
        for symbol in [0, 3, 7, 16] {
            w.write_bits(symbol, 5)?;
        }
        w.write_bits(1, 1)?;
        Ok(())
    })
    .unwrap();

    let mut group = c.benchmark_group("decoder benchmark");
    group.measurement_time(std::time::Duration::from_secs(10));
    group.throughput(Throughput::Elements(NUM_SYMBOLS as u64));
    group.sample_size(10);
    group.bench_function("prefix decoding", |b| {
        b.iter_batched(
            || {
                let mut reader = BitStreamReader::new(&data);
                let stream = EntropyStream::new(&mut reader, 1, false).unwrap();
                (reader, stream)
            },
            |(mut reader, mut stream)| {
                for _ in 0..NUM_SYMBOLS {
                    black_box(stream.read_symbol(&mut reader, 0).unwrap());
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group! {
    name = decoder_benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = ans_decode_benchmark, prefix_decode_benchmark
}
