use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use oxiarc_xz::{compress, decompress, XzOptions};

fn bench_roundtrip(c: &mut Criterion) {
    let data = b"The quick brown fox jumps over the lazy dog. ".repeat(2000);

    let mut group = c.benchmark_group("xz_roundtrip");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("compress_level1", |b| {
        let opts = XzOptions::with_level(1);
        b.iter(|| compress(&data, &opts).unwrap())
    });

    group.bench_function("compress_level6", |b| {
        let opts = XzOptions::with_level(6);
        b.iter(|| compress(&data, &opts).unwrap())
    });

    let compressed = compress(&data, &XzOptions::with_level(6)).unwrap();
    group.bench_function("decompress", |b| b.iter(|| decompress(&compressed).unwrap()));

    group.finish();
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
