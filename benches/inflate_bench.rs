use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use reflate::decompress::Decompressor;
use reflate::{Reader, Writer};
use std::io::Write;

fn sample_data(len: usize) -> Vec<u8> {
    let phrase = b"It is a truth universally acknowledged, that a single man in \
possession of a good fortune, must be in want of a wife. ";
    let mut data = Vec::with_capacity(len);
    let mut i = 0usize;
    while data.len() < len {
        data.extend_from_slice(phrase);
        data.push((i % 251) as u8);
        i += 1;
    }
    data.truncate(len);
    data
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut e = DeflateEncoder::new(Vec::new(), Compression::new(6));
    e.write_all(data).unwrap();
    e.finish().unwrap()
}

fn bench_inflate(c: &mut Criterion) {
    let mut group = c.benchmark_group("inflate");
    for &size in &[16 * 1024, 256 * 1024] {
        let data = sample_data(size);
        let compressed = compress(&data);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("reflate", size),
            &compressed,
            |b, compressed| {
                let mut d = Decompressor::new();
                let mut output = vec![0u8; size];
                b.iter(|| {
                    d.reset();
                    let mut src = Reader::new(compressed, true);
                    let mut dst = Writer::new(&mut output);
                    d.decompress(&mut dst, &mut src).unwrap();
                    dst.pos()
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("libdeflater", size),
            &compressed,
            |b, compressed| {
                let mut d = libdeflater::Decompressor::new();
                let mut output = vec![0u8; size];
                b.iter(|| d.deflate_decompress(compressed, &mut output).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_inflate_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("inflate_streaming");
    let size = 256 * 1024;
    let data = sample_data(size);
    let compressed = compress(&data);
    group.throughput(Throughput::Bytes(size as u64));

    // Small output windows: the suspension path, not the fast loop,
    // dominates here.
    group.bench_function("4k_output_windows", |b| {
        let mut d = Decompressor::new();
        let mut window = vec![0u8; 4096];
        b.iter(|| {
            d.reset();
            let mut consumed = 0;
            let mut total = 0usize;
            loop {
                let mut src = Reader::new(&compressed[consumed..], true);
                let mut dst = Writer::new(&mut window);
                let status = d.decompress(&mut dst, &mut src).unwrap();
                consumed += src.pos();
                total += dst.pos();
                if status == reflate::Status::Finished {
                    break;
                }
            }
            total
        });
    });
    group.finish();
}

criterion_group!(benches, bench_inflate, bench_inflate_streaming);
criterion_main!(benches);
