use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndlz8::{compress, decompress, Block2D};
use rand::prelude::*;

fn constant_block(rows: usize, cols: usize) -> Vec<u8> {
    vec![0x42u8; rows * cols]
}

fn random_block(rows: usize, cols: usize) -> Vec<u8> {
    let mut data = vec![0u8; rows * cols];
    thread_rng().fill(data.as_mut_slice());
    data
}

fn mixed_block(rows: usize, cols: usize) -> Vec<u8> {
    let mut data = vec![0u8; rows * cols];
    let mid = data.len() / 2;
    thread_rng().fill(&mut data[..mid]);
    data
}

fn criterion_benchmark(c: &mut Criterion) {
    let (rows, cols) = (256usize, 256usize);
    let block = Block2D::new(rows as u32, cols as u32);

    let mut group = c.benchmark_group("compress");
    for (name, data) in [
        ("constant", constant_block(rows, cols)),
        ("random", random_block(rows, cols)),
        ("mixed", mixed_block(rows, cols)),
    ] {
        let mut out = vec![0u8; data.len() * 2 + 256];
        group.bench_function(name, |b| {
            b.iter(|| compress(2, block, false, black_box(&data), &mut out))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("decompress");
    for (name, data) in [
        ("constant", constant_block(rows, cols)),
        ("random", random_block(rows, cols)),
        ("mixed", mixed_block(rows, cols)),
    ] {
        let mut compressed = vec![0u8; data.len() * 2 + 256];
        let produced = compress(2, block, false, &data, &mut compressed).unwrap();
        let compressed = &compressed[..produced];
        let mut restored = vec![0u8; data.len()];
        group.bench_function(name, |b| {
            b.iter(|| decompress(black_box(compressed), &mut restored))
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
