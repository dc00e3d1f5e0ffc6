#[path = "../tests/common/mod.rs"]
mod common;

use criterion::{criterion_group, criterion_main, Criterion};
use readtrj_core::lammpstrj::LammpstrjReader;
use readtrj_core::reader::TrajectoryReader;
use readtrj_core::types::ReaderConfig;
use std::fs;
use std::hint::black_box;
use std::io::Cursor;

fn generate_large_dump(num_frames: usize) -> String {
    let single = fs::read_to_string(test_case!("scaled.lammpstrj")).expect("Can't find test.");
    let mut buf = String::with_capacity(single.len() * num_frames);
    for _ in 0..num_frames {
        buf.push_str(&single);
    }
    buf
}

fn frame_iteration_bench(c: &mut Criterion) {
    let fdat = fs::read_to_string(test_case!("nvt_4frame.lammpstrj")).expect("Can't find test.");
    let mut group = c.benchmark_group("FrameIteration");

    group.bench_function("borrowed_next_frame", |b| {
        b.iter(|| {
            let mut reader = LammpstrjReader::new(
                Cursor::new(fdat.as_bytes()),
                ReaderConfig::default(),
            );
            while let Ok(Some(frame)) = reader.next_frame() {
                let _ = black_box(frame.positions[0]);
            }
        })
    });

    group.bench_function("owned_frames_collect", |b| {
        b.iter(|| {
            let reader = LammpstrjReader::new(
                Cursor::new(fdat.as_bytes()),
                ReaderConfig::default(),
            );
            let frames: Vec<_> = reader.frames().collect();
            let _ = black_box(frames);
        })
    });

    group.finish();
}

fn large_file_bench(c: &mut Criterion) {
    let large = generate_large_dump(1000);
    let mut group = c.benchmark_group("LargeFile");

    group.bench_function("1000_frames_sequential", |b| {
        b.iter(|| {
            let mut reader = LammpstrjReader::new(
                Cursor::new(large.as_bytes()),
                ReaderConfig::default(),
            );
            let mut count = 0usize;
            while let Ok(Some(frame)) = reader.next_frame() {
                count += black_box(frame.natoms);
            }
            let _ = black_box(count);
        })
    });

    group.finish();
}

fn float_parsing_bench(c: &mut Criterion) {
    let line = "247 1 3.69544 2.56202 3.27701 0.00433856 -0.00099307 -0.00486166";
    let mut group = c.benchmark_group("FloatParsing");

    group.bench_function("fast_float2_parse_8", |b| {
        b.iter(|| {
            let vals = readtrj_core::parser::parse_line_of_n_f64(black_box(line), 8).unwrap();
            let _ = black_box(vals);
        })
    });

    group.bench_function("std_parse_8", |b| {
        b.iter(|| {
            let vals =
                readtrj_core::parser::parse_line_of_n::<f64>(black_box(line), 8).unwrap();
            let _ = black_box(vals);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    frame_iteration_bench,
    large_file_bench,
    float_parsing_bench,
);
criterion_main!(benches);
