// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;
use seamscan::detect::{CoincidenceTest, ExhaustiveDetector, OverlapDetector, SpatialHashDetector};
use seamscan::geometry::{extract, FaceRecord, MeshObject, Primitive};
use seamscan::report::{quick_scan, summarize, ReportOptions};

/// `objects` stacked grids, each `side` x `side`, with the first two sharing a plane
fn stacked_grids(objects: usize, side: usize) -> Vec<FaceRecord> {
    let meshes: Vec<MeshObject> = (0..objects)
        .map(|k| {
            let z = if k == 0 { 0.0 } else { (k - 1) as f64 * 0.5 };
            Primitive::grid(side, side, 0.05)
                .to_mesh(format!("object_{}", k))
                .placed(Vector3::new(0.0, 0.0, z), Vector3::zeros(), Vector3::repeat(1.0))
        })
        .collect();
    extract(&meshes).unwrap()
}

fn bench_extract(c: &mut Criterion) {
    let meshes: Vec<MeshObject> = (0..4)
        .map(|k| Primitive::grid(50, 50, 0.05).to_mesh(format!("grid_{}", k)))
        .collect();

    c.bench_function("extract_10k", |b| {
        b.iter(|| extract(black_box(&meshes)).unwrap());
    });
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    let test = CoincidenceTest::default();

    for side in [20, 40, 70] {
        let records = stacked_grids(4, side);
        let faces = records.len();

        group.bench_with_input(BenchmarkId::new("exhaustive", faces), &records, |b, records| {
            let detector = ExhaustiveDetector::new(test);
            b.iter(|| detector.detect(black_box(records), None).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("spatial_hash", faces), &records, |b, records| {
            let detector = SpatialHashDetector::new(test, 0.1).unwrap();
            b.iter(|| detector.detect(black_box(records), None).unwrap());
        });

        group.bench_with_input(
            BenchmarkId::new("spatial_hash_parallel", faces),
            &records,
            |b, records| {
                let detector = SpatialHashDetector::new(test, 0.1).unwrap().with_parallel(true);
                b.iter(|| detector.detect(black_box(records), None).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_reporting(c: &mut Criterion) {
    let mut group = c.benchmark_group("reporting");
    let records = stacked_grids(4, 70);
    let detection = SpatialHashDetector::new(CoincidenceTest::default(), 0.1)
        .unwrap()
        .detect(&records, None)
        .unwrap();

    group.bench_function("summarize", |b| {
        b.iter(|| summarize(black_box(&detection.pairs), ReportOptions::default()));
    });

    group.bench_function("quick_scan", |b| {
        b.iter(|| quick_scan(black_box(&records), 0.1).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_extract, bench_detection, bench_reporting);
criterion_main!(benches);
