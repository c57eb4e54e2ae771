// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exhaustive and spatial-hash engines must agree on randomized scenes

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use seamscan::detect::{
    find_overlaps, CoincidenceTest, ExhaustiveDetector, OverlapDetector, PairKey,
    SpatialHashDetector,
};
use seamscan::geometry::FaceRecord;
use seamscan::DetectionConfig;

const TOLERANCE: f64 = 0.001;
const CELL: f64 = 0.1;

fn random_normal(rng: &mut StdRng) -> Vector3<f64> {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if v.norm() > 0.1 {
            return v.normalize();
        }
    }
}

/// Random faces over four objects, with copies of earlier faces planted in
/// other objects. Centers are snapped near cell boundaries so many
/// coincident copies straddle two cells.
fn random_scene(seed: u64) -> Vec<FaceRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let objects = ["Facemask", "Hardware", "Padding", "Shell"];
    let mut next_index = [0usize; 4];
    let mut records: Vec<FaceRecord> = Vec::new();

    for _ in 0..1200 {
        let slot = rng.gen_range(0..objects.len());
        let face_index = next_index[slot];
        next_index[slot] += 1;

        let copy = !records.is_empty() && rng.gen_bool(0.3);
        let (center, normal) = if copy {
            let source = &records[rng.gen_range(0..records.len())];
            // Up to 1.5x tolerance per axis: some copies land just outside
            let jitter = Vector3::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
            ) * TOLERANCE;
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            (source.center + jitter, source.normal * sign)
        } else {
            let snapped = |v: f64| ((v / CELL).floor() + 0.5) * CELL + rng_offset(v);
            let center = Point3::new(
                snapped(rng.gen_range(0.0..2.0)),
                snapped(rng.gen_range(0.0..2.0)),
                snapped(rng.gen_range(0.0..2.0)),
            );
            (center, random_normal(&mut rng))
        };

        records.push(FaceRecord::new(objects[slot], face_index, center, normal, 1.0));
    }

    records
}

/// Deterministic sub-tolerance offset derived from the coordinate itself
fn rng_offset(v: f64) -> f64 {
    ((v * 1e4).fract() - 0.5) * TOLERANCE
}

fn keys(detector: &dyn OverlapDetector, records: &[FaceRecord]) -> Result<Vec<PairKey>> {
    Ok(detector
        .detect(records, None)?
        .pairs
        .iter()
        .map(|p| p.key())
        .collect())
}

#[test]
fn test_engines_agree_on_random_scenes() -> Result<()> {
    let test = CoincidenceTest::new(TOLERANCE, 0.1);
    let exhaustive = ExhaustiveDetector::new(test);
    let spatial = SpatialHashDetector::new(test, CELL)?;

    for seed in [1, 7, 42, 2025] {
        let records = random_scene(seed);
        let reference = keys(&exhaustive, &records)?;
        assert!(!reference.is_empty(), "seed {} planted no overlaps", seed);
        assert_eq!(keys(&spatial, &records)?, reference, "seed {}", seed);
    }
    Ok(())
}

#[test]
fn test_cell_equal_to_tolerance_still_matches() -> Result<()> {
    let test = CoincidenceTest::new(TOLERANCE, 0.1);
    let records = random_scene(99);
    let reference = keys(&ExhaustiveDetector::new(test), &records)?;
    let tight = SpatialHashDetector::new(test, TOLERANCE)?;
    assert_eq!(keys(&tight, &records)?, reference);
    Ok(())
}

#[test]
fn test_parallel_matches_sequential() -> Result<()> {
    let test = CoincidenceTest::new(TOLERANCE, 0.1);
    let records = random_scene(3);

    let sequential = keys(&SpatialHashDetector::new(test, CELL)?, &records)?;
    let parallel = keys(
        &SpatialHashDetector::new(test, CELL)?.with_parallel(true),
        &records,
    )?;
    assert_eq!(parallel, sequential);

    let parallel = keys(&ExhaustiveDetector::new(test).with_parallel(true), &records)?;
    assert_eq!(parallel, sequential);
    Ok(())
}

#[test]
fn test_input_order_does_not_matter() -> Result<()> {
    let config = DetectionConfig::default();
    let records = random_scene(11);
    let first = find_overlaps(&records, &config)?;

    let mut shuffled = records.clone();
    shuffled.shuffle(&mut StdRng::seed_from_u64(5));
    let second = find_overlaps(&shuffled, &config)?;

    let a: Vec<PairKey> = first.pairs.iter().map(|p| p.key()).collect();
    let b: Vec<PairKey> = second.pairs.iter().map(|p| p.key()).collect();
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_detection_is_repeatable_and_well_formed() -> Result<()> {
    let config = DetectionConfig::default();
    let records = random_scene(21);

    let first = find_overlaps(&records, &config)?;
    let second = find_overlaps(&records, &config)?;
    assert_eq!(first.pairs, second.pairs);

    let test = config.coincidence_test();
    for pair in &first.pairs {
        assert_ne!(pair.a.object_id, pair.b.object_id);
        assert!(pair.a.face_ref() < pair.b.face_ref());
        assert!(pair.distance() <= TOLERANCE * (1.0 + 1e-9));
        assert!(test.is_coincident(&pair.a, &pair.b));
    }

    let mut unique: Vec<PairKey> = first.pairs.iter().map(|p| p.key()).collect();
    unique.dedup();
    assert_eq!(unique.len(), first.len());
    Ok(())
}

#[test]
fn test_predicate_is_symmetric() {
    let test = CoincidenceTest::new(TOLERANCE, 0.1);
    let records = random_scene(8);
    let mut rng = StdRng::seed_from_u64(8);

    for _ in 0..5_000 {
        let a = &records[rng.gen_range(0..records.len())];
        let b = &records[rng.gen_range(0..records.len())];
        assert_eq!(test.is_coincident(a, b), test.is_coincident(b, a));
    }
}
