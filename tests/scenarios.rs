// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end detection and planning scenarios

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use seamscan::detect::{
    CoincidenceTest, ExhaustiveDetector, OverlapDetector, SpatialHashDetector,
};
use seamscan::geometry::{extract, FaceRecord, MeshObject, Primitive};
use seamscan::resolve::{ResolutionPlanner, Seam};

fn record(object: &str, center: Point3<f64>, normal: Vector3<f64>) -> FaceRecord {
    FaceRecord::new(object, 0, center, normal, 1.0)
}

fn both_engines() -> Result<Vec<Box<dyn OverlapDetector>>> {
    let test = CoincidenceTest::default();
    Ok(vec![
        Box::new(ExhaustiveDetector::new(test)) as Box<dyn OverlapDetector>,
        Box::new(SpatialHashDetector::new(test, 0.1)?) as Box<dyn OverlapDetector>,
    ])
}

#[test]
fn test_identical_unit_squares_overlap() -> Result<()> {
    let records = vec![
        record("A", Point3::origin(), Vector3::z()),
        record("B", Point3::origin(), Vector3::z()),
    ];

    for engine in both_engines()? {
        let detection = engine.detect(&records, None)?;
        assert_eq!(detection.len(), 1, "{}", engine.strategy().as_str());
        assert_eq!(detection.pairs[0].objects(), ("A", "B"));
    }

    // Same thing through the extractor
    let objects = vec![
        Primitive::quad(1.0).to_mesh("A"),
        Primitive::quad(1.0).to_mesh("B"),
    ];
    let records = extract(&objects)?;
    assert!(records[0].center.coords.norm() < 1e-12);
    for engine in both_engines()? {
        assert_eq!(engine.detect(&records, None)?.len(), 1);
    }

    Ok(())
}

#[test]
fn test_offset_beyond_tolerance_is_not_overlap() -> Result<()> {
    let records = vec![
        record("A", Point3::origin(), Vector3::z()),
        record("B", Point3::new(0.0, 0.0, 0.01), Vector3::z()),
    ];
    for engine in both_engines()? {
        assert!(engine.detect(&records, None)?.is_empty());
    }
    Ok(())
}

#[test]
fn test_orthogonal_normals_are_not_overlap() -> Result<()> {
    let records = vec![
        record("A", Point3::origin(), Vector3::z()),
        record("B", Point3::origin(), Vector3::x()),
    ];
    for engine in both_engines()? {
        assert!(engine.detect(&records, None)?.is_empty());
    }
    Ok(())
}

#[test]
fn test_opposed_normals_overlap() -> Result<()> {
    let records = vec![
        record("A", Point3::origin(), Vector3::z()),
        record("B", Point3::origin(), -Vector3::z()),
    ];
    for engine in both_engines()? {
        assert_eq!(engine.detect(&records, None)?.len(), 1);
    }
    Ok(())
}

#[test]
fn test_three_way_seam_keeps_one_copy() -> Result<()> {
    let objects = vec![
        Primitive::quad(1.0).to_mesh("X"),
        Primitive::quad(1.0).to_mesh("Y"),
        Primitive::quad(1.0).to_mesh("Z"),
    ];
    let records = extract(&objects)?;
    let detection = both_engines()?[1].detect(&records, None)?;
    assert_eq!(detection.len(), 3);

    let planner = ResolutionPlanner::new(&detection.pairs);
    let outcome = planner.plan(&Seam::new("corner", ["X", "Y", "Z"]), "X")?;

    assert!(outcome.findings.is_empty());
    assert!(outcome.plan.faces_for("X").is_none());
    assert!(outcome.plan.faces_for("Y").is_some_and(|f| f.contains(&0)));
    assert!(outcome.plan.faces_for("Z").is_some_and(|f| f.contains(&0)));
    assert_eq!(outcome.plan.face_count(), 2);
    Ok(())
}

const LATTICE_COLS: usize = 40;
const LATTICE_SPACING: f64 = 0.05;

fn lattice_square(mesh: &mut MeshObject, slot: usize, z: f64) {
    let x = (slot % LATTICE_COLS) as f64 * LATTICE_SPACING;
    let y = (slot / LATTICE_COLS) as f64 * LATTICE_SPACING;
    let s = 0.04;
    mesh.add_polygon(&[
        Point3::new(x, y, z),
        Point3::new(x + s, y, z),
        Point3::new(x + s, y + s, z),
        Point3::new(x, y + s, z),
    ]);
}

/// Five objects of 2,000 faces each on separate planes, with three faces of
/// `B` duplicated onto `A`'s plane
fn sparse_scene() -> Vec<MeshObject> {
    let mut objects = Vec::new();
    for (k, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        let z = k as f64 * 0.5;
        let mut mesh = MeshObject::new(*name);
        let lattice_faces = if *name == "B" { 1997 } else { 2000 };
        for slot in 0..lattice_faces {
            lattice_square(&mut mesh, slot, z);
        }
        if *name == "B" {
            for slot in 0..3 {
                lattice_square(&mut mesh, slot * 7, 0.0);
            }
        }
        objects.push(mesh);
    }
    objects
}

#[test]
fn test_sparse_overlaps_in_large_scene() -> Result<()> {
    let records = extract(&sparse_scene())?;
    assert_eq!(records.len(), 10_000);

    let test = CoincidenceTest::default();
    let accelerated = SpatialHashDetector::new(test, 0.1)?.detect(&records, None)?;
    let exhaustive = ExhaustiveDetector::new(test)
        .with_parallel(true)
        .detect(&records, None)?;

    assert_eq!(accelerated.len(), 3);
    let keys: Vec<_> = accelerated.pairs.iter().map(|p| p.key()).collect();
    let reference: Vec<_> = exhaustive.pairs.iter().map(|p| p.key()).collect();
    assert_eq!(keys, reference);

    for pair in &accelerated.pairs {
        assert_eq!(pair.objects(), ("A", "B"));
        assert_eq!(pair.a.face_index % 7, 0);
        assert!(pair.b.face_index >= 1997);
    }

    let naive = accelerated.stats.naive_pairs();
    assert_eq!(naive, 10_000 * 9_999 / 2);
    assert!(exhaustive.stats.comparisons > naive / 2);
    assert!(
        accelerated.stats.comparisons < naive / 1_000,
        "spatial hash compared {} pairs",
        accelerated.stats.comparisons
    );
    assert!(accelerated.stats.candidate_cells >= 1);
    Ok(())
}
