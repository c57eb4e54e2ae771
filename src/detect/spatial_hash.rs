// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Uniform spatial hash for accelerating coincidence queries
//!
//! Faces are bucketed by `round(center / cell_size)`. Because the cell size is
//! never smaller than the distance tolerance, two coincident faces always sit
//! in the same or adjacent cells, so scanning the 27-cell neighbourhood finds
//! exactly the pairs the exhaustive detector finds.

use super::engine::{
    Detection, DetectionStats, ObjectSlots, OverlapDetector, ProgressFn, Strategy, PROGRESS_STRIDE,
};
use super::pair::{canonicalize, OverlapPair};
use super::predicate::CoincidenceTest;
use crate::error::{Result, SeamError};
use crate::geometry::FaceRecord;
use crate::utils::math::grid_cell;
use ahash::AHashMap;
use nalgebra::Point3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Integer cell coordinates
pub type CellKey = [i64; 3];

/// Headroom applied to the cell size when it equals the tolerance exactly,
/// so floating-point division cannot push a coincident neighbour two cells away
const CELL_GUARD: f64 = 1e-6;

/// The 27 offsets covering a cell and its face, edge and corner neighbours
fn neighbourhood(key: CellKey) -> impl Iterator<Item = CellKey> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).map(move |dz| [key[0] + dx, key[1] + dy, key[2] + dz])
        })
    })
}

/// Record indices bucketed by cell
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: AHashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket every record by its center
    pub fn build(records: &[FaceRecord], cell_size: f64) -> Self {
        let mut cells: AHashMap<CellKey, Vec<usize>> = AHashMap::new();
        for (index, record) in records.iter().enumerate() {
            cells
                .entry(grid_cell(&record.center, cell_size))
                .or_insert_with(Vec::new)
                .push(index);
        }
        Self { cell_size, cells }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell_of(&self, point: &Point3<f64>) -> CellKey {
        grid_cell(point, self.cell_size)
    }

    /// Record indices in one cell
    pub fn get(&self, key: &CellKey) -> &[usize] {
        self.cells.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record indices in a cell and its 26 neighbours
    pub fn neighbours(&self, key: CellKey) -> impl Iterator<Item = usize> + '_ {
        neighbourhood(key).flat_map(move |k| self.get(&k).iter().copied())
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &Vec<usize>)> {
        self.cells.iter()
    }

    /// Cells whose records come from at least two distinct objects
    pub fn candidate_cells(&self, slots: &[u32]) -> usize {
        self.cells
            .values()
            .filter(|indices| {
                let first = slots[indices[0]];
                indices.iter().any(|&i| slots[i] != first)
            })
            .count()
    }
}

/// Detector that restricts comparisons to spatially nearby faces
#[derive(Debug, Clone)]
pub struct SpatialHashDetector {
    test: CoincidenceTest,
    cell_size: f64,
    parallel: bool,
}

impl SpatialHashDetector {
    /// Fails when the cell is smaller than the distance tolerance
    pub fn new(test: CoincidenceTest, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size < test.distance_tolerance {
            return Err(SeamError::ToleranceMisconfiguration(format!(
                "spatial cell size {} is smaller than distance tolerance {}",
                cell_size, test.distance_tolerance
            )));
        }
        Ok(Self {
            test,
            cell_size,
            parallel: false,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn hash_cell_size(&self) -> f64 {
        self.cell_size
            .max(self.test.distance_tolerance * (1.0 + CELL_GUARD))
    }

    /// Pairs between record `i` and every later record in its neighbourhood.
    ///
    /// Each record lives in exactly one cell, so restricting to `j > i`
    /// visits every unordered pair once.
    fn scan_record(
        &self,
        i: usize,
        grid: &SpatialGrid,
        records: &[FaceRecord],
        slots: &[u32],
    ) -> (Vec<OverlapPair>, u64) {
        let mut pairs = Vec::new();
        let mut comparisons = 0;
        let a = &records[i];

        for j in grid.neighbours(grid.cell_of(&a.center)) {
            if j <= i || slots[i] == slots[j] {
                continue;
            }
            comparisons += 1;
            let b = &records[j];
            if self.test.matches(a, b) {
                pairs.push(OverlapPair::new(a.clone(), b.clone()));
            }
        }

        (pairs, comparisons)
    }
}

impl OverlapDetector for SpatialHashDetector {
    fn strategy(&self) -> Strategy {
        Strategy::SpatialHash
    }

    fn detect(&self, records: &[FaceRecord], progress: Option<&ProgressFn<'_>>) -> Result<Detection> {
        let start = Instant::now();
        let slots = ObjectSlots::assign(records)?;
        let n = records.len();
        let mut stats = DetectionStats::new(Strategy::SpatialHash, n, slots.objects);

        let grid = SpatialGrid::build(records, self.hash_cell_size());
        stats.occupied_cells = grid.occupied_cells();
        stats.candidate_cells = grid.candidate_cells(&slots.slots);

        tracing::debug!(
            cell_size = grid.cell_size(),
            occupied = stats.occupied_cells,
            candidates = stats.candidate_cells,
            "spatial hash built"
        );

        let (mut pairs, comparisons) = if self.parallel {
            let done = AtomicUsize::new(0);
            (0..n)
                .into_par_iter()
                .map(|i| {
                    let found = self.scan_record(i, &grid, records, &slots.slots);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(report) = progress {
                        if finished % PROGRESS_STRIDE == 0 || finished == n {
                            report(finished, n);
                        }
                    }
                    found
                })
                .reduce(
                    || (Vec::new(), 0),
                    |(mut acc, count), (found, found_count)| {
                        acc.extend(found);
                        (acc, count + found_count)
                    },
                )
        } else {
            let mut pairs = Vec::new();
            let mut comparisons = 0;
            for i in 0..n {
                let (found, found_count) = self.scan_record(i, &grid, records, &slots.slots);
                pairs.extend(found);
                comparisons += found_count;
                if let Some(report) = progress {
                    if (i + 1) % PROGRESS_STRIDE == 0 || i + 1 == n {
                        report(i + 1, n);
                    }
                }
            }
            (pairs, comparisons)
        };

        canonicalize(&mut pairs);
        stats.comparisons = comparisons;
        stats.elapsed = start.elapsed();

        tracing::debug!(
            records = n,
            comparisons,
            pairs = pairs.len(),
            "spatial hash detection finished"
        );

        Ok(Detection { pairs, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ExhaustiveDetector;
    use nalgebra::Vector3;

    fn record(object: &str, index: usize, center: Point3<f64>) -> FaceRecord {
        FaceRecord::new(object, index, center, Vector3::z(), 1.0)
    }

    #[test]
    fn test_neighbourhood_has_27_cells() {
        let cells: Vec<_> = neighbourhood([0, 0, 0]).collect();
        assert_eq!(cells.len(), 27);
        assert!(cells.contains(&[-1, 1, -1]));
        assert!(cells.contains(&[0, 0, 0]));
    }

    #[test]
    fn test_grid_buckets() {
        let records = vec![
            record("A", 0, Point3::new(0.01, 0.0, 0.0)),
            record("B", 0, Point3::new(0.02, 0.0, 0.0)),
            record("A", 1, Point3::new(1.0, 0.0, 0.0)),
        ];
        let grid = SpatialGrid::build(&records, 0.1);
        assert_eq!(grid.occupied_cells(), 2);
        assert_eq!(grid.get(&[0, 0, 0]), &[0, 1]);
        assert_eq!(grid.get(&[10, 0, 0]), &[2]);
        assert!(grid.get(&[5, 5, 5]).is_empty());
        assert_eq!(grid.candidate_cells(&[0, 1, 0]), 1);
    }

    #[test]
    fn test_pair_across_cell_boundary() {
        // Both faces are within tolerance but round into different cells
        let test = CoincidenceTest::new(0.001, 0.1);
        let records = vec![
            record("A", 0, Point3::new(0.0499, 0.0, 0.0)),
            record("B", 0, Point3::new(0.0501, 0.0, 0.0)),
        ];

        let detector = SpatialHashDetector::new(test, 0.1).unwrap();
        let grid = SpatialGrid::build(&records, 0.1);
        assert_ne!(grid.cell_of(&records[0].center), grid.cell_of(&records[1].center));

        let detection = detector.detect(&records, None).unwrap();
        assert_eq!(detection.len(), 1);
    }

    #[test]
    fn test_cell_equal_to_tolerance() {
        let test = CoincidenceTest::new(0.5, 0.1);
        let records = vec![
            record("A", 0, Point3::new(0.25, 0.0, 0.0)),
            record("B", 0, Point3::new(-0.25, 0.0, 0.0)),
        ];
        let detection = SpatialHashDetector::new(test, 0.5)
            .unwrap()
            .detect(&records, None)
            .unwrap();
        assert_eq!(detection.len(), 1);
    }

    #[test]
    fn test_rejects_small_cells() {
        let test = CoincidenceTest::new(0.01, 0.1);
        assert!(matches!(
            SpatialHashDetector::new(test, 0.005),
            Err(SeamError::ToleranceMisconfiguration(_))
        ));
    }

    #[test]
    fn test_matches_exhaustive_on_dense_cluster() {
        let test = CoincidenceTest::new(0.05, 0.1);
        let mut records = Vec::new();
        for i in 0..60 {
            let object = ["A", "B", "C", "D"][i % 4];
            let t = i as f64 * 0.013;
            records.push(record(object, i, Point3::new(t.sin() * 0.1, t.cos() * 0.1, t * 0.02)));
        }

        let exhaustive = ExhaustiveDetector::new(test).detect(&records, None).unwrap();
        let hashed = SpatialHashDetector::new(test, 0.05)
            .unwrap()
            .with_parallel(true)
            .detect(&records, None)
            .unwrap();

        let keys = |d: &Detection| d.pairs.iter().map(|p| p.key()).collect::<Vec<_>>();
        assert!(!exhaustive.is_empty());
        assert_eq!(keys(&exhaustive), keys(&hashed));
    }
}
