// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Quick candidate scan: cells shared by faces of several objects
//!
//! Much cheaper than full detection and useful for a first look at a scene.
//! It applies no coincidence test, so counts are estimates.

use crate::detect::{CellKey, SpatialGrid};
use crate::error::{Result, SeamError};
use crate::geometry::FaceRecord;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One grid cell holding faces from two or more objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRegion {
    pub cell: CellKey,
    /// Center of the first face found in the cell
    pub sample_position: Point3<f64>,
    pub face_count: usize,
    pub object_counts: BTreeMap<String, usize>,
}

/// Rough count of overlapping faces between two objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPairEstimate {
    pub objects: (String, String),
    pub estimated_faces: usize,
}

/// Result of a quick scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScan {
    pub cell_size: f64,
    pub total_faces: usize,
    pub occupied_cells: usize,
    pub regions: Vec<CandidateRegion>,
    /// Sorted by estimate, largest first
    pub estimates: Vec<ObjectPairEstimate>,
}

impl CandidateScan {
    pub fn is_clean(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Bucket faces by `cell_size` and list cells shared by several objects.
///
/// Each object pair's estimate sums, over shared cells, the smaller of the
/// two objects' face counts in that cell.
pub fn quick_scan(records: &[FaceRecord], cell_size: f64) -> Result<CandidateScan> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(SeamError::invalid(format!(
            "scan cell size must be positive, got {}",
            cell_size
        )));
    }

    let grid = SpatialGrid::build(records, cell_size);
    let mut regions = Vec::new();
    let mut estimates: BTreeMap<(String, String), usize> = BTreeMap::new();

    for (cell, indices) in grid.iter() {
        let mut object_counts: BTreeMap<String, usize> = BTreeMap::new();
        for &i in indices {
            *object_counts.entry(records[i].object_id.clone()).or_insert(0) += 1;
        }
        if object_counts.len() < 2 {
            continue;
        }

        let counted: Vec<(&String, &usize)> = object_counts.iter().collect();
        for (x, (first, first_count)) in counted.iter().enumerate() {
            for (second, second_count) in &counted[x + 1..] {
                *estimates
                    .entry(((*first).clone(), (*second).clone()))
                    .or_insert(0) += (**first_count).min(**second_count);
            }
        }

        regions.push(CandidateRegion {
            cell: *cell,
            sample_position: records[indices[0]].center,
            face_count: indices.len(),
            object_counts,
        });
    }

    regions.sort_by(|a, b| a.cell.cmp(&b.cell));

    let mut estimates: Vec<ObjectPairEstimate> = estimates
        .into_iter()
        .map(|(objects, estimated_faces)| ObjectPairEstimate {
            objects,
            estimated_faces,
        })
        .collect();
    estimates.sort_by(|a, b| {
        b.estimated_faces
            .cmp(&a.estimated_faces)
            .then_with(|| a.objects.cmp(&b.objects))
    });

    tracing::debug!(
        cells = grid.occupied_cells(),
        shared = regions.len(),
        "quick scan finished"
    );

    Ok(CandidateScan {
        cell_size,
        total_faces: records.len(),
        occupied_cells: grid.occupied_cells(),
        regions,
        estimates,
    })
}
