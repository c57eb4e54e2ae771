// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Overlap report: pairs grouped by object pair, region and height

use crate::config::DetectionConfig;
use crate::detect::{CellKey, Detection, DetectionStats, OverlapPair};
use crate::utils::math::{grid_cell, grid_index};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Grouping parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Human-scale grid used for region and height grouping
    pub region_cell_size: f64,
    /// Sample pairs kept per object pair
    pub sample_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            region_cell_size: 0.1,
            sample_limit: 5,
        }
    }
}

impl From<&DetectionConfig> for ReportOptions {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            region_cell_size: config.report_cell_size,
            sample_limit: config.sample_limit,
        }
    }
}

/// Overlaps between one pair of objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectPairGroup {
    pub objects: (String, String),
    pub count: usize,
    pub samples: Vec<OverlapPair>,
}

/// Overlaps whose midpoint falls in one coarse grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionGroup {
    pub cell: CellKey,
    /// Center of the grid cell
    pub position: Point3<f64>,
    pub count: usize,
    pub objects: BTreeSet<String>,
}

/// Overlaps at one rounded Z height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeightBand {
    pub z: f64,
    pub count: usize,
    pub objects: BTreeSet<String>,
}

/// Read-only summary of a set of overlap pairs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub total_pairs: usize,
    /// Distinct faces that take part in at least one pair
    pub faces_involved: usize,
    pub by_object_pair: Vec<ObjectPairGroup>,
    pub by_region: Vec<RegionGroup>,
    pub by_height: Vec<HeightBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<DetectionStats>,
}

impl Report {
    /// Summarize a detection, keeping its counters
    pub fn from_detection(detection: &Detection, options: ReportOptions) -> Self {
        let mut report = summarize(&detection.pairs, options);
        report.stats = Some(detection.stats.clone());
        report
    }

    pub fn is_clean(&self) -> bool {
        self.total_pairs == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Group pairs by sorted object pair, by coarse region and by height
pub fn summarize(pairs: &[OverlapPair], options: ReportOptions) -> Report {
    let cell = options.region_cell_size;

    let mut by_pair: BTreeMap<(String, String), ObjectPairGroup> = BTreeMap::new();
    let mut by_region: BTreeMap<CellKey, RegionGroup> = BTreeMap::new();
    let mut by_height: BTreeMap<i64, HeightBand> = BTreeMap::new();
    let mut faces = BTreeSet::new();

    for pair in pairs {
        faces.insert(pair.a.face_ref());
        faces.insert(pair.b.face_ref());

        let (a, b) = pair.objects();
        let key = (a.to_string(), b.to_string());
        let group = by_pair.entry(key.clone()).or_insert_with(|| ObjectPairGroup {
            objects: key,
            count: 0,
            samples: Vec::new(),
        });
        group.count += 1;
        if group.samples.len() < options.sample_limit {
            group.samples.push(pair.clone());
        }

        let midpoint = pair.midpoint();

        let cell_key = grid_cell(&midpoint, cell);
        let region = by_region.entry(cell_key).or_insert_with(|| RegionGroup {
            cell: cell_key,
            position: Point3::new(
                cell_key[0] as f64 * cell,
                cell_key[1] as f64 * cell,
                cell_key[2] as f64 * cell,
            ),
            count: 0,
            objects: BTreeSet::new(),
        });
        region.count += 1;
        region.objects.insert(a.to_string());
        region.objects.insert(b.to_string());

        let z_key = grid_index(midpoint.z, cell);
        let band = by_height.entry(z_key).or_insert_with(|| HeightBand {
            z: z_key as f64 * cell,
            count: 0,
            objects: BTreeSet::new(),
        });
        band.count += 1;
        band.objects.insert(a.to_string());
        band.objects.insert(b.to_string());
    }

    let mut regions: Vec<RegionGroup> = by_region.into_values().collect();
    // Busiest regions first; cell order breaks ties
    regions.sort_by(|x, y| y.count.cmp(&x.count).then(x.cell.cmp(&y.cell)));

    Report {
        timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        total_pairs: pairs.len(),
        faces_involved: faces.len(),
        by_object_pair: by_pair.into_values().collect(),
        by_region: regions,
        by_height: by_height.into_values().rev().collect(),
        stats: None,
    }
}
