// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detection strategies behind one interface

use super::exhaustive::ExhaustiveDetector;
use super::pair::OverlapPair;
use super::spatial_hash::SpatialHashDetector;
use crate::config::DetectionConfig;
use crate::error::{Result, SeamError};
use crate::geometry::FaceRecord;
use crate::utils::math::is_finite_point;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

// Custom serialization for Duration
fn serialize_duration<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::from_secs_f64(secs))
}

/// Progress callback: `(completed, total)` work units
pub type ProgressFn<'a> = dyn Fn(usize, usize) + Sync + 'a;

/// How often, in work units, progress is reported
pub(crate) const PROGRESS_STRIDE: usize = 256;

/// Detection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Exhaustive,
    SpatialHash,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exhaustive => "exhaustive",
            Strategy::SpatialHash => "spatial-hash",
        }
    }
}

/// Counters describing one detection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionStats {
    pub strategy: Strategy,
    pub records: usize,
    pub objects: usize,
    /// Cross-object candidate pairs on which the predicate was evaluated
    pub comparisons: u64,
    /// Spatial hash cells holding at least one face (spatial hash only)
    pub occupied_cells: usize,
    /// Cells holding faces from two or more objects (spatial hash only)
    pub candidate_cells: usize,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub elapsed: Duration,
}

impl DetectionStats {
    pub fn new(strategy: Strategy, records: usize, objects: usize) -> Self {
        Self {
            strategy,
            records,
            objects,
            comparisons: 0,
            occupied_cells: 0,
            candidate_cells: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Unordered record pairs a naive all-pairs scan would visit
    pub fn naive_pairs(&self) -> u64 {
        let n = self.records as u64;
        n * n.saturating_sub(1) / 2
    }
}

/// Result of one detection pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Canonically ordered, duplicate-free
    pub pairs: Vec<OverlapPair>,
    pub stats: DetectionStats,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// A coincident-face detection strategy
pub trait OverlapDetector: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// Find every cross-object coincident pair among `records`
    fn detect(&self, records: &[FaceRecord], progress: Option<&ProgressFn<'_>>) -> Result<Detection>;
}

/// Dense per-record object ordinals, so the hot loops compare integers
pub(crate) struct ObjectSlots {
    pub slots: Vec<u32>,
    pub objects: usize,
}

impl ObjectSlots {
    /// Assign slots, rejecting records that cannot be compared
    pub fn assign(records: &[FaceRecord]) -> Result<Self> {
        let mut ids: AHashMap<&str, u32> = AHashMap::new();
        let mut seen: AHashSet<(&str, usize)> = AHashSet::with_capacity(records.len());
        let mut slots = Vec::with_capacity(records.len());

        for record in records {
            if !is_finite_point(&record.center) || record.normal.iter().any(|v| !v.is_finite()) {
                return Err(SeamError::invalid(format!(
                    "face {}#{} has non-finite geometry",
                    record.object_id, record.face_index
                )));
            }
            if !seen.insert((record.object_id.as_str(), record.face_index)) {
                return Err(SeamError::invalid(format!(
                    "face {}#{} appears twice",
                    record.object_id, record.face_index
                )));
            }

            let next = ids.len() as u32;
            let slot = *ids.entry(record.object_id.as_str()).or_insert(next);
            slots.push(slot);
        }

        Ok(Self {
            slots,
            objects: ids.len(),
        })
    }
}

/// Build the detector selected by `config`
pub fn detector_for(config: &DetectionConfig) -> Result<Box<dyn OverlapDetector>> {
    config.validate()?;
    let test = config.coincidence_test();

    if config.use_accelerated_engine {
        Ok(Box::new(
            SpatialHashDetector::new(test, config.effective_cell_size())?.with_parallel(config.parallel),
        ))
    } else {
        Ok(Box::new(ExhaustiveDetector::new(test).with_parallel(config.parallel)))
    }
}

/// Find all coincident face pairs using the configured strategy
pub fn find_overlaps(records: &[FaceRecord], config: &DetectionConfig) -> Result<Detection> {
    detector_for(config)?.detect(records, None)
}

/// As [`find_overlaps`], reporting progress along the way
pub fn find_overlaps_with_progress(
    records: &[FaceRecord],
    config: &DetectionConfig,
    progress: &ProgressFn<'_>,
) -> Result<Detection> {
    detector_for(config)?.detect(records, Some(progress))
}
