// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coincidence engine - finds cross-object face pairs that occupy the same
//! surface patch

mod engine;
mod exhaustive;
mod pair;
mod predicate;
mod spatial_hash;

pub use engine::{
    detector_for, find_overlaps, find_overlaps_with_progress, Detection, DetectionStats,
    OverlapDetector, ProgressFn, Strategy,
};
pub use exhaustive::ExhaustiveDetector;
pub use pair::{canonicalize, OverlapPair, PairKey};
pub use predicate::CoincidenceTest;
pub use spatial_hash::{CellKey, SpatialGrid, SpatialHashDetector};
