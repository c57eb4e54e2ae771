// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Overlapping face pairs and their canonical ordering

use crate::geometry::{FaceRecord, FaceRef};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Two faces from different objects judged coincident.
///
/// Always stored with `a` before `b` in `(object_id, face_index)` order, so a
/// pair is reported once regardless of the order it was discovered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapPair {
    pub a: FaceRecord,
    pub b: FaceRecord,
}

/// Hashable identity of an overlap pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub a: FaceRef,
    pub b: FaceRef,
}

impl OverlapPair {
    /// Build a pair in canonical order
    pub fn new(first: FaceRecord, second: FaceRecord) -> Self {
        if face_order(&first, &second) == Ordering::Greater {
            Self { a: second, b: first }
        } else {
            Self { a: first, b: second }
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey {
            a: self.a.face_ref(),
            b: self.b.face_ref(),
        }
    }

    /// Object ids of both sides, already sorted
    pub fn objects(&self) -> (&str, &str) {
        (&self.a.object_id, &self.b.object_id)
    }

    /// Whether either side belongs to `object_id`
    pub fn involves(&self, object_id: &str) -> bool {
        self.a.object_id == object_id || self.b.object_id == object_id
    }

    /// Midpoint of the two centroids
    pub fn midpoint(&self) -> Point3<f64> {
        Point3::from((self.a.center.coords + self.b.center.coords) / 2.0)
    }

    /// Centroid separation
    pub fn distance(&self) -> f64 {
        (self.a.center - self.b.center).norm()
    }

    fn sort_key(&self) -> (&str, usize, &str, usize) {
        (
            &self.a.object_id,
            self.a.face_index,
            &self.b.object_id,
            self.b.face_index,
        )
    }
}

fn face_order(x: &FaceRecord, y: &FaceRecord) -> Ordering {
    (x.object_id.as_str(), x.face_index).cmp(&(y.object_id.as_str(), y.face_index))
}

/// Sort pairs into canonical order and drop repeats
pub fn canonicalize(pairs: &mut Vec<OverlapPair>) {
    pairs.sort_by(|x, y| x.sort_key().cmp(&y.sort_key()));
    pairs.dedup_by(|x, y| x.sort_key() == y.sort_key());
}
