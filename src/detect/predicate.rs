// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coincidence predicate: centroid distance plus normal alignment

use crate::geometry::FaceRecord;
use serde::{Deserialize, Serialize};

/// Decides whether two faces occupy the same surface patch.
///
/// Two faces are coincident when their centroids are within
/// `distance_tolerance` and their normals are parallel or anti-parallel,
/// i.e. `||n1 . n2| - 1| <= angular_slack`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoincidenceTest {
    pub distance_tolerance: f64,
    pub angular_slack: f64,
}

impl Default for CoincidenceTest {
    fn default() -> Self {
        Self {
            distance_tolerance: 0.001,
            angular_slack: 0.1,
        }
    }
}

impl CoincidenceTest {
    pub fn new(distance_tolerance: f64, angular_slack: f64) -> Self {
        Self {
            distance_tolerance,
            angular_slack,
        }
    }

    /// Distance half of the test
    #[inline]
    pub fn centers_close(&self, a: &FaceRecord, b: &FaceRecord) -> bool {
        (a.center - b.center).norm() <= self.distance_tolerance
    }

    /// Orientation half of the test
    #[inline]
    pub fn normals_aligned(&self, a: &FaceRecord, b: &FaceRecord) -> bool {
        (a.normal.dot(&b.normal).abs() - 1.0).abs() <= self.angular_slack
    }

    /// Full predicate; faces of the same object are never coincident
    #[inline]
    pub fn is_coincident(&self, a: &FaceRecord, b: &FaceRecord) -> bool {
        a.object_id != b.object_id && self.matches(a, b)
    }

    /// Geometric part only, for callers that already know the objects differ
    #[inline]
    pub(crate) fn matches(&self, a: &FaceRecord, b: &FaceRecord) -> bool {
        self.centers_close(a, b) && self.normals_aligned(a, b)
    }
}
