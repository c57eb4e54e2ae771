// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Grid and float helpers

use nalgebra::Point3;

/// Index of the grid cell nearest to `value` for a grid of spacing `cell`.
///
/// Ties always round towards +inf so that two values at most one cell apart
/// never land more than one index apart. Saturates at the `i64` range.
pub fn grid_index(value: f64, cell: f64) -> i64 {
    (value / cell + 0.5).floor() as i64
}

/// Integer cell coordinates of a point
pub fn grid_cell(point: &Point3<f64>, cell: f64) -> [i64; 3] {
    [
        grid_index(point.x, cell),
        grid_index(point.y, cell),
        grid_index(point.z, cell),
    ]
}

/// Check that every coordinate of a point is finite
pub fn is_finite_point(point: &Point3<f64>) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}
