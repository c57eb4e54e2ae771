// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Quad-faced primitives for building test scenes and fixtures

use super::MeshObject;
use nalgebra::{Point3, Vector3};

/// Geometric primitives
pub enum Primitive {
    /// Square in the XY plane centred on the origin, facing +Z
    Quad { size: f64 },
    /// Box made of six outward-facing quads
    Cuboid { size: Vector3<f64>, center: bool },
    /// Flat grid of `cols` x `rows` square quads in the XY plane
    Grid { cols: usize, rows: usize, spacing: f64 },
}

impl Primitive {
    pub fn quad(size: f64) -> Self {
        Self::Quad { size }
    }

    pub fn cuboid(size: Vector3<f64>, center: bool) -> Self {
        Self::Cuboid { size, center }
    }

    pub fn grid(cols: usize, rows: usize, spacing: f64) -> Self {
        Self::Grid {
            cols,
            rows,
            spacing,
        }
    }

    pub fn to_mesh(&self, name: impl Into<String>) -> MeshObject {
        match self {
            Self::Quad { size } => generate_quad_mesh(name, *size),
            Self::Cuboid { size, center } => generate_cuboid_mesh(name, *size, *center),
            Self::Grid {
                cols,
                rows,
                spacing,
            } => generate_grid_mesh(name, *cols, *rows, *spacing),
        }
    }
}

fn generate_quad_mesh(name: impl Into<String>, size: f64) -> MeshObject {
    let h = size / 2.0;
    let mut mesh = MeshObject::with_capacity(name, 4, 1);
    mesh.add_polygon(&[
        Point3::new(-h, -h, 0.0),
        Point3::new(h, -h, 0.0),
        Point3::new(h, h, 0.0),
        Point3::new(-h, h, 0.0),
    ]);
    mesh
}

fn generate_cuboid_mesh(name: impl Into<String>, size: Vector3<f64>, center: bool) -> MeshObject {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    let mut mesh = MeshObject::with_capacity(name, 8, 6);
    let corners = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    for corner in corners {
        mesh.add_vertex(corner);
    }

    // Counter-clockwise when viewed from outside
    let loops = [
        [0, 3, 2, 1], // bottom (-Z)
        [4, 5, 6, 7], // top (+Z)
        [0, 1, 5, 4], // front (-Y)
        [2, 3, 7, 6], // back (+Y)
        [0, 4, 7, 3], // left (-X)
        [1, 2, 6, 5], // right (+X)
    ];
    for face in loops {
        mesh.add_face(face.to_vec());
    }

    mesh
}

fn generate_grid_mesh(name: impl Into<String>, cols: usize, rows: usize, spacing: f64) -> MeshObject {
    let mut mesh = MeshObject::with_capacity(name, (cols + 1) * (rows + 1), cols * rows);

    for j in 0..=rows {
        for i in 0..=cols {
            mesh.add_vertex(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
        }
    }

    let stride = cols + 1;
    for j in 0..rows {
        for i in 0..cols {
            let v0 = j * stride + i;
            mesh.add_face(vec![v0, v0 + 1, v0 + 1 + stride, v0 + stride]);
        }
    }

    mesh
}
