// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh objects as exposed by the host scene

use crate::error::{Result, SeamError};
use crate::utils::math::is_finite_point;
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const DEGENERATE_EPS: f64 = 1e-12;

/// Polygonal face defined by a loop of vertex indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Centroid, orientation and area of one polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonGeometry {
    pub centroid: Point3<f64>,
    /// Unit normal, or zero for a degenerate polygon
    pub normal: Vector3<f64>,
    pub area: f64,
}

/// Compute area-weighted centroid, Newell normal and area of a planar polygon.
///
/// Degenerate polygons report a zero normal, zero area and the vertex mean as
/// centroid.
pub fn polygon_geometry(points: &[Point3<f64>]) -> PolygonGeometry {
    if points.is_empty() {
        return PolygonGeometry {
            centroid: Point3::origin(),
            normal: Vector3::zeros(),
            area: 0.0,
        };
    }

    let mut newell = Vector3::<f64>::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        newell.x += (current.y - next.y) * (current.z + next.z);
        newell.y += (current.z - next.z) * (current.x + next.x);
        newell.z += (current.x - next.x) * (current.y + next.y);
    }

    let mean = points
        .iter()
        .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords)
        / points.len() as f64;

    let length = newell.norm();
    if length < DEGENERATE_EPS {
        return PolygonGeometry {
            centroid: Point3::from(mean),
            normal: Vector3::zeros(),
            area: 0.0,
        };
    }
    let normal = newell / length;

    // Fan triangulation; signed weights keep concave loops correct
    let origin = points[0];
    let mut weighted = Vector3::<f64>::zeros();
    let mut total = 0.0;
    for k in 1..points.len().saturating_sub(1) {
        let a = points[k] - origin;
        let b = points[k + 1] - origin;
        let w = 0.5 * a.cross(&b).dot(&normal);
        weighted += w * (origin.coords + points[k].coords + points[k + 1].coords) / 3.0;
        total += w;
    }

    let centroid = if total.abs() > DEGENERATE_EPS {
        Point3::from(weighted / total)
    } else {
        Point3::from(mean)
    };

    PolygonGeometry {
        centroid,
        normal,
        area: length * 0.5,
    }
}

fn identity_transform() -> Matrix4<f64> {
    Matrix4::identity()
}

/// A named mesh with its world transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshObject {
    pub name: String,
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<Face>,
    #[serde(default = "identity_transform")]
    pub transform: Matrix4<f64>,
    /// Per-face local normals supplied by the host, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_normals: Option<Vec<Vector3<f64>>>,
}

impl MeshObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
            transform: Matrix4::identity(),
            face_normals: None,
        }
    }

    pub fn with_capacity(name: impl Into<String>, vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            ..Self::new(name)
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    /// Add a face and return its index
    pub fn add_face(&mut self, indices: Vec<usize>) -> usize {
        let index = self.faces.len();
        self.faces.push(Face::new(indices));
        index
    }

    /// Add a polygon from world-independent positions, creating fresh vertices
    pub fn add_polygon(&mut self, points: &[Point3<f64>]) -> usize {
        let indices = points.iter().map(|p| self.add_vertex(*p)).collect();
        self.add_face(indices)
    }

    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform = transform;
        self
    }

    /// Set the transform from translation, XYZ euler rotation (radians) and scale
    pub fn placed(self, translation: Vector3<f64>, rotation: Vector3<f64>, scale: Vector3<f64>) -> Self {
        let matrix = Matrix4::new_translation(&translation)
            * Rotation3::from_euler_angles(rotation.x, rotation.y, rotation.z).to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&scale);
        self.with_transform(matrix)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check the mesh is well formed enough to extract
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SeamError::invalid("mesh object with empty name"));
        }

        if let Some(normals) = &self.face_normals {
            if normals.len() != self.faces.len() {
                return Err(SeamError::invalid(format!(
                    "'{}' has {} faces but {} face normals",
                    self.name,
                    self.faces.len(),
                    normals.len()
                )));
            }
        }

        if self.transform.iter().any(|v| !v.is_finite()) {
            return Err(SeamError::invalid(format!(
                "'{}' has a non-finite world transform",
                self.name
            )));
        }

        if let Some(i) = self.vertices.iter().position(|p| !is_finite_point(p)) {
            return Err(SeamError::invalid(format!(
                "'{}' vertex {} is not finite",
                self.name, i
            )));
        }

        for (face_index, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(SeamError::invalid(format!(
                    "'{}' face {} has {} vertices",
                    self.name,
                    face_index,
                    face.len()
                )));
            }
            if let Some(&bad) = face.indices.iter().find(|&&i| i >= self.vertices.len()) {
                return Err(SeamError::invalid(format!(
                    "'{}' face {} references vertex {} of {}",
                    self.name,
                    face_index,
                    bad,
                    self.vertices.len()
                )));
            }
        }

        Ok(())
    }

    /// Local-space positions of one face's loop
    pub fn face_points(&self, face_index: usize) -> Vec<Point3<f64>> {
        self.faces[face_index]
            .indices
            .iter()
            .map(|&i| self.vertices[i])
            .collect()
    }

    /// Local-space geometry of one face, honouring host-supplied normals
    pub fn local_face_geometry(&self, face_index: usize) -> PolygonGeometry {
        let mut geometry = polygon_geometry(&self.face_points(face_index));
        if let Some(normals) = &self.face_normals {
            let supplied = normals[face_index];
            let length = supplied.norm();
            geometry.normal = if length > DEGENERATE_EPS {
                supplied / length
            } else {
                Vector3::zeros()
            };
        }
        geometry
    }

    /// Matrix that carries local normals into world space
    pub fn normal_matrix(&self) -> Matrix3<f64> {
        let linear: Matrix3<f64> = self.transform.fixed_view::<3, 3>(0, 0).into_owned();
        linear
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(linear)
    }

    /// Delete the faces at the given indices; vertices are left in place
    pub fn remove_faces(&mut self, face_indices: &BTreeSet<usize>) -> usize {
        if face_indices.is_empty() {
            return 0;
        }

        let before = self.faces.len();
        let mut index = 0;
        self.faces.retain(|_| {
            let keep = !face_indices.contains(&index);
            index += 1;
            keep
        });

        if let Some(normals) = &mut self.face_normals {
            let mut index = 0;
            normals.retain(|_| {
                let keep = !face_indices.contains(&index);
                index += 1;
                keep
            });
        }

        before - self.faces.len()
    }
}
