// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face records: the world-space view of every face in the working set

use super::mesh::{polygon_geometry, MeshObject};
use crate::error::{Result, SeamError};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifies one face inside one extraction snapshot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceRef {
    pub object_id: String,
    pub face_index: usize,
}

impl FaceRef {
    pub fn new(object_id: impl Into<String>, face_index: usize) -> Self {
        Self {
            object_id: object_id.into(),
            face_index,
        }
    }
}

impl fmt::Display for FaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.object_id, self.face_index)
    }
}

/// World-space centroid, normal and area of a single face.
///
/// `face_index` is only meaningful for the extraction pass that produced the
/// record; any deletion on the owning mesh invalidates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub object_id: String,
    pub face_index: usize,
    pub center: Point3<f64>,
    pub normal: Vector3<f64>,
    pub area: f64,
}

impl FaceRecord {
    pub fn new(
        object_id: impl Into<String>,
        face_index: usize,
        center: Point3<f64>,
        normal: Vector3<f64>,
        area: f64,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            face_index,
            center,
            normal,
            area,
        }
    }

    pub fn face_ref(&self) -> FaceRef {
        FaceRef::new(self.object_id.clone(), self.face_index)
    }
}

/// Extract world-space face records from one mesh
pub fn extract_object(mesh: &MeshObject) -> Result<Vec<FaceRecord>> {
    mesh.validate()?;

    let normal_matrix = mesh.normal_matrix();
    let mut records = Vec::with_capacity(mesh.face_count());

    for face_index in 0..mesh.face_count() {
        let local = mesh.local_face_geometry(face_index);

        let center = mesh.transform.transform_point(&local.centroid);
        let transformed = normal_matrix * local.normal;
        let length = transformed.norm();
        let normal = if length > 0.0 {
            transformed / length
        } else {
            Vector3::zeros()
        };

        // Area in world units needs the transformed loop, not the local one
        let world_points: Vec<Point3<f64>> = mesh
            .face_points(face_index)
            .iter()
            .map(|p| mesh.transform.transform_point(p))
            .collect();
        let area = polygon_geometry(&world_points).area;

        records.push(FaceRecord {
            object_id: mesh.name.clone(),
            face_index,
            center,
            normal,
            area,
        });
    }

    Ok(records)
}

/// Extract face records for every mesh in the working set.
///
/// Fails on an empty object list, duplicate object names, or any malformed
/// mesh; no partial result is returned.
pub fn extract(objects: &[MeshObject]) -> Result<Vec<FaceRecord>> {
    if objects.is_empty() {
        return Err(SeamError::invalid("no mesh objects to extract"));
    }

    let mut seen = HashSet::new();
    for object in objects {
        if !seen.insert(object.name.as_str()) {
            return Err(SeamError::invalid(format!(
                "duplicate mesh object name '{}'",
                object.name
            )));
        }
    }

    let total: usize = objects.iter().map(MeshObject::face_count).sum();
    let mut records = Vec::with_capacity(total);
    for object in objects {
        records.extend(extract_object(object)?);
    }

    tracing::debug!(
        objects = objects.len(),
        faces = records.len(),
        "extracted face records"
    );

    Ok(records)
}
