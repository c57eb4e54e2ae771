// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Host integration: reading meshes and applying removal plans

mod scene;

pub use scene::Scene;

use crate::error::{Result, SeamError};
use crate::geometry::MeshObject;
use crate::resolve::RemovalPlan;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// The editing application that owns the meshes.
///
/// Face deletion happens only through this trait; the detector and planner
/// never mutate geometry.
pub trait MeshHost {
    fn mesh_objects(&self) -> &[MeshObject];

    fn mesh(&self, name: &str) -> Option<&MeshObject> {
        self.mesh_objects().iter().find(|m| m.name == name)
    }

    /// Delete faces from one mesh and commit; returns the number removed
    fn delete_faces(&mut self, object_id: &str, faces: &BTreeSet<usize>) -> Result<usize>;

    fn is_applied(&self, plan_id: &str) -> bool;

    fn mark_applied(&mut self, plan_id: String);
}

/// Outcome of one `apply_plan` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub plan_id: String,
    pub faces_removed: usize,
    pub already_applied: bool,
}

/// SHA-256 over a mesh's name, transform, vertices, face loops and any
/// host-supplied normals
pub fn fingerprint(mesh: &MeshObject) -> String {
    let mut hasher = Sha256::new();
    hasher.update(mesh.name.as_bytes());
    hasher.update([0u8]);
    for value in mesh.transform.iter() {
        hasher.update(value.to_bits().to_le_bytes());
    }
    for vertex in &mesh.vertices {
        for value in vertex.coords.iter() {
            hasher.update(value.to_bits().to_le_bytes());
        }
    }
    for face in &mesh.faces {
        hasher.update((face.len() as u64).to_le_bytes());
        for &index in &face.indices {
            hasher.update((index as u64).to_le_bytes());
        }
    }
    if let Some(normals) = &mesh.face_normals {
        hasher.update([1u8]);
        for normal in normals {
            for value in normal.iter() {
                hasher.update(value.to_bits().to_le_bytes());
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Check that every object a plan touches still matches the planning snapshot
pub fn check_plan<H: MeshHost + ?Sized>(host: &H, plan: &RemovalPlan) -> Result<()> {
    for (object_id, faces) in &plan.removals {
        let mesh = host
            .mesh(object_id)
            .ok_or_else(|| SeamError::stale(object_id.as_str(), "object no longer exists"))?;

        if let Some(expected) = plan.snapshots.get(object_id) {
            if fingerprint(mesh) != *expected {
                return Err(SeamError::stale(
                    object_id.as_str(),
                    "mesh changed since the plan was computed",
                ));
            }
        }

        if let Some(&last) = faces.iter().next_back() {
            if last >= mesh.face_count() {
                return Err(SeamError::stale(
                    object_id.as_str(),
                    format!("face {} out of range ({} faces)", last, mesh.face_count()),
                ));
            }
        }
    }
    Ok(())
}

/// Apply a removal plan to a host.
///
/// All objects are checked before anything is deleted, so a stale plan leaves
/// the host untouched. Applying a plan the host has already applied is a no-op,
/// unless the plan is stamped and every snapshot still matches: then the meshes
/// are in the state the plan was computed against and it is applied again.
pub fn apply_plan<H: MeshHost + ?Sized>(host: &mut H, plan: &RemovalPlan) -> Result<ApplyOutcome> {
    let plan_id = plan.id();
    let checked = check_plan(&*host, plan);

    if host.is_applied(&plan_id) {
        if plan.snapshots.is_empty() || checked.is_err() {
            tracing::info!(plan = %plan.label, "plan already applied, skipping");
            return Ok(ApplyOutcome {
                plan_id,
                faces_removed: 0,
                already_applied: true,
            });
        }
        tracing::info!(plan = %plan.label, "meshes match the plan snapshot again, reapplying");
    }

    if let Err(e) = checked {
        tracing::warn!(plan = %plan.label, error = %e, "refusing stale plan");
        return Err(e);
    }

    let mut faces_removed = 0;
    for (object_id, faces) in &plan.removals {
        let removed = host.delete_faces(object_id, faces)?;
        tracing::debug!(object = %object_id, removed, "deleted faces");
        faces_removed += removed;
    }
    host.mark_applied(plan_id.clone());

    tracing::info!(plan = %plan.label, faces_removed, "plan applied");
    Ok(ApplyOutcome {
        plan_id,
        faces_removed,
        already_applied: false,
    })
}
