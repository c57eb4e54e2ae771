// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-memory scene persisted as JSON

use super::{fingerprint, MeshHost};
use crate::error::{Result, SeamError};
use crate::geometry::{extract, FaceRecord, MeshObject};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// A set of mesh objects plus the ids of plans already applied to them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<MeshObject>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub applied_plans: BTreeSet<String>,
}

impl Scene {
    pub fn new(objects: Vec<MeshObject>) -> Self {
        Self {
            objects,
            applied_plans: BTreeSet::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let scene: Scene = serde_json::from_str(json)?;
        tracing::debug!(objects = scene.objects.len(), "scene loaded");
        Ok(scene)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(MeshObject::face_count).sum()
    }

    /// Face records for every object in the scene
    pub fn extract(&self) -> Result<Vec<FaceRecord>> {
        extract(&self.objects)
    }

    /// Fingerprint of every object, keyed by name
    pub fn fingerprints(&self) -> BTreeMap<String, String> {
        self.objects
            .iter()
            .map(|m| (m.name.clone(), fingerprint(m)))
            .collect()
    }
}

impl MeshHost for Scene {
    fn mesh_objects(&self) -> &[MeshObject] {
        &self.objects
    }

    fn delete_faces(&mut self, object_id: &str, faces: &BTreeSet<usize>) -> Result<usize> {
        let mesh = self
            .objects
            .iter_mut()
            .find(|m| m.name == object_id)
            .ok_or_else(|| SeamError::stale(object_id, "object no longer exists"))?;
        Ok(mesh.remove_faces(faces))
    }

    fn is_applied(&self, plan_id: &str) -> bool {
        self.applied_plans.contains(plan_id)
    }

    fn mark_applied(&mut self, plan_id: String) {
        self.applied_plans.insert(plan_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.json");

        let mut scene = Scene::new(vec![
            Primitive::cuboid(Vector3::new(1.0, 2.0, 3.0), false)
                .to_mesh("Shell")
                .placed(Vector3::new(0.0, 0.0, 1.5), Vector3::zeros(), Vector3::repeat(1.0)),
        ]);
        scene.mark_applied("abc".to_string());
        scene.save(&path).unwrap();

        let loaded = Scene::load(&path).unwrap();
        assert_eq!(loaded.objects.len(), 1);
        assert_eq!(loaded.face_count(), 6);
        assert!(loaded.is_applied("abc"));
        assert_eq!(loaded.fingerprints(), scene.fingerprints());
    }

    #[test]
    fn test_transform_defaults_to_identity() {
        let json = r#"{
            "objects": [{
                "name": "Quad",
                "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0]],
                "faces": [[0,1,2,3]]
            }]
        }"#;
        let scene = Scene::from_json(json).unwrap();
        let records = scene.extract().unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].center.x - 0.5).abs() < 1e-12);
        assert!(scene.applied_plans.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Scene::load("/nonexistent/scene.json"),
            Err(SeamError::Io(_))
        ));
    }

    #[test]
    fn test_delete_faces_unknown_object() {
        let mut scene = Scene::default();
        assert!(scene.delete_faces("nope", &BTreeSet::new()).is_err());
    }
}
