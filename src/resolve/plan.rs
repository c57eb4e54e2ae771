// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Removal plans: which faces to delete from which object

use crate::geometry::FaceRef;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Per-object face indices to delete.
///
/// Indices refer to the extraction snapshot the plan was computed from. A plan
/// is valid until the next mutation of any mesh it references; `snapshots`
/// records the fingerprint of each referenced mesh at planning time so a host
/// can detect late application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalPlan {
    pub label: String,
    /// Objects whose copy of the duplicated geometry is kept
    #[serde(default)]
    pub keep_in: Vec<String>,
    pub removals: BTreeMap<String, BTreeSet<usize>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub snapshots: BTreeMap<String, String>,
}

impl RemovalPlan {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Mark one face for removal
    pub fn remove(&mut self, object_id: &str, face_index: usize) {
        self.removals
            .entry(object_id.to_string())
            .or_default()
            .insert(face_index);
    }

    /// Mark several faces of one object for removal
    pub fn remove_all(&mut self, object_id: &str, face_indices: impl IntoIterator<Item = usize>) {
        let entry = self.removals.entry(object_id.to_string()).or_default();
        entry.extend(face_indices);
        if entry.is_empty() {
            self.removals.remove(object_id);
        }
    }

    /// Record an object whose geometry this plan keeps
    pub fn keep(&mut self, object_id: &str) {
        if !self.keep_in.iter().any(|k| k == object_id) {
            self.keep_in.push(object_id.to_string());
        }
    }

    /// Fold another plan's removals and keepers into this one
    pub fn merge(&mut self, other: &RemovalPlan) {
        for (object_id, faces) in &other.removals {
            self.remove_all(object_id, faces.iter().copied());
        }
        for object_id in &other.keep_in {
            self.keep(object_id);
        }
    }

    pub fn faces_for(&self, object_id: &str) -> Option<&BTreeSet<usize>> {
        self.removals.get(object_id)
    }

    pub fn contains(&self, face: &FaceRef) -> bool {
        self.removals
            .get(&face.object_id)
            .is_some_and(|faces| faces.contains(&face.face_index))
    }

    /// Total faces across all objects
    pub fn face_count(&self) -> usize {
        self.removals.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.face_count() == 0
    }

    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.removals.keys().map(String::as_str)
    }

    pub fn face_refs(&self) -> impl Iterator<Item = FaceRef> + '_ {
        self.removals.iter().flat_map(|(object_id, faces)| {
            faces.iter().map(move |&i| FaceRef::new(object_id.clone(), i))
        })
    }

    /// Faces this plan and `other` both remove
    pub fn intersection(&self, other: &RemovalPlan) -> Vec<FaceRef> {
        self.face_refs().filter(|f| other.contains(f)).collect()
    }

    /// Attach mesh fingerprints for every object the plan touches
    pub fn stamp<'a>(&mut self, fingerprints: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (object_id, fingerprint) in fingerprints {
            if self.removals.contains_key(object_id) {
                self.snapshots
                    .insert(object_id.to_string(), fingerprint.to_string());
            }
        }
    }

    /// Content hash identifying this plan, including the mesh state it was
    /// computed against
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.label.as_bytes());
        for (object_id, faces) in &self.removals {
            hasher.update([0u8]);
            hasher.update(object_id.as_bytes());
            hasher.update([0u8]);
            for face in faces {
                hasher.update((*face as u64).to_le_bytes());
            }
        }
        for (object_id, fingerprint) in &self.snapshots {
            hasher.update([1u8]);
            hasher.update(object_id.as_bytes());
            hasher.update([0u8]);
            hasher.update(fingerprint.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_and_query() {
        let mut plan = RemovalPlan::new("keep A");
        plan.remove("B", 3);
        plan.remove("B", 1);
        plan.remove_all("C", [7, 7, 2]);

        assert_eq!(plan.face_count(), 4);
        assert!(plan.contains(&FaceRef::new("B", 1)));
        assert!(!plan.contains(&FaceRef::new("A", 1)));
        assert_eq!(plan.objects().collect::<Vec<_>>(), vec!["B", "C"]);
        assert_eq!(
            plan.faces_for("C").unwrap().iter().copied().collect::<Vec<_>>(),
            vec![2, 7]
        );
    }

    #[test]
    fn test_remove_all_empty_does_not_create_entry() {
        let mut plan = RemovalPlan::new("p");
        plan.remove_all("A", []);
        assert!(plan.is_empty());
        assert_eq!(plan.objects().count(), 0);
    }

    #[test]
    fn test_merge_and_intersection() {
        let mut a = RemovalPlan::new("a");
        a.remove("Z", 0);
        a.keep("X");

        let mut b = RemovalPlan::new("b");
        b.remove("Z", 0);
        b.remove("Y", 4);
        b.keep("X");

        assert_eq!(a.intersection(&b), vec![FaceRef::new("Z", 0)]);

        a.merge(&b);
        assert_eq!(a.face_count(), 2);
        assert_eq!(a.keep_in, vec!["X".to_string()]);
    }

    #[test]
    fn test_id_depends_on_content() {
        let mut a = RemovalPlan::new("a");
        a.remove("B", 1);
        let mut b = a.clone();
        assert_eq!(a.id(), b.id());

        b.remove("B", 2);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().len(), 64);
    }

    #[test]
    fn test_id_depends_on_snapshots() {
        let mut before = RemovalPlan::new("version-a");
        before.remove("Hardware", 0);
        let mut after = before.clone();

        before.stamp([("Hardware", "ddbb")]);
        after.stamp([("Hardware", "ef87")]);
        assert_ne!(before.id(), after.id());
    }

    #[test]
    fn test_stamp_only_touched_objects() {
        let mut plan = RemovalPlan::new("a");
        plan.remove("B", 1);
        plan.stamp([("A", "aaaa"), ("B", "bbbb")]);
        assert_eq!(plan.snapshots.len(), 1);
        assert_eq!(plan.snapshots["B"], "bbbb");
    }
}
