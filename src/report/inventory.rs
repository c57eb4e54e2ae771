// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object inventory and duplicate-name detection

use crate::geometry::MeshObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts for one mesh object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub name: String,
    pub vertex_count: usize,
    pub face_count: usize,
}

/// Objects sharing a base name, e.g. `Hardware` and `Hardware.001`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameGroup {
    pub base_name: String,
    pub objects: Vec<ObjectSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// Sorted by name
    pub objects: Vec<ObjectSummary>,
    pub duplicate_names: Vec<NameGroup>,
}

impl Inventory {
    pub fn total_faces(&self) -> usize {
        self.objects.iter().map(|o| o.face_count).sum()
    }

    pub fn total_vertices(&self) -> usize {
        self.objects.iter().map(|o| o.vertex_count).sum()
    }
}

/// Name with any `.NNN` copy suffix removed
pub fn base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Summarize the working set
pub fn inventory(objects: &[MeshObject]) -> Inventory {
    let mut summaries: Vec<ObjectSummary> = objects
        .iter()
        .map(|o| ObjectSummary {
            name: o.name.clone(),
            vertex_count: o.vertex_count(),
            face_count: o.face_count(),
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut groups: BTreeMap<&str, Vec<ObjectSummary>> = BTreeMap::new();
    for summary in &summaries {
        groups
            .entry(base_name(&summary.name))
            .or_default()
            .push(summary.clone());
    }

    let duplicate_names = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(base, members)| NameGroup {
            base_name: base.to_string(),
            objects: members,
        })
        .collect();

    Inventory {
        objects: summaries,
        duplicate_names,
    }
}
