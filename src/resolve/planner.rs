// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Resolution planner - turns detected overlaps into alternative removal plans

use super::plan::RemovalPlan;
use crate::detect::OverlapPair;
use crate::error::{Result, SeamError};
use crate::geometry::FaceRef;
use ahash::{AHashMap, AHashSet};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Label of the first alternative in a dual resolution
pub const VERSION_A: &str = "version-a";
/// Label of the second alternative in a dual resolution
pub const VERSION_B: &str = "version-b";

/// A named boundary shared by two or more objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seam {
    pub name: String,
    pub members: BTreeSet<String>,
}

impl Seam {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, object_id: &str) -> bool {
        self.members.contains(object_id)
    }

    /// Whether both sides of the pair border this seam
    pub fn covers(&self, pair: &OverlapPair) -> bool {
        self.contains(&pair.a.object_id) && self.contains(&pair.b.object_id)
    }
}

/// A seam together with the object each alternative keeps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeamRoles {
    #[serde(flatten)]
    pub seam: Seam,
    pub keep_a: String,
    pub keep_b: String,
}

impl SeamRoles {
    pub fn new(seam: Seam, keep_a: impl Into<String>, keep_b: impl Into<String>) -> Self {
        Self {
            seam,
            keep_a: keep_a.into(),
            keep_b: keep_b.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.keep_a == self.keep_b {
            return Err(SeamError::invalid(format!(
                "seam '{}' keeps '{}' in both alternatives",
                self.seam.name, self.keep_a
            )));
        }
        for keeper in [&self.keep_a, &self.keep_b] {
            if !self.seam.contains(keeper) {
                return Err(SeamError::invalid(format!(
                    "'{}' does not border seam '{}'",
                    keeper, self.seam.name
                )));
            }
        }
        Ok(())
    }
}

/// A connected group of mutually coincident faces: one surface patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub faces: BTreeMap<String, BTreeSet<usize>>,
    pub center: Point3<f64>,
}

impl Cluster {
    pub fn has_object(&self, object_id: &str) -> bool {
        self.faces.contains_key(object_id)
    }

    pub fn face_refs(&self) -> Vec<FaceRef> {
        self.faces
            .iter()
            .flat_map(|(object_id, faces)| faces.iter().map(move |&i| FaceRef::new(object_id.clone(), i)))
            .collect()
    }

    pub fn face_count(&self) -> usize {
        self.faces.values().map(BTreeSet::len).sum()
    }
}

/// Conditions the planner cannot settle on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    /// The same face is removed under both alternatives
    RemovedUnderBoth,
    /// Faces with no coincident copy in the kept object, so no copy is preferred
    NoKeeper,
    /// Merged removals would delete every copy of a patch
    WouldCreateHole,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::RemovedUnderBoth => "removed under both plans",
            FindingKind::NoKeeper => "no copy in kept object",
            FindingKind::WouldCreateHole => "would create hole",
        }
    }
}

/// A structured report for operator review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionFinding {
    pub kind: FindingKind,
    pub seam: String,
    pub faces: Vec<FaceRef>,
    pub center: Point3<f64>,
    /// Labels of the plans involved
    pub competing_plans: Vec<String>,
}

/// A single plan plus anything it could not resolve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub plan: RemovalPlan,
    pub findings: Vec<ResolutionFinding>,
}

/// Two alternative resolutions computed from one detection pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualResolution {
    pub keep_a: RemovalPlan,
    pub keep_b: RemovalPlan,
    pub findings: Vec<ResolutionFinding>,
}

impl DualResolution {
    pub fn is_ambiguous(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Both plans, or an error when anything needs an operator decision
    pub fn require_unambiguous(self) -> Result<(RemovalPlan, RemovalPlan)> {
        if self.is_ambiguous() {
            return Err(SeamError::AmbiguousResolution {
                count: self.findings.len(),
            });
        }
        Ok((self.keep_a, self.keep_b))
    }
}

/// Computes removal plans from a fixed set of detected pairs.
///
/// The planner never touches mesh data; it only reads the pairs.
pub struct ResolutionPlanner<'a> {
    pairs: &'a [OverlapPair],
}

impl<'a> ResolutionPlanner<'a> {
    pub fn new(pairs: &'a [OverlapPair]) -> Self {
        Self { pairs }
    }

    /// Pairs whose both sides border the seam
    pub fn seam_pairs<'s>(&'s self, seam: &'s Seam) -> impl Iterator<Item = &'a OverlapPair> + 's {
        self.pairs.iter().filter(move |pair| seam.covers(pair))
    }

    /// Group the seam's overlapping faces into connected patches
    pub fn clusters(&self, seam: &Seam) -> Vec<Cluster> {
        let mut adjacency: AHashMap<FaceRef, Vec<FaceRef>> = AHashMap::new();
        let mut centers: AHashMap<FaceRef, Point3<f64>> = AHashMap::new();
        let mut order: Vec<FaceRef> = Vec::new();

        for pair in self.seam_pairs(seam) {
            let a = pair.a.face_ref();
            let b = pair.b.face_ref();
            for (face, center) in [(&a, pair.a.center), (&b, pair.b.center)] {
                if centers.insert(face.clone(), center).is_none() {
                    order.push(face.clone());
                }
            }
            adjacency.entry(a.clone()).or_insert_with(Vec::new).push(b.clone());
            adjacency.entry(b).or_insert_with(Vec::new).push(a);
        }

        let mut visited: AHashSet<FaceRef> = AHashSet::new();
        let mut clusters = Vec::new();

        for start in order {
            if visited.contains(&start) {
                continue;
            }

            let mut faces: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
            let mut sum = nalgebra::Vector3::<f64>::zeros();
            let mut count = 0usize;
            let mut queue = VecDeque::from([start.clone()]);
            visited.insert(start);

            while let Some(face) = queue.pop_front() {
                sum += centers[&face].coords;
                count += 1;
                if let Some(neighbours) = adjacency.get(&face) {
                    for next in neighbours {
                        if visited.insert(next.clone()) {
                            queue.push_back(next.clone());
                        }
                    }
                }
                faces
                    .entry(face.object_id)
                    .or_default()
                    .insert(face.face_index);
            }

            clusters.push(Cluster {
                faces,
                center: Point3::from(sum / count as f64),
            });
        }

        clusters
    }

    /// Plan that keeps `keep_in`'s copy of every patch on the seam.
    ///
    /// Faces are removed only where they coincide directly with a face of
    /// `keep_in`; anything else in the patch is left in place and reported.
    pub fn plan(&self, seam: &Seam, keep_in: &str) -> Result<PlanOutcome> {
        let label = format!("keep {}", keep_in);
        self.plan_labelled(seam, keep_in, &label)
    }

    fn plan_labelled(&self, seam: &Seam, keep_in: &str, label: &str) -> Result<PlanOutcome> {
        if !seam.contains(keep_in) {
            return Err(SeamError::invalid(format!(
                "'{}' does not border seam '{}'",
                keep_in, seam.name
            )));
        }

        let mut plan = RemovalPlan::new(label);
        plan.keep(keep_in);
        let mut findings = Vec::new();

        // A face may only go when it is itself coincident with a kept face
        let mut covered: AHashSet<FaceRef> = AHashSet::new();
        for pair in self.seam_pairs(seam) {
            if pair.a.object_id == keep_in {
                covered.insert(pair.b.face_ref());
            } else if pair.b.object_id == keep_in {
                covered.insert(pair.a.face_ref());
            }
        }

        for cluster in self.clusters(seam) {
            if cluster.has_object(keep_in) {
                let mut orphaned = Vec::new();
                for face in cluster.face_refs() {
                    if face.object_id == keep_in {
                        continue;
                    }
                    if covered.contains(&face) {
                        plan.remove(&face.object_id, face.face_index);
                    } else {
                        orphaned.push(face);
                    }
                }
                if !orphaned.is_empty() {
                    findings.push(ResolutionFinding {
                        kind: FindingKind::NoKeeper,
                        seam: seam.name.clone(),
                        faces: orphaned,
                        center: cluster.center,
                        competing_plans: vec![label.to_string()],
                    });
                }
            } else {
                findings.push(ResolutionFinding {
                    kind: FindingKind::NoKeeper,
                    seam: seam.name.clone(),
                    faces: cluster.face_refs(),
                    center: cluster.center,
                    competing_plans: vec![label.to_string()],
                });
            }
        }

        tracing::debug!(
            seam = %seam.name,
            keep = keep_in,
            removed = plan.face_count(),
            unresolved = findings.len(),
            "planned seam"
        );

        Ok(PlanOutcome { plan, findings })
    }

    /// Both alternatives over one or more seams, merged into one plan each
    pub fn plan_dual(&self, roles: &[SeamRoles]) -> Result<DualResolution> {
        if roles.is_empty() {
            return Err(SeamError::invalid("no seams to resolve"));
        }

        let mut keep_a = RemovalPlan::new(VERSION_A);
        let mut keep_b = RemovalPlan::new(VERSION_B);
        let mut findings = Vec::new();

        for role in roles {
            role.validate()?;

            let outcome = self.plan_labelled(&role.seam, &role.keep_a, VERSION_A)?;
            keep_a.merge(&outcome.plan);
            findings.extend(outcome.findings);

            let outcome = self.plan_labelled(&role.seam, &role.keep_b, VERSION_B)?;
            keep_b.merge(&outcome.plan);
            findings.extend(outcome.findings);
        }

        // Cross-checks run on the merged plans so seam interactions show up
        let mut reported: AHashSet<FaceRef> = AHashSet::new();
        for role in roles {
            for cluster in self.clusters(&role.seam) {
                let faces = cluster.face_refs();

                let both: Vec<FaceRef> = faces
                    .iter()
                    .filter(|f| keep_a.contains(f) && keep_b.contains(f))
                    .filter(|f| reported.insert((*f).clone()))
                    .cloned()
                    .collect();
                if !both.is_empty() {
                    findings.push(ResolutionFinding {
                        kind: FindingKind::RemovedUnderBoth,
                        seam: role.seam.name.clone(),
                        faces: both,
                        center: cluster.center,
                        competing_plans: vec![VERSION_A.to_string(), VERSION_B.to_string()],
                    });
                }

                for plan in [&keep_a, &keep_b] {
                    if faces.iter().all(|f| plan.contains(f)) {
                        findings.push(ResolutionFinding {
                            kind: FindingKind::WouldCreateHole,
                            seam: role.seam.name.clone(),
                            faces: faces.clone(),
                            center: cluster.center,
                            competing_plans: vec![plan.label.clone()],
                        });
                    }
                }
            }
        }

        for finding in &findings {
            tracing::warn!(
                kind = finding.kind.as_str(),
                seam = %finding.seam,
                faces = finding.faces.len(),
                "resolution needs operator decision"
            );
        }

        Ok(DualResolution {
            keep_a,
            keep_b,
            findings,
        })
    }
}
