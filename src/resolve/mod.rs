// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Resolution planning for detected overlaps

mod plan;
mod planner;

pub use plan::RemovalPlan;
pub use planner::{
    Cluster, DualResolution, FindingKind, PlanOutcome, ResolutionFinding, ResolutionPlanner, Seam,
    SeamRoles, VERSION_A, VERSION_B,
};
