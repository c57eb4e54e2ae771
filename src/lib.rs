// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Seamscan
//!
//! Finds coincident faces between distinct mesh objects (the cause of
//! z-fighting), summarizes them and plans which copy of each duplicated
//! surface to delete.

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod host;
pub mod report;
pub mod resolve;
pub mod utils;

pub use config::DetectionConfig;
pub use detect::{find_overlaps, Detection, OverlapDetector, OverlapPair};
pub use error::{Result, SeamError};
pub use geometry::{extract, FaceRecord, FaceRef, MeshObject, Primitive};
pub use host::{apply_plan, MeshHost, Scene};
pub use report::{summarize, Report, ReportOptions};
pub use resolve::{DualResolution, RemovalPlan, ResolutionPlanner, Seam, SeamRoles};

/// Extract, detect and summarize in one pass
pub fn scan(objects: &[MeshObject], config: &DetectionConfig) -> Result<Report> {
    let records = extract(objects)?;
    let detection = find_overlaps(&records, config)?;
    Ok(Report::from_detection(&detection, ReportOptions::from(config)))
}
