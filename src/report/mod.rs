// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reporting layer - read-only summaries of detected overlaps

mod candidates;
mod inventory;
mod summary;

pub use candidates::{quick_scan, CandidateRegion, CandidateScan, ObjectPairEstimate};
pub use inventory::{base_name, inventory, Inventory, NameGroup, ObjectSummary};
pub use summary::{summarize, HeightBand, ObjectPairGroup, RegionGroup, Report, ReportOptions};
