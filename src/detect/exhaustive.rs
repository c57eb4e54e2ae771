// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exhaustive all-pairs detector, the reference strategy

use super::engine::{
    Detection, DetectionStats, ObjectSlots, OverlapDetector, ProgressFn, Strategy, PROGRESS_STRIDE,
};
use super::pair::{canonicalize, OverlapPair};
use super::predicate::CoincidenceTest;
use crate::error::Result;
use crate::geometry::FaceRecord;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Compares every cross-object pair exactly once
#[derive(Debug, Clone)]
pub struct ExhaustiveDetector {
    test: CoincidenceTest,
    parallel: bool,
}

impl ExhaustiveDetector {
    pub fn new(test: CoincidenceTest) -> Self {
        Self {
            test,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Pairs between record `i` and every later record
    fn scan_row(&self, i: usize, records: &[FaceRecord], slots: &[u32]) -> (Vec<OverlapPair>, u64) {
        let mut pairs = Vec::new();
        let mut comparisons = 0;
        let a = &records[i];

        for j in (i + 1)..records.len() {
            if slots[i] == slots[j] {
                continue;
            }
            comparisons += 1;
            let b = &records[j];
            if self.test.matches(a, b) {
                pairs.push(OverlapPair::new(a.clone(), b.clone()));
            }
        }

        (pairs, comparisons)
    }
}

impl OverlapDetector for ExhaustiveDetector {
    fn strategy(&self) -> Strategy {
        Strategy::Exhaustive
    }

    fn detect(&self, records: &[FaceRecord], progress: Option<&ProgressFn<'_>>) -> Result<Detection> {
        let start = Instant::now();
        let slots = ObjectSlots::assign(records)?;
        let n = records.len();
        let mut stats = DetectionStats::new(Strategy::Exhaustive, n, slots.objects);

        let (mut pairs, comparisons) = if self.parallel {
            let done = AtomicUsize::new(0);
            (0..n)
                .into_par_iter()
                .map(|i| {
                    let row = self.scan_row(i, records, &slots.slots);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(report) = progress {
                        if finished % PROGRESS_STRIDE == 0 || finished == n {
                            report(finished, n);
                        }
                    }
                    row
                })
                .reduce(
                    || (Vec::new(), 0),
                    |(mut acc, count), (row, row_count)| {
                        acc.extend(row);
                        (acc, count + row_count)
                    },
                )
        } else {
            let mut pairs = Vec::new();
            let mut comparisons = 0;
            for i in 0..n {
                let (row, row_count) = self.scan_row(i, records, &slots.slots);
                pairs.extend(row);
                comparisons += row_count;
                if let Some(report) = progress {
                    if (i + 1) % PROGRESS_STRIDE == 0 || i + 1 == n {
                        report(i + 1, n);
                    }
                }
            }
            (pairs, comparisons)
        };

        canonicalize(&mut pairs);
        stats.comparisons = comparisons;
        stats.elapsed = start.elapsed();

        tracing::debug!(
            records = n,
            comparisons,
            pairs = pairs.len(),
            "exhaustive detection finished"
        );

        Ok(Detection { pairs, stats })
    }
}
