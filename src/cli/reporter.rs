// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::report::{CandidateScan, Inventory, Report};
use crate::resolve::{DualResolution, RemovalPlan};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a detection summary with colors
    pub fn report_detection(scene: &str, report: &Report) {
        Self::header("Scene:", scene);

        if report.is_clean() {
            println!("{} {}", "✅".green(), "No coincident faces".green().bold());
        } else {
            println!(
                "{} {}",
                "❌".red(),
                format!(
                    "{} coincident face pairs ({} faces)",
                    report.total_pairs, report.faces_involved
                )
                .red()
                .bold()
            );
        }

        if let Some(stats) = &report.stats {
            println!("\n{}", "Detection:".bold());
            Self::print_field("Strategy", stats.strategy.as_str());
            Self::print_field(
                "Faces",
                &format!("{} across {} objects", stats.records, stats.objects),
            );
            Self::print_field(
                "Comparisons",
                &format!("{} of {} naive", stats.comparisons, stats.naive_pairs()),
            );
            if stats.occupied_cells > 0 {
                Self::print_field(
                    "Cells",
                    &format!(
                        "{} occupied, {} shared",
                        stats.occupied_cells, stats.candidate_cells
                    ),
                );
            }
            println!(
                "  {} {}",
                "Time:".bright_black(),
                Self::format_duration(stats.elapsed).yellow()
            );
        }

        if !report.by_object_pair.is_empty() {
            println!("\n{}", "By object pair:".bold());
            for group in &report.by_object_pair {
                println!(
                    "  {} ↔ {} {}",
                    group.objects.0.cyan(),
                    group.objects.1.cyan(),
                    format!("{} pairs", group.count).yellow()
                );
                for sample in &group.samples {
                    println!(
                        "    {} {} / {} at {}",
                        "•".bright_black(),
                        sample.a.face_ref(),
                        sample.b.face_ref(),
                        Self::format_point(&sample.midpoint()).bright_black()
                    );
                }
            }
        }

        if !report.by_height.is_empty() {
            println!("\n{}", "By height:".bold());
            for band in &report.by_height {
                let objects: Vec<&str> = band.objects.iter().map(String::as_str).collect();
                println!(
                    "  {} {:>6} {}",
                    format!("z={:>8.3}", band.z).bright_black(),
                    band.count.to_string().yellow(),
                    objects.join(", ")
                );
            }
        }

        if !report.by_region.is_empty() {
            println!("\n{}", "Busiest regions:".bold());
            for region in report.by_region.iter().take(10) {
                println!(
                    "  {} {:>6}",
                    Self::format_point(&region.position).bright_black(),
                    region.count.to_string().yellow()
                );
            }
        }

        Self::rule();
    }

    /// Report a quick candidate scan
    pub fn report_scan(scene: &str, scan: &CandidateScan) {
        Self::header("Quick scan:", scene);
        Self::print_field(
            "Faces",
            &format!("{} in {} cells", scan.total_faces, scan.occupied_cells),
        );
        Self::print_field("Cell size", &format!("{}", scan.cell_size));

        if scan.is_clean() {
            println!("{} {}", "✅".green(), "No shared cells".green());
        } else {
            Self::print_field("Shared cells", &scan.regions.len().to_string());
            println!("\n{}", "Likely overlaps:".bold());
            for estimate in &scan.estimates {
                println!(
                    "  {} ↔ {} {}",
                    estimate.objects.0.cyan(),
                    estimate.objects.1.cyan(),
                    format!("~{} faces", estimate.estimated_faces).yellow()
                );
            }
        }

        Self::rule();
    }

    /// Report object counts and base-name duplicates
    pub fn report_inventory(scene: &str, inventory: &Inventory) {
        Self::header("Inventory:", scene);
        for object in &inventory.objects {
            println!(
                "  {:<32} {:>8} {} {:>8} {}",
                object.name.cyan(),
                object.vertex_count,
                "verts".bright_black(),
                object.face_count,
                "faces".bright_black()
            );
        }
        Self::print_field(
            "Total",
            &format!(
                "{} objects, {} faces",
                inventory.objects.len(),
                inventory.total_faces()
            ),
        );

        for group in &inventory.duplicate_names {
            let names: Vec<&str> = group.objects.iter().map(|o| o.name.as_str()).collect();
            Self::report_warning(&format!(
                "'{}' appears {} times: {}",
                group.base_name,
                group.objects.len(),
                names.join(", ")
            ));
        }

        Self::rule();
    }

    /// Report both alternatives of a dual resolution
    pub fn report_resolution(resolution: &DualResolution) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{}", "Resolution".bold());
        println!("{}", "━".repeat(80).bright_black());

        Self::print_plan(&resolution.keep_a);
        Self::print_plan(&resolution.keep_b);

        if resolution.is_ambiguous() {
            println!(
                "\n{} {}",
                "⚠️ ".yellow(),
                format!("{} findings need a decision", resolution.findings.len())
                    .yellow()
                    .bold()
            );
            for finding in &resolution.findings {
                println!(
                    "  {} [{}] {} faces at {} ({})",
                    finding.kind.as_str().red(),
                    finding.seam.cyan(),
                    finding.faces.len(),
                    Self::format_point(&finding.center),
                    finding.competing_plans.join(", ").bright_black()
                );
            }
        } else {
            println!("\n{} {}", "✅".green(), "Plans are disjoint".green());
        }

        Self::rule();
    }

    fn print_plan(plan: &RemovalPlan) {
        println!(
            "\n{} {} {}",
            plan.label.bold(),
            format!("keeps {}", plan.keep_in.join(", ")).bright_black(),
            format!("({} faces)", plan.face_count()).yellow()
        );
        for object_id in plan.objects() {
            let count = plan.faces_for(object_id).map_or(0, |f| f.len());
            println!("  {} {}", format!("{}:", object_id).bright_black(), count);
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    fn header(title: &str, subject: &str) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", title.bold(), subject.cyan());
        println!("{}", "━".repeat(80).bright_black());
    }

    fn rule() {
        println!("{}", "━".repeat(80).bright_black());
    }

    fn print_field(name: &str, value: &str) {
        println!("  {} {}", format!("{}:", name).bright_black(), value.cyan());
    }

    fn format_point(point: &nalgebra::Point3<f64>) -> String {
        format!("({:.3}, {:.3}, {:.3})", point.x, point.y, point.z)
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print progress line
    pub fn progress(message: &str) {
        println!("{} {}...", "⏳".bright_blue(), message.bright_black());
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}
