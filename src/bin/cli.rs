// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Seamscan CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use seamscan::cli::Reporter;
use seamscan::detect::{find_overlaps, find_overlaps_with_progress};
use seamscan::report::{inventory, quick_scan, Report, ReportOptions};
use seamscan::resolve::{RemovalPlan, ResolutionPlanner, Seam, SeamRoles};
use seamscan::{apply_plan, DetectionConfig, Scene};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seamscan")]
#[command(about = "Find and resolve coincident faces between mesh objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./seamscan.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect coincident faces and print a report
    Detect {
        /// Scene JSON file
        scene: PathBuf,

        /// Maximum centroid distance
        #[arg(long)]
        tolerance: Option<f64>,

        /// Allowed deviation of |n1 . n2| from 1
        #[arg(long)]
        slack: Option<f64>,

        /// Spatial hash cell size
        #[arg(long)]
        cell_size: Option<f64>,

        /// Compare every face pair instead of using the spatial hash
        #[arg(long)]
        exhaustive: bool,

        /// Use all cores
        #[arg(long)]
        parallel: bool,

        /// Also write the report as JSON
        #[arg(long, value_name = "OUT")]
        json: Option<PathBuf>,
    },

    /// Cheap scan for grid cells shared by several objects
    Quick {
        /// Scene JSON file
        scene: PathBuf,

        #[arg(long, default_value_t = 0.1)]
        cell_size: f64,
    },

    /// List objects and duplicated base names
    Inventory {
        /// Scene JSON file
        scene: PathBuf,
    },

    /// Compute the two alternative removal plans
    Resolve {
        /// Scene JSON file
        scene: PathBuf,

        /// TOML file with one [[seam]] table per seam
        #[arg(long, conflicts_with_all = ["seam", "keep_a", "keep_b"])]
        seams: Option<PathBuf>,

        /// Objects bordering a single seam, comma separated
        #[arg(long, value_delimiter = ',')]
        seam: Vec<String>,

        /// Object kept by the first plan
        #[arg(long)]
        keep_a: Option<String>,

        /// Object kept by the second plan
        #[arg(long)]
        keep_b: Option<String>,

        /// Output directory for plan_a.json, plan_b.json and findings.json
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Fail instead of writing plans when any finding needs a decision
        #[arg(long)]
        strict: bool,
    },

    /// Apply a removal plan and write the edited scene
    Apply {
        /// Scene JSON file
        scene: PathBuf,

        /// Plan JSON file
        plan: PathBuf,

        /// Output scene file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the effective configuration
    Config,

    /// Show version information
    Version,
}

/// `--seams` file layout
#[derive(Debug, Serialize, Deserialize)]
struct SeamsFile {
    #[serde(rename = "seam", default)]
    seams: Vec<SeamRoles>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Detect {
            scene,
            tolerance,
            slack,
            cell_size,
            exhaustive,
            parallel,
            json,
        } => {
            let mut config = config;
            if let Some(tolerance) = tolerance {
                config.distance_tolerance = tolerance;
            }
            if let Some(slack) = slack {
                config.angular_slack = slack;
            }
            if cell_size.is_some() {
                config.spatial_cell_size = cell_size;
            }
            if exhaustive {
                config.use_accelerated_engine = false;
            }
            config.parallel |= parallel;
            detect_command(&scene, &config, json.as_deref(), cli.verbose)?;
        }
        Commands::Quick { scene, cell_size } => {
            let data = load_scene(&scene)?;
            let scan = quick_scan(&data.extract()?, cell_size)?;
            Reporter::report_scan(&scene.display().to_string(), &scan);
        }
        Commands::Inventory { scene } => {
            let data = load_scene(&scene)?;
            Reporter::report_inventory(&scene.display().to_string(), &inventory(&data.objects));
        }
        Commands::Resolve {
            scene,
            seams,
            seam,
            keep_a,
            keep_b,
            out,
            strict,
        } => {
            let roles = match seams {
                Some(path) => load_seams(&path)?,
                None => {
                    if seam.len() < 2 {
                        bail!("--seam needs at least two objects, or pass --seams FILE");
                    }
                    let keep_a = keep_a.context("--keep-a is required with --seam")?;
                    let keep_b = keep_b.context("--keep-b is required with --seam")?;
                    vec![SeamRoles::new(Seam::new(seam.join("/"), seam), keep_a, keep_b)]
                }
            };
            resolve_command(&scene, &roles, &config, &out, strict)?;
        }
        Commands::Apply {
            scene,
            plan,
            output,
        } => {
            apply_command(&scene, &plan, &output)?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Version => {
            println!("seamscan v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DetectionConfig> {
    match path {
        Some(path) => {
            let mut config = DetectionConfig::from_file(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => DetectionConfig::load(),
    }
}

fn load_scene(path: &Path) -> Result<Scene> {
    Scene::load(path).with_context(|| format!("Failed to load scene: {}", path.display()))
}

fn load_seams(path: &Path) -> Result<Vec<SeamRoles>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seams file: {}", path.display()))?;
    let file: SeamsFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse seams file: {}", path.display()))?;
    if file.seams.is_empty() {
        bail!("{} defines no [[seam]] tables", path.display());
    }
    Ok(file.seams)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn detect_command(
    scene: &Path,
    config: &DetectionConfig,
    json: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let data = load_scene(scene)?;
    let records = data.extract()?;

    if verbose {
        Reporter::progress(&format!(
            "Comparing {} faces from {} objects",
            records.len(),
            data.objects.len()
        ));
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )?
        .progress_chars("#>-"),
    );
    let progress = |done: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    };

    let detection = find_overlaps_with_progress(&records, config, &progress)?;
    bar.finish_and_clear();

    let report = Report::from_detection(&detection, ReportOptions::from(config));
    Reporter::report_detection(&scene.display().to_string(), &report);

    if let Some(path) = json {
        fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Reporter::report_info(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

fn resolve_command(
    scene: &Path,
    roles: &[SeamRoles],
    config: &DetectionConfig,
    out: &Path,
    strict: bool,
) -> Result<()> {
    let data = load_scene(scene)?;
    let records = data.extract()?;
    let detection = find_overlaps(&records, config)?;

    let planner = ResolutionPlanner::new(&detection.pairs);
    let mut resolution = planner.plan_dual(roles)?;

    let fingerprints = data.fingerprints();
    for plan in [&mut resolution.keep_a, &mut resolution.keep_b] {
        plan.stamp(fingerprints.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    Reporter::report_resolution(&resolution);

    fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
    write_json(&out.join("findings.json"), &resolution.findings)?;

    let (plan_a, plan_b) = if strict {
        resolution.require_unambiguous()?
    } else {
        (resolution.keep_a, resolution.keep_b)
    };

    write_json(&out.join("plan_a.json"), &plan_a)?;
    write_json(&out.join("plan_b.json"), &plan_b)?;
    Reporter::success(&format!("Plans written to {}", out.display()));

    Ok(())
}

fn apply_command(scene: &Path, plan: &Path, output: &Path) -> Result<()> {
    if scene == output {
        bail!("refusing to overwrite the input scene; choose another --output");
    }

    let mut data = load_scene(scene)?;
    let content = fs::read_to_string(plan)
        .with_context(|| format!("Failed to read plan: {}", plan.display()))?;
    let plan: RemovalPlan = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan: {}", plan.display()))?;

    let outcome = apply_plan(&mut data, &plan)?;
    data.save(output)
        .with_context(|| format!("Failed to write scene: {}", output.display()))?;

    if outcome.already_applied {
        Reporter::report_warning(&format!("'{}' was already applied; scene unchanged", plan.label));
    } else {
        Reporter::success(&format!(
            "Removed {} faces ({}) -> {}",
            outcome.faces_removed,
            plan.label,
            output.display()
        ));
    }

    Ok(())
}
