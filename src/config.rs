// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detection configuration system

use crate::detect::CoincidenceTest;
use crate::error::SeamError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file picked up from the working directory
pub const CONFIG_FILE: &str = "seamscan.toml";

/// Cell size multiplier applied to the distance tolerance when no explicit
/// spatial cell size is configured
pub const DEFAULT_CELL_FACTOR: f64 = 100.0;

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum centroid distance for two faces to count as coincident
    pub distance_tolerance: f64,
    /// Allowed deviation of `|n1 . n2|` from 1
    pub angular_slack: f64,
    /// Spatial hash cell size (defaults to tolerance x 100)
    pub spatial_cell_size: Option<f64>,
    /// Use the spatial hash instead of the exhaustive engine
    pub use_accelerated_engine: bool,
    /// Spread detection across the rayon thread pool
    pub parallel: bool,
    /// Grid used to group pairs into human-scale regions
    pub report_cell_size: f64,
    /// Sample pairs kept per object pair in reports
    pub sample_limit: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            distance_tolerance: 0.001,
            angular_slack: 0.1,
            spatial_cell_size: None,
            use_accelerated_engine: true,
            parallel: false,
            report_cell_size: 0.1,
            sample_limit: 5,
        }
    }
}

impl DetectionConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: DetectionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `SEAMSCAN_*` environment variables on top of the current values
    pub fn apply_env_overrides(&mut self) {
        if let Some(tolerance) = env_parse("SEAMSCAN_TOLERANCE") {
            self.distance_tolerance = tolerance;
        }

        if let Some(slack) = env_parse("SEAMSCAN_ANGULAR_SLACK") {
            self.angular_slack = slack;
        }

        if let Some(cell) = env_parse("SEAMSCAN_CELL_SIZE") {
            self.spatial_cell_size = Some(cell);
        }

        if let Some(accelerated) = env_parse("SEAMSCAN_ACCELERATED") {
            self.use_accelerated_engine = accelerated;
        }

        if let Some(parallel) = env_parse("SEAMSCAN_PARALLEL") {
            self.parallel = parallel;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Spatial hash cell size after applying the default
    pub fn effective_cell_size(&self) -> f64 {
        self.spatial_cell_size
            .unwrap_or(self.distance_tolerance * DEFAULT_CELL_FACTOR)
    }

    /// The coincidence predicate described by this configuration
    pub fn coincidence_test(&self) -> CoincidenceTest {
        CoincidenceTest::new(self.distance_tolerance, self.angular_slack)
    }

    /// Reject settings that would make the engines disagree or misbehave
    pub fn validate(&self) -> std::result::Result<(), SeamError> {
        if !self.distance_tolerance.is_finite() || self.distance_tolerance <= 0.0 {
            return Err(SeamError::ToleranceMisconfiguration(format!(
                "distance tolerance must be positive, got {}",
                self.distance_tolerance
            )));
        }

        if !self.angular_slack.is_finite() || self.angular_slack < 0.0 {
            return Err(SeamError::ToleranceMisconfiguration(format!(
                "angular slack must be non-negative, got {}",
                self.angular_slack
            )));
        }

        let cell = self.effective_cell_size();
        if !cell.is_finite() || cell < self.distance_tolerance {
            return Err(SeamError::ToleranceMisconfiguration(format!(
                "spatial cell size {} is smaller than distance tolerance {}",
                cell, self.distance_tolerance
            )));
        }

        if !self.report_cell_size.is_finite() || self.report_cell_size <= 0.0 {
            return Err(SeamError::ToleranceMisconfiguration(format!(
                "report cell size must be positive, got {}",
                self.report_cell_size
            )));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.distance_tolerance, 0.001);
        assert_eq!(config.angular_slack, 0.1);
        assert!((config.effective_cell_size() - 0.1).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cell_smaller_than_tolerance_is_rejected() {
        let config = DetectionConfig {
            spatial_cell_size: Some(0.0005),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SeamError::ToleranceMisconfiguration(_))
        ));

        let config = DetectionConfig {
            spatial_cell_size: Some(0.001),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_values_rejected() {
        let config = DetectionConfig {
            distance_tolerance: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DetectionConfig {
            angular_slack: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seamscan.toml");

        let config = DetectionConfig {
            distance_tolerance: 0.01,
            spatial_cell_size: Some(0.5),
            parallel: true,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = DetectionConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: DetectionConfig = toml::from_str("distance_tolerance = 0.002\n").unwrap();
        assert_eq!(config.distance_tolerance, 0.002);
        assert_eq!(config.angular_slack, 0.1);
        assert!(config.use_accelerated_engine);
    }
}
