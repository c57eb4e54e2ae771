// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy for detection, planning and plan application

use thiserror::Error;

/// Errors raised by the seamscan core
#[derive(Error, Debug)]
pub enum SeamError {
    /// Geometry handed to the extractor or engine is unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A removal plan no longer matches the mesh it targets
    #[error("Stale plan for '{object}': {reason}")]
    StaleIndex { object: String, reason: String },

    /// Faces would be removed under both alternative plans
    #[error("Ambiguous resolution: {count} finding(s) need an operator decision")]
    AmbiguousResolution { count: usize },

    /// The spatial hash cannot match the exhaustive engine with these settings
    #[error("Tolerance misconfiguration: {0}")]
    ToleranceMisconfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SeamError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SeamError::InvalidInput(message.into())
    }

    pub fn stale(object: impl Into<String>, reason: impl Into<String>) -> Self {
        SeamError::StaleIndex {
            object: object.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SeamError::stale("Hardware", "fingerprint changed");
        assert_eq!(
            err.to_string(),
            "Stale plan for 'Hardware': fingerprint changed"
        );

        let err = SeamError::AmbiguousResolution { count: 2 };
        assert!(err.to_string().contains("2 finding(s)"));
    }
}
