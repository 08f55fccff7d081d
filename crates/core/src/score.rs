// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Compatibility scoring.
//!
//! ```text
//! feature_score   = (flags_set / 4) * 0.7
//! error_penalty   = min(errors * 0.1, 0.3)
//! warning_penalty = min(warnings * 0.05, 0.2)
//! score           = max(0.0, feature_score - error_penalty - warning_penalty)
//! ```
//!
//! The attainable maximum is therefore 0.7.

use crate::capability::Capability;
use crate::result::TestResult;
use serde::{Deserialize, Serialize};

/// Share of the score earned by capability coverage.
pub const FEATURE_WEIGHT: f64 = 0.7;
/// Penalty per recorded error.
pub const ERROR_PENALTY: f64 = 0.1;
/// Upper bound of the error penalty.
pub const MAX_ERROR_PENALTY: f64 = 0.3;
/// Penalty per recorded warning.
pub const WARNING_PENALTY: f64 = 0.05;
/// Upper bound of the warning penalty.
pub const MAX_WARNING_PENALTY: f64 = 0.2;

/// Intermediate terms of a score computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Capability coverage term.
    pub feature_score: f64,
    /// Capped error penalty.
    pub error_penalty: f64,
    /// Capped warning penalty.
    pub warning_penalty: f64,
    /// Final floored score.
    pub score: f64,
}

/// Compute every term of the score for a finished record.
pub fn breakdown(result: &TestResult) -> ScoreBreakdown {
    let supported = result.supported_count() as f64;
    let feature_score = supported / Capability::ALL.len() as f64 * FEATURE_WEIGHT;
    let error_penalty = (result.errors.len() as f64 * ERROR_PENALTY).min(MAX_ERROR_PENALTY);
    let warning_penalty = (result.warnings.len() as f64 * WARNING_PENALTY).min(MAX_WARNING_PENALTY);

    ScoreBreakdown {
        feature_score,
        error_penalty,
        warning_penalty,
        score: (feature_score - error_penalty - warning_penalty).max(0.0),
    }
}

/// Compatibility score of a finished record.
pub fn compatibility_score(result: &TestResult) -> f64 {
    breakdown(result).score
}
