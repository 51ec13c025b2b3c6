//! Whole-response validation for the inference gateway's JSON output.
//!
//! A response either becomes a complete `Report` or is rejected with the
//! offending position; a vulnerability entry is never silently dropped,
//! since a report that understates risk is worse than a visible failure.
//! Synthetic id assignment for entries the gateway returns without an id
//! is confined to this module so the rest of the engine can assume ids
//! are always present and unique.

use crate::core::report::{Report, Vulnerability};
use crate::core::severity::Severity;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("response is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("response is missing required field `overallRiskScore`")]
    MissingRiskScore,

    #[error("`{field}` is {value} but must be a finite number in [{min}, {max}]")]
    ScoreOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("vulnerability {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("vulnerability {index}: unrecognized severity `{value}`")]
    UnknownSeverity { index: usize, value: String },

    #[error("vulnerability {index}: `{field}` is {value} but must be in [{min}, {max}]")]
    VulnerabilityScoreOutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("vulnerability {index}: duplicate id `{id}`")]
    DuplicateId { index: usize, id: String },
}

impl ValidationError {
    /// Zero-based index of the vulnerability entry that caused the
    /// rejection, when the failure is entry-specific.
    pub fn offending_index(&self) -> Option<usize> {
        match self {
            Self::MissingField { index, .. }
            | Self::UnknownSeverity { index, .. }
            | Self::VulnerabilityScoreOutOfRange { index, .. }
            | Self::DuplicateId { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Raw deserialization targets. Everything is optional here; the
/// required/optional rules are enforced in `validate_value`, not by serde,
/// so the error can name the field and entry. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    overall_risk_score: Option<f64>,
    maturity_score: Option<f64>,
    #[serde(default)]
    vulnerabilities: Vec<RawVulnerability>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVulnerability {
    id: Option<String>,
    title: Option<String>,
    severity: Option<String>,
    category: Option<String>,
    description: Option<String>,
    attacker_logic: Option<String>,
    defender_logic: Option<String>,
    simulated_payload: Option<String>,
    impact: Option<String>,
    kill_chain_stage: Option<String>,
    risk_score: Option<f64>,
    confidence: Option<f64>,
    secure_code_fix: Option<String>,
    vulnerable_code_snippet: Option<String>,
}

/// Validate the gateway's raw response text into a `Report`.
pub fn validate(raw: &str) -> Result<Report, ValidationError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
    validate_value(value)
}

/// Validate an already-parsed JSON value into a `Report`.
pub fn validate_value(value: serde_json::Value) -> Result<Report, ValidationError> {
    let raw: RawReport = serde_json::from_value(value)
        .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;

    let overall_risk_score = raw
        .overall_risk_score
        .ok_or(ValidationError::MissingRiskScore)?;
    check_range("overallRiskScore", overall_risk_score, 0.0, 100.0)?;

    let mut seen_ids = HashSet::new();
    let mut vulnerabilities = Vec::with_capacity(raw.vulnerabilities.len());

    for (index, entry) in raw.vulnerabilities.into_iter().enumerate() {
        let vulnerability = validate_entry(index, entry)?;
        if !seen_ids.insert(vulnerability.id.clone()) {
            return Err(ValidationError::DuplicateId {
                index,
                id: vulnerability.id,
            });
        }
        vulnerabilities.push(vulnerability);
    }

    Ok(Report {
        overall_risk_score,
        maturity_score: raw.maturity_score,
        vulnerabilities,
    })
}

fn validate_entry(index: usize, raw: RawVulnerability) -> Result<Vulnerability, ValidationError> {
    let title = require(index, "title", raw.title)?;
    let description = require(index, "description", raw.description)?;
    let secure_code_fix = require(index, "secureCodeFix", raw.secure_code_fix)?;

    let severity_label = require(index, "severity", raw.severity)?;
    let severity = Severity::from_label(&severity_label).ok_or_else(|| {
        ValidationError::UnknownSeverity {
            index,
            value: severity_label,
        }
    })?;

    if let Some(score) = raw.risk_score {
        check_entry_range(index, "riskScore", score, 0.0, 100.0)?;
    }
    if let Some(confidence) = raw.confidence {
        check_entry_range(index, "confidence", confidence, 0.0, 1.0)?;
    }

    // Positional fallback for a response schema that does not guarantee
    // ids. An empty string counts as omitted.
    let id = match raw.id {
        Some(id) if !id.trim().is_empty() => id,
        _ => synthetic_id(index),
    };

    Ok(Vulnerability {
        id,
        title,
        severity,
        description,
        category: raw.category,
        attacker_logic: raw.attacker_logic,
        defender_logic: raw.defender_logic,
        simulated_payload: raw.simulated_payload,
        impact: raw.impact,
        kill_chain_stage: raw.kill_chain_stage,
        risk_score: raw.risk_score,
        confidence: raw.confidence,
        secure_code_fix,
        vulnerable_code_snippet: raw.vulnerable_code_snippet,
    })
}

fn synthetic_id(index: usize) -> String {
    format!("VULN-{}", index + 1)
}

fn require(
    index: usize,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField { index, field }),
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::ScoreOutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_entry_range(
    index: usize,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::VulnerabilityScoreOutOfRange {
            index,
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
