//! View cursor over a completed report
//!
//! Pure view-state: the navigator holds a selection id and the active
//! narrative perspective, and resolves both against a borrowed `Report`.
//! It never mutates report data and never lets the selection point outside
//! the report's vulnerability list.

use crate::core::{Report, Vulnerability};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which narrative of a vulnerability is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Attacker,
    #[default]
    Defender,
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attacker => write!(f, "attacker"),
            Self::Defender => write!(f, "defender"),
        }
    }
}

impl FromStr for Perspective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attacker" => Ok(Self::Attacker),
            "defender" => Ok(Self::Defender),
            _ => Err(format!("Unknown perspective: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNavigator {
    selected: Option<String>,
    perspective: Perspective,
}

impl ReportNavigator {
    /// Initialize over a report: first vulnerability selected (none for an
    /// empty report), defender perspective.
    pub fn for_report(report: &Report) -> Self {
        Self {
            selected: report.vulnerabilities.first().map(|v| v.id.clone()),
            perspective: Perspective::Defender,
        }
    }

    /// Move the selection. An id not present in the report is ignored and
    /// the previous selection is kept — it never falls back to the first
    /// entry or clears.
    pub fn select(&mut self, report: &Report, id: &str) -> bool {
        if report.find(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            tracing::debug!(id, "selection miss, keeping previous selection");
            false
        }
    }

    pub fn set_perspective(&mut self, perspective: Perspective) {
        self.perspective = perspective;
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Resolve the selection. Returns `None` only when the report has no
    /// vulnerabilities.
    pub fn selection<'r>(&self, report: &'r Report) -> Option<&'r Vulnerability> {
        self.selected.as_deref().and_then(|id| report.find(id))
    }
}
