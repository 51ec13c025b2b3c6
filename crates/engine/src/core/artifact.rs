use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of artifact the user submitted. Selects the prompt template
/// the gateway uses; not part of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Code,
    Api,
    Sql,
    Config,
}

impl ArtifactKind {
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Code => "source_code",
            Self::Api => "api_surface",
            Self::Sql => "sql_review",
            Self::Config => "config_review",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Code => "Source Code",
            Self::Api => "API Endpoint",
            Self::Sql => "DB Queries",
            Self::Config => "Configuration",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "code" | "source" => Ok(Self::Code),
            "api" | "endpoint" => Ok(Self::Api),
            "sql" | "query" | "queries" => Ok(Self::Sql),
            "config" | "configuration" => Ok(Self::Config),
            _ => Err(format!("Unknown artifact kind: {}", s)),
        }
    }
}
