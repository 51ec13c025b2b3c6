//! Kensa Engine - Dual-Perspective Security Analysis
//!
//! This crate turns a submitted code artifact into a navigable security
//! report with an attacker and a defender narrative per vulnerability.
//! Detection itself is delegated to an external inference capability
//! behind the `InferenceGateway` trait; the engine owns the analysis
//! session state machine, the report schema and its validator, and the
//! navigator view-state the presentation layer reads from.

pub mod core;
pub mod gateway;
pub mod navigator;
pub mod session;

pub use core::{
    validate, validate_value, ArtifactKind, KillChainStage, Report, Severity, UserProfile,
    ValidationError, Vulnerability,
};

pub use gateway::{
    GatewayConfig, GatewayError, InferenceGateway, MockGateway, OpenAiGateway, ProviderConfig,
};

pub use navigator::{Perspective, ReportNavigator};

pub use session::{AnalysisSession, SessionError, SessionStatus, Submission};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
