//! Core data model of the analysis engine
//!
//! The report schema is pure data: a validated `Report` owns its
//! `Vulnerability` entries, which are immutable once the response
//! validator has constructed them. Everything else in the engine (session,
//! navigator, rendering) works against these types and can rely on the
//! required/optional rules having already been enforced.

pub mod artifact;
pub mod identity;
pub mod kill_chain;
pub mod report;
pub mod severity;
pub mod validate;

pub use artifact::ArtifactKind;
pub use identity::UserProfile;
pub use kill_chain::KillChainStage;
pub use report::{Report, Vulnerability, DEFAULT_DISPLAY_CONFIDENCE};
pub use severity::Severity;
pub use validate::{validate, validate_value, ValidationError};
