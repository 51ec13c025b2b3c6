//! Analysis session state machine
//!
//! One session tracks one submission from Idle through Analyzing to a
//! terminal Completed/Failed state. The gateway call is the only
//! suspending operation; `submit` and `settle` split it so the synchronous
//! Idle→Analyzing transition is observable and so exactly one settlement
//! can be applied per in-flight call. Failures are captured into session
//! state rather than propagated — callers observe them via `status()` and
//! `error()`, and nothing here is fatal to the process.

use crate::core::{validate, Report, UserProfile, ValidationError, Vulnerability};
use crate::gateway::{GatewayError, InferenceGateway};
use crate::navigator::{Perspective, ReportNavigator};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Analyzing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The gateway call itself failed (network, remote error, timeout).
    #[error("inference gateway failure: {0}")]
    Gateway(#[from] GatewayError),

    /// The gateway settled but returned a structurally invalid result.
    /// Rendered identically to a gateway failure; kept distinct for
    /// diagnostics.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(#[from] ValidationError),
}

/// Proof of a single in-flight gateway call. `submit` hands out at most
/// one per Analyzing period; the driver feeds its fields to the gateway
/// and applies the outcome with `settle`.
#[derive(Debug, Clone)]
pub struct Submission {
    pub content: String,
    pub label: String,
}

#[derive(Debug)]
enum SessionState {
    Idle,
    Analyzing,
    Completed {
        report: Report,
        navigator: ReportNavigator,
    },
    Failed {
        error: SessionError,
    },
}

#[derive(Debug)]
pub struct AnalysisSession {
    state: SessionState,
    submitted_content: Option<String>,
    user: Option<UserProfile>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            submitted_content: None,
            user: None,
        }
    }

    /// Attach the identity-provider profile for traceability. Opaque to
    /// the state machine.
    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Analyzing => SessionStatus::Analyzing,
            SessionState::Completed { .. } => SessionStatus::Completed,
            SessionState::Failed { .. } => SessionStatus::Failed,
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match &self.state {
            SessionState::Completed { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SessionError> {
        match &self.state {
            SessionState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// The text of the current attempt. Retained through Failed so the
    /// user can retry without retyping; cleared by `reset`.
    pub fn submitted_content(&self) -> Option<&str> {
        self.submitted_content.as_deref()
    }

    /// Begin an analysis. Returns the in-flight token, or `None` without
    /// any state change when the submission is blank, a call is already in
    /// flight, or a completed report has not been reset yet.
    pub fn submit(&mut self, content: &str, label: &str) -> Option<Submission> {
        if content.trim().is_empty() {
            debug!("ignoring blank submission");
            return None;
        }

        match self.state {
            SessionState::Analyzing => {
                warn!("submit while a gateway call is in flight, ignoring");
                return None;
            }
            SessionState::Completed { .. } => {
                warn!("submit on a completed session, reset first");
                return None;
            }
            SessionState::Idle | SessionState::Failed { .. } => {}
        }

        info!(label, "starting analysis");
        self.submitted_content = Some(content.to_string());
        self.state = SessionState::Analyzing;

        Some(Submission {
            content: content.to_string(),
            label: label.to_string(),
        })
    }

    /// Apply the one settlement of the in-flight gateway call. A success
    /// is validated into a report; validation failure is treated exactly
    /// like a gateway failure. Ignored unless a call is in flight.
    pub fn settle(&mut self, outcome: Result<String, GatewayError>) {
        if !matches!(self.state, SessionState::Analyzing) {
            warn!("settle without an in-flight call, ignoring");
            return;
        }

        self.state = match outcome {
            Ok(raw) => match validate(&raw) {
                Ok(report) => {
                    info!(
                        vulnerabilities = report.vulnerabilities.len(),
                        risk = report.overall_risk_score,
                        "analysis completed"
                    );
                    let navigator = ReportNavigator::for_report(&report);
                    SessionState::Completed { report, navigator }
                }
                Err(e) => {
                    warn!(error = %e, "gateway response failed validation");
                    SessionState::Failed {
                        error: SessionError::InvalidResponse(e),
                    }
                }
            },
            Err(e) => {
                warn!(error = %e, "gateway call failed");
                SessionState::Failed {
                    error: SessionError::Gateway(e),
                }
            }
        };
    }

    /// Drive one full attempt: submit, await the gateway, settle.
    pub async fn analyze(
        &mut self,
        gateway: &dyn InferenceGateway,
        content: &str,
        label: &str,
    ) -> SessionStatus {
        let Some(submission) = self.submit(content, label) else {
            return self.status();
        };

        let outcome = gateway
            .analyze(&submission.content, &submission.label)
            .await;
        self.settle(outcome);
        self.status()
    }

    /// Return to Idle, discarding the report or error and the submitted
    /// content. Only allowed from a terminal state; while Analyzing this
    /// is a no-op so the in-flight call's eventual settlement still lands
    /// in a coherent state machine.
    pub fn reset(&mut self) {
        match self.state {
            SessionState::Completed { .. } | SessionState::Failed { .. } => {
                debug!("session reset");
                self.state = SessionState::Idle;
                self.submitted_content = None;
            }
            SessionState::Analyzing => {
                warn!("reset while analyzing, ignoring");
            }
            SessionState::Idle => {}
        }
    }

    // Navigator passthroughs. Only meaningful on a completed session;
    // no-ops on every other status.

    pub fn select_vulnerability(&mut self, id: &str) -> bool {
        match &mut self.state {
            SessionState::Completed { report, navigator } => navigator.select(report, id),
            _ => false,
        }
    }

    pub fn set_perspective(&mut self, perspective: Perspective) {
        if let SessionState::Completed { navigator, .. } = &mut self.state {
            navigator.set_perspective(perspective);
        }
    }

    pub fn perspective(&self) -> Option<Perspective> {
        match &self.state {
            SessionState::Completed { navigator, .. } => Some(navigator.perspective()),
            _ => None,
        }
    }

    pub fn selected_vulnerability_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Completed { navigator, .. } => navigator.selected_id(),
            _ => None,
        }
    }

    pub fn current_selection(&self) -> Option<&Vulnerability> {
        match &self.state {
            SessionState::Completed { report, navigator } => navigator.selection(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;

    #[test]
    fn test_submit_transitions_synchronously() {
        let mut session = AnalysisSession::new();
        assert_eq!(session.status(), SessionStatus::Idle);

        let submission = session.submit("let x = 1;", "snippet.rs");
        assert!(submission.is_some());
        assert_eq!(session.status(), SessionStatus::Analyzing);
        assert_eq!(session.submitted_content(), Some("let x = 1;"));
    }

    #[test]
    fn test_blank_submission_is_a_no_op() {
        let mut session = AnalysisSession::new();
        assert!(session.submit("   \n\t  ", "blank").is_none());
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.submitted_content(), None);
    }

    #[test]
    fn test_second_submit_while_analyzing_is_rejected() {
        let mut session = AnalysisSession::new();
        assert!(session.submit("first", "a").is_some());
        assert!(session.submit("second", "b").is_none());
        assert_eq!(session.submitted_content(), Some("first"));
    }

    #[test]
    fn test_reset_while_analyzing_is_a_no_op() {
        let mut session = AnalysisSession::new();
        session.submit("content", "a");
        session.reset();
        assert_eq!(session.status(), SessionStatus::Analyzing);
        assert_eq!(session.submitted_content(), Some("content"));
    }

    #[test]
    fn test_settle_without_in_flight_call_is_ignored() {
        let mut session = AnalysisSession::new();
        session.settle(Err(GatewayError::RateLimited));
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_gateway_failure_retains_content_for_retry() {
        let gateway = MockGateway::failing();
        let mut session = AnalysisSession::new();

        let status = session.analyze(&gateway, "SELECT 1", "q.sql").await;
        assert_eq!(status, SessionStatus::Failed);
        assert!(matches!(
            session.error(),
            Some(SessionError::Gateway(GatewayError::Network(_)))
        ));
        assert_eq!(session.submitted_content(), Some("SELECT 1"));

        // Retry is a fresh user-initiated submit.
        let status = session
            .analyze(&MockGateway::new(), "SELECT 1", "q.sql")
            .await;
        assert_eq!(status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_malformed_response_is_invalid_response() {
        let gateway = MockGateway::malformed();
        let mut session = AnalysisSession::new();

        session.analyze(&gateway, "some artifact", "a.txt").await;
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(matches!(
            session.error(),
            Some(SessionError::InvalidResponse(_))
        ));
        assert!(session.report().is_none());
    }
}
