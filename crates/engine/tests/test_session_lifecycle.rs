use kensa_engine::{
    AnalysisSession, GatewayError, MockGateway, Perspective, SessionError, SessionStatus, Severity,
};
use serde_json::json;

#[tokio::test]
async fn test_sql_injection_scenario() -> anyhow::Result<()> {
    let gateway = MockGateway::new();
    let mut session = AnalysisSession::new();

    let status = session
        .analyze(
            &gateway,
            "\"SELECT * FROM users WHERE id=\" + userInput",
            "user-lookup.sql",
        )
        .await;

    assert_eq!(status, SessionStatus::Completed);
    assert_eq!(gateway.call_count(), 1);

    let report = session.report().expect("completed session has a report");
    assert_eq!(report.vulnerabilities.len(), 1);

    let selected = session.current_selection().expect("default selection");
    assert_eq!(selected.severity, Severity::Critical);
    assert!(!selected.secure_code_fix.is_empty());
    assert_eq!(session.selected_vulnerability_id(), Some("SQLI-1"));
    assert_eq!(session.perspective(), Some(Perspective::Defender));

    // Selecting an id that is not in the report keeps the previous
    // selection rather than falling back or clearing.
    assert!(!session.select_vulnerability("GHOST-7"));
    assert_eq!(session.selected_vulnerability_id(), Some("SQLI-1"));

    Ok(())
}

#[tokio::test]
async fn test_completed_report_preserves_gateway_order_and_count() {
    let gateway = MockGateway::new().with_default_response(json!({
        "overallRiskScore": 70.0,
        "vulnerabilities": [
            {
                "title": "Low issue first",
                "severity": "LOW",
                "description": "ordering probe",
                "secureCodeFix": "fix"
            },
            {
                "title": "Critical issue second",
                "severity": "CRITICAL",
                "description": "ordering probe",
                "secureCodeFix": "fix"
            }
        ]
    }));

    let mut session = AnalysisSession::new();
    session.analyze(&gateway, "artifact body", "a.rs").await;

    let report = session.report().unwrap();
    assert_eq!(report.vulnerabilities.len(), 2);

    // Insertion order is the gateway's response order, untouched.
    assert_eq!(report.vulnerabilities[0].id, "VULN-1");
    assert_eq!(report.vulnerabilities[0].severity, Severity::Low);

    // The navigator still starts at index 0, not at the most severe.
    assert_eq!(session.selected_vulnerability_id(), Some("VULN-1"));

    // The derived severity view ranks critical first.
    let sorted = report.by_severity();
    assert_eq!(sorted[0].id, "VULN-2");
}

#[tokio::test]
async fn test_clean_report_completes_with_no_selection() {
    let gateway = MockGateway::new();
    let mut session = AnalysisSession::new();

    session
        .analyze(&gateway, "fn safe() -> u32 { 42 }", "safe.rs")
        .await;

    assert_eq!(session.status(), SessionStatus::Completed);
    let report = session.report().unwrap();
    assert!(report.vulnerabilities.is_empty());
    assert!(session.current_selection().is_none());
    assert_eq!(session.selected_vulnerability_id(), None);
}

#[tokio::test]
async fn test_missing_fix_fails_with_invalid_response() {
    let gateway = MockGateway::new().with_default_response(json!({
        "overallRiskScore": 55.0,
        "vulnerabilities": [{
            "title": "Issue without remediation",
            "severity": "HIGH",
            "description": "no fix supplied"
        }]
    }));

    let mut session = AnalysisSession::new();
    let status = session.analyze(&gateway, "artifact", "a.rs").await;

    assert_eq!(status, SessionStatus::Failed);
    assert!(session.report().is_none(), "no partial report is stored");

    match session.error() {
        Some(SessionError::InvalidResponse(e)) => {
            assert_eq!(e.offending_index(), Some(0));
        }
        other => panic!("expected InvalidResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_failure_reaches_failed_with_gateway_error() {
    let gateway = MockGateway::failing_with(GatewayError::Timeout(60));
    let mut session = AnalysisSession::new();

    session.analyze(&gateway, "SELECT 1", "probe.sql").await;

    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(matches!(
        session.error(),
        Some(SessionError::Gateway(GatewayError::Timeout(60)))
    ));
    assert_eq!(session.submitted_content(), Some("SELECT 1"));
}

#[tokio::test]
async fn test_reset_clears_terminal_state() {
    let gateway = MockGateway::new();
    let mut session = AnalysisSession::new();

    session.analyze(&gateway, "select secrets", "q.sql").await;
    assert_eq!(session.status(), SessionStatus::Completed);

    session.reset();
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(session.report().is_none());
    assert!(session.error().is_none());
    assert_eq!(session.submitted_content(), None);

    // Failed resets identically.
    session.analyze(&MockGateway::failing(), "x", "y").await;
    assert_eq!(session.status(), SessionStatus::Failed);
    session.reset();
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_completed_session_requires_reset_before_resubmit() {
    let gateway = MockGateway::new();
    let mut session = AnalysisSession::new();

    session.analyze(&gateway, "select one", "a.sql").await;
    assert_eq!(session.status(), SessionStatus::Completed);

    // Without a reset the completed report stays put.
    let status = session.analyze(&gateway, "select two", "b.sql").await;
    assert_eq!(status, SessionStatus::Completed);
    assert_eq!(gateway.call_count(), 1);

    session.reset();
    let status = session.analyze(&gateway, "select two", "b.sql").await;
    assert_eq!(status, SessionStatus::Completed);
    assert_eq!(gateway.call_count(), 2);
}

#[tokio::test]
async fn test_exactly_one_gateway_call_per_submission() {
    let gateway = MockGateway::new();
    let mut session = AnalysisSession::new();

    // Blank submissions never reach the gateway.
    session.analyze(&gateway, "   ", "blank").await;
    assert_eq!(gateway.call_count(), 0);
    assert_eq!(session.status(), SessionStatus::Idle);

    session.analyze(&gateway, "select x", "q.sql").await;
    assert_eq!(gateway.call_count(), 1);
}
