use kensa_engine::{
    validate_value, KillChainStage, Perspective, Report, ReportNavigator, Severity,
};
use serde_json::json;

fn sample_report() -> Report {
    validate_value(json!({
        "overallRiskScore": 68.0,
        "maturityScore": 35.0,
        "vulnerabilities": [
            {
                "id": "XSS-1",
                "title": "Reflected XSS in search parameter",
                "severity": "MEDIUM",
                "description": "Query string echoed without encoding",
                "secureCodeFix": "Encode output with the template engine",
                "killChainStage": "delivery"
            },
            {
                "title": "SQL Injection in login",
                "severity": "CRITICAL",
                "description": "Concatenated credentials query",
                "secureCodeFix": "Parameterize the statement",
                "killChainStage": "Exploit",
                "confidence": 0.9
            },
            {
                "id": "XSS-2",
                "title": "Stored XSS in profile bio",
                "severity": "MEDIUM",
                "description": "Bio rendered as raw HTML",
                "secureCodeFix": "Sanitize on render",
                "killChainStage": "Lateral Movement"
            }
        ]
    }))
    .unwrap()
}

#[test]
fn test_navigation_over_a_validated_report() {
    let report = sample_report();
    let mut navigator = ReportNavigator::for_report(&report);

    assert_eq!(navigator.selected_id(), Some("XSS-1"));
    assert_eq!(navigator.perspective(), Perspective::Defender);

    // The second entry got a synthetic id from the validator.
    assert!(navigator.select(&report, "VULN-2"));
    assert_eq!(navigator.selection(&report).unwrap().severity, Severity::Critical);

    // A stale id from a previous report resolves to nothing and the
    // selection stays where it was.
    assert!(!navigator.select(&report, "SQLI-9"));
    assert_eq!(navigator.selected_id(), Some("VULN-2"));

    navigator.set_perspective(Perspective::Attacker);
    assert_eq!(navigator.perspective(), Perspective::Attacker);
}

#[test]
fn test_severity_sort_is_stable_across_equal_entries() {
    let report = sample_report();
    let sorted = report.by_severity();

    let ids: Vec<&str> = sorted.iter().map(|v| v.id.as_str()).collect();
    // Critical first; the two MEDIUM entries keep their insertion order.
    assert_eq!(ids, vec!["VULN-2", "XSS-1", "XSS-2"]);
}

#[test]
fn test_kill_chain_highlighting() {
    let report = sample_report();

    let delivery = report.find("XSS-1").unwrap();
    let highlighted: Vec<KillChainStage> = KillChainStage::ALL
        .into_iter()
        .filter(|stage| stage.matches(delivery.kill_chain_stage.as_deref()))
        .collect();
    assert_eq!(highlighted, vec![KillChainStage::Delivery]);

    // A stage outside the six canonical names highlights nothing.
    let unknown = report.find("XSS-2").unwrap();
    assert!(KillChainStage::ALL
        .into_iter()
        .all(|stage| !stage.matches(unknown.kill_chain_stage.as_deref())));
}

#[test]
fn test_export_round_trip_is_lossless() {
    let report = sample_report();

    let exported = report.to_export_json().unwrap();
    let revalidated = kensa_engine::validate(&exported).unwrap();

    assert_eq!(report, revalidated);

    // The missing confidence on XSS-1 stays missing in the export rather
    // than being written out as the display default.
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    let first = &value["vulnerabilities"][0];
    assert!(first.get("confidence").is_none());
    assert_eq!(report.find("XSS-1").unwrap().display_confidence(), 0.95);
}
