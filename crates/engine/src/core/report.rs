use crate::core::severity::Severity;
use serde::{Deserialize, Serialize};

/// Substituted for a missing `confidence` at the display boundary only.
/// Never written back into a report or its export form.
pub const DEFAULT_DISPLAY_CONFIDENCE: f64 = 0.95;

/// One discovered security issue with dual attacker/defender narratives.
///
/// Instances are only ever constructed by the response validator and are
/// immutable afterwards; every field already passed the required/optional
/// rules, and `id` is unique within the owning report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,

    pub title: String,

    pub severity: Severity,

    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attacker_logic: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub defender_logic: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_payload: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill_chain_stage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    pub secure_code_fix: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vulnerable_code_snippet: Option<String>,
}

impl Vulnerability {
    /// Confidence for presentation. The gateway frequently omits the
    /// field; the stored value stays `None` so exports never fabricate it.
    pub fn display_confidence(&self) -> f64 {
        self.confidence.unwrap_or(DEFAULT_DISPLAY_CONFIDENCE)
    }
}

/// The full result of one analysis. `overall_risk_score` is required even
/// when `vulnerabilities` is empty; a clean report is a valid report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub overall_risk_score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_score: Option<f64>,

    pub vulnerabilities: Vec<Vulnerability>,
}

impl Report {
    /// Vulnerabilities ranked most severe first. The sort is stable, so
    /// entries of equal severity keep the gateway's response order.
    pub fn by_severity(&self) -> Vec<&Vulnerability> {
        let mut sorted: Vec<&Vulnerability> = self.vulnerabilities.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
        sorted
    }

    pub fn find(&self, id: &str) -> Option<&Vulnerability> {
        self.vulnerabilities.iter().find(|v| v.id == id)
    }

    pub fn count_at(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Export form: the exact validated shape, pretty-printed.
    pub fn to_export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Response schema text embedded in gateway prompts.
    pub fn schema_definition() -> &'static str {
        r#"
{
  "overallRiskScore": "number (0-100, required)",
  "maturityScore": "number (optional)",
  "vulnerabilities": [
    {
      "id": "string (optional, assigned if omitted)",
      "title": "string (required, short human label)",
      "severity": "CRITICAL|HIGH|MEDIUM|LOW (required)",
      "category": "string (optional, e.g. 'Injection')",
      "description": "string (required, technical summary)",
      "attackerLogic": "string (optional, exploitation path)",
      "defenderLogic": "string (optional, fix rationale)",
      "simulatedPayload": "string (optional, example payload)",
      "impact": "string (optional, data/infrastructure impact)",
      "riskScore": "number (optional, 0-100)",
      "confidence": "number (optional, 0.0-1.0)",
      "secureCodeFix": "string (required, production-ready fix)",
      "vulnerableCodeSnippet": "string (optional, offending excerpt)",
      "killChainStage": "Recon|Weaponize|Delivery|Exploit|C2|Actions (optional)"
    }
  ]
}
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vuln(id: &str, severity: Severity) -> Vulnerability {
        Vulnerability {
            id: id.to_string(),
            title: format!("issue {}", id),
            severity,
            description: "test".to_string(),
            category: None,
            attacker_logic: None,
            defender_logic: None,
            simulated_payload: None,
            impact: None,
            kill_chain_stage: None,
            risk_score: None,
            confidence: None,
            secure_code_fix: "fix".to_string(),
            vulnerable_code_snippet: None,
        }
    }

    #[test]
    fn test_severity_sort_is_stable() {
        let report = Report {
            overall_risk_score: 50.0,
            maturity_score: None,
            vulnerabilities: vec![
                vuln("a", Severity::Medium),
                vuln("b", Severity::Critical),
                vuln("c", Severity::Medium),
                vuln("d", Severity::High),
            ],
        };

        let ids: Vec<&str> = report.by_severity().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_display_confidence_default_is_not_stored() {
        let v = vuln("a", Severity::Low);
        assert_eq!(v.display_confidence(), DEFAULT_DISPLAY_CONFIDENCE);
        assert_eq!(v.confidence, None);

        let json = serde_json::to_value(&v).unwrap();
        assert!(json.get("confidence").is_none());
    }

    #[test]
    fn test_export_uses_camel_case() {
        let report = Report {
            overall_risk_score: 12.0,
            maturity_score: Some(88.0),
            vulnerabilities: vec![vuln("VULN-1", Severity::High)],
        };

        let json = report.to_export_json().unwrap();
        assert!(json.contains("overallRiskScore"));
        assert!(json.contains("maturityScore"));
        assert!(json.contains("secureCodeFix"));
        assert!(!json.contains("overall_risk_score"));
    }
}
