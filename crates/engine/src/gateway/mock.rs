use crate::gateway::provider::{GatewayError, InferenceGateway};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

/// Canned inference gateway for tests and offline demos. Responses are
/// matched by substring against the submitted content and label.
pub struct MockGateway {
    responses: HashMap<String, serde_json::Value>,
    default_response: serde_json::Value,
    call_count: std::sync::atomic::AtomicUsize,
    failure: Option<GatewayError>,
    malformed: bool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            responses: Self::default_responses(),
            default_response: Self::clean_response(),
            call_count: std::sync::atomic::AtomicUsize::new(0),
            failure: None,
            malformed: false,
        }
    }

    /// Gateway that rejects every call with a network error.
    pub fn failing() -> Self {
        Self::failing_with(GatewayError::Network("connection refused".to_string()))
    }

    pub fn failing_with(error: GatewayError) -> Self {
        let mut gateway = Self::new();
        gateway.failure = Some(error);
        gateway
    }

    /// Gateway that settles successfully but returns unparsable text, for
    /// exercising the invalid-response path.
    pub fn malformed() -> Self {
        let mut gateway = Self::new();
        gateway.malformed = true;
        gateway
    }

    pub fn with_response(mut self, pattern: &str, response: serde_json::Value) -> Self {
        self.responses.insert(pattern.to_string(), response);
        self
    }

    pub fn with_default_response(mut self, response: serde_json::Value) -> Self {
        self.default_response = response;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn default_responses() -> HashMap<String, serde_json::Value> {
        let mut responses = HashMap::new();

        responses.insert(
            "select".to_string(),
            json!({
                "overallRiskScore": 92.0,
                "maturityScore": 18.0,
                "vulnerabilities": [{
                    "id": "SQLI-1",
                    "title": "SQL Injection via string-concatenated query",
                    "severity": "CRITICAL",
                    "category": "Injection",
                    "description": "User input is concatenated directly into a SQL statement, allowing the statement to be terminated and arbitrary SQL appended.",
                    "attackerLogic": "Close the current literal, append a UNION SELECT over the users table, and exfiltrate credential hashes.",
                    "defenderLogic": "Bind user input through a parameterized query so it can never alter statement structure.",
                    "simulatedPayload": "1 OR 1=1; --",
                    "impact": "Full read access to the users table and potential authentication bypass.",
                    "riskScore": 95.0,
                    "confidence": 0.98,
                    "secureCodeFix": "let row = client.query_one(\"SELECT * FROM users WHERE id = $1\", &[&user_input])?;",
                    "vulnerableCodeSnippet": "\"SELECT * FROM users WHERE id=\" + userInput",
                    "killChainStage": "Exploit"
                }]
            }),
        );

        responses.insert(
            "password".to_string(),
            json!({
                "overallRiskScore": 61.0,
                "vulnerabilities": [{
                    "id": "SECRET-1",
                    "title": "Hardcoded credential in configuration",
                    "severity": "HIGH",
                    "category": "Secrets Management",
                    "description": "A plaintext credential is committed in the configuration artifact.",
                    "attackerLogic": "Harvest the credential from source control history and authenticate directly against the backing service.",
                    "defenderLogic": "Move the credential into a secret manager and rotate it.",
                    "impact": "Direct access to the protected service with the leaked identity.",
                    "secureCodeFix": "password = \"${DB_PASSWORD}\"  # injected from the secret store at deploy time",
                    "killChainStage": "Recon"
                }]
            }),
        );

        responses
    }

    fn clean_response() -> serde_json::Value {
        json!({
            "overallRiskScore": 4.0,
            "maturityScore": 82.0,
            "vulnerabilities": []
        })
    }

    fn generate_response(&self, content: &str, label: &str) -> serde_json::Value {
        let haystack = format!("{} {}", content, label).to_lowercase();

        for (pattern, response) in &self.responses {
            if haystack.contains(pattern) {
                return response.clone();
            }
        }

        self.default_response.clone()
    }
}

#[async_trait]
impl InferenceGateway for MockGateway {
    async fn analyze(&self, content: &str, label: &str) -> Result<String, GatewayError> {
        self.call_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        if self.malformed {
            return Ok("I could not produce JSON this time, sorry.".to_string());
        }

        Ok(self.generate_response(content, label).to_string())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
