use anyhow::Result;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub system_prompt: String,
    pub user_prompt_template: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: String::new(),
            user_prompt_template: String::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_user_template(mut self, template: impl Into<String>) -> Self {
        self.user_prompt_template = template.into();
        self
    }
}

pub struct PromptBuilder {
    templates: HashMap<String, PromptTemplate>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            templates: HashMap::new(),
        };

        builder.add_template(Self::source_code_template());
        builder.add_template(Self::api_surface_template());
        builder.add_template(Self::sql_review_template());
        builder.add_template(Self::config_review_template());

        builder
    }

    pub fn add_template(&mut self, template: PromptTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn build_prompt(
        &self,
        template_name: &str,
        variables: HashMap<String, String>,
    ) -> Result<(String, String)> {
        let template = self
            .templates
            .get(template_name)
            .ok_or_else(|| anyhow::anyhow!("Template '{}' not found", template_name))?;

        let system_prompt = substitute_variables(&template.system_prompt, &variables);
        let user_prompt = substitute_variables(&template.user_prompt_template, &variables);

        Ok((system_prompt, user_prompt))
    }

    fn source_code_template() -> PromptTemplate {
        PromptTemplate::new("source_code")
            .with_system_prompt(DUAL_PERSPECTIVE_SYSTEM_PROMPT)
            .with_user_template(SOURCE_CODE_USER_TEMPLATE)
    }

    fn api_surface_template() -> PromptTemplate {
        PromptTemplate::new("api_surface")
            .with_system_prompt(DUAL_PERSPECTIVE_SYSTEM_PROMPT)
            .with_user_template(API_SURFACE_USER_TEMPLATE)
    }

    fn sql_review_template() -> PromptTemplate {
        PromptTemplate::new("sql_review")
            .with_system_prompt(DUAL_PERSPECTIVE_SYSTEM_PROMPT)
            .with_user_template(SQL_REVIEW_USER_TEMPLATE)
    }

    fn config_review_template() -> PromptTemplate {
        PromptTemplate::new("config_review")
            .with_system_prompt(DUAL_PERSPECTIVE_SYSTEM_PROMPT)
            .with_user_template(CONFIG_REVIEW_USER_TEMPLATE)
    }
}

fn substitute_variables(template: &str, variables: &HashMap<String, String>) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

const DUAL_PERSPECTIVE_SYSTEM_PROMPT: &str = r#"You are a security analysis engine that models the thinking of both an ethical hacker and a secure developer.

YOUR ROLE:
- Identify vulnerabilities in the submitted artifact with high precision
- For every finding, produce BOTH perspectives:
  attackerLogic (exploitation path), simulatedPayload, impact, killChainStage
  AND defenderLogic (fix rationale) with a production-ready secureCodeFix
- Minimize false positives by requiring concrete evidence in the artifact
- Score overall risk 0-100 for the whole submission

HARD REQUIREMENTS:
- Every vulnerability MUST include title, severity, description, and secureCodeFix
- severity is one of CRITICAL, HIGH, MEDIUM, LOW
- killChainStage, when given, is one of Recon, Weaponize, Delivery, Exploit, C2, Actions
- If nothing is exploitable, return an empty vulnerabilities array with a low overallRiskScore
- Respond with a single JSON object and nothing else"#;

const SOURCE_CODE_USER_TEMPLATE: &str = r#"Analyze the following source code for security vulnerabilities.

File Name: {artifact_label}
Code:
{artifact}

Return a JSON object matching this exact schema:
{report_schema}"#;

const API_SURFACE_USER_TEMPLATE: &str = r#"Analyze the following API description for security weaknesses.

Focus on:
- Authentication and authorization gaps
- Injection through request parameters
- Data exposure in responses
- Rate limiting and abuse surfaces

Identifier: {artifact_label}
API description:
{artifact}

Return a JSON object matching this exact schema:
{report_schema}"#;

const SQL_REVIEW_USER_TEMPLATE: &str = r#"Analyze the following database queries for security vulnerabilities.

Focus on:
- Injection through concatenated input
- Excessive privileges and missing row scoping
- Unsafe dynamic SQL construction

Identifier: {artifact_label}
Queries:
{artifact}

Return a JSON object matching this exact schema:
{report_schema}"#;

const CONFIG_REVIEW_USER_TEMPLATE: &str = r#"Analyze the following configuration for security weaknesses.

Focus on:
- Hardcoded secrets and credentials
- Overly permissive access settings
- Disabled security controls and weak defaults

Identifier: {artifact_label}
Configuration:
{artifact}

Return a JSON object matching this exact schema:
{report_schema}"#;
