use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, ChatCompletionResponseFormat,
        ChatCompletionResponseFormatType, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::Report;
use crate::gateway::config::{GatewayConfig, ProviderConfig};
use crate::gateway::prompts::PromptBuilder;
use crate::gateway::provider::{GatewayError, InferenceGateway};

pub struct OpenAiGateway {
    client: Client<OpenAIConfig>,
    prompt_builder: PromptBuilder,
    template_name: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_seconds: u64,
    max_retries: u32,
}

impl OpenAiGateway {
    pub fn new(model: Option<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        Ok(Self::with_config(
            api_key,
            None,
            model.unwrap_or_else(|| "gpt-4o".to_string()),
        ))
    }

    pub fn with_config(api_key: String, base_url: Option<String>, model: String) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = base_url {
            config = config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(config),
            prompt_builder: PromptBuilder::new(),
            template_name: "source_code".to_string(),
            model,
            temperature: 0.2,
            max_tokens: 4000,
            timeout_seconds: 60,
            max_retries: 3,
        }
    }

    pub fn from_gateway_config(config: &GatewayConfig) -> Result<Self> {
        let mut gateway = match &config.provider {
            ProviderConfig::OpenAi {
                model,
                api_key,
                base_url,
            } => {
                let api_key = api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY not set"))?;
                Self::with_config(api_key, base_url.clone(), model.clone())
            }
            ProviderConfig::Local { endpoint, model } => Self::with_config(
                "local".to_string(),
                Some(endpoint.clone()),
                model.clone(),
            ),
        };

        gateway.temperature = config.global.default_temperature;
        gateway.max_tokens = config.global.default_max_tokens;
        gateway.timeout_seconds = config.global.timeout_seconds;
        gateway.max_retries = config.global.retry_attempts;
        Ok(gateway)
    }

    /// Select the prompt template the next calls will use. Callers pick
    /// this from the artifact kind being submitted.
    pub fn with_template(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = template_name.into();
        self
    }

    fn build_messages(
        &self,
        content: &str,
        label: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, GatewayError> {
        let mut variables = HashMap::new();
        variables.insert("artifact".to_string(), content.to_string());
        variables.insert("artifact_label".to_string(), label.to_string());
        variables.insert(
            "report_schema".to_string(),
            Report::schema_definition().to_string(),
        );

        let (system_prompt, user_prompt) = self
            .prompt_builder
            .build_prompt(&self.template_name, variables)
            .map_err(|e| GatewayError::Api(e.to_string()))?;

        let system_message = ChatCompletionRequestSystemMessage {
            content: system_prompt,
            ..Default::default()
        };
        let user_message = ChatCompletionRequestUserMessage {
            content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                user_prompt,
            ),
            ..Default::default()
        };

        Ok(vec![
            ChatCompletionRequestMessage::System(system_message),
            ChatCompletionRequestMessage::User(user_message),
        ])
    }

    /// Strip a markdown code fence when a model ignores the JSON response
    /// format and wraps its answer anyway.
    fn extract_json_from_text(text: &str) -> &str {
        if let Some(start) = text.find("```json") {
            let body = &text[start + 7..];
            if let Some(end) = body.find("```") {
                return body[..end].trim();
            }
        }

        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if end > start {
                return &text[start..=end];
            }
        }

        text
    }
}

#[async_trait]
impl InferenceGateway for OpenAiGateway {
    async fn analyze(&self, content: &str, label: &str) -> Result<String, GatewayError> {
        let messages = self.build_messages(content, label)?;

        let api_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens as u16)
            .response_format(ChatCompletionResponseFormat {
                r#type: ChatCompletionResponseFormatType::JsonObject,
            })
            .build()
            .map_err(|e| GatewayError::Api(e.to_string()))?;

        debug!(model = %self.model, label, "sending analysis request");

        let mut attempt = 0;
        let max_attempts = self.max_retries.max(1);

        let response = loop {
            attempt += 1;

            let chat = self.client.chat();
            let call = chat.create(api_request.clone());
            let outcome =
                tokio::time::timeout(Duration::from_secs(self.timeout_seconds), call).await;

            match outcome {
                Err(_) => return Err(GatewayError::Timeout(self.timeout_seconds)),
                Ok(Ok(response)) => break response,
                Ok(Err(e)) => {
                    let message = e.to_string();
                    warn!(attempt, max_attempts, error = %message, "gateway call failed");

                    if attempt >= max_attempts {
                        return Err(if message.contains("rate") {
                            GatewayError::RateLimited
                        } else if message.contains("connect") || message.contains("dns") {
                            GatewayError::Network(message)
                        } else {
                            GatewayError::Api(message)
                        });
                    }

                    let wait_time = if message.contains("rate") {
                        Duration::from_secs(2_u64.pow(attempt))
                    } else {
                        Duration::from_millis(100 * attempt as u64)
                    };
                    tokio::time::sleep(wait_time).await;
                }
            }
        };

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "token usage"
            );
        }

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(GatewayError::EmptyResponse)?;

        Ok(Self::extract_json_from_text(&content).to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
