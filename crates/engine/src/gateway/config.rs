use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub provider: ProviderConfig,

    #[serde(default)]
    pub global: GlobalSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "openai")]
    OpenAi {
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        api_key: Option<String>, // If not provided, use OPENAI_API_KEY env var
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>, // For custom endpoints
    },
    #[serde(rename = "local")]
    Local { endpoint: String, model: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_timeout_seconds() -> u64 {
    60
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            retry_attempts: default_retry_attempts(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::OpenAi {
                model: "gpt-4o".to_string(),
                api_key: None,
                base_url: None,
            },
            global: GlobalSettings::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("KENSA_MODEL") {
            if let ProviderConfig::OpenAi {
                model: ref mut m, ..
            } = config.provider
            {
                *m = model;
            }
        }

        if let Ok(temp) = std::env::var("KENSA_TEMPERATURE") {
            if let Ok(t) = temp.parse::<f32>() {
                config.global.default_temperature = t;
            }
        }

        if let Ok(timeout) = std::env::var("KENSA_TIMEOUT_SECONDS") {
            if let Ok(t) = timeout.parse::<u64>() {
                config.global.timeout_seconds = t;
            }
        }

        config
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub const EXAMPLE_CONFIG: &str = r#"
# Inference gateway configuration

provider:
  type: openai
  model: gpt-4o
  # api_key: sk-...  # Optional, defaults to OPENAI_API_KEY env var
  # base_url: https://my-proxy.internal/v1

global:
  default_temperature: 0.2
  default_max_tokens: 4000
  retry_attempts: 3
  timeout_seconds: 60
"#;
