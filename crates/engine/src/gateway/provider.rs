use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("timeout after {0} seconds")]
    Timeout(u64),

    #[error("empty response from model")]
    EmptyResponse,
}

/// The external inference capability. One call per submission; exactly one
/// settlement per invocation — no streaming, no partial results.
///
/// Implementations return the raw response text. Parsing and schema
/// validation belong to the engine core, so a structurally broken payload
/// surfaces as an `InvalidResponse` session failure rather than a gateway
/// error.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Analyze the submitted artifact. `label` is a free-form identifier
    /// carried through for logging and traceability, not interpreted.
    async fn analyze(&self, content: &str, label: &str) -> Result<String, GatewayError>;

    fn model_name(&self) -> &str;
}
