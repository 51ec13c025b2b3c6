//! Inference gateway boundary
//!
//! The engine delegates all detection intelligence to an external model
//! behind the `InferenceGateway` trait: one asynchronous `analyze` call,
//! exactly one settlement per invocation. The OpenAI-backed implementation
//! owns prompt construction, bounded retries, and timeouts; the mock
//! implementation stands in for it everywhere in tests. Whatever comes
//! back is raw text — turning it into a `Report` is the validator's job,
//! so a structurally broken payload is distinguishable from a transport
//! failure.

pub mod config;
pub mod mock;
pub mod openai;
pub mod prompts;
pub mod provider;

pub use config::{GatewayConfig, GlobalSettings, ProviderConfig, EXAMPLE_CONFIG};
pub use mock::MockGateway;
pub use openai::OpenAiGateway;
pub use prompts::{PromptBuilder, PromptTemplate};
pub use provider::{GatewayError, InferenceGateway};
