//! Taskline LLM
//!
//! The reasoning-capability abstraction: a provider trait over chat-style
//! completion with tool calling, the Anthropic Messages API implementation,
//! and the circuit breaker every reasoning call goes through.
//!
//! Providers are consumed exclusively behind [`breaker::GuardedProvider`];
//! nothing else in the workspace calls a provider directly.

pub mod anthropic;
pub mod breaker;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use breaker::{BreakerConfig, BreakerState, CircuitBreaker, GuardedProvider};
pub use provider::LlmProvider;
pub use types::{
    LlmError, LlmResponse, LlmResult, Message, MessageContent, MessageRole, ParameterSchema,
    ProviderConfig, StopReason, ToolCall, ToolDefinition, UsageStats,
};
