//! LLM Provider Trait
//!
//! The interface the orchestrator consumes: given a conversation history,
//! an optional system preamble, and a tool catalog, the provider returns
//! either a direct reply or a sequence of tool calls.

use async_trait::async_trait;

use super::types::{LlmError, LlmResponse, LlmResult, Message, ToolDefinition};

/// Trait implemented by reasoning-capability backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Send a conversation and get a complete response.
    ///
    /// # Arguments
    /// * `messages` - Conversation history, oldest first
    /// * `system` - Optional system preamble
    /// * `tools` - Tool catalog the model may call
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse>;

    /// Check if the provider is reachable and credentials are accepted.
    async fn health_check(&self) -> LlmResult<()>;
}

/// Helper function to create an error for a missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to classify HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
            retry_after: None,
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_error() {
        let err = missing_api_key_error("anthropic");
        match err {
            LlmError::AuthenticationFailed { message } => {
                assert!(message.contains("anthropic"));
            }
            _ => panic!("Expected AuthenticationFailed"),
        }
    }

    #[test]
    fn test_parse_http_error() {
        let err = parse_http_error(401, "unauthorized", "anthropic");
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));

        let err = parse_http_error(429, "rate limited", "anthropic");
        assert!(matches!(err, LlmError::RateLimited { .. }));

        let err = parse_http_error(500, "internal error", "anthropic");
        assert!(matches!(err, LlmError::ServerError { .. }));

        let err = parse_http_error(418, "teapot", "anthropic");
        assert!(matches!(err, LlmError::Other { .. }));
    }
}
