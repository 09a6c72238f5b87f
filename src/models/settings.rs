//! Settings Models
//!
//! Server configuration stored in config.json, with serde defaults so a
//! partial file is enough to boot.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Server configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Database file; defaults to ~/.taskline/data.db when absent
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Model the reasoning provider uses
    #[serde(default = "default_model")]
    pub model: String,
    /// Reasoning API key; the ANTHROPIC_API_KEY env var overrides this
    #[serde(default)]
    pub api_key: Option<String>,
    /// Maximum accepted message length in characters
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Token budget for assembled conversation context
    #[serde(default = "default_context_token_budget")]
    pub context_token_budget: usize,
    /// Hard deadline for one reasoning call, in seconds
    #[serde(default = "default_reasoning_timeout_secs")]
    pub reasoning_timeout_secs: u64,
    /// Hard deadline for one tool call, in seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// Consecutive reasoning failures before the breaker opens
    #[serde(default = "default_breaker_failure_threshold")]
    pub breaker_failure_threshold: u32,
    /// Breaker cooldown before a probe is admitted, in seconds
    #[serde(default = "default_breaker_cooldown_secs")]
    pub breaker_cooldown_secs: u64,
    /// Bearer token table: token -> user id. Stands in for the external
    /// credential verifier.
    #[serde(default)]
    pub auth_tokens: HashMap<String, String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_message_len() -> usize {
    4000
}

fn default_context_token_budget() -> usize {
    3000
}

fn default_reasoning_timeout_secs() -> u64 {
    30
}

fn default_tool_timeout_secs() -> u64 {
    10
}

fn default_breaker_failure_threshold() -> u32 {
    5
}

fn default_breaker_cooldown_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            database_path: None,
            model: default_model(),
            api_key: None,
            max_message_len: default_max_message_len(),
            context_token_budget: default_context_token_budget(),
            reasoning_timeout_secs: default_reasoning_timeout_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
            breaker_failure_threshold: default_breaker_failure_threshold(),
            breaker_cooldown_secs: default_breaker_cooldown_secs(),
            auth_tokens: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if self.model.is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.max_message_len == 0 {
            return Err("max_message_len must be positive".to_string());
        }
        if self.context_token_budget == 0 {
            return Err("context_token_budget must be positive".to_string());
        }
        if self.reasoning_timeout_secs == 0 || self.tool_timeout_secs == 0 {
            return Err("timeouts must be positive".to_string());
        }
        if self.breaker_failure_threshold == 0 {
            return Err("breaker_failure_threshold must be positive".to_string());
        }
        Ok(())
    }
}
