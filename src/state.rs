//! Application State
//!
//! Shared state handed to every request handler: the turn orchestrator,
//! the credential verifier, and the database handle for readiness checks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use taskline_core::CoreResult;
use taskline_llm::{
    AnthropicProvider, BreakerConfig, CircuitBreaker, GuardedProvider, LlmProvider,
    ProviderConfig,
};
use taskline_tools::standard_registry;

use crate::models::settings::ServerConfig;
use crate::services::auth::{CredentialVerifier, TokenTableVerifier};
use crate::services::turn::TurnService;
use crate::storage::{Database, SqliteConversationStore, SqliteTaskStore};
use crate::utils::paths::database_path;

/// Application state shared across requests
#[derive(Clone)]
pub struct AppState {
    /// Turn orchestrator
    pub turns: Arc<TurnService>,
    /// Credential verifier for the bearer tokens
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Database handle, used by the readiness probe
    pub database: Database,
    /// Process start, for the liveness probe's uptime
    pub start_time: Instant,
}

impl AppState {
    /// Build state from configuration, opening the configured database
    /// and the Anthropic reasoning provider.
    pub fn from_config(config: &ServerConfig) -> CoreResult<Self> {
        let database = match &config.database_path {
            Some(path) => Database::open(path)?,
            None => Database::open(&database_path()?)?,
        };
        let provider = Arc::new(AnthropicProvider::new(ProviderConfig {
            api_key: config.api_key.clone(),
            base_url: None,
            model: config.model.clone(),
            ..Default::default()
        }));
        Ok(Self::build(config, provider, database))
    }

    /// Wire all services over an open database and a provider.
    ///
    /// Split out from [`from_config`] so tests can inject an in-memory
    /// database and a scripted provider.
    ///
    /// [`from_config`]: AppState::from_config
    pub fn build(
        config: &ServerConfig,
        provider: Arc<dyn LlmProvider>,
        database: Database,
    ) -> Self {
        let conversations = Arc::new(SqliteConversationStore::new(database.clone()));
        let tasks = Arc::new(SqliteTaskStore::new(database.clone()));

        // One breaker instance for the whole process; every concurrent
        // turn shares it.
        let breaker = Arc::new(CircuitBreaker::new(BreakerConfig {
            failure_threshold: config.breaker_failure_threshold,
            cooldown: Duration::from_secs(config.breaker_cooldown_secs),
        }));
        let reasoning = Arc::new(GuardedProvider::new(
            provider,
            breaker,
            Duration::from_secs(config.reasoning_timeout_secs),
        ));

        let turns = Arc::new(TurnService::new(
            conversations,
            tasks,
            Arc::new(standard_registry()),
            reasoning,
            config.context_token_budget,
            config.max_message_len,
            Duration::from_secs(config.tool_timeout_secs),
        ));

        let verifier = Arc::new(TokenTableVerifier::new(config.auth_tokens.clone()));

        Self {
            turns,
            verifier,
            database,
            start_time: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_in_memory_database() {
        let config = ServerConfig::default();
        let provider = Arc::new(AnthropicProvider::new(ProviderConfig::default()));
        let database = Database::new_in_memory().unwrap();
        let state = AppState::build(&config, provider, database);
        assert!(state.database.is_healthy());
    }
}
