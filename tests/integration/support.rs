//! Shared test harness: scripted provider plus fully wired state over an
//! in-memory database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use taskline_llm::{
    LlmProvider, LlmResponse, LlmResult, Message, StopReason, ToolCall, ToolDefinition,
    UsageStats,
};
use taskline_server::models::settings::ServerConfig;
use taskline_server::state::AppState;
use taskline_server::storage::{Database, SqliteConversationStore, SqliteTaskStore};
use taskline_server::TurnRequest;

/// Provider that pops scripted responses in order and records how it was
/// called.
pub struct ScriptedProvider {
    responses: Mutex<Vec<LlmResult<LlmResponse>>>,
    calls: AtomicU32,
    last_history_len: AtomicUsize,
    last_tool_count: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(mut responses: Vec<LlmResult<LlmResponse>>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            calls: AtomicU32::new(0),
            last_history_len: AtomicUsize::new(0),
            last_tool_count: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Make every call sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_history_len(&self) -> usize {
        self.last_history_len.load(Ordering::SeqCst)
    }

    pub fn last_tool_count(&self) -> usize {
        self.last_tool_count.load(Ordering::SeqCst)
    }

    /// A direct natural-language reply
    pub fn reply(text: &str) -> LlmResult<LlmResponse> {
        Ok(LlmResponse {
            content: Some(text.to_string()),
            tool_calls: vec![],
            stop_reason: StopReason::EndTurn,
            usage: UsageStats::default(),
            model: "scripted".to_string(),
        })
    }

    /// A response requesting one tool call
    pub fn tool_call(name: &str, arguments: serde_json::Value) -> LlmResult<LlmResponse> {
        Self::tool_calls(vec![(name, arguments)])
    }

    /// A response requesting several tool calls in order
    pub fn tool_calls(calls: Vec<(&str, serde_json::Value)>) -> LlmResult<LlmResponse> {
        Ok(LlmResponse {
            content: None,
            tool_calls: calls
                .into_iter()
                .enumerate()
                .map(|(i, (name, arguments))| ToolCall {
                    id: format!("call_{}", i + 1),
                    name: name.to_string(),
                    arguments,
                })
                .collect(),
            stop_reason: StopReason::ToolUse,
            usage: UsageStats::default(),
            model: "scripted".to_string(),
        })
    }

    /// A simulated provider-side outage
    pub fn failure() -> LlmResult<LlmResponse> {
        Err(taskline_llm::LlmError::ServerError {
            message: "simulated outage".to_string(),
            status: Some(503),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_history_len.store(messages.len(), Ordering::SeqCst);
        self.last_tool_count.store(tools.len(), Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Self::reply("out of script"))
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }
}

/// Fully wired application state plus direct store handles for seeding
/// and inspection.
pub struct TestHarness {
    pub state: AppState,
    pub provider: Arc<ScriptedProvider>,
    pub conversations: SqliteConversationStore,
    pub tasks: SqliteTaskStore,
}

/// Config with test-friendly auth tokens and defaults otherwise
pub fn test_config() -> ServerConfig {
    let mut auth_tokens = HashMap::new();
    auth_tokens.insert("tok-one".to_string(), "user-1".to_string());
    auth_tokens.insert("tok-two".to_string(), "user-2".to_string());
    ServerConfig {
        auth_tokens,
        ..Default::default()
    }
}

/// Build a harness with the default config
pub fn harness(responses: Vec<LlmResult<LlmResponse>>) -> TestHarness {
    harness_with(test_config(), ScriptedProvider::new(responses))
}

/// Build a harness with explicit config and provider
pub fn harness_with(config: ServerConfig, provider: ScriptedProvider) -> TestHarness {
    let database = Database::new_in_memory().unwrap();
    let provider = Arc::new(provider);
    let state = AppState::build(&config, provider.clone(), database.clone());
    TestHarness {
        state,
        provider,
        conversations: SqliteConversationStore::new(database.clone()),
        tasks: SqliteTaskStore::new(database),
    }
}

/// Convenience turn request
pub fn turn(user_id: &str, message: &str, conversation_id: Option<String>) -> TurnRequest {
    TurnRequest {
        user_id: user_id.to_string(),
        message: message.to_string(),
        conversation_id,
    }
}
