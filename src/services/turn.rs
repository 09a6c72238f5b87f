//! Turn Orchestrator
//!
//! Drives one chat turn end to end: validate the caller, persist the user
//! message (durability before reasoning), assemble bounded context, invoke
//! the reasoning capability through the circuit breaker, execute any
//! requested tool calls in order, and persist the assistant reply.
//!
//! Once the user's message is durably stored, no later failure loses it:
//! reasoning or tool trouble degrades the turn to a fallback reply instead
//! of failing it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use taskline_core::{
    ChatRole, Conversation, ConversationStore, CoreError, CoreResult, TaskStore,
};
use taskline_llm::{GuardedProvider, ToolCall};
use taskline_tools::{ToolError, ToolExecutionContext, ToolRegistry};

use crate::models::chat::{TurnRequest, TurnResponse};
use crate::services::context::ContextAssembler;

/// Reply persisted and returned when the reasoning capability is
/// unavailable after the user's message was stored
pub const FALLBACK_REPLY: &str =
    "I'm having trouble reaching my reasoning service right now. Your message \
     has been saved; please try again in a moment.";

/// System preamble sent with every reasoning call
const SYSTEM_PREAMBLE: &str =
    "You are Taskline, an assistant that manages the user's task list through \
     conversation. Use the provided tools to add, list, complete, update, or \
     delete tasks whenever the user asks for a change or an overview; reply \
     directly when no task action is needed. Refer to tasks by the titles the \
     user used. Never fabricate task data.";

/// Orchestrates chat turns
#[derive(Clone)]
pub struct TurnService {
    conversations: Arc<dyn ConversationStore>,
    tasks: Arc<dyn TaskStore>,
    registry: Arc<ToolRegistry>,
    reasoning: Arc<GuardedProvider>,
    assembler: Arc<ContextAssembler>,
    max_message_len: usize,
    tool_timeout: Duration,
}

impl TurnService {
    /// Wire up the orchestrator
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        tasks: Arc<dyn TaskStore>,
        registry: Arc<ToolRegistry>,
        reasoning: Arc<GuardedProvider>,
        context_token_budget: usize,
        max_message_len: usize,
        tool_timeout: Duration,
    ) -> Self {
        let assembler = Arc::new(ContextAssembler::new(
            conversations.clone(),
            context_token_budget,
        ));
        Self {
            conversations,
            tasks,
            registry,
            reasoning,
            assembler,
            max_message_len,
            tool_timeout,
        }
    }

    /// Handle one turn for a verified caller.
    ///
    /// Rejections (identity mismatch, validation, missing conversation)
    /// happen before anything is persisted. The turn body itself runs on a
    /// spawned task: if the caller drops the request mid-turn, persistence
    /// still completes.
    pub async fn handle_turn(
        &self,
        verified_user_id: &str,
        request: TurnRequest,
    ) -> CoreResult<TurnResponse> {
        if request.user_id != verified_user_id {
            return Err(CoreError::forbidden(
                "request user does not match credential",
            ));
        }

        let message = request.message.trim().to_string();
        if message.is_empty() {
            return Err(CoreError::validation("message must not be empty"));
        }
        if message.chars().count() > self.max_message_len {
            return Err(CoreError::Validation(format!(
                "message exceeds {} characters",
                self.max_message_len
            )));
        }

        // Load-or-create: a supplied id must exist and belong to the
        // caller; conversations are never created implicitly mid-turn.
        let conversation = match &request.conversation_id {
            Some(id) => {
                self.conversations
                    .load_conversation(id, verified_user_id)
                    .await?
            }
            None => {
                self.conversations
                    .create_conversation(verified_user_id)
                    .await?
            }
        };

        let service = self.clone();
        let user_id = verified_user_id.to_string();
        let handle =
            tokio::spawn(async move { service.run_turn(&user_id, conversation, &message).await });
        handle
            .await
            .map_err(|e| CoreError::internal(format!("turn task failed: {}", e)))?
    }

    /// The turn body, from the first write onward
    async fn run_turn(
        &self,
        user_id: &str,
        conversation: Conversation,
        message: &str,
    ) -> CoreResult<TurnResponse> {
        // Durability before reasoning: whatever happens next, the user's
        // message is stored.
        self.conversations
            .append_message(&conversation.id, ChatRole::User, message)
            .await?;

        let (history, truncated) = self
            .assembler
            .assemble(&conversation.id, SYSTEM_PREAMBLE)
            .await?;
        if truncated {
            info!(conversation_id = %conversation.id, "history truncated for context budget");
        }

        let catalog = self.registry.definitions();
        let (reply, degraded) = match self
            .reasoning
            .send_message(history, Some(SYSTEM_PREAMBLE.to_string()), catalog)
            .await
        {
            Ok(response) => {
                if response.has_tool_calls() {
                    self.execute_tool_calls(user_id, &response.tool_calls).await
                } else {
                    let reply = response
                        .content
                        .filter(|c| !c.trim().is_empty())
                        .unwrap_or_else(|| "I'm not sure how to help with that.".to_string());
                    (reply, false)
                }
            }
            Err(e) => {
                warn!(error = %e, conversation_id = %conversation.id,
                      "reasoning unavailable, degrading turn");
                (FALLBACK_REPLY.to_string(), true)
            }
        };

        self.conversations
            .append_message(&conversation.id, ChatRole::Assistant, &reply)
            .await?;
        self.conversations.touch(&conversation.id).await?;

        Ok(TurnResponse {
            reply,
            conversation_id: conversation.id,
            degraded,
        })
    }

    /// Execute requested tool calls strictly in order.
    ///
    /// The caller identity is injected here from the verified credential;
    /// nothing the reasoning step produced can change whose tasks are
    /// touched. Handler-level misses (validation, not found) read as
    /// normal conversation; infrastructure failures degrade the turn.
    async fn execute_tool_calls(&self, user_id: &str, calls: &[ToolCall]) -> (String, bool) {
        let ctx = ToolExecutionContext::new(user_id, self.tasks.clone());
        let mut parts = Vec::new();
        let mut degraded = false;

        for call in calls {
            let dispatch = self
                .registry
                .dispatch(&call.name, &ctx, call.arguments.clone());
            match tokio::time::timeout(self.tool_timeout, dispatch).await {
                Ok(Ok(outcome)) => parts.push(outcome.summary_text()),
                Ok(Err(ToolError::NotFound(msg))) => {
                    parts.push(format!("Sorry, I found {}.", msg));
                }
                Ok(Err(ToolError::Validation(msg))) => {
                    parts.push(format!("I couldn't do that: {}.", msg));
                }
                Ok(Err(ToolError::UnknownTool(name))) => {
                    warn!(tool = %name, "reasoning requested unknown tool");
                    parts.push("I couldn't do that.".to_string());
                }
                Ok(Err(ToolError::Storage(msg))) => {
                    warn!(tool = %call.name, error = %msg, "tool execution failed");
                    parts.push(
                        "Something went wrong while updating your tasks; please try again."
                            .to_string(),
                    );
                    degraded = true;
                }
                Err(_) => {
                    warn!(tool = %call.name, "tool call timed out");
                    parts.push(
                        "That operation timed out before finishing; please try again."
                            .to_string(),
                    );
                    degraded = true;
                }
            }
        }

        (parts.join("\n\n"), degraded)
    }
}
