//! Context Assembler
//!
//! Rebuilds the bounded conversation history for a turn. Loading is
//! store-backed; the truncation itself is a pure function so the budget
//! behavior is testable without a database.
//!
//! Truncation drops the oldest messages first and always re-aligns the
//! head to a user message, so the reasoning capability never sees an
//! assistant reply without the user message that prompted it. The newest
//! user message is never dropped, budget or not.

use std::sync::Arc;

use tracing::debug;

use taskline_core::{ChatMessage, ChatRole, ConversationStore, CoreResult};
use taskline_llm::Message;

/// Approximate token cost of a stored message (chars/4 heuristic)
fn message_tokens(message: &ChatMessage) -> usize {
    message.content.chars().count().div_ceil(4)
}

/// Pure truncation: returns the index of the first surviving message and
/// whether anything was dropped.
pub fn truncate_history(
    messages: &[ChatMessage],
    system_tokens: usize,
    budget: usize,
) -> (usize, bool) {
    if messages.is_empty() {
        return (0, false);
    }

    let costs: Vec<usize> = messages.iter().map(message_tokens).collect();
    let mut remaining: usize = system_tokens + costs.iter().sum::<usize>();
    let mut start = 0;

    while start + 1 < messages.len() && remaining > budget {
        remaining -= costs[start];
        start += 1;
        // Keep the head on a user message so no assistant reply is
        // orphaned from its prompt.
        while start + 1 < messages.len() && messages[start].role == ChatRole::Assistant {
            remaining -= costs[start];
            start += 1;
        }
    }

    (start, start > 0)
}

/// Convert a stored message into the reasoning wire shape
fn to_llm_message(message: &ChatMessage) -> Message {
    match message.role {
        ChatRole::User => Message::user(&message.content),
        ChatRole::Assistant => Message::assistant(&message.content),
    }
}

/// Assembles bounded context for one turn
pub struct ContextAssembler {
    conversations: Arc<dyn ConversationStore>,
    token_budget: usize,
}

impl ContextAssembler {
    /// Create an assembler with the configured token budget
    pub fn new(conversations: Arc<dyn ConversationStore>, token_budget: usize) -> Self {
        Self {
            conversations,
            token_budget,
        }
    }

    /// Load the conversation's messages in order and truncate to budget.
    ///
    /// The newest user message has already been persisted by the caller,
    /// so it is the tail of the loaded history. Returns the history ready
    /// for the reasoning call plus a flag indicating truncation occurred.
    pub async fn assemble(
        &self,
        conversation_id: &str,
        system_preamble: &str,
    ) -> CoreResult<(Vec<Message>, bool)> {
        let stored = self.conversations.load_messages(conversation_id).await?;
        let system_tokens = system_preamble.chars().count().div_ceil(4);

        let (start, truncated) = truncate_history(&stored, system_tokens, self.token_budget);
        if truncated {
            debug!(
                conversation_id,
                dropped = start,
                kept = stored.len() - start,
                "context truncated to budget"
            );
        }

        let history = stored[start..].iter().map(to_llm_message).collect();
        Ok((history, truncated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskline_llm::MessageRole;

    fn message(role: ChatRole, content: &str, seq: i64) -> ChatMessage {
        ChatMessage::new("conv-1", role, content, seq)
    }

    /// Alternating user/assistant history with uniform message size
    fn history(turns: usize, content: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::new();
        for i in 0..turns {
            messages.push(message(ChatRole::User, content, (i * 2 + 1) as i64));
            messages.push(message(ChatRole::Assistant, content, (i * 2 + 2) as i64));
        }
        // The newest user message, just persisted.
        messages.push(message(ChatRole::User, content, (turns * 2 + 1) as i64));
        messages
    }

    #[test]
    fn test_no_truncation_under_budget() {
        let messages = history(2, "hello");
        let (start, truncated) = truncate_history(&messages, 10, 1_000);
        assert_eq!(start, 0);
        assert!(!truncated);
    }

    #[test]
    fn test_drops_oldest_pairs_first() {
        // 5 messages of 10 tokens each ("x" * 40), plus 0 system tokens.
        // Budget 35 forces dropping one user+assistant pair.
        let messages = history(2, &"x".repeat(40));
        let (start, truncated) = truncate_history(&messages, 0, 35);
        assert!(truncated);
        assert_eq!(start, 2);
        assert_eq!(messages[start].role, ChatRole::User);
    }

    #[test]
    fn test_never_drops_newest_user_message() {
        let messages = history(3, &"x".repeat(400));
        // Budget far below even one message.
        let (start, truncated) = truncate_history(&messages, 0, 1);
        assert!(truncated);
        assert_eq!(start, messages.len() - 1);
        assert_eq!(messages[start].role, ChatRole::User);
    }

    #[test]
    fn test_head_never_orphaned_assistant() {
        let messages = history(4, &"x".repeat(40));
        for budget in [1, 20, 35, 50, 75, 100] {
            let (start, _) = truncate_history(&messages, 0, budget);
            assert_ne!(
                messages[start].role,
                ChatRole::Assistant,
                "orphaned assistant head at budget {}",
                budget
            );
        }
    }

    #[test]
    fn test_empty_history() {
        let (start, truncated) = truncate_history(&[], 10, 100);
        assert_eq!(start, 0);
        assert!(!truncated);
    }

    #[test]
    fn test_system_tokens_count_toward_budget() {
        let messages = history(1, &"x".repeat(40));
        // 3 messages * 10 tokens fits a 40 budget alone, but not with a
        // 20-token preamble.
        let (_, truncated_without) = truncate_history(&messages, 0, 40);
        let (_, truncated_with) = truncate_history(&messages, 20, 40);
        assert!(!truncated_without);
        assert!(truncated_with);
    }

    #[test]
    fn test_to_llm_message_roles() {
        let user = to_llm_message(&message(ChatRole::User, "hi", 1));
        assert_eq!(user.role, MessageRole::User);
        let assistant = to_llm_message(&message(ChatRole::Assistant, "hello", 2));
        assert_eq!(assistant.role, MessageRole::Assistant);
    }
}
