//! Conversation memory.
//!
//! Conversations live in process memory only and are lost on restart. The
//! assistant sees at most [`DEFAULT_HISTORY_WINDOW`] recent messages
//! (configurable via `rag.history_window`).

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::ChatMessage;

/// Default number of recent messages to include in context.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Truncates conversation history to a window of recent messages.
pub fn truncate_history(history: &[ChatMessage], window_size: usize) -> Vec<ChatMessage> {
    if history.len() <= window_size {
        history.to_vec()
    } else {
        history[history.len() - window_size..].to_vec()
    }
}

/// In-memory conversation log keyed by conversation id.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a question and its answer under one lock, creating the
    /// conversation on first use. Concurrent requests never split a turn.
    pub fn append_turn(&self, conversation_id: &str, question: ChatMessage, answer: ChatMessage) {
        let mut conversations = self.conversations.write();
        let history = conversations.entry(conversation_id.to_string()).or_default();
        history.push(question);
        history.push(answer);
    }

    /// Full history, `None` for an unknown conversation.
    pub fn history(&self, conversation_id: &str) -> Option<Vec<ChatMessage>> {
        self.conversations.read().get(conversation_id).cloned()
    }

    /// The last `n` messages; empty for an unknown conversation.
    pub fn recent(&self, conversation_id: &str, n: usize) -> Vec<ChatMessage> {
        self.conversations
            .read()
            .get(conversation_id)
            .map(|h| truncate_history(h, n))
            .unwrap_or_default()
    }

    /// Remove a conversation. Returns whether it existed.
    pub fn clear(&self, conversation_id: &str) -> bool {
        self.conversations.write().remove(conversation_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| ChatMessage::user(format!("Message {}", i)))
            .collect()
    }

    #[test]
    fn test_truncate_history() {
        let truncated = truncate_history(&numbered(10), 3);
        assert_eq!(truncated.len(), 3);
        assert!(truncated[0].content.contains('7'));
        assert!(truncated[2].content.contains('9'));
        assert_eq!(truncate_history(&numbered(2), 3).len(), 2);
    }

    #[test]
    fn test_store_append_and_recent() {
        let store = ConversationStore::new();
        for i in 0..8 {
            store.append_turn(
                "c1",
                ChatMessage::user(format!("Question {i}")),
                ChatMessage::assistant(format!("Answer {i}"), vec![]),
            );
        }
        store.append_turn("c2", ChatMessage::user("q"), ChatMessage::assistant("hi", vec![]));

        assert_eq!(store.history("c2").unwrap().len(), 2);
        assert_eq!(store.history("c1").unwrap().len(), 16);
        let recent = store.recent("c1", DEFAULT_HISTORY_WINDOW);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "Question 3");
        assert_eq!(recent[9].content, "Answer 7");
        assert!(store.recent("missing", 10).is_empty());
        assert!(store.history("missing").is_none());
    }

    #[test]
    fn test_store_clear() {
        let store = ConversationStore::new();
        store.append_turn("c1", ChatMessage::user("q"), ChatMessage::assistant("a", vec![]));
        assert!(store.clear("c1"));
        assert!(!store.clear("c1"));
        assert!(store.history("c1").is_none());
    }

    #[test]
    fn test_concurrent_turns_stay_paired() {
        let store = std::sync::Arc::new(ConversationStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store.append_turn(
                            "shared",
                            ChatMessage::user(format!("q{i}-{j}")),
                            ChatMessage::assistant(format!("a{i}-{j}"), vec![]),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let history = store.history("shared").unwrap();
        assert_eq!(history.len(), 400);
        for pair in history.chunks(2) {
            assert_eq!(&pair[0].content[1..], &pair[1].content[1..]);
        }
    }
}
