//! In-memory conversation store.
//!
//! Pure data plus invariants: no I/O, no business rules. A missing id is an
//! `Option::None`, never an error; callers decide whether that matters.

use std::collections::HashMap;

use parley_core::types::{Conversation, ConversationId};

/// Map of conversation id to conversation record.
#[derive(Clone, Debug, Default)]
pub struct ConversationStore {
    inner: HashMap<ConversationId, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a conversation by id.
    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.inner.get(id)
    }

    /// Looks up a conversation for in-place mutation.
    pub fn get_mut(&mut self, id: &ConversationId) -> Option<&mut Conversation> {
        self.inner.get_mut(id)
    }

    /// Inserts or replaces a conversation, keyed by its own id.
    pub fn put(&mut self, conversation: Conversation) {
        self.inner.insert(conversation.id.clone(), conversation);
    }

    /// Returns true if the id is present.
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.inner.contains_key(id)
    }

    /// All conversations, ordered by `updated_at` descending (inbox order).
    pub fn list(&self) -> Vec<&Conversation> {
        let mut conversations: Vec<&Conversation> = self.inner.values().collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        conversations
    }

    /// Unordered iteration over all conversations.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.inner.values()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
