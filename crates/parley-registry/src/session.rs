//! Session index: customer identity to current conversation.
//!
//! A binding is created by find-or-create on a customer's first message and
//! cleared only by an explicit "start new conversation" request. It is NOT
//! cleared when a conversation reaches a terminal status; the customer keeps
//! pointing at the closed record until they explicitly start over.

use std::collections::HashMap;

use parley_core::types::{ConversationId, CustomerId};

/// Map of customer identifier to their currently-open conversation id.
#[derive(Clone, Debug, Default)]
pub struct SessionIndex {
    inner: HashMap<CustomerId, ConversationId>,
}

impl SessionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the customer's current conversation id, if bound.
    pub fn lookup(&self, customer_id: &CustomerId) -> Option<&ConversationId> {
        self.inner.get(customer_id)
    }

    /// Binds a customer to a conversation, replacing any previous binding.
    pub fn bind(&mut self, customer_id: CustomerId, conversation_id: ConversationId) {
        self.inner.insert(customer_id, conversation_id);
    }

    /// Clears a customer's binding, returning the old conversation id.
    pub fn clear(&mut self, customer_id: &CustomerId) -> Option<ConversationId> {
        self.inner.remove(customer_id)
    }

    /// Iterates all bindings (used by snapshotting).
    pub fn iter(&self) -> impl Iterator<Item = (&CustomerId, &ConversationId)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<(CustomerId, ConversationId)> for SessionIndex {
    fn from_iter<T: IntoIterator<Item = (CustomerId, ConversationId)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
