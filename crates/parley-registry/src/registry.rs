//! The registry aggregate: conversation store, session index, id counter.
//!
//! One `Registry` instance is constructed at startup (from a snapshot or
//! empty) and owned by the lifecycle engine; there is no ambient global
//! state.

use crate::session::SessionIndex;
use crate::snapshot::RegistrySnapshot;
use crate::store::ConversationStore;

use parley_core::types::ConversationId;

/// The full in-memory state that persistence captures and restores.
#[derive(Clone, Debug)]
pub struct Registry {
    pub conversations: ConversationStore,
    pub sessions: SessionIndex,
    /// Counter for the next `conv_<n>` id. Starts at 1, never reused.
    next_conversation_id: u64,
}

impl Registry {
    /// Creates an empty registry with the counter at 1.
    pub fn new() -> Self {
        Self {
            conversations: ConversationStore::new(),
            sessions: SessionIndex::new(),
            next_conversation_id: 1,
        }
    }

    /// Rebuilds a registry from a loaded snapshot.
    ///
    /// Session bindings are restored as-is, including any that point at
    /// conversations missing from the store; find-or-create treats those as
    /// unbound.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let mut conversations = ConversationStore::new();
        for conversation in snapshot.conversations {
            conversations.put(conversation);
        }

        let sessions: SessionIndex = snapshot.customer_sessions.into_iter().collect();

        Self {
            conversations,
            sessions,
            next_conversation_id: snapshot.conversation_id_counter.max(1),
        }
    }

    /// Captures the current state as a persistable snapshot.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::capture(
            self.conversations.iter().cloned().collect(),
            self.sessions
                .iter()
                .map(|(c, id)| (c.clone(), id.clone()))
                .collect(),
            self.next_conversation_id,
        )
    }

    /// Allocates the next conversation id, advancing the counter.
    pub fn allocate_conversation_id(&mut self) -> ConversationId {
        let id = ConversationId::from_counter(self.next_conversation_id);
        self.next_conversation_id += 1;
        id
    }

    /// The counter value the next allocation will use.
    pub fn next_conversation_counter(&self) -> u64 {
        self.next_conversation_id
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
