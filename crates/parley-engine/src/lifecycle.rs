//! Conversation lifecycle engine.
//!
//! Owns the registry behind a single mutex and applies the business rules:
//! find-or-create, message appends with their status preconditions, and the
//! status transitions. Every mutation is followed by a best-effort snapshot
//! save before the operation returns; a failed save is logged and the
//! in-memory mutation stands.
//!
//! All mutations serialize on the one registry lock; find-or-create is
//! check-then-act and relies on that lock to stay atomic per customer.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tracing::{error, info, warn};

use parley_core::error::ParleyError;
use parley_core::types::{
    ClosedBy, Conversation, ConversationId, ConversationSummary, CustomerId, Message,
};
use parley_registry::{Registry, SnapshotStore};

use crate::error::RoutingError;

/// State machine and business rules over the conversation registry.
pub struct LifecycleEngine {
    registry: Mutex<Registry>,
    snapshots: SnapshotStore,
}

impl LifecycleEngine {
    /// Creates an engine over an already-built registry.
    pub fn new(registry: Registry, snapshots: SnapshotStore) -> Self {
        Self {
            registry: Mutex::new(registry),
            snapshots,
        }
    }

    /// Loads the snapshot under `data_dir` (empty if none) and builds the
    /// engine from it.
    pub fn open(data_dir: &Path) -> Result<Self, ParleyError> {
        let snapshots = SnapshotStore::in_dir(data_dir);
        let snapshot = snapshots.load()?;
        let registry = Registry::from_snapshot(snapshot);
        info!(
            conversations = registry.conversations.len(),
            sessions = registry.sessions.len(),
            "Conversation registry ready"
        );
        Ok(Self::new(registry, snapshots))
    }

    /// Returns the customer's current conversation, creating and binding a
    /// fresh `active` one when no usable binding exists.
    ///
    /// An existing conversation is returned unchanged: its locale is not
    /// re-evaluated and its status is not inspected here. A binding that
    /// points at a conversation missing from the store counts as unbound.
    pub fn find_or_create(
        &self,
        customer_id: &CustomerId,
        detected_locale: &str,
    ) -> Result<Conversation, RoutingError> {
        let mut registry = self.lock()?;

        if let Some(existing_id) = registry.sessions.lookup(customer_id) {
            if let Some(existing) = registry.conversations.get(existing_id) {
                return Ok(existing.clone());
            }
        }

        let id = registry.allocate_conversation_id();
        let conversation = Conversation::new(id.clone(), customer_id.clone(), detected_locale);
        registry.conversations.put(conversation.clone());
        registry.sessions.bind(customer_id.clone(), id.clone());
        info!(
            conversation_id = %id,
            customer_id = %customer_id,
            locale = detected_locale,
            "Conversation created"
        );

        self.persist(&registry);
        Ok(conversation)
    }

    /// Appends a customer message. Rejected unless the conversation is
    /// `active`; rejection leaves the record untouched.
    pub fn append_customer_message(
        &self,
        conversation_id: &ConversationId,
        text: &str,
        translated_text: &str,
    ) -> Result<(Message, Conversation), RoutingError> {
        let mut registry = self.lock()?;
        let conversation = registry
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| RoutingError::NotFound(conversation_id.clone()))?;

        if !conversation.status.accepts_customer_messages() {
            warn!(
                conversation_id = %conversation_id,
                status = %conversation.status,
                "Customer message rejected: conversation closed"
            );
            return Err(RoutingError::ConversationClosed(conversation.status));
        }

        let message = Message::customer(text, translated_text);
        conversation.push_message(message.clone());
        let updated = conversation.clone();

        self.persist(&registry);
        Ok((message, updated))
    }

    /// Appends an agent reply. Only `resolved` blocks; escalated
    /// conversations may still receive replies.
    pub fn append_agent_reply(
        &self,
        conversation_id: &ConversationId,
        text: &str,
        translated_text: &str,
    ) -> Result<(Message, Conversation), RoutingError> {
        let mut registry = self.lock()?;
        let conversation = registry
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| RoutingError::NotFound(conversation_id.clone()))?;

        if !conversation.status.accepts_agent_replies() {
            warn!(
                conversation_id = %conversation_id,
                status = %conversation.status,
                "Agent reply rejected: conversation closed"
            );
            return Err(RoutingError::ConversationClosed(conversation.status));
        }

        let message = Message::agent(text, translated_text);
        conversation.push_message(message.clone());
        let updated = conversation.clone();

        self.persist(&registry);
        Ok((message, updated))
    }

    /// Resolves the conversation on the customer's request.
    ///
    /// Unconditional: no status precondition, re-invocation overwrites
    /// closedAt/closedBy.
    pub fn end_by_customer(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, RoutingError> {
        self.transition(conversation_id, "Conversation ended by customer", |c| {
            c.resolve(ClosedBy::Customer)
        })
    }

    /// Resolves the conversation on an agent's request. Unconditional.
    pub fn resolve_by_agent(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, RoutingError> {
        self.transition(conversation_id, "Conversation resolved by agent", |c| {
            c.resolve(ClosedBy::Agent)
        })
    }

    /// Escalates the conversation. Unconditional; a missing reason is stored
    /// as the empty string.
    pub fn escalate(
        &self,
        conversation_id: &ConversationId,
        reason: Option<&str>,
    ) -> Result<Conversation, RoutingError> {
        self.transition(conversation_id, "Conversation escalated", |c| {
            c.escalate(reason.unwrap_or_default())
        })
    }

    /// Clears the customer's session binding so their next message starts a
    /// fresh conversation. The old conversation record is kept.
    pub fn clear_session(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<ConversationId>, RoutingError> {
        let mut registry = self.lock()?;
        let cleared = registry.sessions.clear(customer_id);
        if let Some(ref old_id) = cleared {
            info!(
                customer_id = %customer_id,
                conversation_id = %old_id,
                "Session binding cleared"
            );
            self.persist(&registry);
        }
        Ok(cleared)
    }

    /// Looks up a conversation by id.
    pub fn get(&self, conversation_id: &ConversationId) -> Result<Conversation, RoutingError> {
        let registry = self.lock()?;
        registry
            .conversations
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| RoutingError::NotFound(conversation_id.clone()))
    }

    /// All conversation summaries, ordered by `updated_at` descending.
    pub fn list(&self) -> Result<Vec<ConversationSummary>, RoutingError> {
        let registry = self.lock()?;
        Ok(registry
            .conversations
            .list()
            .into_iter()
            .map(Conversation::summary)
            .collect())
    }

    // -- Private helpers --

    fn lock(&self) -> Result<MutexGuard<'_, Registry>, RoutingError> {
        self.registry
            .lock()
            .map_err(|e| RoutingError::Registry(format!("registry lock poisoned: {e}")))
    }

    /// Applies an unconditional status transition and persists.
    fn transition(
        &self,
        conversation_id: &ConversationId,
        log_line: &'static str,
        apply: impl FnOnce(&mut Conversation),
    ) -> Result<Conversation, RoutingError> {
        let mut registry = self.lock()?;
        let conversation = registry
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| RoutingError::NotFound(conversation_id.clone()))?;

        apply(conversation);
        info!(conversation_id = %conversation_id, status = %conversation.status, "{}", log_line);
        let updated = conversation.clone();

        self.persist(&registry);
        Ok(updated)
    }

    /// Best-effort snapshot save; failures are logged, never propagated.
    fn persist(&self, registry: &Registry) {
        if let Err(e) = self.snapshots.save(&registry.snapshot()) {
            error!(error = %e, "Failed to persist registry snapshot");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
