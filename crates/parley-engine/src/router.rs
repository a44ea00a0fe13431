//! Message router: the transport-independent operation surface.
//!
//! Wires validation, the translation capability, the lifecycle engine, the
//! notification fan-out, and the publish capability into the operations a
//! transport layer calls. Holds the process-wide agent language preference
//! (single shared value, last writer wins).

use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::info;

use parley_core::config::ParleyConfig;
use parley_core::error::ParleyError;
use parley_core::types::{
    Conversation, ConversationId, ConversationSummary, CustomerId, Message,
};

use crate::error::RoutingError;
use crate::fanout;
use crate::lifecycle::LifecycleEngine;
use crate::publish::Publisher;
use crate::translate::Translator;

/// Result of a submitted customer message.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMessageReceipt {
    pub conversation_id: ConversationId,
    pub customer_id: CustomerId,
    pub message: Message,
}

/// Result of a submitted agent reply.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReplyReceipt {
    pub conversation_id: ConversationId,
    pub message: Message,
    /// The customer-facing rendering, echoed for the agent's own view.
    pub translated_for_customer: String,
}

/// Transport-independent entry point for all conversation operations.
pub struct MessageRouter {
    engine: LifecycleEngine,
    translator: Arc<dyn Translator>,
    publisher: Arc<dyn Publisher>,
    agent_language: RwLock<String>,
}

impl MessageRouter {
    /// Creates a router over an existing engine.
    pub fn new(
        engine: LifecycleEngine,
        translator: Arc<dyn Translator>,
        publisher: Arc<dyn Publisher>,
        default_agent_language: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            translator,
            publisher,
            agent_language: RwLock::new(default_agent_language.into()),
        }
    }

    /// Builds the engine from configuration (loading any saved snapshot)
    /// and wraps it in a router.
    pub fn from_config(
        config: &ParleyConfig,
        translator: Arc<dyn Translator>,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self, ParleyError> {
        let engine = LifecycleEngine::open(Path::new(&config.general.data_dir))?;
        Ok(Self::new(
            engine,
            translator,
            publisher,
            config.desk.default_agent_language.clone(),
        ))
    }

    /// Routes an inbound customer message.
    ///
    /// Detects the customer's locale, renders the text into the current
    /// agent language, finds or creates the customer's conversation, and
    /// appends. A closed conversation rejects the message after
    /// find-or-create, mirroring the rest of the flow: the locale of an
    /// existing conversation is never re-evaluated.
    pub async fn submit_customer_message(
        &self,
        customer_id: &CustomerId,
        text: &str,
    ) -> Result<CustomerMessageReceipt, RoutingError> {
        if text.trim().is_empty() {
            return Err(RoutingError::EmptyMessage);
        }

        let detected_locale = self.translator.detect_locale(text).await?;
        let target = self.agent_language();
        let translated = self
            .translator
            .translate(text, &detected_locale, &target)
            .await?;

        let conversation = self.engine.find_or_create(customer_id, &detected_locale)?;
        if !conversation.status.accepts_customer_messages() {
            return Err(RoutingError::ConversationClosed(conversation.status));
        }

        let (message, conversation) =
            self.engine
                .append_customer_message(&conversation.id, text, &translated)?;
        self.publish_all(fanout::on_customer_message(&conversation, &message));

        Ok(CustomerMessageReceipt {
            conversation_id: conversation.id,
            customer_id: conversation.customer_id,
            message,
        })
    }

    /// Routes an agent reply into a conversation.
    ///
    /// The reply is rendered from the current agent language into the
    /// conversation's customer locale. The `resolved` check runs before
    /// translation.
    pub async fn submit_agent_reply(
        &self,
        conversation_id: &ConversationId,
        text: &str,
    ) -> Result<AgentReplyReceipt, RoutingError> {
        if text.trim().is_empty() {
            return Err(RoutingError::EmptyMessage);
        }

        let conversation = self.engine.get(conversation_id)?;
        if !conversation.status.accepts_agent_replies() {
            return Err(RoutingError::ConversationClosed(conversation.status));
        }

        let source = self.agent_language();
        let translated = self
            .translator
            .translate(text, &source, &conversation.customer_locale)
            .await?;

        let (message, conversation) =
            self.engine
                .append_agent_reply(conversation_id, text, &translated)?;
        self.publish_all(fanout::on_agent_reply(&conversation, &message));

        Ok(AgentReplyReceipt {
            conversation_id: conversation.id,
            translated_for_customer: message.translated_text.clone(),
            message,
        })
    }

    /// Clears the customer's session binding so their next message opens a
    /// fresh conversation.
    pub fn start_new_conversation(&self, customer_id: &CustomerId) -> Result<(), RoutingError> {
        self.engine.clear_session(customer_id)?;
        Ok(())
    }

    /// Ends a conversation on the customer's request.
    pub fn end_as_customer(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, RoutingError> {
        let conversation = self.engine.end_by_customer(conversation_id)?;
        self.publish_all(fanout::on_conversation_ended(&conversation));
        Ok(conversation)
    }

    /// Resolves a conversation on an agent's request.
    pub fn resolve_as_agent(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, RoutingError> {
        let conversation = self.engine.resolve_by_agent(conversation_id)?;
        self.publish_all(fanout::on_conversation_ended(&conversation));
        Ok(conversation)
    }

    /// Escalates a conversation on an agent's request.
    pub fn escalate_as_agent(
        &self,
        conversation_id: &ConversationId,
        reason: Option<&str>,
    ) -> Result<Conversation, RoutingError> {
        let conversation = self.engine.escalate(conversation_id, reason)?;
        self.publish_all(fanout::on_conversation_escalated(&conversation));
        Ok(conversation)
    }

    /// All conversation summaries, most recently updated first.
    pub fn list_conversations(&self) -> Result<Vec<ConversationSummary>, RoutingError> {
        self.engine.list()
    }

    /// The full record of one conversation.
    pub fn get_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, RoutingError> {
        self.engine.get(conversation_id)
    }

    /// The current process-wide agent language.
    pub fn agent_language(&self) -> String {
        self.agent_language
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Updates the process-wide agent language. Last writer wins across all
    /// connected agents.
    pub fn set_agent_language(&self, language: impl Into<String>) {
        let language = language.into();
        info!(language = %language, "Agent language updated");
        *self
            .agent_language
            .write()
            .unwrap_or_else(|e| e.into_inner()) = language;
    }

    // -- Private helpers --

    fn publish_all(&self, notifications: Vec<parley_core::events::Notification>) {
        for notification in &notifications {
            self.publisher.publish(notification);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
