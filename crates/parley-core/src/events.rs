use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::types::{ClosedBy, ConversationId, ConversationStatus, CustomerId, Message};

/// Delivery scope for a notification.
///
/// Scopes name the audience, not the mechanism: the transport layer decides
/// what "all agents" or "customer:<id>" means for its medium.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Every connected agent.
    Agents,
    /// The channel of one specific customer.
    Customer(CustomerId),
}

impl Scope {
    /// Returns the topic string a transport subscribes to.
    pub fn topic(&self) -> String {
        match self {
            Scope::Agents => "agents".to_string(),
            Scope::Customer(id) => format!("customer:{id}"),
        }
    }
}

/// Events emitted by conversation mutations.
///
/// Events are produced by the notification fan-out after state changes and
/// handed to the external publish capability. `event_name()` and `payload()`
/// together form the wire contract the transport layer must honor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConversationEvent {
    /// A customer message was appended; agents need the full message.
    NewMessage {
        conversation_id: ConversationId,
        message: Message,
    },

    /// A conversation's inbox row changed (new message, fresh preview).
    ConversationUpdated {
        id: ConversationId,
        language: String,
        last_message: String,
        updated_at: DateTime<Utc>,
        customer_id: CustomerId,
    },

    /// An agent reply was appended; the customer needs the full message.
    AgentReply {
        conversation_id: ConversationId,
        message: Message,
    },

    /// A conversation reached `resolved`.
    ConversationEnded {
        conversation_id: ConversationId,
        status: ConversationStatus,
        closed_by: Option<ClosedBy>,
    },

    /// A conversation was escalated.
    ConversationEscalated {
        conversation_id: ConversationId,
        status: ConversationStatus,
    },
}

impl ConversationEvent {
    /// Returns the wire event name used by transports.
    pub fn event_name(&self) -> &'static str {
        match self {
            ConversationEvent::NewMessage { .. } => "new_message",
            ConversationEvent::ConversationUpdated { .. } => "conversation_updated",
            ConversationEvent::AgentReply { .. } => "agent_reply",
            ConversationEvent::ConversationEnded { .. } => "conversation_ended",
            ConversationEvent::ConversationEscalated { .. } => "conversation_escalated",
        }
    }

    /// Returns the wire payload for this event.
    ///
    /// Key spelling is part of the delivery contract (camelCase envelope
    /// keys, snake_case message fields).
    pub fn payload(&self) -> serde_json::Value {
        match self {
            ConversationEvent::NewMessage {
                conversation_id,
                message,
            } => json!({
                "conversationId": conversation_id,
                "message": message,
            }),
            ConversationEvent::ConversationUpdated {
                id,
                language,
                last_message,
                updated_at,
                customer_id,
            } => json!({
                "id": id,
                "language": language,
                "lastMessage": last_message,
                "updatedAt": updated_at,
                "customerId": customer_id,
            }),
            ConversationEvent::AgentReply {
                conversation_id,
                message,
            } => json!({
                "conversationId": conversation_id,
                "message": message,
            }),
            ConversationEvent::ConversationEnded {
                conversation_id,
                status,
                closed_by,
            } => json!({
                "conversationId": conversation_id,
                "status": status,
                "closedBy": closed_by,
            }),
            ConversationEvent::ConversationEscalated {
                conversation_id,
                status,
            } => json!({
                "conversationId": conversation_id,
                "status": status,
            }),
        }
    }
}

/// One delivery instruction: which audience gets which event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub scope: Scope,
    pub event: ConversationEvent,
}

impl Notification {
    pub fn new(scope: Scope, event: ConversationEvent) -> Self {
        Self { scope, event }
    }
}

// =============================================================================
// Tests
// =============================================================================
