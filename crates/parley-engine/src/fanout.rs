//! Notification fan-out.
//!
//! Pure mapping from each mutating operation to the notifications the
//! transport layer must deliver. Nothing here performs delivery; the
//! returned list is the delivery contract.

use parley_core::events::{ConversationEvent, Notification, Scope};
use parley_core::types::{ClosedBy, Conversation, Message};

/// A customer message was appended: agents get the message itself plus a
/// refreshed inbox row.
pub fn on_customer_message(conversation: &Conversation, message: &Message) -> Vec<Notification> {
    let summary = conversation.summary();
    vec![
        Notification::new(
            Scope::Agents,
            ConversationEvent::NewMessage {
                conversation_id: conversation.id.clone(),
                message: message.clone(),
            },
        ),
        Notification::new(
            Scope::Agents,
            ConversationEvent::ConversationUpdated {
                id: summary.id,
                language: summary.language,
                last_message: summary.last_message,
                updated_at: summary.updated_at,
                customer_id: summary.customer_id,
            },
        ),
    ]
}

/// An agent reply was appended: only that customer's channel is informed.
pub fn on_agent_reply(conversation: &Conversation, message: &Message) -> Vec<Notification> {
    vec![Notification::new(
        Scope::Customer(conversation.customer_id.clone()),
        ConversationEvent::AgentReply {
            conversation_id: conversation.id.clone(),
            message: message.clone(),
        },
    )]
}

/// A conversation was resolved: the party who did NOT close it is informed.
/// Customer-closed goes to all agents, agent-closed goes to the customer.
pub fn on_conversation_ended(conversation: &Conversation) -> Vec<Notification> {
    let scope = match conversation.closed_by {
        Some(ClosedBy::Customer) => Scope::Agents,
        _ => Scope::Customer(conversation.customer_id.clone()),
    };
    vec![Notification::new(
        scope,
        ConversationEvent::ConversationEnded {
            conversation_id: conversation.id.clone(),
            status: conversation.status,
            closed_by: conversation.closed_by,
        },
    )]
}

/// A conversation was escalated: the customer is informed.
pub fn on_conversation_escalated(conversation: &Conversation) -> Vec<Notification> {
    vec![Notification::new(
        Scope::Customer(conversation.customer_id.clone()),
        ConversationEvent::ConversationEscalated {
            conversation_id: conversation.id.clone(),
            status: conversation.status,
        },
    )]
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::types::{ConversationId, ConversationStatus, CustomerId};

    fn conversation_with_message() -> (Conversation, Message) {
        let mut conversation = Conversation::new(
            ConversationId::from_counter(1),
            CustomerId::new("c1"),
            "es-MX",
        );
        let message = Message::customer("Hola", "Hello");
        conversation.push_message(message.clone());
        (conversation, message)
    }

    // ---- Customer message ----

    #[test]
    fn test_customer_message_notifies_agents_twice() {
        let (conversation, message) = conversation_with_message();
        let notifications = on_customer_message(&conversation, &message);

        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|n| n.scope == Scope::Agents));
        assert_eq!(notifications[0].event.event_name(), "new_message");
        assert_eq!(
            notifications[1].event.event_name(),
            "conversation_updated"
        );
    }

    #[test]
    fn test_customer_message_update_carries_preview() {
        let (conversation, message) = conversation_with_message();
        let notifications = on_customer_message(&conversation, &message);

        let payload = notifications[1].event.payload();
        assert_eq!(payload["id"], "conv_1");
        assert_eq!(payload["language"], "es");
        assert_eq!(payload["lastMessage"], "Hello");
        assert_eq!(payload["customerId"], "c1");
    }

    // ---- Agent reply ----

    #[test]
    fn test_agent_reply_targets_customer_channel() {
        let (mut conversation, _) = conversation_with_message();
        let reply = Message::agent("Hello", "Hola");
        conversation.push_message(reply.clone());

        let notifications = on_agent_reply(&conversation, &reply);
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].scope,
            Scope::Customer(CustomerId::new("c1"))
        );
        assert_eq!(notifications[0].event.event_name(), "agent_reply");
        assert_eq!(notifications[0].scope.topic(), "customer:c1");
    }

    // ---- Ended ----

    #[test]
    fn test_customer_ended_notifies_agents() {
        let (mut conversation, _) = conversation_with_message();
        conversation.resolve(ClosedBy::Customer);

        let notifications = on_conversation_ended(&conversation);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].scope, Scope::Agents);

        let payload = notifications[0].event.payload();
        assert_eq!(payload["status"], "resolved");
        assert_eq!(payload["closedBy"], "customer");
    }

    #[test]
    fn test_agent_resolved_notifies_customer() {
        let (mut conversation, _) = conversation_with_message();
        conversation.resolve(ClosedBy::Agent);

        let notifications = on_conversation_ended(&conversation);
        assert_eq!(
            notifications[0].scope,
            Scope::Customer(CustomerId::new("c1"))
        );
        assert_eq!(notifications[0].event.payload()["closedBy"], "agent");
    }

    // ---- Escalated ----

    #[test]
    fn test_escalation_notifies_customer_without_reason() {
        let (mut conversation, _) = conversation_with_message();
        conversation.escalate("needs specialist");

        let notifications = on_conversation_escalated(&conversation);
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].scope,
            Scope::Customer(CustomerId::new("c1"))
        );
        assert_eq!(
            notifications[0].event.event_name(),
            "conversation_escalated"
        );

        // The escalation reason stays internal; the payload carries only
        // the id and status.
        let payload = notifications[0].event.payload();
        assert_eq!(payload["status"], "escalated");
        assert!(payload.get("reason").is_none());
        assert_eq!(
            conversation.status,
            ConversationStatus::Escalated
        );
    }
}
