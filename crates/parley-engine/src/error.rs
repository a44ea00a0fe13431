//! Error types for the lifecycle engine and router.

use parley_core::types::{ConversationId, ConversationStatus};

use crate::translate::TranslateError;

/// Rejections produced by the routing operations.
///
/// Persistence failures are deliberately absent: saves are best-effort and
/// logged, never surfaced as operation failures.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("message text is required")]
    EmptyMessage,
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),
    #[error("conversation is closed ({0})")]
    ConversationClosed(ConversationStatus),
    #[error("translation failed: {0}")]
    Translation(String),
    #[error("registry access failed: {0}")]
    Registry(String),
}

impl RoutingError {
    /// The conversation status carried by a closed rejection, if any.
    ///
    /// Transports surface this to the requester so the customer or agent
    /// learns why the message was refused.
    pub fn closed_status(&self) -> Option<ConversationStatus> {
        match self {
            RoutingError::ConversationClosed(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<TranslateError> for RoutingError {
    fn from(err: TranslateError) -> Self {
        RoutingError::Translation(err.to_string())
    }
}
