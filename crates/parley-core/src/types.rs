use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters of the latest translated message shown in list views.
pub const PREVIEW_LENGTH: usize = 80;

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque customer identifier, supplied by the transport layer.
///
/// Customers identify themselves however the embedding application sees fit
/// (device id, account id, "anonymous"); the core never inspects the value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Conversation identifier, monotonically assigned as `conv_<counter>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Build the id for the given counter value.
    pub fn from_counter(counter: u64) -> Self {
        Self(format!("conv_{counter}"))
    }

    /// Wrap an already-formatted id (e.g. one read back from a snapshot).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Customer,
    Agent,
}

/// Lifecycle status of a conversation.
///
/// `active` is the initial state; `resolved` is terminal. `escalated`
/// conversations may still receive agent replies and may later be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Resolved,
    Escalated,
}

impl ConversationStatus {
    /// Returns true if customer messages may be appended.
    pub fn accepts_customer_messages(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns true if agent replies may be appended (only `resolved` blocks).
    pub fn accepts_agent_replies(&self) -> bool {
        !matches!(self, Self::Resolved)
    }

    /// Returns true if this is the terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// The wire/storage spelling of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Escalated => "escalated",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which party closed a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosedBy {
    Customer,
    Agent,
}

// =============================================================================
// Message
// =============================================================================

/// A single message within a conversation.
///
/// `original_text` is the author's verbatim input and is never altered;
/// `translated_text` is the rendering shown to the other party. The two are
/// equal when source and target locale coincide or translation is a no-op.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub original_text: String,
    pub translated_text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message with the current timestamp.
    pub fn new(
        role: MessageRole,
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
    ) -> Self {
        Self {
            role,
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a customer message.
    pub fn customer(original: impl Into<String>, translated: impl Into<String>) -> Self {
        Self::new(MessageRole::Customer, original, translated)
    }

    /// Creates an agent message.
    pub fn agent(original: impl Into<String>, translated: impl Into<String>) -> Self {
        Self::new(MessageRole::Agent, original, translated)
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// The full record of one customer's support interaction.
///
/// Serialized field names match the snapshot file format (camelCase record
/// fields, snake_case message fields).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub customer_id: CustomerId,
    /// Short language code, the first subtag of `customer_locale` (e.g. "es").
    pub language: String,
    /// Full locale tag detected from the customer's first message (e.g. "es-MX").
    pub customer_locale: String,
    pub messages: Vec<Message>,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_by: Option<ClosedBy>,
    #[serde(default)]
    pub escalated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub escalation_reason: Option<String>,
}

impl Conversation {
    /// Creates a fresh `active` conversation for a customer.
    ///
    /// The language facet is the first subtag of `detected_locale`.
    pub fn new(id: ConversationId, customer_id: CustomerId, detected_locale: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_id,
            language: language_subtag(detected_locale),
            customer_locale: detected_locale.to_string(),
            messages: Vec::new(),
            status: ConversationStatus::Active,
            created_at: now,
            updated_at: now,
            closed_at: None,
            closed_by: None,
            escalated_at: None,
            escalation_reason: None,
        }
    }

    /// Appends a message and refreshes `updated_at`.
    ///
    /// The message list is append-only; callers enforce status preconditions.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Transitions into `resolved`, recording who closed it and when.
    ///
    /// Unconditional: re-resolving overwrites `closed_at`/`closed_by`.
    pub fn resolve(&mut self, by: ClosedBy) {
        let now = Utc::now();
        self.status = ConversationStatus::Resolved;
        self.closed_at = Some(now);
        self.closed_by = Some(by);
        self.updated_at = now;
    }

    /// Transitions into `escalated`, recording the reason (empty if absent).
    ///
    /// Unconditional: no precondition on the current status.
    pub fn escalate(&mut self, reason: impl Into<String>) {
        let now = Utc::now();
        self.status = ConversationStatus::Escalated;
        self.escalated_at = Some(now);
        self.escalation_reason = Some(reason.into());
        self.updated_at = now;
    }

    /// Returns the most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// First `PREVIEW_LENGTH` characters of the latest message's
    /// translated text; empty string when there are no messages.
    pub fn last_message_preview(&self) -> String {
        self.messages
            .last()
            .map(|m| m.translated_text.chars().take(PREVIEW_LENGTH).collect())
            .unwrap_or_default()
    }

    /// The list-view projection of this conversation.
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            language: self.language.clone(),
            last_message: self.last_message_preview(),
            updated_at: self.updated_at,
            customer_id: self.customer_id.clone(),
        }
    }
}

/// List-view projection of a conversation, sorted by `updated_at` descending
/// in inbox listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub language: String,
    pub last_message: String,
    pub updated_at: DateTime<Utc>,
    pub customer_id: CustomerId,
}

/// Extracts the leading subtag of a locale tag ("es-MX" -> "es").
pub fn language_subtag(locale: &str) -> String {
    locale.split('-').next().unwrap_or_default().to_string()
}

// =============================================================================
// Tests
// =============================================================================
