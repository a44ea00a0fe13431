//! JSON-file persistence gateway.
//!
//! The whole registry is written as one pretty-printed JSON document and
//! overwritten wholesale on every save; there is no incremental or
//! log-structured persistence at this durability tier. Timestamps round-trip
//! as ISO-8601 strings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use parley_core::error::ParleyError;
use parley_core::types::{Conversation, ConversationId, CustomerId};

/// File name of the registry snapshot inside the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "conversations.json";

/// The persisted unit: every conversation, every session binding, and the
/// next-id counter.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub conversations: Vec<Conversation>,
    pub customer_sessions: HashMap<CustomerId, ConversationId>,
    pub conversation_id_counter: u64,
    pub saved_at: DateTime<Utc>,
}

impl RegistrySnapshot {
    /// An empty snapshot, used when no file exists yet.
    pub fn empty() -> Self {
        Self::capture(Vec::new(), HashMap::new(), 1)
    }

    /// Builds a snapshot stamped with the current time.
    ///
    /// Conversations are ordered by creation for a stable file layout.
    pub fn capture(
        mut conversations: Vec<Conversation>,
        customer_sessions: HashMap<CustomerId, ConversationId>,
        conversation_id_counter: u64,
    ) -> Self {
        conversations.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Self {
            conversations,
            customer_sessions,
            conversation_id_counter,
            saved_at: Utc::now(),
        }
    }
}

/// Reads and writes registry snapshots at a fixed path.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store for the given snapshot file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for `conversations.json` inside a data directory.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SNAPSHOT_FILE_NAME))
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot from disk.
    ///
    /// A missing file is not an error: it yields an empty snapshot so a
    /// first run starts fresh. A present-but-unparseable file is an error.
    pub fn load(&self) -> Result<RegistrySnapshot, ParleyError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No saved snapshot found, starting fresh");
                return Ok(RegistrySnapshot::empty());
            }
            Err(e) => {
                return Err(ParleyError::Persistence(format!(
                    "failed to read snapshot {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let snapshot: RegistrySnapshot = serde_json::from_str(&content).map_err(|e| {
            ParleyError::Persistence(format!(
                "failed to parse snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!(
            path = %self.path.display(),
            conversations = snapshot.conversations.len(),
            "Loaded registry snapshot from disk"
        );
        Ok(snapshot)
    }

    /// Writes the snapshot, replacing any previous file.
    pub fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), ParleyError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ParleyError::Persistence(format!(
                    "failed to create data directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(snapshot).map_err(|e| {
            ParleyError::Persistence(format!("failed to serialize snapshot: {e}"))
        })?;

        std::fs::write(&self.path, content).map_err(|e| {
            ParleyError::Persistence(format!(
                "failed to write snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(
            path = %self.path.display(),
            conversations = snapshot.conversations.len(),
            "Saved registry snapshot to disk"
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::types::Message;

    fn sample_snapshot() -> RegistrySnapshot {
        let mut conversation = Conversation::new(
            ConversationId::from_counter(1),
            CustomerId::new("c1"),
            "es-MX",
        );
        conversation.push_message(Message::customer("Hola", "Hello"));

        let mut sessions = HashMap::new();
        sessions.insert(CustomerId::new("c1"), ConversationId::from_counter(1));

        RegistrySnapshot::capture(vec![conversation], sessions, 2)
    }

    // ---- Load ----

    #[test]
    fn test_load_missing_file_yields_empty_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::in_dir(dir.path());

        let snapshot = store.load().expect("load");
        assert!(snapshot.conversations.is_empty());
        assert!(snapshot.customer_sessions.is_empty());
        assert_eq!(snapshot.conversation_id_counter, 1);
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::in_dir(dir.path());
        std::fs::write(store.path(), "{ not json").expect("write");

        let err = store.load().expect_err("corrupt file");
        assert!(matches!(err, ParleyError::Persistence(_)));
    }

    // ---- Save ----

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("nested").join("conversations.json"));

        store.save(&RegistrySnapshot::empty()).expect("save");
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_overwrites_previous_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::in_dir(dir.path());

        store.save(&RegistrySnapshot::empty()).expect("first save");
        store.save(&sample_snapshot()).expect("second save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.conversations.len(), 1);
        assert_eq!(loaded.conversation_id_counter, 2);
    }

    // ---- Round-trip ----

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::in_dir(dir.path());
        let snapshot = sample_snapshot();

        store.save(&snapshot).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded.conversations, snapshot.conversations);
        assert_eq!(loaded.customer_sessions, snapshot.customer_sessions);
        assert_eq!(loaded.conversation_id_counter, snapshot.conversation_id_counter);
        assert_eq!(loaded.saved_at, snapshot.saved_at);
    }

    #[test]
    fn test_timestamps_roundtrip_as_iso8601() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::in_dir(dir.path());
        let snapshot = sample_snapshot();

        store.save(&snapshot).expect("save");

        let raw = std::fs::read_to_string(store.path()).expect("read raw");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        let created_at = value["conversations"][0]["createdAt"]
            .as_str()
            .expect("string timestamp");
        let parsed: DateTime<Utc> = created_at.parse().expect("ISO-8601");
        assert_eq!(parsed, snapshot.conversations[0].created_at);
    }

    #[test]
    fn test_snapshot_file_format_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::in_dir(dir.path());
        store.save(&sample_snapshot()).expect("save");

        let raw = std::fs::read_to_string(store.path()).expect("read raw");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert!(value.get("conversations").is_some());
        assert!(value.get("customerSessions").is_some());
        assert!(value.get("conversationIdCounter").is_some());
        assert!(value.get("savedAt").is_some());
        assert_eq!(value["customerSessions"]["c1"], "conv_1");
    }

    // ---- Snapshot construction ----

    #[test]
    fn test_capture_orders_conversations_by_creation() {
        let older = Conversation::new(
            ConversationId::from_counter(2),
            CustomerId::new("c2"),
            "en-US",
        );
        std::thread::sleep(std::time::Duration::from_millis(2));
        let newer = Conversation::new(
            ConversationId::from_counter(1),
            CustomerId::new("c1"),
            "es-MX",
        );

        let snapshot = RegistrySnapshot::capture(vec![newer, older], HashMap::new(), 3);
        assert_eq!(snapshot.conversations[0].id.as_str(), "conv_2");
        assert_eq!(snapshot.conversations[1].id.as_str(), "conv_1");
    }

    #[test]
    fn test_empty_snapshot_counter_starts_at_one() {
        assert_eq!(RegistrySnapshot::empty().conversation_id_counter, 1);
    }
}
