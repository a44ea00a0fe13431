//! Conversation registry and persistence for Parley.
//!
//! This crate provides:
//!
//! - **Conversation Store**: the id-to-record map with inbox-ordered listing
//! - **Session Index**: customer-to-current-conversation bindings
//! - **Registry**: the aggregate of both plus the monotonic id counter
//! - **Snapshot Store**: the JSON-file persistence gateway

pub mod registry;
pub mod session;
pub mod snapshot;
pub mod store;

pub use registry::Registry;
pub use session::SessionIndex;
pub use snapshot::{RegistrySnapshot, SnapshotStore, SNAPSHOT_FILE_NAME};
pub use store::ConversationStore;
