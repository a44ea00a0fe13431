//! Conversation lifecycle engine for Parley.
//!
//! Provides the state machine and business rules over the registry, the
//! notification fan-out, the translator and publisher capability seams, and
//! the `MessageRouter` operation surface consumed by transport layers.

pub mod error;
pub mod fanout;
pub mod lifecycle;
pub mod publish;
pub mod router;
pub mod translate;

pub use error::RoutingError;
pub use lifecycle::LifecycleEngine;
pub use publish::{BroadcastPublisher, NullPublisher, Publisher};
pub use router::{AgentReplyReceipt, CustomerMessageReceipt, MessageRouter};
pub use translate::{EchoTranslator, TranslateError, Translator};
