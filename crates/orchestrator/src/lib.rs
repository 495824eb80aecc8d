//! Conversation engine for the rental WhatsApp backend.
//!
//! This crate ties the webhook event stream to conversation bookkeeping and
//! automated replies:
//!
//! - [`Engine`] - dedup, contact/conversation bookkeeping, the state-gated
//!   reply pipeline, and catalog card dispatch
//! - [`conversation`] - the state machine surface (welcome seeding plus the
//!   status transitions)
//! - [`MessageSender`] - the outbound transport seam, with WhatsApp and
//!   test implementations
//! - [`SqlListingSearch`] / [`SqlKnowledgeSearch`] - default collaborator
//!   implementations over the local store

pub mod conversation;
pub mod engine;
pub mod error;
pub mod search;
pub mod sender;

pub use conversation::{ensure_conversation, WELCOME_TEXT};
pub use engine::{Engine, EngineConfig, Outcome};
pub use error::EngineError;
pub use search::{SqlKnowledgeSearch, SqlListingSearch};
pub use sender::{MessageSender, NoOpSender, RecordingSender, SentItem, WhatsAppSender};
