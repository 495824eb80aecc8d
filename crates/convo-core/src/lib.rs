//! Core types and traits for the conversation engine.
//!
//! This crate provides the shared interface between the orchestration
//! engine and its collaborators:
//!
//! - [`ReplyGenerator`] - the text-generation seam
//! - [`ListingSearch`] / [`KnowledgeSearch`] - the retrieval seams
//! - [`IntentParser`] - free text to structured intent, regex-backed
//! - [`build_system_prompt`] - reply context assembly

pub mod error;
pub mod generator;
pub mod intent;
pub mod prompt;
pub mod search;
pub mod types;

pub use error::{GeneratorError, SearchError};
pub use generator::{FixedReplyGenerator, ReplyGenerator};
pub use intent::{
    parse_location_and_dates, parse_single_listing_request, IntentParser, PatternIntentParser,
    StayQuery,
};
pub use prompt::{build_system_prompt, PromptContext};
pub use search::{KnowledgeSearch, ListingSearch};
pub use types::{ChatRole, ChatTurn, ListingSummary};

// Re-export async_trait for implementors.
pub use async_trait::async_trait;
