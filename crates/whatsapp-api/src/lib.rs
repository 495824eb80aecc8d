//! WhatsApp channel and catalog API client library.
//!
//! This crate provides the HTTP surface the conversation engine talks
//! through:
//!
//! - Sending free-text messages and interactive catalog cards
//! - Pushing catalog item CREATE/UPDATE/DELETE operations
//! - Parsing webhook payloads into typed events
//!
//! # Example
//!
//! ```no_run
//! use whatsapp_api::{MessageClient, SendTextParams};
//!
//! # async fn example() -> Result<(), whatsapp_api::WhatsAppError> {
//! let client = MessageClient::from_env()?;
//! let result = client
//!     .send_text(SendTextParams::new("+573001112233", "¡Hola!"))
//!     .await?;
//! println!("Sent message: {:?}", result.message_id());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::CatalogClient;
pub use client::MessageClient;
pub use config::{CatalogConfig, ChannelConfig};
pub use error::WhatsAppError;
pub use types::*;
