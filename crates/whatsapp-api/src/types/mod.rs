//! Wire types for the channel and catalog APIs.

pub mod catalog;
pub mod send;
pub mod webhook;

pub use catalog::CatalogItem;
pub use send::{
    CatalogCardParams, InteractivePayload, SendResponse, SendTextParams, TextPayload,
};
pub use webhook::{InboundEvent, InboundMessage, MessageContent, OutboundEvent, WebhookEvent};
