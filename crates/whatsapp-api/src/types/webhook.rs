//! Webhook payload types delivered by the channel provider.

use serde::{Deserialize, Serialize};

/// A webhook event, discriminated by its `type` field.
///
/// Unrecognized event types deserialize as [`WebhookEvent::Unknown`] so the
/// endpoint can acknowledge them without failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEvent {
    /// A customer sent a message to the business.
    #[serde(rename = "message.received")]
    MessageReceived(InboundEvent),

    /// The business sent a message through the channel (possibly from a
    /// human agent using the provider's own tooling).
    #[serde(rename = "message.sent")]
    MessageSent(OutboundEvent),

    /// Any other event type.
    #[serde(other)]
    Unknown,
}

impl WebhookEvent {
    /// The event id used for idempotency, when the event carries one.
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::MessageReceived(e) => Some(&e.id),
            Self::MessageSent(e) => Some(&e.id),
            Self::Unknown => None,
        }
    }
}

/// An inbound customer message event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Unique event id.
    pub id: String,

    /// Sender phone number.
    pub from: String,

    /// Display name of the sender, if the provider shares it.
    #[serde(default)]
    pub contact_name: Option<String>,

    /// The message itself.
    pub message: InboundMessage,
}

/// An outbound business message event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEvent {
    /// Unique event id.
    pub id: String,

    /// Destination phone number.
    pub to: String,
}

/// The message carried by an inbound event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// WhatsApp message id (wamid), used for reply threading.
    #[serde(default)]
    pub id: Option<String>,

    /// The typed message content.
    #[serde(flatten)]
    pub content: MessageContent,
}

/// Message content, discriminated by its `kind` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MessageContent {
    /// Plain text.
    Text {
        #[serde(default)]
        body: String,
    },

    /// An image, with an optional caption.
    Image {
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        media_id: Option<String>,
    },

    /// A voice note or audio file.
    Audio {
        #[serde(default)]
        media_id: Option<String>,
    },

    /// A video, with an optional caption.
    Video {
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        media_id: Option<String>,
    },

    /// A document attachment.
    Document {
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        media_id: Option<String>,
    },
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl MessageContent {
    /// Derive the text shown in the conversation transcript.
    ///
    /// Text messages use their body, media messages their caption, and
    /// captionless media a fixed placeholder. Returns `None` when there is
    /// neither text nor a media reference; such events are dropped.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Self::Text { body } => non_empty(body),
            Self::Image { caption, media_id } => caption
                .as_deref()
                .and_then(non_empty)
                .or_else(|| media_id.as_ref().map(|_| "[Imagen]".to_string())),
            Self::Audio { media_id } => media_id.as_ref().map(|_| "[Audio]".to_string()),
            Self::Video { caption, media_id } => caption
                .as_deref()
                .and_then(non_empty)
                .or_else(|| media_id.as_ref().map(|_| "[Video]".to_string())),
            Self::Document {
                caption,
                filename,
                media_id,
            } => caption
                .as_deref()
                .and_then(non_empty)
                .or_else(|| filename.as_deref().and_then(non_empty))
                .or_else(|| media_id.as_ref().map(|_| "[Documento]".to_string())),
        }
    }

    /// The media reference, for kinds that carry one.
    pub fn media_id(&self) -> Option<&str> {
        match self {
            Self::Text { .. } => None,
            Self::Image { media_id, .. }
            | Self::Audio { media_id }
            | Self::Video { media_id, .. }
            | Self::Document { media_id, .. } => media_id.as_deref(),
        }
    }

    /// Short kind name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Audio { .. } => "audio",
            Self::Video { .. } => "video",
            Self::Document { .. } => "document",
        }
    }
}
