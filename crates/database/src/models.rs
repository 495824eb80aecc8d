//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A WhatsApp contact, identified by phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    /// Phone number (e.g., "+573001112233").
    pub phone: String,
    /// Display name, empty when the provider never shared one.
    pub name: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Lifecycle status of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Automation replies.
    Ai,
    /// A human agent has taken over; automation stays silent.
    Human,
    /// Closed. Terminal until reactivated by a new inbound message.
    Resolved,
}

impl ConversationStatus {
    /// Stable string form, matching the stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Human => "human",
            Self::Resolved => "resolved",
        }
    }

    /// Whether the conversation counts as active (ai or human).
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

/// A conversation with a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// Auto-incrementing id.
    pub id: i64,
    /// Owning contact's phone number.
    pub contact_phone: String,
    /// Current status.
    pub status: ConversationStatus,
    /// Creation timestamp.
    pub created_at: String,
    /// Timestamp of the latest message.
    pub last_message_at: String,
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SenderRole {
    /// The customer.
    User,
    /// The bot (or the canned welcome script).
    Assistant,
}

/// A message in a conversation. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Auto-incrementing id.
    pub id: i64,
    /// Owning conversation.
    pub conversation_id: i64,
    /// Author.
    pub sender: SenderRole,
    /// Text content (or a media placeholder).
    pub content: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A rental property ("finca").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Property {
    /// Stable external id.
    pub id: String,
    /// Display name (e.g., "Villa Green").
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Free-text location (e.g., "Restrepo, Valle").
    pub location: String,
    /// Base nightly price in COP.
    pub price_base: i64,
    /// Low-season price in COP, when one exists.
    pub price_low_season: Option<i64>,
    /// Guest capacity.
    pub capacity: Option<i64>,
    /// JSON array of image URLs.
    pub images: String,
}

impl Property {
    /// Parse the stored image list. Malformed JSON yields an empty list.
    pub fn image_list(&self) -> Vec<String> {
        serde_json::from_str(&self.images).unwrap_or_default()
    }
}

/// A booking holding a property for a half-open `[entry, exit)` date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Auto-incrementing id.
    pub id: i64,
    /// Booked property.
    pub property_id: String,
    /// Check-in date (inclusive), ISO format.
    pub entry_date: String,
    /// Check-out date (exclusive), ISO format.
    pub exit_date: String,
    /// Booking status.
    pub status: String,
}

/// An externally-hosted WhatsApp product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WhatsAppCatalog {
    /// Auto-incrementing local id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// External catalog identifier.
    pub catalog_id: String,
    /// Fallback catalog when no location keyword matches.
    pub is_default: bool,
    /// Substring matched case-insensitively against location text.
    pub location_keyword: Option<String>,
    /// Resolution and display priority; lowest wins ties.
    pub order_index: i64,
}

/// A (property, catalog) link carrying the external product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PropertyCatalogLink {
    /// Linked property.
    pub property_id: String,
    /// Local catalog id.
    pub catalog_id: i64,
    /// External product/retailer identifier.
    pub product_id: String,
}

/// A searchable knowledge snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct KnowledgeChunk {
    /// Auto-incrementing id.
    pub id: i64,
    /// Source document name.
    pub document: String,
    /// Snippet text.
    pub content: String,
}
