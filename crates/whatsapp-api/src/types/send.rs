//! Types for sending messages through the channel API.

use serde::{Deserialize, Serialize};

/// Parameters for sending a text message.
#[derive(Debug, Clone, Default)]
pub struct SendTextParams {
    /// Destination phone number.
    pub to: String,
    /// Message body.
    pub body: String,
    /// Message id (wamid) to thread the reply under.
    pub reply_to: Option<String>,
    /// Direct-send variant: no reply threading, no link preview. Used for
    /// system-initiated sends rather than replies.
    pub direct: bool,
}

impl SendTextParams {
    /// Create params for a text message.
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    /// Thread the message under a previous message id.
    pub fn with_reply_to(mut self, wamid: impl Into<String>) -> Self {
        self.reply_to = Some(wamid.into());
        self
    }

    /// Select the direct-send variant.
    pub fn direct(mut self) -> Self {
        self.direct = true;
        self
    }
}

/// Parameters for sending an interactive catalog card.
#[derive(Debug, Clone, Default)]
pub struct CatalogCardParams {
    /// Destination phone number.
    pub to: String,
    /// External product ids to present.
    pub product_ids: Vec<String>,
    /// Body text shown with the card.
    pub body: String,
    /// External catalog id the products belong to.
    pub catalog_id: String,
    /// Message id (wamid) to thread the card under.
    pub reply_to: Option<String>,
}

impl CatalogCardParams {
    /// Create params for a catalog card.
    pub fn new(
        to: impl Into<String>,
        catalog_id: impl Into<String>,
        product_ids: Vec<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            product_ids,
            body: body.into(),
            catalog_id: catalog_id.into(),
            reply_to: None,
        }
    }

    /// Thread the card under a previous message id.
    pub fn with_reply_to(mut self, wamid: impl Into<String>) -> Self {
        self.reply_to = Some(wamid.into());
        self
    }
}

/// Wire body for a text message send.
#[derive(Debug, Clone, Serialize)]
pub struct TextPayload {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
}

/// Text body of a message.
#[derive(Debug, Clone, Serialize)]
pub struct TextBody {
    pub body: String,
    pub preview_url: bool,
}

/// Reply-threading context.
#[derive(Debug, Clone, Serialize)]
pub struct MessageContext {
    pub message_id: String,
}

impl TextPayload {
    /// Build the wire body from send params.
    pub fn from_params(params: &SendTextParams) -> Self {
        let context = if params.direct {
            None
        } else {
            params
                .reply_to
                .as_ref()
                .map(|id| MessageContext { message_id: id.clone() })
        };

        Self {
            messaging_product: "whatsapp",
            to: params.to.clone(),
            kind: "text",
            text: TextBody {
                body: params.body.clone(),
                preview_url: !params.direct,
            },
            context,
        }
    }
}

/// Wire body for an interactive message send.
#[derive(Debug, Clone, Serialize)]
pub struct InteractivePayload {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub interactive: Interactive,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
}

/// The interactive portion of a catalog card.
#[derive(Debug, Clone, Serialize)]
pub struct Interactive {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub body: InteractiveBody,
    pub action: InteractiveAction,
}

/// Body text of an interactive message.
#[derive(Debug, Clone, Serialize)]
pub struct InteractiveBody {
    pub text: String,
}

/// Action of an interactive message: one product, or a single-section list.
#[derive(Debug, Clone, Serialize)]
pub struct InteractiveAction {
    pub catalog_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_retailer_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<ProductSection>,
}

/// A titled group of products in a product list.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSection {
    pub title: String,
    pub product_items: Vec<ProductItem>,
}

/// A single product reference in a section.
#[derive(Debug, Clone, Serialize)]
pub struct ProductItem {
    pub product_retailer_id: String,
}

impl InteractivePayload {
    /// Build the wire body from card params.
    ///
    /// Exactly one product id produces a `product` message; more produce a
    /// `product_list` message with one section.
    pub fn from_params(params: &CatalogCardParams, section_title: &str) -> Self {
        let interactive = if params.product_ids.len() == 1 {
            Interactive {
                kind: "product",
                body: InteractiveBody { text: params.body.clone() },
                action: InteractiveAction {
                    catalog_id: params.catalog_id.clone(),
                    product_retailer_id: Some(params.product_ids[0].clone()),
                    sections: Vec::new(),
                },
            }
        } else {
            Interactive {
                kind: "product_list",
                body: InteractiveBody { text: params.body.clone() },
                action: InteractiveAction {
                    catalog_id: params.catalog_id.clone(),
                    product_retailer_id: None,
                    sections: vec![ProductSection {
                        title: section_title.to_string(),
                        product_items: params
                            .product_ids
                            .iter()
                            .map(|id| ProductItem { product_retailer_id: id.clone() })
                            .collect(),
                    }],
                },
            }
        };

        Self {
            messaging_product: "whatsapp",
            to: params.to.clone(),
            kind: "interactive",
            interactive,
            context: params
                .reply_to
                .as_ref()
                .map(|id| MessageContext { message_id: id.clone() }),
        }
    }
}

/// Response from a message send.
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessageId>,
}

/// Id of a sent message.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessageId {
    pub id: String,
}

impl SendResponse {
    /// The id of the sent message, if the provider returned one.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}
