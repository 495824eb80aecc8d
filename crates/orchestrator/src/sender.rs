//! Message sender trait and implementations.

use async_trait::async_trait;
use whatsapp_api::{CatalogCardParams, MessageClient, SendTextParams};

use crate::error::EngineError;

/// Trait for sending messages to a contact.
///
/// Abstracted to support different transports (WhatsApp, tests).
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message, returning the sent message id when known.
    ///
    /// `direct` selects the unthreaded variant used for system-initiated
    /// sends; otherwise `reply_to` threads the message under the inbound
    /// one.
    async fn send_text(
        &self,
        to: &str,
        body: &str,
        reply_to: Option<&str>,
        direct: bool,
    ) -> Result<Option<String>, EngineError>;

    /// Send an interactive catalog card for one or more products.
    async fn send_catalog_card(
        &self,
        to: &str,
        catalog_id: &str,
        product_ids: &[String],
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<(), EngineError>;
}

/// Production sender backed by the channel API client.
#[derive(Debug, Clone)]
pub struct WhatsAppSender {
    client: MessageClient,
}

impl WhatsAppSender {
    /// Create a sender over the given client.
    pub fn new(client: MessageClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    async fn send_text(
        &self,
        to: &str,
        body: &str,
        reply_to: Option<&str>,
        direct: bool,
    ) -> Result<Option<String>, EngineError> {
        let mut params = SendTextParams::new(to, body);
        if let Some(wamid) = reply_to {
            params = params.with_reply_to(wamid);
        }
        if direct {
            params = params.direct();
        }

        let response = self.client.send_text(params).await?;
        Ok(response.message_id().map(|id| id.to_string()))
    }

    async fn send_catalog_card(
        &self,
        to: &str,
        catalog_id: &str,
        product_ids: &[String],
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<(), EngineError> {
        let mut params = CatalogCardParams::new(to, catalog_id, product_ids.to_vec(), body);
        if let Some(wamid) = reply_to {
            params = params.with_reply_to(wamid);
        }

        self.client.send_catalog_card(params).await?;
        Ok(())
    }
}

/// A no-op sender for testing that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpSender;

#[async_trait]
impl MessageSender for NoOpSender {
    async fn send_text(
        &self,
        _to: &str,
        _body: &str,
        _reply_to: Option<&str>,
        _direct: bool,
    ) -> Result<Option<String>, EngineError> {
        Ok(None)
    }

    async fn send_catalog_card(
        &self,
        _to: &str,
        _catalog_id: &str,
        _product_ids: &[String],
        _body: &str,
        _reply_to: Option<&str>,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

/// What a [`RecordingSender`] captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentItem {
    /// A text message.
    Text {
        to: String,
        body: String,
        direct: bool,
    },
    /// A catalog card.
    Card {
        to: String,
        catalog_id: String,
        product_ids: Vec<String>,
        body: String,
    },
}

/// A sender that records everything for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: std::sync::Mutex<Vec<SentItem>>,
}

impl RecordingSender {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<SentItem> {
        self.sent.lock().expect("sender lock").clone()
    }
}

#[async_trait]
impl MessageSender for &RecordingSender {
    async fn send_text(
        &self,
        to: &str,
        body: &str,
        _reply_to: Option<&str>,
        direct: bool,
    ) -> Result<Option<String>, EngineError> {
        self.sent.lock().expect("sender lock").push(SentItem::Text {
            to: to.to_string(),
            body: body.to_string(),
            direct,
        });
        Ok(Some("wamid.sent".to_string()))
    }

    async fn send_catalog_card(
        &self,
        to: &str,
        catalog_id: &str,
        product_ids: &[String],
        body: &str,
        _reply_to: Option<&str>,
    ) -> Result<(), EngineError> {
        self.sent.lock().expect("sender lock").push(SentItem::Card {
            to: to.to_string(),
            catalog_id: catalog_id.to_string(),
            product_ids: product_ids.to_vec(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sender() {
        let sender = NoOpSender;
        sender.send_text("+57300", "hola", None, false).await.unwrap();
        sender
            .send_catalog_card("+57300", "cat-1", &["prod-1".to_string()], "mira", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_recording_sender_captures() {
        let recorder = RecordingSender::new();
        let sender = &recorder;
        sender.send_text("+57300", "hola", None, true).await.unwrap();

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            SentItem::Text {
                to: "+57300".to_string(),
                body: "hola".to_string(),
                direct: true,
            }
        );
    }
}
