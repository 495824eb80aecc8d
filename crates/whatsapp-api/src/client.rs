//! Channel API client for outbound messages.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ChannelConfig;
use crate::error::WhatsAppError;
use crate::types::send::{
    CatalogCardParams, InteractivePayload, SendResponse, SendTextParams, TextPayload,
};

/// Section title used for product-list cards.
const PRODUCT_SECTION_TITLE: &str = "Fincas disponibles";

/// Client for sending messages through the channel API.
#[derive(Clone)]
pub struct MessageClient {
    http: Client,
    config: ChannelConfig,
}

impl MessageClient {
    /// Create a client with the given configuration.
    pub fn new(config: ChannelConfig) -> Result<Self, WhatsAppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(WhatsAppError::Http)?;

        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`ChannelConfig::from_env`]. Missing credentials surface as
    /// errors from the send calls, not here.
    pub fn from_env() -> Result<Self, WhatsAppError> {
        Self::new(ChannelConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Send a free-text message.
    pub async fn send_text(&self, params: SendTextParams) -> Result<SendResponse, WhatsAppError> {
        let payload = TextPayload::from_params(&params);
        debug!(to = %params.to, direct = params.direct, "Sending text message");
        self.post_message(&payload).await
    }

    /// Send an interactive catalog card.
    ///
    /// Exactly one product id sends a `product` message; more send a
    /// `product_list` message grouped under one section. Requires a
    /// non-empty catalog id in addition to the channel credentials.
    pub async fn send_catalog_card(
        &self,
        params: CatalogCardParams,
    ) -> Result<SendResponse, WhatsAppError> {
        if params.catalog_id.is_empty() {
            return Err(WhatsAppError::Config("catalog id is empty".to_string()));
        }
        if params.product_ids.is_empty() {
            return Err(WhatsAppError::InvalidRequest(
                "no product ids to present".to_string(),
            ));
        }

        let payload = InteractivePayload::from_params(&params, PRODUCT_SECTION_TITLE);
        info!(
            to = %params.to,
            products = params.product_ids.len(),
            catalog = %params.catalog_id,
            "Sending catalog card"
        );
        self.post_message(&payload).await
    }

    /// POST a message body to the send endpoint.
    async fn post_message<P: Serialize>(&self, payload: &P) -> Result<SendResponse, WhatsAppError> {
        self.config.require_credentials()?;

        let response = self
            .http
            .post(self.config.messages_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()
            .await
            .map_err(WhatsAppError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await.map_err(WhatsAppError::Http)?)
    }
}

impl std::fmt::Debug for MessageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageClient")
            .field("api_url", &self.config.api_url)
            .field("phone_id", &self.config.phone_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_without_credentials_is_config_error() {
        let client = MessageClient::new(ChannelConfig::new("", "")).unwrap();
        let err = client
            .send_text(SendTextParams::new("+57300", "hola"))
            .await
            .unwrap_err();
        assert!(matches!(err, WhatsAppError::Config(_)));
    }

    #[tokio::test]
    async fn test_card_without_catalog_id_is_config_error() {
        let client = MessageClient::new(ChannelConfig::new("key", "phone")).unwrap();
        let err = client
            .send_catalog_card(CatalogCardParams::new(
                "+57300",
                "",
                vec!["prod-1".to_string()],
                "mira",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, WhatsAppError::Config(_)));
    }

    #[tokio::test]
    async fn test_card_without_products_is_invalid() {
        let client = MessageClient::new(ChannelConfig::new("key", "phone")).unwrap();
        let err = client
            .send_catalog_card(CatalogCardParams::new("+57300", "cat-1", Vec::new(), "mira"))
            .await
            .unwrap_err();
        assert!(matches!(err, WhatsAppError::InvalidRequest(_)));
    }
}
