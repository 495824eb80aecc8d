//! Remote catalog item client.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::WhatsAppError;
use crate::types::catalog::CatalogItem;

/// Client for CREATE/UPDATE/DELETE operations against a remote catalog.
///
/// Items are pushed one per request. Callers running in background context
/// are expected to log and drop configuration errors rather than retry.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self, WhatsAppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(WhatsAppError::Http)?;

        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, WhatsAppError> {
        Self::new(CatalogConfig::from_env())
    }

    /// Whether an access token is configured.
    pub fn has_token(&self) -> bool {
        !self.config.access_token.is_empty()
    }

    /// Create an item in a catalog.
    pub async fn create_item(
        &self,
        catalog_id: &str,
        item: &CatalogItem,
    ) -> Result<(), WhatsAppError> {
        self.config.require_token()?;
        debug!(catalog = catalog_id, retailer_id = %item.retailer_id, "Creating catalog item");

        let response = self
            .http
            .post(self.config.items_url(catalog_id))
            .bearer_auth(&self.config.access_token)
            .json(item)
            .send()
            .await
            .map_err(WhatsAppError::Http)?;

        Self::check(response).await
    }

    /// Update an existing item in a catalog.
    pub async fn update_item(
        &self,
        catalog_id: &str,
        item: &CatalogItem,
    ) -> Result<(), WhatsAppError> {
        self.config.require_token()?;
        debug!(catalog = catalog_id, retailer_id = %item.retailer_id, "Updating catalog item");

        let response = self
            .http
            .post(self.config.item_url(catalog_id, &item.retailer_id))
            .bearer_auth(&self.config.access_token)
            .json(item)
            .send()
            .await
            .map_err(WhatsAppError::Http)?;

        Self::check(response).await
    }

    /// Delete an item from a catalog.
    pub async fn delete_item(
        &self,
        catalog_id: &str,
        retailer_id: &str,
    ) -> Result<(), WhatsAppError> {
        self.config.require_token()?;
        debug!(catalog = catalog_id, retailer_id, "Deleting catalog item");

        let response = self
            .http
            .delete(self.config.item_url(catalog_id, retailer_id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(WhatsAppError::Http)?;

        Self::check(response).await
    }

    /// Map a non-success response into an error with status and body.
    async fn check(response: reqwest::Response) -> Result<(), WhatsAppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("api_url", &self.config.api_url)
            .field("has_token", &self.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> CatalogItem {
        CatalogItem {
            retailer_id: "prod-1".to_string(),
            name: "Villa Green".to_string(),
            description: String::new(),
            price: "500000 COP".to_string(),
            sale_price: None,
            image_url: None,
            additional_image_urls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_token_is_config_error() {
        let client = CatalogClient::new(CatalogConfig::new("")).unwrap();
        assert!(!client.has_token());

        let err = client.create_item("cat-1", &item()).await.unwrap_err();
        assert!(matches!(err, WhatsAppError::Config(_)));

        let err = client.delete_item("cat-1", "prod-1").await.unwrap_err();
        assert!(matches!(err, WhatsAppError::Config(_)));
    }
}
