//! Configuration types for the WhatsApp clients.

use std::env;

use crate::error::WhatsAppError;

/// Default base URL for the channel API.
pub const DEFAULT_API_URL: &str = "https://graph.facebook.com/v19.0";

/// Configuration for sending messages through the channel API.
///
/// Credentials are validated when a send is attempted, not at construction,
/// so a gateway can boot without them and fail only the calls that need them.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Base URL of the channel API.
    pub api_url: String,
    /// API key used as a bearer token.
    pub api_key: String,
    /// Identifier of the business phone number messages are sent from.
    pub phone_id: String,
}

impl ChannelConfig {
    /// Create a new configuration.
    pub fn new(api_key: impl Into<String>, phone_id: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            phone_id: phone_id.into(),
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `WHATSAPP_API_URL` - base URL (default: the public graph endpoint)
    /// - `WHATSAPP_API_KEY` - bearer token
    /// - `WHATSAPP_PHONE_ID` - sending phone number id
    ///
    /// Missing credentials are left empty; sends will fail with a
    /// configuration error when attempted.
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("WHATSAPP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: env::var("WHATSAPP_API_KEY").unwrap_or_default(),
            phone_id: env::var("WHATSAPP_PHONE_ID").unwrap_or_default(),
        }
    }

    /// Get the message send endpoint URL.
    pub fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_url, self.phone_id)
    }

    /// Ensure both credentials are present.
    pub fn require_credentials(&self) -> Result<(), WhatsAppError> {
        if self.api_key.is_empty() {
            return Err(WhatsAppError::Config("WHATSAPP_API_KEY not set".to_string()));
        }
        if self.phone_id.is_empty() {
            return Err(WhatsAppError::Config("WHATSAPP_PHONE_ID not set".to_string()));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Configuration for the remote catalog item API.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API.
    pub api_url: String,
    /// Bearer access token.
    pub access_token: String,
}

impl CatalogConfig {
    /// Create a new configuration with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `CATALOG_API_URL` - base URL (default: the public graph endpoint)
    /// - `CATALOG_ACCESS_TOKEN` - bearer token
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("CATALOG_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            access_token: env::var("CATALOG_ACCESS_TOKEN").unwrap_or_default(),
        }
    }

    /// Get the item collection URL for a catalog.
    pub fn items_url(&self, catalog_id: &str) -> String {
        format!("{}/{}/products", self.api_url, catalog_id)
    }

    /// Get the URL for a single item in a catalog.
    pub fn item_url(&self, catalog_id: &str, retailer_id: &str) -> String {
        format!("{}/{}/products/{}", self.api_url, catalog_id, retailer_id)
    }

    /// Ensure the access token is present.
    pub fn require_token(&self) -> Result<(), WhatsAppError> {
        if self.access_token.is_empty() {
            return Err(WhatsAppError::Config(
                "CATALOG_ACCESS_TOKEN not set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let config = ChannelConfig {
            api_url: "https://api.example.com/v1".to_string(),
            api_key: "key".to_string(),
            phone_id: "12345".to_string(),
        };
        assert_eq!(config.messages_url(), "https://api.example.com/v1/12345/messages");
    }

    #[test]
    fn test_require_credentials_missing_key() {
        let config = ChannelConfig::new("", "12345");
        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("WHATSAPP_API_KEY"));
    }

    #[test]
    fn test_require_credentials_missing_phone() {
        let config = ChannelConfig::new("key", "");
        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("WHATSAPP_PHONE_ID"));
    }

    #[test]
    fn test_item_urls() {
        let config = CatalogConfig {
            api_url: "https://api.example.com/v1".to_string(),
            access_token: "tok".to_string(),
        };
        assert_eq!(config.items_url("cat1"), "https://api.example.com/v1/cat1/products");
        assert_eq!(
            config.item_url("cat1", "prod-9"),
            "https://api.example.com/v1/cat1/products/prod-9"
        );
    }
}
