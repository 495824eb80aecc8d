//! Types for the remote catalog item API.

use serde::{Deserialize, Serialize};

/// A product payload pushed to a remote catalog.
///
/// `sale_price` is serialized only when present; a listing without a genuine
/// discount must omit the field entirely rather than send zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// External product id the catalog knows the listing by.
    pub retailer_id: String,

    /// Product title.
    pub name: String,

    /// Product description.
    pub description: String,

    /// Price with currency, e.g. "500000 COP".
    pub price: String,

    /// Discounted price, only when strictly below the base price.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub sale_price: Option<String>,

    /// Primary image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub image_url: Option<String>,

    /// Additional image URLs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub additional_image_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_price_omitted_when_none() {
        let item = CatalogItem {
            retailer_id: "prod-1".to_string(),
            name: "Villa Green".to_string(),
            description: "Finca con piscina".to_string(),
            price: "500000 COP".to_string(),
            sale_price: None,
            image_url: None,
            additional_image_urls: Vec::new(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("sale_price").is_none());
        assert!(json.get("image_url").is_none());
        assert!(json.get("additional_image_urls").is_none());
    }

    #[test]
    fn test_sale_price_present_when_set() {
        let item = CatalogItem {
            retailer_id: "prod-1".to_string(),
            name: "Villa Green".to_string(),
            description: String::new(),
            price: "500000 COP".to_string(),
            sale_price: Some("400000 COP".to_string()),
            image_url: Some("https://img.example.com/1.jpg".to_string()),
            additional_image_urls: vec!["https://img.example.com/2.jpg".to_string()],
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["sale_price"], "400000 COP");
        assert_eq!(json["additional_image_urls"].as_array().unwrap().len(), 1);
    }
}
