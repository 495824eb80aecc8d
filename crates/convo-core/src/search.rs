//! Search collaborator traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::SearchError;
use crate::types::ListingSummary;

/// Trait for the listing search/availability collaborator.
#[async_trait]
pub trait ListingSearch: Send + Sync {
    /// Find listings whose name matches the free-text query.
    async fn search_by_name(&self, query: &str) -> Result<Vec<ListingSummary>, SearchError>;

    /// Find listings in a location free for the half-open `[entry, exit)`
    /// range.
    async fn search_available(
        &self,
        location: &str,
        entry: NaiveDate,
        exit: NaiveDate,
    ) -> Result<Vec<ListingSummary>, SearchError>;
}

/// Trait for the knowledge snippet collaborator.
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// Retrieve up to `limit` snippets relevant to the query.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError>;
}
