//! SQL-backed implementations of the search collaborator traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use convo_core::{KnowledgeSearch, ListingSearch, ListingSummary, SearchError};
use database::models::Property;
use database::SqlitePool;

fn summary(property: Property) -> ListingSummary {
    ListingSummary {
        id: property.id,
        name: property.name,
        location: property.location,
        price_base: property.price_base,
        capacity: property.capacity,
        description: property.description,
    }
}

fn store_error(e: database::DatabaseError) -> SearchError {
    SearchError::Store(e.to_string())
}

/// Listing search over the local properties and bookings tables.
#[derive(Debug, Clone)]
pub struct SqlListingSearch {
    pool: SqlitePool,
}

impl SqlListingSearch {
    /// Create a search over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingSearch for SqlListingSearch {
    async fn search_by_name(&self, query: &str) -> Result<Vec<ListingSummary>, SearchError> {
        let properties = database::property::search_by_name(&self.pool, query)
            .await
            .map_err(store_error)?;

        Ok(properties.into_iter().map(summary).collect())
    }

    async fn search_available(
        &self,
        location: &str,
        entry: NaiveDate,
        exit: NaiveDate,
    ) -> Result<Vec<ListingSummary>, SearchError> {
        let properties = database::property::available_in_location(
            &self.pool,
            location,
            &entry.format("%Y-%m-%d").to_string(),
            &exit.format("%Y-%m-%d").to_string(),
        )
        .await
        .map_err(store_error)?;

        Ok(properties.into_iter().map(summary).collect())
    }
}

/// Keyword knowledge search over the local snippet table.
#[derive(Debug, Clone)]
pub struct SqlKnowledgeSearch {
    pool: SqlitePool,
}

impl SqlKnowledgeSearch {
    /// Create a search over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KnowledgeSearch for SqlKnowledgeSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        let chunks = database::knowledge::search_chunks(&self.pool, query, limit)
            .await
            .map_err(store_error)?;

        Ok(chunks.into_iter().map(|c| c.content).collect())
    }
}
