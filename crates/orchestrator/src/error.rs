//! Error types for engine operations.

use thiserror::Error;

/// Errors that can occur while processing an event.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Catalog resolution or sync failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    /// The channel API call failed.
    #[error("channel error: {0}")]
    Channel(#[from] whatsapp_api::WhatsAppError),

    /// Reply generation failed.
    #[error("generator error: {0}")]
    Generator(#[from] convo_core::GeneratorError),

    /// A search collaborator failed.
    #[error("search error: {0}")]
    Search(#[from] convo_core::SearchError),
}
