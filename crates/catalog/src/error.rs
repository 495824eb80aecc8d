//! Error types for catalog operations.

use thiserror::Error;

/// Errors that can occur during catalog resolution or sync.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// The remote catalog API call failed.
    #[error("catalog API error: {0}")]
    Api(#[from] whatsapp_api::WhatsAppError),

    /// No catalogs exist; nothing can be presented.
    #[error("no catalogs configured")]
    NoCatalogs,
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
