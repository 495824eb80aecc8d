//! Error types for collaborator traits.

use thiserror::Error;

/// Errors from a reply generator.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The generation call failed or returned an unusable response.
    #[error("generation failed: {0}")]
    ProcessingFailed(String),
}

/// Errors from a search collaborator.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The backing store failed.
    #[error("search store error: {0}")]
    Store(String),

    /// An external search service failed.
    #[error("search failed: {0}")]
    External(String),
}
