//! Catalog resolution and remote catalog synchronization.
//!
//! Maps listings to the external product ids needed to present them through
//! the channel's catalog feature, and keeps the remote catalog consistent
//! with local listing data:
//!
//! - [`resolver`] - deterministic catalog choice and product-id mapping
//! - [`CatalogSync`] - link/unlink/replace with scheduled remote sync
//! - [`SyncQueue`] - fire-and-forget background worker for remote pushes

pub mod error;
pub mod jobs;
pub mod resolver;
pub mod sync;

pub use error::CatalogError;
pub use jobs::{SyncJob, SyncQueue};
pub use resolver::{default_catalog, product_ids_for_listings, resolve_for_location};
pub use sync::{build_item, bulk_resync, CatalogSync, ResyncReport};
