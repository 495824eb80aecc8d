//! Local link maintenance with scheduled remote synchronization.
//!
//! The local link store is authoritative; remote catalog state is eventually
//! consistent. Write operations here update the store synchronously and
//! enqueue the matching remote work on the [`SyncQueue`].

use database::models::Property;
use database::SqlitePool;
use tracing::{info, warn};
use whatsapp_api::{CatalogClient, CatalogItem};

use crate::error::Result;
use crate::jobs::{SyncJob, SyncQueue};

/// Format a COP price for the catalog API.
fn format_price(value: i64) -> String {
    format!("{} COP", value)
}

/// Build the full catalog payload for a property.
///
/// The sale price is included only for a genuine discount: a low-season
/// price that is strictly positive and strictly below the base price.
/// Otherwise the field is omitted entirely.
pub fn build_item(property: &Property, retailer_id: &str) -> CatalogItem {
    let sale_price = property
        .price_low_season
        .filter(|&low| low > 0 && low < property.price_base)
        .map(format_price);

    let mut images = property.image_list();
    let image_url = if images.is_empty() {
        None
    } else {
        Some(images.remove(0))
    };

    CatalogItem {
        retailer_id: retailer_id.to_string(),
        name: property.name.clone(),
        description: property.description.clone(),
        price: format_price(property.price_base),
        sale_price,
        image_url,
        additional_image_urls: images,
    }
}

/// Outcome of a bulk resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncReport {
    /// Number of (listing, catalog) pushes attempted.
    pub attempted: usize,
    /// Number that succeeded.
    pub succeeded: usize,
}

/// Link maintenance service.
#[derive(Debug, Clone)]
pub struct CatalogSync {
    pool: SqlitePool,
    queue: SyncQueue,
}

impl CatalogSync {
    /// Create the service over a store and a sync queue.
    pub fn new(pool: SqlitePool, queue: SyncQueue) -> Self {
        Self { pool, queue }
    }

    /// Create or update the (listing, catalog) link.
    ///
    /// Schedules a remote CREATE for a new link, UPDATE for a replaced one.
    /// The local write is the operation's outcome; remote failures surface
    /// only in the worker's logs.
    pub async fn link(&self, property_id: &str, catalog_id: i64, product_id: &str) -> Result<()> {
        let change =
            database::catalog::upsert_link(&self.pool, property_id, catalog_id, product_id)
                .await?;

        let catalog = database::catalog::get_catalog(&self.pool, catalog_id).await?;
        let property = database::property::get_property(&self.pool, property_id).await?;
        let item = build_item(&property, product_id);

        if change.inserted() {
            info!(property_id, catalog = %catalog.name, "Linked listing; scheduling create");
            self.queue.enqueue(SyncJob::Create {
                catalog_id: catalog.catalog_id,
                item,
            });
        } else {
            info!(property_id, catalog = %catalog.name, "Relinked listing; scheduling update");
            self.queue.enqueue(SyncJob::Update {
                catalog_id: catalog.catalog_id,
                item,
            });
        }

        Ok(())
    }

    /// Remove the (listing, catalog) link, scheduling a remote DELETE.
    /// No-op when the link does not exist.
    pub async fn unlink(&self, property_id: &str, catalog_id: i64) -> Result<()> {
        let Some(product_id) =
            database::catalog::delete_link(&self.pool, property_id, catalog_id).await?
        else {
            return Ok(());
        };

        let catalog = database::catalog::get_catalog(&self.pool, catalog_id).await?;
        info!(property_id, catalog = %catalog.name, "Unlinked listing; scheduling delete");
        self.queue.enqueue(SyncJob::Delete {
            catalog_id: catalog.catalog_id,
            retailer_id: product_id,
        });

        Ok(())
    }

    /// Replace the listing's full catalog set: deletes every existing link
    /// (scheduling remote DELETEs), then inserts the new entries
    /// (scheduling remote CREATEs).
    ///
    /// Not transactional across the remote calls; the local state reflects
    /// the target set regardless, and a later resync reconciles.
    pub async fn replace_all_links(
        &self,
        property_id: &str,
        entries: &[(i64, String)],
    ) -> Result<()> {
        let existing = database::catalog::links_for_property(&self.pool, property_id).await?;

        for link in existing {
            self.unlink(property_id, link.catalog_id).await?;
        }

        for (catalog_id, product_id) in entries {
            database::catalog::upsert_link(&self.pool, property_id, *catalog_id, product_id)
                .await?;

            let catalog = database::catalog::get_catalog(&self.pool, *catalog_id).await?;
            let property = database::property::get_property(&self.pool, property_id).await?;
            self.queue.enqueue(SyncJob::Create {
                catalog_id: catalog.catalog_id,
                item: build_item(&property, product_id),
            });
        }

        Ok(())
    }

    /// Enqueue a bulk resync for the given listings.
    pub fn schedule_resync(&self, property_ids: Vec<String>) {
        self.queue.enqueue(SyncJob::Resync { property_ids });
    }
}

/// Re-push the full current payload for every catalog each listing is
/// linked to, as UPDATEs.
///
/// Catalogs are attempted independently; one failure is logged and does not
/// stop the others. The report carries the success count.
pub async fn bulk_resync(
    pool: &SqlitePool,
    client: &CatalogClient,
    property_ids: &[String],
) -> Result<ResyncReport> {
    let mut attempted = 0;
    let mut succeeded = 0;

    for property_id in property_ids {
        let property = match database::property::get_property(pool, property_id).await {
            Ok(property) => property,
            Err(e) => {
                warn!(property_id, "Skipping resync for missing listing: {}", e);
                continue;
            }
        };

        for link in database::catalog::links_for_property(pool, property_id).await? {
            let catalog = database::catalog::get_catalog(pool, link.catalog_id).await?;
            let item = build_item(&property, &link.product_id);

            attempted += 1;
            match client.update_item(&catalog.catalog_id, &item).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    warn!(
                        property_id,
                        catalog = %catalog.name,
                        "Resync push failed: {}", e
                    );
                }
            }
        }
    }

    Ok(ResyncReport {
        attempted,
        succeeded,
    })
}
