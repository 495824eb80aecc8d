//! Fire-and-forget catalog sync jobs.
//!
//! Writes to the link store enqueue jobs here; a detached worker drains the
//! queue against the remote catalog API. Failures are logged and the job
//! abandoned; callers never await completion and must not assume ordering
//! relative to the request that triggered the job.

use database::SqlitePool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use whatsapp_api::{CatalogClient, CatalogItem};

use crate::sync::bulk_resync;

/// A unit of remote catalog work.
#[derive(Debug, Clone)]
pub enum SyncJob {
    /// Create an item in the external catalog.
    Create { catalog_id: String, item: CatalogItem },
    /// Update an existing item.
    Update { catalog_id: String, item: CatalogItem },
    /// Delete an item.
    Delete {
        catalog_id: String,
        retailer_id: String,
    },
    /// Re-push the full payload for each listing's catalogs.
    Resync { property_ids: Vec<String> },
}

/// Handle for enqueueing sync jobs.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    tx: mpsc::UnboundedSender<SyncJob>,
}

impl SyncQueue {
    /// Start a worker draining jobs against the given client and store.
    ///
    /// Returns the queue handle and the worker task handle.
    pub fn start(client: CatalogClient, pool: SqlitePool) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<SyncJob>();

        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                run_job(&client, &pool, job).await;
            }
            info!("Catalog sync queue closed");
        });

        (Self { tx }, worker)
    }

    /// Create a queue whose jobs are captured instead of executed. For
    /// tests asserting what gets scheduled.
    pub fn capturing() -> (Self, mpsc::UnboundedReceiver<SyncJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a job. A closed queue is logged, not an error: the local
    /// write already succeeded and a later resync reconciles.
    pub fn enqueue(&self, job: SyncJob) {
        if self.tx.send(job).is_err() {
            warn!("Catalog sync queue is closed; dropping job");
        }
    }
}

/// Execute one job, logging failures.
async fn run_job(client: &CatalogClient, pool: &SqlitePool, job: SyncJob) {
    match job {
        SyncJob::Create { catalog_id, item } => {
            if let Err(e) = client.create_item(&catalog_id, &item).await {
                error!(catalog = %catalog_id, retailer_id = %item.retailer_id,
                    "Catalog create failed: {}", e);
            }
        }
        SyncJob::Update { catalog_id, item } => {
            if let Err(e) = client.update_item(&catalog_id, &item).await {
                error!(catalog = %catalog_id, retailer_id = %item.retailer_id,
                    "Catalog update failed: {}", e);
            }
        }
        SyncJob::Delete {
            catalog_id,
            retailer_id,
        } => {
            if let Err(e) = client.delete_item(&catalog_id, &retailer_id).await {
                error!(catalog = %catalog_id, retailer_id = %retailer_id, "Catalog delete failed: {}", e);
            }
        }
        SyncJob::Resync { property_ids } => match bulk_resync(pool, client, &property_ids).await {
            Ok(report) => {
                info!(
                    attempted = report.attempted,
                    succeeded = report.succeeded,
                    "Catalog resync finished"
                );
            }
            Err(e) => error!("Catalog resync failed: {}", e),
        },
    }
}
