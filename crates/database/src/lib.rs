//! SQLite persistence layer for the rental conversation backend.
//!
//! This crate provides async database operations for contacts,
//! conversations, messages, webhook idempotency, properties, catalogs, and
//! knowledge snippets using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{contact, conversation, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:fincas.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     contact::upsert_contact(db.pool(), "+573001112233", Some("Juan")).await?;
//!     let (conversation, created) =
//!         conversation::get_or_create(db.pool(), "+573001112233").await?;
//!     println!("conversation {} (new: {})", conversation.id, created);
//!
//!     Ok(())
//! }
//! ```

pub mod booking;
pub mod catalog;
pub mod contact;
pub mod conversation;
pub mod error;
pub mod knowledge;
pub mod message;
pub mod models;
pub mod processed_event;
pub mod property;

pub use catalog::{LinkChange, NewCatalog};
pub use error::{DatabaseError, Result};
pub use models::{
    Booking, Contact, Conversation, ConversationStatus, KnowledgeChunk, Message,
    Property, PropertyCatalogLink, SenderRole, WhatsAppCatalog,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

// Re-exported so dependents don't need their own sqlx pin for pool handles.
pub use sqlx::SqlitePool;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_migrate_in_memory() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        // Schema is in place: a contact round-trips.
        let contact = contact::upsert_contact(db.pool(), "+57300", Some("Ana"))
            .await
            .unwrap();
        assert_eq!(contact.phone, "+57300");
        assert_eq!(contact.name, "Ana");
    }
}
