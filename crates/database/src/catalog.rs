//! Catalog and property-link operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{PropertyCatalogLink, WhatsAppCatalog};

const CATALOG_COLUMNS: &str =
    "id, name, catalog_id, is_default, location_keyword, order_index";

/// Fields for creating a catalog.
#[derive(Debug, Clone)]
pub struct NewCatalog {
    pub name: String,
    pub catalog_id: String,
    pub is_default: bool,
    pub location_keyword: Option<String>,
    pub order_index: i64,
}

/// Insert a catalog and return the stored row.
pub async fn insert_catalog(pool: &SqlitePool, new: &NewCatalog) -> Result<WhatsAppCatalog> {
    let result = sqlx::query(
        r#"
        INSERT INTO whatsapp_catalogs (name, catalog_id, is_default, location_keyword, order_index)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.name)
    .bind(&new.catalog_id)
    .bind(new.is_default)
    .bind(&new.location_keyword)
    .bind(new.order_index)
    .execute(pool)
    .await?;

    get_catalog(pool, result.last_insert_rowid()).await
}

/// Get a catalog by local id.
pub async fn get_catalog(pool: &SqlitePool, id: i64) -> Result<WhatsAppCatalog> {
    sqlx::query_as::<_, WhatsAppCatalog>(&format!(
        "SELECT {CATALOG_COLUMNS} FROM whatsapp_catalogs WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Catalog",
        id: id.to_string(),
    })
}

/// List all catalogs in resolution order (ascending `order_index`, then id).
pub async fn list_catalogs(pool: &SqlitePool) -> Result<Vec<WhatsAppCatalog>> {
    let catalogs = sqlx::query_as::<_, WhatsAppCatalog>(&format!(
        "SELECT {CATALOG_COLUMNS} FROM whatsapp_catalogs ORDER BY order_index, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(catalogs)
}

/// Result of a link upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChange {
    /// The product id the link carried before, if it existed.
    pub previous_product_id: Option<String>,
}

impl LinkChange {
    /// Whether the upsert inserted a new link (vs. replacing one).
    pub fn inserted(&self) -> bool {
        self.previous_product_id.is_none()
    }
}

/// Create or update the (property, catalog) link's product id.
pub async fn upsert_link(
    pool: &SqlitePool,
    property_id: &str,
    catalog_id: i64,
    product_id: &str,
) -> Result<LinkChange> {
    let mut tx = pool.begin().await?;

    let previous = sqlx::query_scalar::<_, String>(
        "SELECT product_id FROM property_catalog_links
         WHERE property_id = ? AND catalog_id = ?",
    )
    .bind(property_id)
    .bind(catalog_id)
    .fetch_optional(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO property_catalog_links (property_id, catalog_id, product_id)
        VALUES (?, ?, ?)
        ON CONFLICT(property_id, catalog_id) DO UPDATE SET product_id = excluded.product_id
        "#,
    )
    .bind(property_id)
    .bind(catalog_id)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(LinkChange {
        previous_product_id: previous,
    })
}

/// Delete a link, returning the product id it carried. `None` when no link
/// existed (advisory delete, not an error).
pub async fn delete_link(
    pool: &SqlitePool,
    property_id: &str,
    catalog_id: i64,
) -> Result<Option<String>> {
    let mut tx = pool.begin().await?;

    let previous = sqlx::query_scalar::<_, String>(
        "SELECT product_id FROM property_catalog_links
         WHERE property_id = ? AND catalog_id = ?",
    )
    .bind(property_id)
    .bind(catalog_id)
    .fetch_optional(&mut *tx)
    .await?;

    if previous.is_some() {
        sqlx::query(
            "DELETE FROM property_catalog_links WHERE property_id = ? AND catalog_id = ?",
        )
        .bind(property_id)
        .bind(catalog_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(previous)
}

/// All links for a property.
pub async fn links_for_property(
    pool: &SqlitePool,
    property_id: &str,
) -> Result<Vec<PropertyCatalogLink>> {
    let links = sqlx::query_as::<_, PropertyCatalogLink>(
        r#"
        SELECT property_id, catalog_id, product_id
        FROM property_catalog_links
        WHERE property_id = ?
        ORDER BY catalog_id
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;

    Ok(links)
}

/// The product id for a (property, catalog) pair, if linked.
pub async fn product_id_for(
    pool: &SqlitePool,
    catalog_id: i64,
    property_id: &str,
) -> Result<Option<String>> {
    let product_id = sqlx::query_scalar::<_, String>(
        "SELECT product_id FROM property_catalog_links
         WHERE catalog_id = ? AND property_id = ?",
    )
    .bind(catalog_id)
    .bind(property_id)
    .fetch_optional(pool)
    .await?;

    Ok(product_id)
}
