//! Deterministic catalog resolution and product-id mapping.

use database::models::WhatsAppCatalog;
use database::SqlitePool;
use tracing::debug;

use crate::error::{CatalogError, Result};

/// Resolve which catalog to present for a location phrase.
///
/// Catalogs are considered in ascending `order_index`. The first whose
/// `location_keyword` is a case-insensitive substring of the location wins;
/// otherwise the catalog flagged default; otherwise the lowest-order
/// catalog. Fails only when no catalogs exist.
pub async fn resolve_for_location(pool: &SqlitePool, location: &str) -> Result<WhatsAppCatalog> {
    let catalogs = database::catalog::list_catalogs(pool).await?;
    let needle = location.trim().to_lowercase();

    if let Some(matched) = catalogs.iter().find(|c| {
        c.location_keyword
            .as_deref()
            .map(|k| !k.is_empty() && needle.contains(&k.to_lowercase()))
            .unwrap_or(false)
    }) {
        debug!(catalog = %matched.name, location, "Resolved catalog by keyword");
        return Ok(matched.clone());
    }

    fallback(catalogs)
}

/// The catalog used when no location is known: the default-flagged one, or
/// the lowest-order catalog.
pub async fn default_catalog(pool: &SqlitePool) -> Result<WhatsAppCatalog> {
    let catalogs = database::catalog::list_catalogs(pool).await?;
    fallback(catalogs)
}

fn fallback(catalogs: Vec<WhatsAppCatalog>) -> Result<WhatsAppCatalog> {
    if let Some(default) = catalogs.iter().find(|c| c.is_default) {
        return Ok(default.clone());
    }
    // The list is already in ascending order.
    catalogs.into_iter().next().ok_or(CatalogError::NoCatalogs)
}

/// Map listing ids to their external product ids in the given catalog.
///
/// Listings without a link are silently omitted; the result can be smaller
/// than the request, and callers fall back to the default catalog when it
/// comes back empty for a non-empty request.
pub async fn product_ids_for_listings(
    pool: &SqlitePool,
    catalog: &WhatsAppCatalog,
    listing_ids: &[String],
) -> Result<Vec<String>> {
    let mut product_ids = Vec::new();

    for listing_id in listing_ids {
        if let Some(product_id) =
            database::catalog::product_id_for(pool, catalog.id, listing_id).await?
        {
            product_ids.push(product_id);
        }
    }

    Ok(product_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::catalog::{insert_catalog, upsert_link};
    use database::property::insert_property;
    use database::models::Property;
    use database::{Database, NewCatalog};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn catalog(name: &str, keyword: Option<&str>, is_default: bool, order: i64) -> NewCatalog {
        NewCatalog {
            name: name.to_string(),
            catalog_id: format!("ext-{}", name),
            is_default,
            location_keyword: keyword.map(|k| k.to_string()),
            order_index: order,
        }
    }

    #[tokio::test]
    async fn test_keyword_match_beats_default() {
        let db = test_db().await;
        insert_catalog(db.pool(), &catalog("tolima", Some("tolima"), false, 1))
            .await
            .unwrap();
        insert_catalog(db.pool(), &catalog("bogota", Some("bogota"), true, 0))
            .await
            .unwrap();

        let resolved = resolve_for_location(db.pool(), "Ibagué, Tolima").await.unwrap();
        assert_eq!(resolved.name, "tolima");
    }

    #[tokio::test]
    async fn test_no_keyword_match_falls_back_to_default() {
        let db = test_db().await;
        insert_catalog(db.pool(), &catalog("tolima", Some("tolima"), false, 1))
            .await
            .unwrap();
        insert_catalog(db.pool(), &catalog("bogota", Some("bogota"), true, 0))
            .await
            .unwrap();

        let resolved = resolve_for_location(db.pool(), "Girardot").await.unwrap();
        assert_eq!(resolved.name, "bogota");
    }

    #[tokio::test]
    async fn test_no_default_falls_back_to_lowest_order() {
        let db = test_db().await;
        insert_catalog(db.pool(), &catalog("segundo", None, false, 2)).await.unwrap();
        insert_catalog(db.pool(), &catalog("primero", None, false, 1)).await.unwrap();

        let resolved = resolve_for_location(db.pool(), "donde sea").await.unwrap();
        assert_eq!(resolved.name, "primero");

        let resolved = default_catalog(db.pool()).await.unwrap();
        assert_eq!(resolved.name, "primero");
    }

    #[tokio::test]
    async fn test_no_catalogs_fails() {
        let db = test_db().await;
        let result = resolve_for_location(db.pool(), "Girardot").await;
        assert!(matches!(result, Err(CatalogError::NoCatalogs)));
    }

    #[tokio::test]
    async fn test_keyword_ties_break_by_order() {
        let db = test_db().await;
        insert_catalog(db.pool(), &catalog("segundo", Some("valle"), false, 2))
            .await
            .unwrap();
        insert_catalog(db.pool(), &catalog("primero", Some("valle"), false, 1))
            .await
            .unwrap();

        let resolved = resolve_for_location(db.pool(), "Calima, Valle").await.unwrap();
        assert_eq!(resolved.name, "primero");
    }

    #[tokio::test]
    async fn test_unlinked_listings_are_omitted() {
        let db = test_db().await;
        let stored = insert_catalog(db.pool(), &catalog("main", None, true, 0)).await.unwrap();

        for id in ["p1", "p2"] {
            insert_property(
                db.pool(),
                &Property {
                    id: id.to_string(),
                    name: id.to_string(),
                    description: String::new(),
                    location: String::new(),
                    price_base: 100,
                    price_low_season: None,
                    capacity: None,
                    images: "[]".to_string(),
                },
            )
            .await
            .unwrap();
        }
        upsert_link(db.pool(), "p1", stored.id, "prod-1").await.unwrap();

        let ids = product_ids_for_listings(
            db.pool(),
            &stored,
            &["p1".to_string(), "p2".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(ids, vec!["prod-1".to_string()]);
    }
}
