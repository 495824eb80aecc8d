//! Property ("finca") operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Property;

const SELECT_COLUMNS: &str =
    "id, name, description, location, price_base, price_low_season, capacity, images";

/// Insert a property.
pub async fn insert_property(pool: &SqlitePool, property: &Property) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO properties
            (id, name, description, location, price_base, price_low_season, capacity, images)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&property.id)
    .bind(&property.name)
    .bind(&property.description)
    .bind(&property.location)
    .bind(property.price_base)
    .bind(property.price_low_season)
    .bind(property.capacity)
    .bind(&property.images)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Property",
                    id: property.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a property by id.
pub async fn get_property(pool: &SqlitePool, id: &str) -> Result<Property> {
    sqlx::query_as::<_, Property>(&format!(
        "SELECT {SELECT_COLUMNS} FROM properties WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Property",
        id: id.to_string(),
    })
}

/// Find properties whose name contains the given term, case-insensitively.
pub async fn search_by_name(pool: &SqlitePool, term: &str) -> Result<Vec<Property>> {
    let properties = sqlx::query_as::<_, Property>(&format!(
        "SELECT {SELECT_COLUMNS} FROM properties
         WHERE name LIKE '%' || ? || '%'
         ORDER BY name"
    ))
    .bind(term)
    .fetch_all(pool)
    .await?;

    Ok(properties)
}

/// Find properties in a location with no confirmed booking overlapping the
/// half-open `[entry, exit)` range.
pub async fn available_in_location(
    pool: &SqlitePool,
    location: &str,
    entry_date: &str,
    exit_date: &str,
) -> Result<Vec<Property>> {
    let properties = sqlx::query_as::<_, Property>(&format!(
        "SELECT {SELECT_COLUMNS} FROM properties p
         WHERE p.location LIKE '%' || ? || '%'
           AND NOT EXISTS (
               SELECT 1 FROM bookings b
               WHERE b.property_id = p.id
                 AND b.status = 'confirmed'
                 AND b.entry_date < ?
                 AND b.exit_date > ?
           )
         ORDER BY p.name"
    ))
    .bind(location)
    .bind(exit_date)
    .bind(entry_date)
    .fetch_all(pool)
    .await?;

    Ok(properties)
}
