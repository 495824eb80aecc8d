//! Contact operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Contact;

/// Create the contact on first sight, refreshing the display name when the
/// webhook carries one. Never deletes.
pub async fn upsert_contact(pool: &SqlitePool, phone: &str, name: Option<&str>) -> Result<Contact> {
    sqlx::query(
        r#"
        INSERT INTO contacts (phone, name)
        VALUES (?, ?)
        ON CONFLICT(phone) DO UPDATE SET
            name = CASE WHEN excluded.name != '' THEN excluded.name ELSE contacts.name END
        "#,
    )
    .bind(phone)
    .bind(name.unwrap_or(""))
    .execute(pool)
    .await?;

    get_contact(pool, phone).await
}

/// Get a contact by phone number.
pub async fn get_contact(pool: &SqlitePool, phone: &str) -> Result<Contact> {
    sqlx::query_as::<_, Contact>(
        r#"
        SELECT phone, name, created_at
        FROM contacts
        WHERE phone = ?
        "#,
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Contact",
        id: phone.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_upsert_creates_and_updates_name() {
        let db = test_db().await;

        let contact = upsert_contact(db.pool(), "+57300", None).await.unwrap();
        assert_eq!(contact.name, "");

        let contact = upsert_contact(db.pool(), "+57300", Some("Juan")).await.unwrap();
        assert_eq!(contact.name, "Juan");

        // A later event without a name keeps the stored one.
        let contact = upsert_contact(db.pool(), "+57300", None).await.unwrap();
        assert_eq!(contact.name, "Juan");
    }

    #[tokio::test]
    async fn test_get_missing_contact() {
        let db = test_db().await;
        let result = get_contact(db.pool(), "+000").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
