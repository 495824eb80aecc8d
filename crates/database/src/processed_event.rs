//! Idempotency ledger for webhook events.

use sqlx::SqlitePool;

use crate::error::Result;

/// Record an event id, returning whether this was its first delivery.
///
/// The insert-or-ignore is atomic per event id, so two concurrent
/// deliveries of the same event see exactly one `true`.
pub async fn try_record(pool: &SqlitePool, event_id: &str) -> Result<bool> {
    let result = sqlx::query("INSERT OR IGNORE INTO processed_events (event_id) VALUES (?)")
        .bind(event_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Check whether an event id has been recorded.
pub async fn is_recorded(pool: &SqlitePool, event_id: &str) -> Result<bool> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM processed_events WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(pool)
            .await?;

    Ok(count > 0)
}

/// Prune ledger entries received before the given cutoff timestamp
/// (`datetime('now')` format). Returns the number removed.
pub async fn prune_before(pool: &SqlitePool, cutoff: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM processed_events WHERE received_at < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
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
    async fn test_first_delivery_wins() {
        let db = test_db().await;

        assert!(try_record(db.pool(), "evt-1").await.unwrap());
        assert!(!try_record(db.pool(), "evt-1").await.unwrap());
        assert!(is_recorded(db.pool(), "evt-1").await.unwrap());
        assert!(!is_recorded(db.pool(), "evt-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_record_once() {
        // One pooled connection so every task hits the same in-memory
        // database.
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = db.pool().clone();
            handles.push(tokio::spawn(async move {
                try_record(&pool, "evt-dup").await.unwrap()
            }));
        }

        let mut firsts = 0;
        for handle in handles {
            if handle.await.unwrap() {
                firsts += 1;
            }
        }
        assert_eq!(firsts, 1);
    }

    #[tokio::test]
    async fn test_prune() {
        let db = test_db().await;
        try_record(db.pool(), "evt-old").await.unwrap();

        let removed = prune_before(db.pool(), "9999-01-01 00:00:00").await.unwrap();
        assert_eq!(removed, 1);
        assert!(!is_recorded(db.pool(), "evt-old").await.unwrap());
    }
}
