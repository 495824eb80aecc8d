//! Message operations. Messages are append-only.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Message, SenderRole};

/// Append a message and bump the conversation's `last_message_at`, in one
/// transaction.
pub async fn append_message(
    pool: &SqlitePool,
    conversation_id: i64,
    sender: SenderRole,
    content: &str,
) -> Result<Message> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO messages (conversation_id, sender, content)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(conversation_id)
    .bind(sender)
    .bind(content)
    .execute(&mut *tx)
    .await?;

    let message_id = result.last_insert_rowid();

    sqlx::query("UPDATE conversations SET last_message_at = datetime('now') WHERE id = ?")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_message(pool, message_id).await
}

/// Get a message by id.
pub async fn get_message(pool: &SqlitePool, id: i64) -> Result<Message> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, sender, content, created_at
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Message",
        id: id.to_string(),
    })
}

/// The most recent `limit` messages of a conversation, oldest first.
pub async fn recent_messages(
    pool: &SqlitePool,
    conversation_id: i64,
    limit: i64,
) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, sender, content, created_at
        FROM (
            SELECT id, conversation_id, sender, content, created_at
            FROM messages
            WHERE conversation_id = ?
            ORDER BY id DESC
            LIMIT ?
        )
        ORDER BY id ASC
        "#,
    )
    .bind(conversation_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Count messages in a conversation.
pub async fn count_messages(pool: &SqlitePool, conversation_id: i64) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}
