//! Conversation state machine persistence.
//!
//! A contact has at most one active (ai or human) conversation, enforced by
//! a partial unique index. Status transitions are idempotent updates;
//! `get_or_create` reuses the active conversation, reactivates the most
//! recent resolved one, or creates a fresh record, in that order.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{is_unique_violation, DatabaseError, Result};
use crate::models::{Conversation, ConversationStatus};

const SELECT_COLUMNS: &str = "id, contact_phone, status, created_at, last_message_at";

/// Get a conversation by id.
pub async fn get_conversation(pool: &SqlitePool, id: i64) -> Result<Conversation> {
    sqlx::query_as::<_, Conversation>(&format!(
        "SELECT {SELECT_COLUMNS} FROM conversations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Conversation",
        id: id.to_string(),
    })
}

/// Find the contact's active (non-resolved) conversation, if any.
pub async fn find_active(pool: &SqlitePool, phone: &str) -> Result<Option<Conversation>> {
    let conversation = sqlx::query_as::<_, Conversation>(&format!(
        "SELECT {SELECT_COLUMNS} FROM conversations
         WHERE contact_phone = ? AND status != 'resolved'"
    ))
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    Ok(conversation)
}

/// Get the contact's conversation, reusing or creating as needed.
///
/// Returns the conversation and whether it was newly created. Only the
/// created path starts a fresh transcript; reactivation continues the old
/// one. Safe under concurrent calls for the same contact: the partial
/// unique index rejects a second active row and the loser re-reads.
pub async fn get_or_create(pool: &SqlitePool, phone: &str) -> Result<(Conversation, bool)> {
    if let Some(conversation) = find_active(pool, phone).await? {
        return Ok((conversation, false));
    }

    // Reactivate the most recent resolved conversation rather than piling
    // up records for the same contact.
    let reactivated = sqlx::query(
        r#"
        UPDATE conversations SET status = 'ai'
        WHERE id = (
            SELECT id FROM conversations
            WHERE contact_phone = ? AND status = 'resolved'
            ORDER BY last_message_at DESC, id DESC
            LIMIT 1
        )
        "#,
    )
    .bind(phone)
    .execute(pool)
    .await;

    match reactivated {
        Ok(result) if result.rows_affected() > 0 => {
            debug!(phone, "Reactivated resolved conversation");
            let conversation = find_active(pool, phone).await?.ok_or_else(|| {
                DatabaseError::NotFound {
                    entity: "Conversation",
                    id: phone.to_string(),
                }
            })?;
            return Ok((conversation, false));
        }
        Ok(_) => {}
        // Another caller activated a conversation first; use theirs.
        Err(e) if is_unique_violation(&e) => {
            if let Some(conversation) = find_active(pool, phone).await? {
                return Ok((conversation, false));
            }
            return Err(DatabaseError::Sqlx(e));
        }
        Err(e) => return Err(DatabaseError::Sqlx(e)),
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO conversations (contact_phone, status)
        VALUES (?, 'ai')
        "#,
    )
    .bind(phone)
    .execute(pool)
    .await;

    match inserted {
        Ok(result) => {
            let conversation = get_conversation(pool, result.last_insert_rowid()).await?;
            Ok((conversation, true))
        }
        Err(e) if is_unique_violation(&e) => {
            let conversation = find_active(pool, phone).await?.ok_or(DatabaseError::Sqlx(e))?;
            Ok((conversation, false))
        }
        Err(e) => Err(DatabaseError::Sqlx(e)),
    }
}

/// Escalate to a human agent. Idempotent; resolved conversations are left
/// untouched.
pub async fn escalate_to_human(pool: &SqlitePool, id: i64) -> Result<()> {
    get_conversation(pool, id).await?;

    sqlx::query("UPDATE conversations SET status = 'human' WHERE id = ? AND status != 'resolved'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Hand the conversation back to automation. Idempotent.
pub async fn return_to_ai(pool: &SqlitePool, id: i64) -> Result<()> {
    get_conversation(pool, id).await?;

    sqlx::query("UPDATE conversations SET status = 'ai' WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Close the conversation. Idempotent; terminal until a new inbound message
/// reactivates it through [`get_or_create`].
pub async fn resolve(pool: &SqlitePool, id: i64) -> Result<()> {
    get_conversation(pool, id).await?;

    sqlx::query("UPDATE conversations SET status = 'resolved' WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Mark the contact's active conversation as human-handled, because the
/// business sent a message through the channel directly.
///
/// Returns whether a conversation was affected. Resolved conversations are
/// not reactivated from this path.
pub async fn mark_human_on_outbound(pool: &SqlitePool, phone: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE conversations SET status = 'human'
         WHERE contact_phone = ? AND status != 'resolved'",
    )
    .bind(phone)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
