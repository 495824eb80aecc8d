//! Conversation state machine surface.
//!
//! Thin layer over the persistence operations: the only behavior added here
//! is seeding the welcome message when a conversation is genuinely new.
//! Reactivated conversations continue their old transcript and get no new
//! welcome.

use database::models::{Conversation, SenderRole};
use database::SqlitePool;
use tracing::info;

use crate::error::EngineError;

/// The canned welcome script, always the first message of a fresh
/// conversation.
pub const WELCOME_TEXT: &str = "¡Hola! 👋 Bienvenido a Fincas del Valle. Soy el asistente \
virtual y te ayudo a encontrar la finca perfecta para tu descanso. Cuéntame: ¿en qué zona te \
gustaría quedarte y para qué fechas? Si ya conoces una de nuestras fincas, dime su nombre y te \
envío la información.";

/// Get the contact's conversation, seeding the welcome message on the
/// brand-new path.
///
/// Returns the conversation and whether it was newly created.
pub async fn ensure_conversation(
    pool: &SqlitePool,
    phone: &str,
) -> Result<(Conversation, bool), EngineError> {
    let (conversation, created) = database::conversation::get_or_create(pool, phone).await?;

    if created {
        info!(phone, conversation_id = conversation.id, "Starting new conversation");
        database::message::append_message(
            pool,
            conversation.id,
            SenderRole::Assistant,
            WELCOME_TEXT,
        )
        .await?;
    }

    Ok((conversation, created))
}

// The remaining transitions are plain persistence operations; re-exported
// here so callers reach the whole state machine through one module.
pub use database::conversation::{
    escalate_to_human, mark_human_on_outbound, resolve, return_to_ai,
};

#[cfg(test)]
mod tests {
    use super::*;
    use database::contact::upsert_contact;
    use database::message::recent_messages;
    use database::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        upsert_contact(db.pool(), "+57300", None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_new_conversation_starts_with_welcome() {
        let db = test_db().await;

        let (conversation, created) = ensure_conversation(db.pool(), "+57300").await.unwrap();
        assert!(created);

        let messages = recent_messages(db.pool(), conversation.id, 10).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, SenderRole::Assistant);
        assert_eq!(messages[0].content, WELCOME_TEXT);
    }

    #[tokio::test]
    async fn test_reactivation_does_not_reseed_welcome() {
        let db = test_db().await;

        let (conversation, _) = ensure_conversation(db.pool(), "+57300").await.unwrap();
        resolve(db.pool(), conversation.id).await.unwrap();

        let (again, created) = ensure_conversation(db.pool(), "+57300").await.unwrap();
        assert!(!created);
        assert_eq!(again.id, conversation.id);

        let messages = recent_messages(db.pool(), conversation.id, 10).await.unwrap();
        let welcomes = messages.iter().filter(|m| m.content == WELCOME_TEXT).count();
        assert_eq!(welcomes, 1);
    }
}
