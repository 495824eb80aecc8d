//! Knowledge snippet operations.
//!
//! Keyword fallback for reply context; semantic retrieval lives behind an
//! external collaborator.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::KnowledgeChunk;

/// Insert a knowledge snippet.
pub async fn insert_chunk(pool: &SqlitePool, document: &str, content: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO knowledge_chunks (document, content) VALUES (?, ?)")
        .bind(document)
        .bind(content)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find snippets whose content matches any word of the query, capped at
/// `limit`. Words shorter than 4 characters are skipped to avoid matching
/// articles and fillers.
pub async fn search_chunks(
    pool: &SqlitePool,
    query: &str,
    limit: usize,
) -> Result<Vec<KnowledgeChunk>> {
    let mut found: Vec<KnowledgeChunk> = Vec::new();

    for word in query.split_whitespace().filter(|w| w.chars().count() >= 4) {
        if found.len() >= limit {
            break;
        }

        let chunks = sqlx::query_as::<_, KnowledgeChunk>(
            r#"
            SELECT id, document, content
            FROM knowledge_chunks
            WHERE content LIKE '%' || ? || '%'
            ORDER BY id
            LIMIT ?
            "#,
        )
        .bind(word)
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

        for chunk in chunks {
            if found.len() >= limit {
                break;
            }
            if !found.iter().any(|c| c.id == chunk.id) {
                found.push(chunk);
            }
        }
    }

    Ok(found)
}
