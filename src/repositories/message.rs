//! MessageRepository - Repository per la gestione dei messaggi

use super::Create;
use crate::dtos::CreateMessageDTO;
use crate::entities::Message;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Error, PgPool};
use uuid::Uuid;

// MESSAGE REPO
pub struct MessageRepository {
    connection_pool: PgPool,
}

impl MessageRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    /// Get a page of messages for a conversation
    ///
    /// Supports both:
    /// - Loading recent messages (when `before` is None): the most recent `limit` messages
    /// - Loading older messages (when `before` is Some): `limit` messages before that date
    ///
    /// # Returns
    /// Messages ordered from oldest to newest, ready to be rendered
    pub async fn find_page(
        &self,
        conversation_id: &Uuid,
        before: Option<&DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, Error> {
        let mut messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, role, content, citations, created_at
            FROM messages
            WHERE conversation_id = $1
              AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(conversation_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    async fn create(&self, data: &CreateMessageDTO) -> Result<Message, Error> {
        // Inserimento e aggiornamento di updated_at nella stessa transazione
        let mut tx = self.connection_pool.begin().await?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, role, content, citations)
            VALUES ($1, $2, $3, $4)
            RETURNING id, conversation_id, role, content, citations, created_at
            "#,
        )
        .bind(data.conversation_id)
        .bind(data.role)
        .bind(&data.content)
        .bind(Json(&data.citations))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = now() WHERE id = $1")
            .bind(data.conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }
}
