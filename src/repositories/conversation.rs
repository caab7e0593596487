//! ConversationRepository - Repository per la gestione delle conversazioni

use super::{Create, Delete, ListOwned, ReadOwned, Update};
use crate::dtos::{CreateConversationDTO, UpdateConversationDTO};
use crate::entities::Conversation;
use sqlx::{Error, PgPool};
use uuid::Uuid;

pub struct ConversationRepository {
    connection_pool: PgPool,
}

impl ConversationRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Conversation, CreateConversationDTO> for ConversationRepository {
    async fn create(&self, data: &CreateConversationDTO) -> Result<Conversation, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (user_id, title)
            VALUES ($1, $2)
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(&data.title)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl ReadOwned<Conversation, Uuid> for ConversationRepository {
    async fn read_owned(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl ListOwned<Conversation> for ConversationRepository {
    async fn list_by_user(&self, user_id: &Uuid) -> Result<Vec<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Update<Conversation, UpdateConversationDTO, Uuid> for ConversationRepository {
    async fn update(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        data: &UpdateConversationDTO,
    ) -> Result<Option<Conversation>, Error> {
        // Se non c'è niente da aggiornare, ritorna la conversazione corrente
        let Some(title) = &data.title else {
            return self.read_owned(id, user_id).await;
        };

        sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations
            SET title = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<Uuid> for ConversationRepository {
    async fn delete(&self, id: &Uuid, user_id: &Uuid) -> Result<bool, Error> {
        // ON DELETE CASCADE rimuove anche i messaggi
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
