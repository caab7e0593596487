//! LetterRepository - Repository per le lettere CRA analizzate

use super::{Create, Delete, ListOwned, ReadOwned};
use crate::dtos::CreateLetterDTO;
use crate::entities::CraLetter;
use sqlx::types::Json;
use sqlx::{Error, PgPool};
use uuid::Uuid;

const LETTER_COLUMNS: &str = "id, user_id, file_name, mime_type, storage_path, letter_type, \
     urgency, deadlines, amounts, summary, explanation, created_at";

pub struct LetterRepository {
    connection_pool: PgPool,
}

impl LetterRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<CraLetter, CreateLetterDTO> for LetterRepository {
    async fn create(&self, data: &CreateLetterDTO) -> Result<CraLetter, Error> {
        sqlx::query_as::<_, CraLetter>(&format!(
            r#"
            INSERT INTO cra_letters
                (id, user_id, file_name, mime_type, storage_path, letter_type,
                 urgency, deadlines, amounts, summary, explanation, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            LETTER_COLUMNS
        ))
        .bind(data.id)
        .bind(data.user_id)
        .bind(&data.file_name)
        .bind(&data.mime_type)
        .bind(&data.storage_path)
        .bind(data.letter_type)
        .bind(data.urgency)
        .bind(Json(&data.deadlines))
        .bind(Json(&data.amounts))
        .bind(&data.summary)
        .bind(&data.explanation)
        .bind(data.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl ReadOwned<CraLetter, Uuid> for LetterRepository {
    async fn read_owned(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<CraLetter>, Error> {
        sqlx::query_as::<_, CraLetter>(&format!(
            "SELECT {} FROM cra_letters WHERE id = $1 AND user_id = $2",
            LETTER_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl ListOwned<CraLetter> for LetterRepository {
    async fn list_by_user(&self, user_id: &Uuid) -> Result<Vec<CraLetter>, Error> {
        sqlx::query_as::<_, CraLetter>(&format!(
            "SELECT {} FROM cra_letters WHERE user_id = $1 ORDER BY created_at DESC",
            LETTER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Delete<Uuid> for LetterRepository {
    async fn delete(&self, id: &Uuid, user_id: &Uuid) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM cra_letters WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
