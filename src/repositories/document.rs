//! DocumentRepository - Repository per i documenti fiscali analizzati

use super::{Create, Delete, ListOwned, ReadOwned};
use crate::dtos::CreateDocumentDTO;
use crate::entities::TaxDocument;
use sqlx::types::Json;
use sqlx::{Error, PgPool};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = "id, user_id, file_name, mime_type, storage_path, document_type, \
     tax_year, issuer, extracted_fields, summary, created_at";

pub struct DocumentRepository {
    connection_pool: PgPool,
}

impl DocumentRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<TaxDocument, CreateDocumentDTO> for DocumentRepository {
    async fn create(&self, data: &CreateDocumentDTO) -> Result<TaxDocument, Error> {
        sqlx::query_as::<_, TaxDocument>(&format!(
            r#"
            INSERT INTO documents
                (id, user_id, file_name, mime_type, storage_path, document_type,
                 tax_year, issuer, extracted_fields, summary, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(data.id)
        .bind(data.user_id)
        .bind(&data.file_name)
        .bind(&data.mime_type)
        .bind(&data.storage_path)
        .bind(data.document_type)
        .bind(data.tax_year)
        .bind(&data.issuer)
        .bind(Json(&data.extracted_fields))
        .bind(&data.summary)
        .bind(data.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl ReadOwned<TaxDocument, Uuid> for DocumentRepository {
    async fn read_owned(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<TaxDocument>, Error> {
        sqlx::query_as::<_, TaxDocument>(&format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl ListOwned<TaxDocument> for DocumentRepository {
    async fn list_by_user(&self, user_id: &Uuid) -> Result<Vec<TaxDocument>, Error> {
        sqlx::query_as::<_, TaxDocument>(&format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Delete<Uuid> for DocumentRepository {
    async fn delete(&self, id: &Uuid, user_id: &Uuid) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
