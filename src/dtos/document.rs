//! Document DTOs - Data Transfer Objects per documenti fiscali

use crate::entities::{DocumentType, TaxDocument};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Struct per gestire io col client (storage_path e user_id restano lato server)
#[derive(Serialize, Deserialize, Debug)]
pub struct DocumentDTO {
    pub id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub document_type: DocumentType,
    pub tax_year: Option<i32>,
    pub issuer: Option<String>,
    pub extracted_fields: serde_json::Value,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl From<TaxDocument> for DocumentDTO {
    fn from(value: TaxDocument) -> Self {
        Self {
            id: value.id,
            file_name: value.file_name,
            mime_type: value.mime_type,
            document_type: value.document_type,
            tax_year: value.tax_year,
            issuer: value.issuer,
            extracted_fields: value.extracted_fields.0,
            summary: value.summary,
            created_at: value.created_at,
        }
    }
}

/// DTO per salvare un documento analizzato; l'id è generato dal server
/// così il risultato resta restituibile anche se il salvataggio fallisce
#[derive(Debug, Clone)]
pub struct CreateDocumentDTO {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub storage_path: String,
    pub document_type: DocumentType,
    pub tax_year: Option<i32>,
    pub issuer: Option<String>,
    pub extracted_fields: serde_json::Value,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl From<CreateDocumentDTO> for TaxDocument {
    fn from(value: CreateDocumentDTO) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            file_name: value.file_name,
            mime_type: value.mime_type,
            storage_path: value.storage_path,
            document_type: value.document_type,
            tax_year: value.tax_year,
            issuer: value.issuer,
            extracted_fields: Json(value.extracted_fields),
            summary: value.summary,
            created_at: value.created_at,
        }
    }
}

/// Risposta di /api/documents/analyze
#[derive(Serialize, Deserialize, Debug)]
pub struct DocumentAnalysisResponse {
    pub document: DocumentDTO,
    pub saved: bool,
}
