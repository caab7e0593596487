//! TaxDocument entity - Documento fiscale caricato e analizzato

use super::enums::DocumentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct TaxDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub storage_path: String,
    pub document_type: DocumentType,
    pub tax_year: Option<i32>,
    pub issuer: Option<String>,
    // campi estratti dal modello (box number -> valore), struttura libera
    pub extracted_fields: Json<serde_json::Value>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}
