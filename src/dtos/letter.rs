//! Letter DTOs - Data Transfer Objects per lettere CRA

use crate::analysis::{Amount, Deadline};
use crate::entities::{CraLetter, LetterType, Urgency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug)]
pub struct LetterDTO {
    pub id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub letter_type: LetterType,
    pub urgency: Urgency,
    pub deadlines: Vec<Deadline>,
    pub amounts: Vec<Amount>,
    pub summary: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl From<CraLetter> for LetterDTO {
    fn from(value: CraLetter) -> Self {
        Self {
            id: value.id,
            file_name: value.file_name,
            mime_type: value.mime_type,
            letter_type: value.letter_type,
            urgency: value.urgency,
            deadlines: value.deadlines.0,
            amounts: value.amounts.0,
            summary: value.summary,
            explanation: value.explanation,
            created_at: value.created_at,
        }
    }
}

/// DTO per salvare una lettera analizzata (id generato dal server)
#[derive(Debug, Clone)]
pub struct CreateLetterDTO {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub storage_path: String,
    pub letter_type: LetterType,
    pub urgency: Urgency,
    pub deadlines: Vec<Deadline>,
    pub amounts: Vec<Amount>,
    pub summary: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl From<CreateLetterDTO> for CraLetter {
    fn from(value: CreateLetterDTO) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            file_name: value.file_name,
            mime_type: value.mime_type,
            storage_path: value.storage_path,
            letter_type: value.letter_type,
            urgency: value.urgency,
            deadlines: Json(value.deadlines),
            amounts: Json(value.amounts),
            summary: value.summary,
            explanation: value.explanation,
            created_at: value.created_at,
        }
    }
}

/// Risposta di /api/letters/analyze
#[derive(Serialize, Deserialize, Debug)]
pub struct LetterAnalysisResponse {
    pub letter: LetterDTO,
    pub saved: bool,
}
