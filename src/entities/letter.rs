//! CraLetter entity - Lettera CRA caricata e analizzata

use super::enums::{LetterType, Urgency};
use crate::analysis::{Amount, Deadline};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct CraLetter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub storage_path: String,
    pub letter_type: LetterType,
    pub urgency: Urgency,
    pub deadlines: Json<Vec<Deadline>>,
    pub amounts: Json<Vec<Amount>>,
    pub summary: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}
