//! Message entity - Entità messaggio di una conversazione

use super::enums::MessageRole;
use crate::clients::Citation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    // solo le risposte dell'assistente hanno citazioni
    pub citations: Json<Vec<Citation>>,
    pub created_at: DateTime<Utc>,
}
