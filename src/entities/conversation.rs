//! Conversation entity - Entità conversazione con l'assistente

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    // aggiornato a ogni nuovo messaggio, serve per ordinare la lista
    pub updated_at: DateTime<Utc>,
}
