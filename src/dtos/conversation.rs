//! Conversation DTOs - Data Transfer Objects per conversazioni

use crate::entities::Conversation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug)]
pub struct ConversationDTO {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationDTO {
    fn from(value: Conversation) -> Self {
        Self {
            id: value.id,
            title: value.title,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Body della richiesta di creazione
#[derive(Deserialize, Debug, Validate)]
pub struct CreateConversationRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
}

/// DTO per creare una nuova conversazione (senza id)
#[derive(Debug, Clone)]
pub struct CreateConversationDTO {
    pub user_id: Uuid,
    pub title: String,
}

/// DTO per aggiornare una conversazione (solo campi modificabili)
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct UpdateConversationDTO {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
}
