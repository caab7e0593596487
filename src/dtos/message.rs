//! Message DTOs - Data Transfer Objects per messaggi

use crate::clients::Citation;
use crate::entities::{Message, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        Self {
            id: value.id,
            conversation_id: value.conversation_id,
            role: value.role,
            content: value.content,
            citations: value.citations.0,
            created_at: value.created_at,
        }
    }
}

/// Body della richiesta di aggiunta di un messaggio
#[derive(Deserialize, Debug, Validate)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    #[validate(length(min = 1, max = 10000, message = "Message content must be between 1 and 10000 characters"))]
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// DTO per creare un nuovo messaggio (senza id)
#[derive(Debug, Clone)]
pub struct CreateMessageDTO {
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub citations: Vec<Citation>,
}
