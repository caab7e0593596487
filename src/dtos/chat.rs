//! Chat DTOs - Data Transfer Objects per domande e risposte

use crate::clients::{ChatRole, Citation, ContextChunk};
use crate::dtos::profile::validate_province;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Turno precedente della conversazione inviato dal client
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct HistoryTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Body di /api/chat e /api/ask
#[derive(Deserialize, Debug, Validate)]
pub struct AskRequest {
    // la domanda viene ripulita da sanitize_question, qui nessun vincolo
    pub question: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    #[serde(default)]
    #[validate(custom(function = "validate_province"))]
    pub province: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub model: String,
}

#[derive(Deserialize, Debug)]
pub struct RetrieveRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RetrieveResponse {
    pub chunks: Vec<ContextChunk>,
}
