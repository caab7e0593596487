//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod chat;
pub mod conversation;
pub mod document;
pub mod letter;
pub mod profile;

// Re-exports per facilitare l'import
pub use chat::{ask, chat_stream, retrieve_context};
pub use conversation::{
    add_message, create_conversation, delete_conversation, get_conversation, list_conversations,
    list_messages, update_conversation,
};
pub use document::{analyze_document, delete_document, get_document, list_documents};
pub use letter::{analyze_letter, delete_letter, get_letter, list_letters};
pub use profile::{get_profile, put_profile};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
