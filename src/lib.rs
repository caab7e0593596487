//! Server library - espone i moduli principali per i test

pub mod analysis;
pub mod clients;
pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod sanitize;
pub mod services;
pub mod sse;
pub mod uploads;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(root))
        .nest("/api", configure_api_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Tutte le route sotto /api richiedono un token Supabase valido
fn configure_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(configure_chat_routes())
        .nest("/conversations", configure_conversation_routes())
        .nest("/documents", configure_document_routes())
        .nest("/letters", configure_letter_routes())
        .route("/profile", get(services::get_profile).put(services::put_profile))
        .layer(middleware::from_fn_with_state(
            state,
            crate::core::authentication_middleware,
        ))
}

/// Configura le routes per le domande all'assistente
fn configure_chat_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/chat", post(chat_stream))
        .route("/ask", post(ask))
        .route("/retrieve", post(retrieve_context))
}

/// Configura le routes per conversazioni e messaggi
fn configure_conversation_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/", get(list_conversations).post(create_conversation))
        .route(
            "/{conversation_id}",
            get(get_conversation)
                .patch(update_conversation)
                .delete(delete_conversation),
        )
        .route(
            "/{conversation_id}/messages",
            get(list_messages).post(add_message),
        )
}

/// Configura le routes per i documenti fiscali
fn configure_document_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route(
            "/analyze",
            post(analyze_document).layer(DefaultBodyLimit::max(uploads::UPLOAD_BODY_LIMIT)),
        )
        .route("/", get(list_documents))
        .route("/{document_id}", get(get_document).delete(delete_document))
}

/// Configura le routes per le lettere CRA
fn configure_letter_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route(
            "/analyze",
            post(analyze_letter).layer(DefaultBodyLimit::max(uploads::UPLOAD_BODY_LIMIT)),
        )
        .route("/", get(list_letters))
        .route("/{letter_id}", get(get_letter).delete(delete_letter))
}
