//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Verifica dei token Supabase
//! - Configurazione
//! - Gestione errori ed estrattori
//! - Stato applicazione

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod state;

// Re-exports per facilitare l'import
pub use auth::{AuthUser, Claims, authentication_middleware, decode_jwt, verify_token};
pub use config::Config;
pub use error::AppError;
pub use extract::{JsonBody, PathParam, QueryParams};
pub use state::AppState;
