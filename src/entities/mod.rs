//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database Postgres ospitato su Supabase.

pub mod conversation;
pub mod document;
pub mod enums;
pub mod letter;
pub mod message;
pub mod profile;

// Re-exports per facilitare l'import
pub use conversation::Conversation;
pub use document::TaxDocument;
pub use enums::{DocumentType, LetterType, MessageRole, Urgency};
pub use letter::CraLetter;
pub use message::Message;
pub use profile::Profile;
