//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod chat;
pub mod conversation;
pub mod document;
pub mod letter;
pub mod message;
pub mod profile;
pub mod query;

// Re-exports per facilitare l'import
pub use chat::{AskRequest, AskResponse, HistoryTurn, RetrieveRequest, RetrieveResponse};
pub use conversation::{
    ConversationDTO, CreateConversationDTO, CreateConversationRequest, UpdateConversationDTO,
    DEFAULT_CONVERSATION_TITLE,
};
pub use document::{CreateDocumentDTO, DocumentAnalysisResponse, DocumentDTO};
pub use letter::{CreateLetterDTO, LetterAnalysisResponse, LetterDTO};
pub use message::{CreateMessageDTO, CreateMessageRequest, MessageDTO};
pub use profile::{ProfileDTO, UpsertProfileDTO};
pub use query::MessagesQuery;
