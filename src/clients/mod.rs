//! Clients module - Client HTTP verso i servizi ospitati
//!
//! - `llm`: chat completion (OpenRouter)
//! - `retrieval`: ricerca vettoriale dei chunk di contesto
//! - `storage`: bucket di storage Supabase

pub mod llm;
pub mod retrieval;
pub mod storage;

pub use llm::{ChatMessage, ChatRequest, ChatRole, Completion, LlmClient, LlmError};
pub use retrieval::{ChunkId, Citation, ContextChunk, RetrievalClient, RetrievalError};
pub use storage::{StorageClient, StorageError};
