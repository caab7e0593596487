//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, i client verso i servizi esterni e le
//! impostazioni condivise necessarie per gestire le richieste.

use crate::clients::{LlmClient, RetrievalClient, StorageClient};
use crate::core::Config;
use crate::repositories::{
    ConversationRepository, DocumentRepository, LetterRepository, MessageRepository,
    ProfileRepository,
};
use sqlx::PgPool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per le conversazioni
    pub conversation: ConversationRepository,

    /// Repository per i messaggi delle conversazioni
    pub msg: MessageRepository,

    /// Repository per i documenti fiscali analizzati
    pub document: DocumentRepository,

    /// Repository per le lettere CRA analizzate
    pub letter: LetterRepository,

    /// Repository per i profili utente
    pub profile: ProfileRepository,

    /// Client chat-completion (OpenRouter)
    pub llm: LlmClient,

    /// Client per la ricerca dei chunk di contesto
    pub retrieval: RetrievalClient,

    /// Client per il bucket di storage Supabase
    pub storage: StorageClient,

    /// Secret con cui Supabase firma i token JWT
    pub jwt_secret: String,

    /// Modello usato per le risposte testuali
    pub chat_model: String,

    /// Modello usato per l'analisi di immagini e PDF
    pub vision_model: String,

    /// Numero di chunk di contesto richiesti per ogni domanda
    pub retrieval_top_k: usize,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando repository e client
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni Postgres condiviso
    /// * `config` - Configurazione caricata dall'ambiente
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let http = reqwest::Client::new();
        Self {
            conversation: ConversationRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            document: DocumentRepository::new(pool.clone()),
            letter: LetterRepository::new(pool.clone()),
            profile: ProfileRepository::new(pool),
            llm: LlmClient::new(
                http.clone(),
                config.openrouter_base_url.clone(),
                config.openrouter_api_key.clone(),
            ),
            retrieval: RetrievalClient::new(
                http.clone(),
                config.retrieval_url.clone(),
                config.supabase_service_key.clone(),
                config.retrieval_min_score,
            ),
            storage: StorageClient::new(
                http,
                config.supabase_url.clone(),
                config.supabase_service_key.clone(),
                config.storage_bucket.clone(),
            ),
            jwt_secret: config.jwt_secret.clone(),
            chat_model: config.chat_model.clone(),
            vision_model: config.vision_model.clone(),
            retrieval_top_k: config.retrieval_top_k,
        }
    }
}
