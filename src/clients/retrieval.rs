//! Retrieval client - Recupero dei chunk di contesto per la RAG
//!
//! Il servizio di ricerca vettoriale è esterno (funzione Supabase): qui si
//! inoltra la domanda, si filtrano i risultati per punteggio e si preparano
//! contesto e citazioni per il prompt.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Identificativo di un chunk: la funzione di ricerca può restituire
/// un bigint o una stringa, viene riemesso nella stessa forma
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChunkId {
    Number(i64),
    Text(String),
}

impl From<&str> for ChunkId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ChunkId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Chunk di testo restituito dalla ricerca vettoriale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextChunk {
    pub id: ChunkId,
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub similarity: f32,
}

/// Citazione mostrata al client, l'indice corrisponde al marker `[n]` del prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub index: usize,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub similarity: f32,
}

#[derive(Serialize)]
struct RetrievalBody<'a> {
    query: &'a str,
    match_count: usize,
}

pub struct RetrievalClient {
    http: Client,
    url: String,
    service_key: String,
    min_score: f32,
}

impl RetrievalClient {
    pub fn new(http: Client, url: String, service_key: String, min_score: f32) -> Self {
        Self {
            http,
            url,
            service_key,
            min_score,
        }
    }

    #[instrument(skip(self, query), fields(top_k))]
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ContextChunk>, RetrievalError> {
        debug!("Requesting context chunks");
        let resp = self
            .http
            .post(&self.url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .json(&RetrievalBody {
                query,
                match_count: top_k,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            error!(status, "Retrieval service returned an error");
            return Err(RetrievalError::Api { status, message });
        }

        let chunks: Vec<ContextChunk> = resp.json().await?;
        let chunks = rank_chunks(chunks, self.min_score, top_k);
        info!(count = chunks.len(), "Context chunks retrieved");
        Ok(chunks)
    }
}

/// Scarta i chunk sotto soglia, ordina per similarità decrescente e tronca a `top_k`
pub fn rank_chunks(mut chunks: Vec<ContextChunk>, min_score: f32, top_k: usize) -> Vec<ContextChunk> {
    chunks.retain(|c| c.similarity >= min_score && !c.content.trim().is_empty());
    chunks.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    chunks.truncate(top_k);
    chunks
}

/// Blocchi numerati `[n] titolo` da inserire nel prompt di sistema
pub fn build_context(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "[{}] {}\n{}",
                i + 1,
                c.title.as_deref().unwrap_or("CRA guidance"),
                c.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Citazioni per il client, deduplicate per URL (vince la prima occorrenza)
pub fn citations(chunks: &[ContextChunk]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .enumerate()
        .filter(|(_, c)| match &c.url {
            Some(url) => seen.insert(url.clone()),
            None => true,
        })
        .map(|(i, c)| Citation {
            index: i + 1,
            title: c.title.clone().unwrap_or_else(|| "CRA guidance".to_string()),
            url: c.url.clone(),
            similarity: c.similarity,
        })
        .collect()
}
