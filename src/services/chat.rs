//! Chat services - Domande all'assistente fiscale (RAG + LLM)

use crate::clients::retrieval::{build_context, citations};
use crate::clients::{ChatMessage, ChatRequest, Citation, ContextChunk};
use crate::core::{AppError, AppState, AuthUser, JsonBody};
use crate::dtos::{AskRequest, AskResponse, CreateMessageDTO, RetrieveRequest, RetrieveResponse};
use crate::entities::MessageRole;
use crate::repositories::{Create, ReadOwned};
use crate::sanitize::{sanitize_history, sanitize_question};
use crate::sse::{EventSink, PipelineError, SseEvent, relay};
use axum::{
    Extension,
    extract::{Json, State},
    response::IntoResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const MAX_ANSWER_TOKENS: u32 = 2000;
const MAX_RETRIEVE_TOP_K: usize = 20;

/// Domanda già ripulita e pronta per il prompt
struct PreparedQuestion {
    question: String,
    history: Vec<ChatMessage>,
    province: Option<String>,
}

/// Validazione e sanitizzazione: nessuna chiamata esterna parte prima di questo passo
fn prepare(body: &AskRequest) -> Result<PreparedQuestion, AppError> {
    body.validate()?;
    let question = sanitize_question(&body.question)?;
    Ok(PreparedQuestion {
        question,
        history: sanitize_history(&body.history),
        province: body.province.as_ref().map(|p| p.to_ascii_uppercase()),
    })
}

fn system_prompt(context: &str, province: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are TaxGuide, an assistant that explains Canadian personal income tax \
         and Canada Revenue Agency (CRA) rules in plain language.\n\
         - Answer in the language of the question (English or French).\n\
         - When the numbered sources below are relevant, rely on them and cite them inline as [n].\n\
         - If the sources do not cover the question, say so and answer from general knowledge \
           of CRA rules, flagging any uncertainty.\n\
         - Never invent amounts, limits or deadlines.\n\
         - End with a short reminder that this is general information, not professional tax advice.\n",
    );
    if let Some(province) = province {
        prompt.push_str(&format!(
            "- The user files taxes in {}; mention provincial differences when they matter.\n",
            province
        ));
    }
    if context.is_empty() {
        prompt.push_str("\nNo sources were found for this question.");
    } else {
        prompt.push_str("\nSources:\n");
        prompt.push_str(context);
    }
    prompt
}

fn build_request(model: &str, prepared: &PreparedQuestion, chunks: &[ContextChunk]) -> ChatRequest {
    let mut messages = Vec::with_capacity(prepared.history.len() + 2);
    messages.push(ChatMessage::system(system_prompt(
        &build_context(chunks),
        prepared.province.as_deref(),
    )));
    messages.extend(prepared.history.iter().cloned());
    messages.push(ChatMessage::user(prepared.question.clone()));

    ChatRequest {
        model: model.to_string(),
        messages,
        max_tokens: Some(MAX_ANSWER_TOKENS),
        temperature: Some(0.3),
    }
}

/// Il contesto è un aiuto, non un requisito: se la ricerca fallisce si risponde senza
async fn retrieve_or_empty(state: &AppState, question: &str) -> Option<Vec<ContextChunk>> {
    match state.retrieval.retrieve(question, state.retrieval_top_k).await {
        Ok(chunks) => Some(chunks),
        Err(e) => {
            warn!("Retrieval failed, answering without context: {}", e);
            None
        }
    }
}

/// Salvataggio best-effort: un errore viene solo loggato
async fn store_message(
    state: &AppState,
    conversation_id: Uuid,
    role: MessageRole,
    content: &str,
    citations: Vec<Citation>,
) {
    let dto = CreateMessageDTO {
        conversation_id,
        role,
        content: content.to_string(),
        citations,
    };
    if let Err(e) = state.msg.create(&dto).await {
        warn!(%conversation_id, ?role, "Failed to store message: {:?}", e);
    }
}

async fn ensure_conversation(
    state: &AppState,
    conversation_id: Option<Uuid>,
    user_id: &Uuid,
) -> Result<Option<Uuid>, AppError> {
    let Some(id) = conversation_id else {
        return Ok(None);
    };
    state
        .conversation
        .read_owned(&id, user_id)
        .await?
        .ok_or_else(|| {
            warn!(conversation_id = %id, "Conversation not found for user");
            AppError::not_found("Conversation not found")
        })?;
    Ok(Some(id))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    JsonBody(body): JsonBody<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    debug!("Answering question");
    // 1. Validare e ripulire la domanda (400 senza chiamate esterne se non valida)
    // 2. Se c'è conversation_id verificare che appartenga all'utente
    // 3. Recuperare i chunk di contesto (best-effort)
    // 4. Chiamare il modello in modalità non streaming
    // 5. Salvare domanda e risposta nella conversazione (best-effort)
    let prepared = prepare(&body)?;
    let conversation_id =
        ensure_conversation(&state, body.conversation_id, &current_user.user_id).await?;

    let chunks = retrieve_or_empty(&state, &prepared.question)
        .await
        .unwrap_or_default();
    let request = build_request(&state.chat_model, &prepared, &chunks);
    let completion = state.llm.chat(&request).await?;
    let cites = citations(&chunks);

    if let Some(id) = conversation_id {
        store_message(&state, id, MessageRole::User, &prepared.question, Vec::new()).await;
        store_message(&state, id, MessageRole::Assistant, &completion.content, cites.clone()).await;
    }

    info!(chunks = chunks.len(), "Question answered");
    Ok(Json(AskResponse {
        answer: completion.content,
        citations: cites,
        model: completion.model,
    }))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    JsonBody(body): JsonBody<AskRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Opening chat stream");
    // la domanda non valida produce un 400 JSON, lo stream non viene nemmeno aperto
    let prepared = prepare(&body)?;
    let user_id = current_user.user_id;
    let conversation_id = body.conversation_id;

    Ok(relay(move |sink| {
        stream_answer(state, user_id, prepared, conversation_id, sink)
    }))
}

async fn stream_answer(
    state: Arc<AppState>,
    user_id: Uuid,
    prepared: PreparedQuestion,
    conversation_id: Option<Uuid>,
    sink: EventSink,
) -> Result<(), PipelineError> {
    let started = Instant::now();

    let conversation_id = ensure_conversation(&state, conversation_id, &user_id).await?;
    if let Some(id) = conversation_id {
        store_message(&state, id, MessageRole::User, &prepared.question, Vec::new()).await;
    }

    sink.send(SseEvent::status("Searching CRA guidance..."))?;
    let chunks = match retrieve_or_empty(&state, &prepared.question).await {
        Some(chunks) => chunks,
        None => {
            sink.send(SseEvent::status(
                "Search is unavailable, answering without sources",
            ))?;
            Vec::new()
        }
    };

    let cites = citations(&chunks);
    if !cites.is_empty() {
        sink.send(SseEvent::Citations {
            citations: cites.clone(),
        })?;
    }

    sink.send(SseEvent::status("Generating answer..."))?;
    let request = build_request(&state.chat_model, &prepared, &chunks);
    let completion = state
        .llm
        .chat_stream(&request, |delta| {
            sink.send(SseEvent::Chunk {
                content: delta.to_string(),
            })
            .is_ok()
        })
        .await?;

    if sink.is_closed() {
        return Err(PipelineError::Disconnected);
    }

    if let Some(id) = conversation_id {
        store_message(&state, id, MessageRole::Assistant, &completion.content, cites).await;
    }

    sink.send(SseEvent::Metadata {
        model: completion.model,
        chunks_used: chunks.len(),
        duration_ms: started.elapsed().as_millis() as u64,
        conversation_id,
    })?;

    info!(user_id = %user_id, chunks = chunks.len(), "Chat stream completed");
    Ok(())
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn retrieve_context(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    JsonBody(body): JsonBody<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, AppError> {
    debug!("Retrieving context chunks");
    let query = sanitize_question(&body.query)?;
    let top_k = body
        .top_k
        .unwrap_or(state.retrieval_top_k)
        .clamp(1, MAX_RETRIEVE_TOP_K);

    let chunks = state.retrieval.retrieve(&query, top_k).await?;
    info!(count = chunks.len(), "Context chunks returned");
    Ok(Json(RetrieveResponse { chunks }))
}
