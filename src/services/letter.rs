//! Letter services - Analisi delle lettere ricevute dalla CRA

use crate::analysis::{assess_urgency, classify_letter, extract_amounts, extract_deadlines};
use crate::clients::{ChatMessage, ChatRequest};
use crate::core::{AppError, AppState, AuthUser, PathParam};
use crate::dtos::{CreateLetterDTO, LetterAnalysisResponse, LetterDTO};
use crate::entities::CraLetter;
use crate::repositories::{Create, Delete, ListOwned, ReadOwned};
use crate::uploads::{read_upload, storage_path, validate_upload};
use axum::{
    Extension,
    extract::{Json, Multipart, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const LETTER_PROMPT: &str = "You help people in Canada understand letters from the Canada Revenue Agency. \
Read the attached letter and answer with exactly three sections, each starting on its own line:\n\
TRANSCRIPT: the key text of the letter copied word for word (title, dates, deadlines, amounts, reference numbers).\n\
EXPLANATION: what the letter means and what the reader has to do, in plain language, step by step.\n\
SUMMARY: one or two sentences.\n\
Do not guess values that are not printed on the letter.";

const TRANSCRIPT_MARKER: &str = "TRANSCRIPT:";
const EXPLANATION_MARKER: &str = "EXPLANATION:";
const SUMMARY_MARKER: &str = "SUMMARY:";

#[derive(Debug, PartialEq)]
struct LetterReply {
    transcript: String,
    explanation: String,
    summary: String,
}

/// Testo della sezione che inizia con `marker` fino alla sezione successiva
fn section<'a>(reply: &'a str, marker: &str) -> Option<&'a str> {
    let upper = reply.to_ascii_uppercase();
    let start = upper.find(marker)? + marker.len();
    let end = [TRANSCRIPT_MARKER, EXPLANATION_MARKER, SUMMARY_MARKER]
        .iter()
        .filter_map(|m| upper[start..].find(m).map(|pos| start + pos))
        .min()
        .unwrap_or(reply.len());
    let text = reply[start..end].trim();
    (!text.is_empty()).then_some(text)
}

fn parse_letter_reply(reply: &str) -> LetterReply {
    let reply = reply.trim();
    let transcript = section(reply, TRANSCRIPT_MARKER).unwrap_or(reply);
    let explanation = section(reply, EXPLANATION_MARKER).unwrap_or(reply);
    let summary = section(reply, SUMMARY_MARKER)
        .map(str::to_string)
        .unwrap_or_else(|| first_sentence(explanation));

    LetterReply {
        transcript: transcript.to_string(),
        explanation: explanation.to_string(),
        summary,
    }
}

fn first_sentence(text: &str) -> String {
    match text.find(". ") {
        Some(pos) => text[..=pos].to_string(),
        None => text.to_string(),
    }
}

#[instrument(skip(state, current_user, multipart), fields(user_id = %current_user.user_id))]
pub async fn analyze_letter(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<LetterAnalysisResponse>, AppError> {
    debug!("Analyzing CRA letter");
    // 1. Validare il file caricato e salvarlo sotto <user>/letters/
    // 2. Chiedere al modello trascrizione e spiegazione della lettera
    // 3. Classificare, estrarre scadenze e importi dalla trascrizione
    // 4. Calcolare l'urgenza rispetto alla data di oggi
    // 5. Salvare (best-effort) e restituire il risultato
    let mut file = read_upload(multipart).await?;
    validate_upload(&file)?;

    let data_url = file.to_data_url();
    let mime_type = file.normalized_mime().to_string();
    let path = storage_path(&current_user.user_id, "letters", &file.file_name);
    let storage_path = state
        .storage
        .upload(&path, std::mem::take(&mut file.bytes), &mime_type)
        .await?;

    let request = ChatRequest {
        model: state.vision_model.clone(),
        messages: vec![
            ChatMessage::system(LETTER_PROMPT),
            ChatMessage::user_with_attachment(
                "Explain this letter from the CRA.",
                &file.file_name,
                &mime_type,
                data_url,
            ),
        ],
        max_tokens: Some(2000),
        temperature: Some(0.2),
    };
    let completion = match state.llm.chat(&request).await {
        Ok(completion) => completion,
        Err(err) => {
            // senza analisi il file caricato resterebbe orfano nel bucket
            if let Err(e) = state.storage.remove(&[storage_path.clone()]).await {
                warn!("Failed to remove orphaned upload: {}", e);
            }
            return Err(err.into());
        }
    };
    let reply = parse_letter_reply(&completion.content);

    let letter_type = classify_letter(&reply.transcript);
    let deadlines = extract_deadlines(&reply.transcript);
    let amounts = extract_amounts(&reply.transcript);
    let urgency = assess_urgency(letter_type, &deadlines, Utc::now().date_naive());

    let dto = CreateLetterDTO {
        id: Uuid::new_v4(),
        user_id: current_user.user_id,
        file_name: file.file_name,
        mime_type,
        storage_path,
        letter_type,
        urgency,
        deadlines,
        amounts,
        summary: reply.summary,
        explanation: reply.explanation,
        created_at: Utc::now(),
    };

    let (letter, saved) = match state.letter.create(&dto).await {
        Ok(letter) => (letter, true),
        Err(e) => {
            warn!("Failed to save letter analysis, returning it anyway: {:?}", e);
            (CraLetter::from(dto), false)
        }
    };

    info!(letter_type = ?letter.letter_type, urgency = ?letter.urgency, saved, "Letter analyzed");
    Ok(Json(LetterAnalysisResponse {
        letter: LetterDTO::from(letter),
        saved,
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_letters(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
) -> Result<Json<Vec<LetterDTO>>, AppError> {
    debug!("Listing letters");
    let letters = state.letter.list_by_user(&current_user.user_id).await?;
    info!("Found {} letters", letters.len());
    Ok(Json(letters.into_iter().map(LetterDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, letter_id = %letter_id))]
pub async fn get_letter(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(letter_id): PathParam<Uuid>,
) -> Result<Json<LetterDTO>, AppError> {
    debug!("Fetching letter");
    let letter = state
        .letter
        .read_owned(&letter_id, &current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Letter not found"))?;
    Ok(Json(LetterDTO::from(letter)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, letter_id = %letter_id))]
pub async fn delete_letter(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(letter_id): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting letter");
    let letter = state
        .letter
        .read_owned(&letter_id, &current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Letter not found"))?;

    if !state.letter.delete(&letter_id, &current_user.user_id).await? {
        return Err(AppError::not_found("Letter not found"));
    }

    if let Err(e) = state.storage.remove(&[letter.storage_path]).await {
        warn!("Failed to remove stored file: {}", e);
    }

    info!("Letter deleted");
    Ok(StatusCode::NO_CONTENT)
}
