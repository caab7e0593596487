//! Document services - Caricamento e analisi dei documenti fiscali

use crate::analysis::classify_document;
use crate::clients::{ChatMessage, ChatRequest};
use crate::core::{AppError, AppState, AuthUser, PathParam};
use crate::dtos::{CreateDocumentDTO, DocumentAnalysisResponse, DocumentDTO};
use crate::entities::{DocumentType, TaxDocument};
use crate::repositories::{Create, Delete, ListOwned, ReadOwned};
use crate::uploads::{read_upload, storage_path, validate_upload};
use axum::{
    Extension,
    extract::{Json, Multipart, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const DOCUMENT_PROMPT: &str = "You read Canadian tax documents (CRA slips such as T4, T4A, T5, \
T3, T5008, T2202, notices of assessment, RRSP/donation/medical/childcare receipts, rental statements). \
Reply with a single JSON object and nothing else, using these keys: \
\"document_type\" (one of t4, t4a, t4e, t5, t3, t5008, t2202, rrsp_receipt, notice_of_assessment, \
medical_receipt, donation_receipt, childcare_receipt, rental_statement, other), \
\"tax_year\" (number or null), \"issuer\" (string or null), \
\"fields\" (object mapping box numbers or labels to the values printed on the document), \
\"summary\" (two or three plain-language sentences on what the document means for the taxpayer's return).";

const MAX_SUMMARY_CHARS: usize = 2000;

#[derive(Deserialize, Default)]
struct RawExtraction {
    #[serde(default)]
    document_type: Option<String>,
    #[serde(default)]
    tax_year: Option<serde_json::Value>,
    #[serde(default)]
    issuer: Option<String>,
    #[serde(default)]
    fields: Option<serde_json::Value>,
    #[serde(default)]
    summary: Option<String>,
}

/// Dati estratti dalla risposta del modello
#[derive(Debug, PartialEq)]
struct DocumentExtraction {
    document_type: DocumentType,
    tax_year: Option<i32>,
    issuer: Option<String>,
    fields: serde_json::Value,
    summary: String,
}

/// Primo oggetto JSON contenuto nel testo (il modello a volte aggiunge testo o ```json)
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_tax_year(value: Option<serde_json::Value>) -> Option<i32> {
    let year = match value? {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (1990..=2100).contains(&year).then_some(year as i32)
}

fn parse_document_reply(reply: &str) -> DocumentExtraction {
    let raw: RawExtraction = first_json_object(reply)
        .and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_else(|| {
            warn!("Model reply is not valid JSON, falling back to text heuristics");
            RawExtraction::default()
        });

    let summary: String = raw
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| reply.trim().to_string())
        .chars()
        .take(MAX_SUMMARY_CHARS)
        .collect();

    // se il modello non dà un tipo riconoscibile, vale la classificazione a regex
    let document_type = raw
        .document_type
        .as_deref()
        .and_then(DocumentType::from_label)
        .filter(|t| *t != DocumentType::Other)
        .unwrap_or_else(|| classify_document(reply));

    DocumentExtraction {
        document_type,
        tax_year: parse_tax_year(raw.tax_year),
        issuer: raw.issuer.filter(|s| !s.trim().is_empty()),
        fields: raw
            .fields
            .filter(serde_json::Value::is_object)
            .unwrap_or_else(|| serde_json::json!({})),
        summary,
    }
}

#[instrument(skip(state, current_user, multipart), fields(user_id = %current_user.user_id))]
pub async fn analyze_document(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<DocumentAnalysisResponse>, AppError> {
    debug!("Analyzing uploaded document");
    // 1. Leggere il campo `file` dal multipart e validarlo (dimensione, tipo, firma)
    // 2. Caricare il file nel bucket sotto <user>/documents/
    // 3. Inviare il file al modello vision come data URL base64
    // 4. Interpretare la risposta JSON (fallback sulla classificazione a regex)
    // 5. Salvare il risultato: se il salvataggio fallisce si restituisce comunque l'analisi
    let mut file = read_upload(multipart).await?;
    validate_upload(&file)?;

    let data_url = file.to_data_url();
    let mime_type = file.normalized_mime().to_string();
    let path = storage_path(&current_user.user_id, "documents", &file.file_name);
    let storage_path = state
        .storage
        .upload(&path, std::mem::take(&mut file.bytes), &mime_type)
        .await?;

    let request = ChatRequest {
        model: state.vision_model.clone(),
        messages: vec![
            ChatMessage::system(DOCUMENT_PROMPT),
            ChatMessage::user_with_attachment(
                "Analyze this tax document.",
                &file.file_name,
                &mime_type,
                data_url,
            ),
        ],
        max_tokens: Some(1500),
        temperature: Some(0.0),
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
    let extraction = parse_document_reply(&completion.content);

    let dto = CreateDocumentDTO {
        id: Uuid::new_v4(),
        user_id: current_user.user_id,
        file_name: file.file_name,
        mime_type,
        storage_path,
        document_type: extraction.document_type,
        tax_year: extraction.tax_year,
        issuer: extraction.issuer,
        extracted_fields: extraction.fields,
        summary: extraction.summary,
        created_at: Utc::now(),
    };

    let (document, saved) = match state.document.create(&dto).await {
        Ok(document) => (document, true),
        Err(e) => {
            warn!("Failed to save document analysis, returning it anyway: {:?}", e);
            (TaxDocument::from(dto), false)
        }
    };

    info!(document_type = ?document.document_type, saved, "Document analyzed");
    Ok(Json(DocumentAnalysisResponse {
        document: DocumentDTO::from(document),
        saved,
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
) -> Result<Json<Vec<DocumentDTO>>, AppError> {
    debug!("Listing documents");
    let documents = state.document.list_by_user(&current_user.user_id).await?;
    info!("Found {} documents", documents.len());
    Ok(Json(documents.into_iter().map(DocumentDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, document_id = %document_id))]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(document_id): PathParam<Uuid>,
) -> Result<Json<DocumentDTO>, AppError> {
    debug!("Fetching document");
    let document = state
        .document
        .read_owned(&document_id, &current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Document not found"))?;
    Ok(Json(DocumentDTO::from(document)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, document_id = %document_id))]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(document_id): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting document");
    let document = state
        .document
        .read_owned(&document_id, &current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Document not found"))?;

    if !state
        .document
        .delete(&document_id, &current_user.user_id)
        .await?
    {
        return Err(AppError::not_found("Document not found"));
    }

    // il file nel bucket è secondario: se la rimozione fallisce resta solo orfano
    if let Err(e) = state.storage.remove(&[document.storage_path]).await {
        warn!("Failed to remove stored file: {}", e);
    }

    info!("Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
