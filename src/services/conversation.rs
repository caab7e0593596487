//! Conversation services - Gestione delle conversazioni e dei loro messaggi

use crate::core::{AppError, AppState, AuthUser, JsonBody, PathParam, QueryParams};
use crate::dtos::{
    ConversationDTO, CreateConversationDTO, CreateConversationRequest, CreateMessageDTO,
    CreateMessageRequest, DEFAULT_CONVERSATION_TITLE, MessageDTO, MessagesQuery,
    UpdateConversationDTO,
};
use crate::repositories::{Create, Delete, ListOwned, ReadOwned, Update};
use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Numero di messaggi restituiti per pagina
pub const MESSAGES_PAGE_SIZE: i64 = 50;

/// 404 sia se la conversazione non esiste sia se appartiene a un altro utente
async fn owned_conversation(
    state: &AppState,
    conversation_id: &Uuid,
    user_id: &Uuid,
) -> Result<(), AppError> {
    state
        .conversation
        .read_owned(conversation_id, user_id)
        .await?
        .ok_or_else(|| {
            warn!(%conversation_id, "Conversation not found for user");
            AppError::not_found("Conversation not found")
        })?;
    Ok(())
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
) -> Result<Json<Vec<ConversationDTO>>, AppError> {
    debug!("Listing conversations");
    let conversations = state
        .conversation
        .list_by_user(&current_user.user_id)
        .await?;
    info!("Found {} conversations", conversations.len());
    Ok(Json(
        conversations.into_iter().map(ConversationDTO::from).collect(),
    ))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationDTO>), AppError> {
    debug!("Creating conversation");
    body.validate()?;

    let title = body
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_string());

    let conversation = state
        .conversation
        .create(&CreateConversationDTO {
            user_id: current_user.user_id,
            title,
        })
        .await?;

    info!(conversation_id = %conversation.id, "Conversation created");
    Ok((StatusCode::CREATED, Json(ConversationDTO::from(conversation))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, conversation_id = %conversation_id))]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(conversation_id): PathParam<Uuid>,
) -> Result<Json<ConversationDTO>, AppError> {
    debug!("Fetching conversation");
    let conversation = state
        .conversation
        .read_owned(&conversation_id, &current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Conversation not found"))?;
    Ok(Json(ConversationDTO::from(conversation)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, conversation_id = %conversation_id))]
pub async fn update_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(conversation_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateConversationDTO>,
) -> Result<Json<ConversationDTO>, AppError> {
    debug!("Updating conversation");
    body.validate()?;

    let conversation = state
        .conversation
        .update(&conversation_id, &current_user.user_id, &body)
        .await?
        .ok_or_else(|| AppError::not_found("Conversation not found"))?;

    info!("Conversation updated");
    Ok(Json(ConversationDTO::from(conversation)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, conversation_id = %conversation_id))]
pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(conversation_id): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting conversation");
    // i messaggi vengono rimossi dal database (ON DELETE CASCADE)
    if !state
        .conversation
        .delete(&conversation_id, &current_user.user_id)
        .await?
    {
        return Err(AppError::not_found("Conversation not found"));
    }

    info!("Conversation deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user, params), fields(user_id = %current_user.user_id, conversation_id = %conversation_id))]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(conversation_id): PathParam<Uuid>,
    QueryParams(params): QueryParams<MessagesQuery>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    debug!("Listing messages");
    owned_conversation(&state, &conversation_id, &current_user.user_id).await?;

    let messages = state
        .msg
        .find_page(&conversation_id, params.before.as_ref(), MESSAGES_PAGE_SIZE)
        .await?;

    info!("Found {} messages", messages.len());
    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, conversation_id = %conversation_id))]
pub async fn add_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    PathParam(conversation_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    debug!("Adding message");
    body.validate()?;
    owned_conversation(&state, &conversation_id, &current_user.user_id).await?;

    let message = state
        .msg
        .create(&CreateMessageDTO {
            conversation_id,
            role: body.role,
            content: body.content,
            citations: body.citations,
        })
        .await?;

    info!(message_id = %message.id, "Message added");
    Ok((StatusCode::CREATED, Json(MessageDTO::from(message))))
}
