//! Profile services - Profilo dell'utente autenticato

use crate::core::{AppError, AppState, AuthUser, JsonBody};
use crate::dtos::{ProfileDTO, UpsertProfileDTO};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
) -> Result<Json<ProfileDTO>, AppError> {
    debug!("Fetching profile");
    let profile = state
        .profile
        .read(&current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;
    Ok(Json(ProfileDTO::from(profile)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<AuthUser>,
    JsonBody(body): JsonBody<UpsertProfileDTO>,
) -> Result<Json<ProfileDTO>, AppError> {
    debug!("Upserting profile");
    body.validate()?;

    let profile = state.profile.upsert(&current_user.user_id, &body).await?;

    info!("Profile saved");
    Ok(Json(ProfileDTO::from(profile)))
}
