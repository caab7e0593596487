use crate::core::{AppError, AppState};
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Audience dei token emessi da Supabase Auth per gli utenti loggati
pub const SUPABASE_AUDIENCE: &str = "authenticated";

// struct che codifica il contenuto del token jwt emesso da Supabase
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id (uuid) di auth.users
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Utente autenticato, inserito nelle Extension della richiesta dal middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, AppError> {
    debug!("Decoding JWT token");
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[SUPABASE_AUDIENCE]);

    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        AppError::unauthorized("Invalid or expired token")
    })
}

/// Verifica il token e restituisce l'utente autenticato
pub fn verify_token(jwt_token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let data = decode_jwt(jwt_token, secret)?;
    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
        warn!("Token subject is not a valid uuid");
        AppError::unauthorized("Invalid or expired token")
    })?;
    Ok(AuthUser {
        user_id,
        email: data.claims.email,
    })
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::unauthorized("Invalid authorization header")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::unauthorized(
                "Please add the access token to the header",
            ));
        }
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Authorization header is not a bearer token");
            return Err(AppError::unauthorized("Invalid authorization header"));
        }
    };

    // l'identità è gestita da Supabase: basta verificare la firma, niente query al db
    let current_user = verify_token(token, &state.jwt_secret)?;
    info!("User authenticated: {}", current_user.user_id);

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret-test-secret-test-secret";

    fn token(sub: &str, aud: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            exp: (now + exp_offset) as usize,
            iat: Some(now as usize),
            aud: aud.to_string(),
            email: Some("taxpayer@example.ca".to_string()),
            role: Some("authenticated".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_user() {
        let id = Uuid::new_v4();
        let user = verify_token(&token(&id.to_string(), SUPABASE_AUDIENCE, 3600), SECRET).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.email.as_deref(), Some("taxpayer@example.ca"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let id = Uuid::new_v4().to_string();
        let err = verify_token(&token(&id, SUPABASE_AUDIENCE, -3600), SECRET).unwrap_err();
        assert_eq!(err.status(), http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let id = Uuid::new_v4().to_string();
        assert!(verify_token(&token(&id, "anon", 3600), SECRET).is_err());
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        assert!(verify_token(&token("not-a-uuid", SUPABASE_AUDIENCE, 3600), SECRET).is_err());
    }
}
