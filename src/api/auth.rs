use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::error::ApiError;
use crate::db::{AccessTokenRepo, DbError};
use crate::error::CoreError;
use crate::server::AppState;

/// The caller's user id, resolved from a bearer token.
///
/// Handlers take this as an argument and pass the id on explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing access token"))?;

        match state.db.get_token(token).await {
            Ok(access) => Ok(AuthUser(access.userid)),
            Err(DbError::NotFound(_)) => Err(ApiError::unauthorized("Invalid access token")),
            Err(e) => Err(CoreError::from(e).into()),
        }
    }
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
