use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::{
    error::AppError,
    models::User,
};

use super::AppState;

/// The signed-in user of the current request
///
/// Resolved from `Authorization: Bearer <token>` through the session registry.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub access_token: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let user = state
            .sessions
            .resolve(state.identity.as_ref(), token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))?;

        Ok(Self {
            user,
            access_token: token.to_string(),
        })
    }
}
