//! Authentication middleware
//!
//! The gate is applied as a route layer to every protected route. It runs
//! before any path or body extraction, so an unauthenticated request never
//! reaches a handler or the database.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use study_records_shared::AuthError;
use tracing::debug;

use super::JwtService;

/// Authenticated user placed in request extensions by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Pull the token out of the Authorization header
///
/// Accepts `Bearer <token>` as well as a bare token value, which clients of
/// the previous system send.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Verify the request's token and return the authenticated user
pub fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthUser, AuthError> {
    let token = extract_token(headers)?;
    let user_id = jwt.verify(token).map_err(|e| {
        debug!(reason = %e, "token rejected");
        e
    })?;
    Ok(AuthUser { user_id })
}

/// Middleware function guarding protected routes
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(request.headers(), state.jwt())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already verified by the gate
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let app_state = AppState::from_ref(state);
        Ok(authenticate(&parts.headers, app_state.jwt())?)
    }
}
