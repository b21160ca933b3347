//! Authentication routes
//!
//! Login is the only public endpoint besides the health probes.

use crate::error::ApiResult;
use crate::extract::AppJson;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use study_records_shared::{LoginRequest, TokenResponse};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login with full name and password
///
/// POST /login
async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = UserService::login(&state.db, state.jwt(), req).await?;
    Ok(Json(token))
}
