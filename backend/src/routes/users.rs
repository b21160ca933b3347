//! User management routes
//!
//! Every route here sits behind the auth gate; handlers receive the caller
//! as an [`AuthUser`] placed in the request extensions by the gate.

use crate::auth::{auth_middleware, AuthUser};
use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    middleware,
    routing::get,
    Json, Router,
};
use study_records_shared::{
    CreateUserRequest, ListUsersQuery, MessageResponse, UpdateUserRequest, UserResponse,
};
use tracing::debug;

/// Create user routes guarded by the auth gate
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// List users
///
/// GET /users?limit=&offset=
async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    debug!(actor = auth_user.user_id, "listing users");
    let settings = &state.config().app;
    let users = UserService::list(
        &state.db,
        &query,
        settings.pagination_default_limit,
        settings.pagination_max_limit,
    )
    .await?;
    Ok(Json(users))
}

/// Create a user
///
/// POST /users
async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(req): AppJson<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    debug!(actor = auth_user.user_id, "creating user");
    let user = UserService::create(&state.db, req).await?;
    Ok(Json(user))
}

/// Get a user by id
///
/// GET /users/:id
async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get(&state.db, id).await?;
    Ok(Json(user))
}

/// Update a user
///
/// PUT /users/:id
async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    debug!(actor = auth_user.user_id, user_id = id, "updating user");
    let user = UserService::update(&state.db, id, req).await?;
    Ok(Json(user))
}

/// Delete a user
///
/// DELETE /users/:id
async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    debug!(actor = auth_user.user_id, user_id = id, "deleting user");
    UserService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
