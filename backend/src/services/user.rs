//! User service for authentication and user management
//!
//! Password hashing and verification run on the blocking thread pool.
//! Update and delete run inside a REPEATABLE READ transaction; any early
//! return drops the transaction, which rolls it back.

use crate::auth::{JwtService, PasswordService};
use crate::db;
use crate::error::ApiError;
use crate::repositories::{AnalysisRepository, UserInput, UserRepository};
use sqlx::PgPool;
use study_records_shared::{
    validation::require_non_blank, AuthError, CreateUserRequest, ListUsersQuery, LoginRequest,
    Page, TokenResponse, UpdateUserRequest, UserResponse,
};
use tracing::{info, warn};
use validator::Validate;

const USER_NOT_FOUND: &str = "User not found";
const DUPLICATE_USER: &str = "A user with this fullname or email already exists";

/// User service for authentication and CRUD operations
pub struct UserService;

impl UserService {
    /// Exchange a full name and password for a token
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: LoginRequest,
    ) -> Result<TokenResponse, ApiError> {
        req.validate()?;

        let credentials = UserRepository::find_credentials(pool, &req.fullname).await?;

        // Unknown names still pay for one verification
        let (user_id, stored_hash) = match credentials {
            Some(record) => (Some(record.id), record.password_hash),
            None => (None, PasswordService::DUMMY_HASH.to_string()),
        };

        let valid = PasswordService::verify_credentials_async(req.password, stored_hash)
            .await
            .map_err(|e| ApiError::internal("verify password", e))?;

        let user_id = match (user_id, valid) {
            (Some(id), true) => id,
            (user_id, _) => {
                warn!(user_id, "login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let token = jwt_service
            .issue(user_id)
            .map_err(|e| ApiError::internal("sign token", e))?;

        info!(user_id, "user logged in");

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_service.ttl_secs(),
        })
    }

    /// Create a user with a freshly hashed password
    pub async fn create(pool: &PgPool, req: CreateUserRequest) -> Result<UserResponse, ApiError> {
        req.validate()?;
        check_blank_fields(&req.fullname, &req.category)?;

        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(|e| ApiError::internal("hash password", e))?;

        let input = UserInput {
            fullname: req.fullname,
            email: req.email,
            category: req.category,
            commission: req.commission,
        };

        let user = UserRepository::create(pool, &input, &password_hash)
            .await
            .map_err(|e| ApiError::from_write(e, DUPLICATE_USER))?;

        info!(user_id = user.id, "user created");
        Ok(user.into())
    }

    /// Get one user by id
    pub async fn get(pool: &PgPool, id: i64) -> Result<UserResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

        Ok(user.into())
    }

    /// List users ordered by id
    pub async fn list(
        pool: &PgPool,
        query: &ListUsersQuery,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<Vec<UserResponse>, ApiError> {
        let page: Option<Page> = query.normalize(default_limit, max_limit);
        let users = UserRepository::list(pool, page).await?;

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Update a user's fields, and the password hash when a new password is given
    pub async fn update(
        pool: &PgPool,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        if !UserRepository::exists(pool, id).await? {
            return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
        }

        req.validate()?;
        check_blank_fields(&req.fullname, &req.category)?;

        // Hash before opening the transaction so no connection is held meanwhile
        let password_hash = match req.new_password() {
            Some(password) => Some(
                PasswordService::hash_async(password.to_string())
                    .await
                    .map_err(|e| ApiError::internal("hash password", e))?,
            ),
            None => None,
        };

        let input = UserInput {
            fullname: req.fullname,
            email: req.email,
            category: req.category,
            commission: req.commission,
        };

        let mut tx = db::begin_repeatable_read(pool)
            .await
            .map_err(|e| ApiError::internal("begin transaction", e))?;

        let affected = UserRepository::update(&mut tx, id, &input, password_hash.as_deref())
            .await
            .map_err(|e| ApiError::from_write(e, DUPLICATE_USER))?;

        if affected != 1 {
            return Err(ApiError::internal(
                "Failed to update user",
                anyhow::anyhow!("update affected {} rows for user {}", affected, id),
            ));
        }

        let user = UserRepository::find_by_id_in(&mut tx, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ApiError::internal("commit transaction", e))?;

        info!(
            user_id = id,
            password_changed = password_hash.is_some(),
            "user updated"
        );
        Ok(user.into())
    }

    /// Delete a user, first detaching every analysis that references it
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        let mut tx = db::begin_repeatable_read(pool)
            .await
            .map_err(|e| ApiError::internal("begin transaction", e))?;

        let mut unlinked = 0;
        if AnalysisRepository::references_user(&mut tx, id).await? {
            unlinked = AnalysisRepository::unlink_user(&mut tx, id).await?;
        }

        let deleted = UserRepository::delete(&mut tx, id).await?;
        if deleted == 0 {
            // Dropping the transaction undoes the unlink
            return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
        }

        tx.commit()
            .await
            .map_err(|e| ApiError::internal("commit transaction", e))?;

        info!(user_id = id, unlinked_analyses = unlinked, "user deleted");
        Ok(())
    }
}

fn check_blank_fields(fullname: &str, category: &str) -> Result<(), ApiError> {
    require_non_blank("fullname", fullname)
        .and_then(|_| require_non_blank("category", category))
        .map_err(ApiError::Validation)
}
