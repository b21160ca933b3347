//! User repository for database operations
//!
//! Read queries never select `password_hash` except the credential lookup
//! used by login. Mutations that must be atomic take a connection so the
//! caller can run them inside its own transaction.

use sqlx::{PgConnection, PgPool};
use study_records_shared::{Page, UserResponse};

/// User record from database, without credentials
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub fullname: String,
    pub email: Option<String>,
    pub category: String,
    pub commission: f64,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            fullname: record.fullname,
            email: record.email,
            category: record.category,
            commission: record.commission,
        }
    }
}

/// Login credentials for one user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRecord {
    pub id: i64,
    pub password_hash: String,
}

/// Mutable user fields
#[derive(Debug, Clone)]
pub struct UserInput {
    pub fullname: String,
    /// `None` on update keeps the stored email
    pub email: Option<String>,
    pub category: String,
    pub commission: f64,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Insert a user; the database assigns the id
    pub async fn create(
        pool: &PgPool,
        input: &UserInput,
        password_hash: &str,
    ) -> sqlx::Result<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (fullname, email, category, commission, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, fullname, email, category, commission
            "#,
        )
        .bind(&input.fullname)
        .bind(&input.email)
        .bind(&input.category)
        .bind(input.commission)
        .bind(password_hash)
        .fetch_one(pool)
        .await
    }

    /// Find login credentials by full name
    pub async fn find_credentials(
        pool: &PgPool,
        fullname: &str,
    ) -> sqlx::Result<Option<CredentialRecord>> {
        sqlx::query_as::<_, CredentialRecord>(
            r#"
            SELECT id, password_hash
            FROM users
            WHERE fullname = $1
            "#,
        )
        .bind(fullname)
        .fetch_optional(pool)
        .await
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> sqlx::Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, fullname, email, category, commission
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Find user by ID on an existing connection
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: i64,
    ) -> sqlx::Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, fullname, email, category, commission
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Check if a user exists
    pub async fn exists(pool: &PgPool, id: i64) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// List users ordered by id, optionally windowed
    pub async fn list(pool: &PgPool, page: Option<Page>) -> sqlx::Result<Vec<UserRecord>> {
        match page {
            Some(page) => {
                sqlx::query_as::<_, UserRecord>(
                    r#"
                    SELECT id, fullname, email, category, commission
                    FROM users
                    ORDER BY id
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(page.limit)
                .bind(page.offset)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, UserRecord>(
                    r#"
                    SELECT id, fullname, email, category, commission
                    FROM users
                    ORDER BY id
                    "#,
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Update the mutable fields, replacing the hash when one is given
    ///
    /// Returns the number of affected rows.
    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &UserInput,
        password_hash: Option<&str>,
    ) -> sqlx::Result<u64> {
        let result = match password_hash {
            Some(hash) => {
                sqlx::query(
                    r#"
                    UPDATE users SET
                        fullname = $2,
                        email = COALESCE($3, email),
                        category = $4,
                        commission = $5,
                        password_hash = $6
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(&input.fullname)
                .bind(&input.email)
                .bind(&input.category)
                .bind(input.commission)
                .bind(hash)
                .execute(conn)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE users SET
                        fullname = $2,
                        email = COALESCE($3, email),
                        category = $4,
                        commission = $5
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(&input.fullname)
                .bind(&input.email)
                .bind(&input.category)
                .bind(input.commission)
                .execute(conn)
                .await?
            }
        };

        Ok(result.rows_affected())
    }

    /// Delete a user row; returns the number of affected rows
    pub async fn delete(conn: &mut PgConnection, id: i64) -> sqlx::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
