//! Analysis repository
//!
//! Only the operations that keep `analyses.user_id` consistent with the
//! users table are exposed; analysis CRUD is not served by the API.

use sqlx::PgConnection;

/// Analysis repository for database operations
pub struct AnalysisRepository;

impl AnalysisRepository {
    /// Check whether any analysis references the user
    pub async fn references_user(conn: &mut PgConnection, user_id: i64) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM analyses WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(conn)
        .await
    }

    /// Clear the user reference on every analysis pointing at the user
    ///
    /// Returns the number of analyses unlinked.
    pub async fn unlink_user(conn: &mut PgConnection, user_id: i64) -> sqlx::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE analyses SET user_id = NULL WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
