use sqlx::PgPool;

use crate::{
    db::postgres::is_unique_violation,
    error::{AppError, AppResult},
    models::{NewUser, User},
};

const USER_COLUMNS: &str = "id, email, username, password_hash, first_name, last_name, role, \
                            google_id, avatar_url, partner_id, is_verified, created_at";

/// Partial profile update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> AppResult<User>;
    async fn update_password(&self, id: i64, password_hash: String) -> AppResult<()>;
    async fn mark_verified(&self, id: i64) -> AppResult<()>;
    /// Attach a Google account to an existing user
    async fn link_google(
        &self,
        id: i64,
        google_id: String,
        avatar_url: Option<String>,
    ) -> AppResult<User>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users
                (email, username, password_hash, first_name, last_name, role,
                 google_id, avatar_url, is_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(&user.google_id)
            .bind(&user.avatar_url)
            .bind(user.is_verified)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Email or username is already in use".to_string())
                } else {
                    e.into()
                }
            })
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> AppResult<User> {
        let sql = format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                username   = COALESCE($4, username),
                avatar_url = COALESCE($5, avatar_url)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.username)
            .bind(&changes.avatar_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Username is already taken".to_string())
                } else {
                    e.into()
                }
            })?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn update_password(&self, id: i64, password_hash: String) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_verified(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn link_google(
        &self,
        id: i64,
        google_id: String,
        avatar_url: Option<String>,
    ) -> AppResult<User> {
        let sql = format!(
            r#"
            UPDATE users SET
                google_id  = $2,
                avatar_url = COALESCE(avatar_url, $3)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(google_id)
            .bind(avatar_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
