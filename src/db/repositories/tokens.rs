use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{AuthToken, NewAuthToken, TokenType},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(&self, token: NewAuthToken) -> AppResult<AuthToken>;
    async fn find(&self, token: &str) -> AppResult<Option<AuthToken>>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn delete_for_user(&self, user_id: i64, token_type: TokenType) -> AppResult<()>;
}

pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TokenRepository for PgTokenRepository {
    async fn create(&self, token: NewAuthToken) -> AppResult<AuthToken> {
        let created = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (token, user_id, token_type, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, token, user_id, token_type, expires_at
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.token_type.as_str())
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find(&self, token: &str) -> AppResult<Option<AuthToken>> {
        let found = sqlx::query_as::<_, AuthToken>(
            "SELECT id, token, user_id, token_type, expires_at FROM auth_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_for_user(&self, user_id: i64, token_type: TokenType) -> AppResult<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1 AND token_type = $2")
            .bind(user_id)
            .bind(token_type.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
