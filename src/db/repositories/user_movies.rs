use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{MovieStatus, UserMovieStatus},
};

const STATUS_COLUMNS: &str = "id, user_id, imdb_id, status, rating, review, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserMovieRepository: Send + Sync {
    async fn list(&self, user_id: i64) -> AppResult<Vec<UserMovieStatus>>;
    async fn with_status(&self, user_id: i64, status: MovieStatus)
        -> AppResult<Vec<UserMovieStatus>>;
    async fn upsert_status(
        &self,
        user_id: i64,
        imdb_id: &str,
        status: MovieStatus,
    ) -> AppResult<UserMovieStatus>;
    /// Set rating and review; a row created here starts out WATCHED
    async fn upsert_rating(
        &self,
        user_id: i64,
        imdb_id: &str,
        rating: i32,
        review: Option<String>,
    ) -> AppResult<UserMovieStatus>;
}

pub struct PgUserMovieRepository {
    pool: PgPool,
}

impl PgUserMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserMovieRepository for PgUserMovieRepository {
    async fn list(&self, user_id: i64) -> AppResult<Vec<UserMovieStatus>> {
        let sql = format!(
            "SELECT {} FROM user_movie_status WHERE user_id = $1 ORDER BY updated_at DESC",
            STATUS_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserMovieStatus>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn with_status(
        &self,
        user_id: i64,
        status: MovieStatus,
    ) -> AppResult<Vec<UserMovieStatus>> {
        let sql = format!(
            "SELECT {} FROM user_movie_status WHERE user_id = $1 AND status = $2 ORDER BY updated_at DESC",
            STATUS_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserMovieStatus>(&sql)
            .bind(user_id)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn upsert_status(
        &self,
        user_id: i64,
        imdb_id: &str,
        status: MovieStatus,
    ) -> AppResult<UserMovieStatus> {
        let sql = format!(
            r#"
            INSERT INTO user_movie_status (user_id, imdb_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, imdb_id)
            DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
            RETURNING {}
            "#,
            STATUS_COLUMNS
        );
        let row = sqlx::query_as::<_, UserMovieStatus>(&sql)
            .bind(user_id)
            .bind(imdb_id)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert_rating(
        &self,
        user_id: i64,
        imdb_id: &str,
        rating: i32,
        review: Option<String>,
    ) -> AppResult<UserMovieStatus> {
        let sql = format!(
            r#"
            INSERT INTO user_movie_status (user_id, imdb_id, status, rating, review)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, imdb_id)
            DO UPDATE SET rating = EXCLUDED.rating, review = EXCLUDED.review, updated_at = NOW()
            RETURNING {}
            "#,
            STATUS_COLUMNS
        );
        let row = sqlx::query_as::<_, UserMovieStatus>(&sql)
            .bind(user_id)
            .bind(imdb_id)
            .bind(MovieStatus::Watched.as_str())
            .bind(rating)
            .bind(review)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}
