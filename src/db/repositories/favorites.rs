use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Favorite, NewFavorite},
};

const FAVORITE_COLUMNS: &str = "id, user_id, imdb_id, title, poster, year, genre, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn list(&self, user_id: i64) -> AppResult<Vec<Favorite>>;
    async fn find(&self, user_id: i64, imdb_id: &str) -> AppResult<Option<Favorite>>;
    /// `None` when the user already has this movie as a favorite
    async fn create(&self, favorite: NewFavorite) -> AppResult<Option<Favorite>>;
    async fn delete(&self, user_id: i64, imdb_id: &str) -> AppResult<bool>;
}

pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn list(&self, user_id: i64) -> AppResult<Vec<Favorite>> {
        let sql = format!(
            "SELECT {} FROM user_favorites WHERE user_id = $1 ORDER BY created_at DESC",
            FAVORITE_COLUMNS
        );
        let favorites = sqlx::query_as::<_, Favorite>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(favorites)
    }

    async fn find(&self, user_id: i64, imdb_id: &str) -> AppResult<Option<Favorite>> {
        let sql = format!(
            "SELECT {} FROM user_favorites WHERE user_id = $1 AND imdb_id = $2",
            FAVORITE_COLUMNS
        );
        let favorite = sqlx::query_as::<_, Favorite>(&sql)
            .bind(user_id)
            .bind(imdb_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(favorite)
    }

    async fn create(&self, favorite: NewFavorite) -> AppResult<Option<Favorite>> {
        let sql = format!(
            r#"
            INSERT INTO user_favorites (user_id, imdb_id, title, poster, year, genre)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, imdb_id) DO NOTHING
            RETURNING {}
            "#,
            FAVORITE_COLUMNS
        );
        let created = sqlx::query_as::<_, Favorite>(&sql)
            .bind(favorite.user_id)
            .bind(&favorite.imdb_id)
            .bind(&favorite.title)
            .bind(&favorite.poster)
            .bind(&favorite.year)
            .bind(&favorite.genre)
            .fetch_optional(&self.pool)
            .await?;
        Ok(created)
    }

    async fn delete(&self, user_id: i64, imdb_id: &str) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND imdb_id = $2")
            .bind(user_id)
            .bind(imdb_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
