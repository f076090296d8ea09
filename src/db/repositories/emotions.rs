use sqlx::PgPool;

use crate::{error::AppResult, models::EmotionGenreMap};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmotionRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    async fn insert_many(&self, mappings: Vec<(String, Vec<String>)>) -> AppResult<()>;
    async fn find(&self, emotion: &str) -> AppResult<Option<EmotionGenreMap>>;
    async fn all(&self) -> AppResult<Vec<EmotionGenreMap>>;
}

pub struct PgEmotionRepository {
    pool: PgPool,
}

impl PgEmotionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EmotionRepository for PgEmotionRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM emotion_genre_map")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_many(&self, mappings: Vec<(String, Vec<String>)>) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        for (emotion, genres) in mappings {
            sqlx::query(
                "INSERT INTO emotion_genre_map (emotion, genres) VALUES ($1, $2) ON CONFLICT (emotion) DO NOTHING",
            )
            .bind(emotion)
            .bind(genres)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, emotion: &str) -> AppResult<Option<EmotionGenreMap>> {
        let mapping = sqlx::query_as::<_, EmotionGenreMap>(
            "SELECT id, emotion, genres FROM emotion_genre_map WHERE emotion = $1",
        )
        .bind(emotion)
        .fetch_optional(&self.pool)
        .await?;
        Ok(mapping)
    }

    async fn all(&self) -> AppResult<Vec<EmotionGenreMap>> {
        let mappings = sqlx::query_as::<_, EmotionGenreMap>(
            "SELECT id, emotion, genres FROM emotion_genre_map ORDER BY emotion",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(mappings)
    }
}
