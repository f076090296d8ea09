use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{CoupleMovie, CoupleWatchStatus, NewCoupleMovie},
};

const COUPLE_MOVIE_COLUMNS: &str = "id, couple_key, imdb_id, title, poster, year, genre, \
    added_by_user_id, watch_status, added_by_creator, added_by_partner, \
    user1_id, user1_rating, user2_id, user2_rating, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CoupleMovieRepository: Send + Sync {
    async fn list(&self, couple_key: &str) -> AppResult<Vec<CoupleMovie>>;
    async fn find(&self, couple_key: &str, imdb_id: &str) -> AppResult<Option<CoupleMovie>>;
    /// Insert with the adder as creator and rating slot 1. If the couple
    /// already has the movie, the adder's side is flagged on the existing row.
    async fn add(&self, movie: NewCoupleMovie) -> AppResult<CoupleMovie>;
    async fn set_status(
        &self,
        couple_key: &str,
        imdb_id: &str,
        status: CoupleWatchStatus,
    ) -> AppResult<Option<CoupleMovie>>;
    /// Store `rating` in the user's slot and mark the movie watched.
    /// The other slot is left untouched.
    async fn rate(
        &self,
        couple_key: &str,
        imdb_id: &str,
        user_id: i64,
        rating: f64,
    ) -> AppResult<Option<CoupleMovie>>;
    async fn delete(&self, couple_key: &str, imdb_id: &str) -> AppResult<bool>;
}

pub struct PgCoupleMovieRepository {
    pool: PgPool,
}

impl PgCoupleMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CoupleMovieRepository for PgCoupleMovieRepository {
    async fn list(&self, couple_key: &str) -> AppResult<Vec<CoupleMovie>> {
        let sql = format!(
            "SELECT {} FROM couple_movies WHERE couple_key = $1 ORDER BY created_at DESC",
            COUPLE_MOVIE_COLUMNS
        );
        let movies = sqlx::query_as::<_, CoupleMovie>(&sql)
            .bind(couple_key)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn find(&self, couple_key: &str, imdb_id: &str) -> AppResult<Option<CoupleMovie>> {
        let sql = format!(
            "SELECT {} FROM couple_movies WHERE couple_key = $1 AND imdb_id = $2",
            COUPLE_MOVIE_COLUMNS
        );
        let movie = sqlx::query_as::<_, CoupleMovie>(&sql)
            .bind(couple_key)
            .bind(imdb_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn add(&self, movie: NewCoupleMovie) -> AppResult<CoupleMovie> {
        let sql = format!(
            r#"
            INSERT INTO couple_movies
                (couple_key, imdb_id, title, poster, year, genre, added_by_user_id,
                 watch_status, added_by_creator, added_by_partner, user1_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'WATCHLIST', TRUE, FALSE, $7)
            ON CONFLICT (couple_key, imdb_id) DO UPDATE SET
                added_by_creator = couple_movies.added_by_creator
                    OR couple_movies.added_by_user_id = EXCLUDED.added_by_user_id,
                added_by_partner = couple_movies.added_by_partner
                    OR couple_movies.added_by_user_id <> EXCLUDED.added_by_user_id
            RETURNING {}
            "#,
            COUPLE_MOVIE_COLUMNS
        );
        let saved = sqlx::query_as::<_, CoupleMovie>(&sql)
            .bind(&movie.couple_key)
            .bind(&movie.imdb_id)
            .bind(&movie.title)
            .bind(&movie.poster)
            .bind(&movie.year)
            .bind(&movie.genre)
            .bind(movie.added_by_user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn set_status(
        &self,
        couple_key: &str,
        imdb_id: &str,
        status: CoupleWatchStatus,
    ) -> AppResult<Option<CoupleMovie>> {
        let sql = format!(
            r#"
            UPDATE couple_movies SET watch_status = $3
            WHERE couple_key = $1 AND imdb_id = $2
            RETURNING {}
            "#,
            COUPLE_MOVIE_COLUMNS
        );
        let movie = sqlx::query_as::<_, CoupleMovie>(&sql)
            .bind(couple_key)
            .bind(imdb_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn rate(
        &self,
        couple_key: &str,
        imdb_id: &str,
        user_id: i64,
        rating: f64,
    ) -> AppResult<Option<CoupleMovie>> {
        let mut tx = self.pool.begin().await?;

        // Slot choice depends on the other partner's slot, so the row stays
        // locked until the rating is written
        let sql = format!(
            "SELECT {} FROM couple_movies WHERE couple_key = $1 AND imdb_id = $2 FOR UPDATE",
            COUPLE_MOVIE_COLUMNS
        );
        let Some(mut movie) = sqlx::query_as::<_, CoupleMovie>(&sql)
            .bind(couple_key)
            .bind(imdb_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };
        movie.apply_rating(user_id, rating);

        let sql = format!(
            r#"
            UPDATE couple_movies SET
                watch_status = $2,
                user1_id     = $3,
                user1_rating = $4,
                user2_id     = $5,
                user2_rating = $6
            WHERE id = $1
            RETURNING {}
            "#,
            COUPLE_MOVIE_COLUMNS
        );
        let rated = sqlx::query_as::<_, CoupleMovie>(&sql)
            .bind(movie.id)
            .bind(movie.watch_status.as_str())
            .bind(movie.user1_id)
            .bind(movie.user1_rating)
            .bind(movie.user2_id)
            .bind(movie.user2_rating)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(rated))
    }

    async fn delete(&self, couple_key: &str, imdb_id: &str) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM couple_movies WHERE couple_key = $1 AND imdb_id = $2")
            .bind(couple_key)
            .bind(imdb_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
