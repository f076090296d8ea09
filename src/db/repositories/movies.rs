use sqlx::PgPool;

use crate::{error::AppResult, models::Movie};

const MOVIE_COLUMNS: &str =
    "imdb_id, title, year, movie_type, poster, genre, director, plot, imdb_rating";

/// The relational half of the local movie cache
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieRepository: Send + Sync {
    async fn find(&self, imdb_id: &str) -> AppResult<Option<Movie>>;
    /// Movies for the given ids; ids that are not cached are skipped
    async fn find_many(&self, imdb_ids: Vec<String>) -> AppResult<Vec<Movie>>;
    async fn existing_ids(&self, imdb_ids: Vec<String>) -> AppResult<Vec<String>>;
    /// Insert or fully replace one movie
    async fn upsert(&self, movie: Movie) -> AppResult<()>;
    /// Insert movies that are not cached yet; returns how many were written
    async fn insert_new(&self, movies: Vec<Movie>) -> AppResult<u64>;
    async fn random(&self) -> AppResult<Option<Movie>>;
    async fn rated_above(&self, min_rating: f64) -> AppResult<Vec<Movie>>;
}

pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MovieRepository for PgMovieRepository {
    async fn find(&self, imdb_id: &str) -> AppResult<Option<Movie>> {
        let sql = format!("SELECT {} FROM movies WHERE imdb_id = $1", MOVIE_COLUMNS);
        let movie = sqlx::query_as::<_, Movie>(&sql)
            .bind(imdb_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn find_many(&self, imdb_ids: Vec<String>) -> AppResult<Vec<Movie>> {
        if imdb_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM movies WHERE imdb_id = ANY($1)",
            MOVIE_COLUMNS
        );
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .bind(&imdb_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn existing_ids(&self, imdb_ids: Vec<String>) -> AppResult<Vec<String>> {
        if imdb_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = sqlx::query_scalar::<_, String>("SELECT imdb_id FROM movies WHERE imdb_id = ANY($1)")
            .bind(&imdb_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn upsert(&self, movie: Movie) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO movies
                (imdb_id, title, year, movie_type, poster, genre, director, plot, imdb_rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (imdb_id) DO UPDATE SET
                title       = EXCLUDED.title,
                year        = EXCLUDED.year,
                movie_type  = EXCLUDED.movie_type,
                poster      = EXCLUDED.poster,
                genre       = EXCLUDED.genre,
                director    = EXCLUDED.director,
                plot        = EXCLUDED.plot,
                imdb_rating = EXCLUDED.imdb_rating
            "#,
        )
        .bind(&movie.imdb_id)
        .bind(&movie.title)
        .bind(&movie.year)
        .bind(&movie.movie_type)
        .bind(&movie.poster)
        .bind(&movie.genre)
        .bind(&movie.director)
        .bind(&movie.plot)
        .bind(movie.imdb_rating)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_new(&self, movies: Vec<Movie>) -> AppResult<u64> {
        if movies.is_empty() {
            return Ok(0);
        }

        let mut ids = Vec::with_capacity(movies.len());
        let mut titles = Vec::with_capacity(movies.len());
        let mut years = Vec::with_capacity(movies.len());
        let mut types = Vec::with_capacity(movies.len());
        let mut posters = Vec::with_capacity(movies.len());
        for movie in movies {
            ids.push(movie.imdb_id);
            titles.push(movie.title);
            years.push(movie.year);
            types.push(movie.movie_type);
            posters.push(movie.poster);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO movies (imdb_id, title, year, movie_type, poster)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[], $5::text[])
            ON CONFLICT (imdb_id) DO NOTHING
            "#,
        )
        .bind(&ids)
        .bind(&titles)
        .bind(&years)
        .bind(&types)
        .bind(&posters)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(inserted)
    }

    async fn random(&self) -> AppResult<Option<Movie>> {
        let sql = format!(
            "SELECT {} FROM movies ORDER BY RANDOM() LIMIT 1",
            MOVIE_COLUMNS
        );
        let movie = sqlx::query_as::<_, Movie>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn rated_above(&self, min_rating: f64) -> AppResult<Vec<Movie>> {
        let sql = format!(
            "SELECT {} FROM movies WHERE imdb_rating > $1 ORDER BY imdb_rating DESC",
            MOVIE_COLUMNS
        );
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .bind(min_rating)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }
}
