use std::sync::Arc;

use crate::{
    db::CoupleMovieRepository,
    error::{AppError, AppResult},
    models::{
        couple_key, CoupleMovie, CoupleMovieView, CoupleStats, CoupleWatchStatus, NewCoupleMovie,
        SaveMovieRequest, User,
    },
    services::couple::NO_PARTNER,
};

pub const MIN_COUPLE_RATING: f64 = 0.5;
pub const MAX_COUPLE_RATING: f64 = 5.0;

const NOT_IN_LIST: &str = "Movie not found in shared list";

fn not_in_list() -> AppError {
    AppError::NotFound(NOT_IN_LIST.to_string())
}

/// The couple key of a paired user
fn key_for(user: &User) -> AppResult<String> {
    user.partner_id
        .map(|partner_id| couple_key(user.id, partner_id))
        .ok_or_else(|| AppError::InvalidInput(NO_PARTNER.to_string()))
}

/// Shared watchlist of a couple, addressed by couple key
#[derive(Clone)]
pub struct CoupleMovieService {
    movies: Arc<dyn CoupleMovieRepository>,
}

impl CoupleMovieService {
    pub fn new(movies: Arc<dyn CoupleMovieRepository>) -> Self {
        Self { movies }
    }

    pub async fn list(&self, user: &User) -> AppResult<Vec<CoupleMovieView>> {
        let key = key_for(user)?;
        let movies = self.movies.list(&key).await?;
        Ok(movies
            .iter()
            .map(|m| CoupleMovieView::for_user(m, user.id))
            .collect())
    }

    /// Add a movie from the caller's side. Adding one the partner already
    /// added makes it a match.
    #[tracing::instrument(skip(self, user, request), fields(user_id = user.id))]
    pub async fn add(&self, user: &User, request: SaveMovieRequest) -> AppResult<CoupleMovie> {
        let key = key_for(user)?;
        let imdb_id = request.require_imdb_id()?;

        let saved = self
            .movies
            .add(NewCoupleMovie {
                couple_key: key.clone(),
                imdb_id,
                title: request.title.unwrap_or_default(),
                poster: request.poster.unwrap_or_default(),
                year: request.year.unwrap_or_default(),
                genre: request.genre.unwrap_or_default(),
                added_by_user_id: user.id,
            })
            .await?;
        if saved.is_match() {
            tracing::info!(couple_key = %key, imdb_id = %saved.imdb_id, "Shared movie is now a match");
        } else {
            tracing::info!(couple_key = %key, imdb_id = %saved.imdb_id, "Added shared movie");
        }
        Ok(saved)
    }

    pub async fn remove(&self, user: &User, imdb_id: &str) -> AppResult<()> {
        let key = key_for(user)?;
        if !self.movies.delete(&key, imdb_id).await? {
            tracing::debug!(couple_key = %key, imdb_id, "Shared movie was not in the list");
        }
        Ok(())
    }

    pub async fn update_status(
        &self,
        user: &User,
        imdb_id: &str,
        status: CoupleWatchStatus,
    ) -> AppResult<CoupleMovie> {
        let key = key_for(user)?;
        self.movies
            .set_status(&key, imdb_id, status)
            .await?
            .ok_or_else(not_in_list)
    }

    /// Rate on the caller's slot; rating marks the movie watched
    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn rate(&self, user: &User, imdb_id: &str, rating: Option<f64>) -> AppResult<CoupleMovie> {
        let rating =
            rating.ok_or_else(|| AppError::InvalidInput("rating is required".to_string()))?;
        if !(MIN_COUPLE_RATING..=MAX_COUPLE_RATING).contains(&rating) {
            return Err(AppError::InvalidInput(
                "Rating must be between 0.5 and 5".to_string(),
            ));
        }
        let key = key_for(user)?;
        self.movies
            .rate(&key, imdb_id, user.id, rating)
            .await?
            .ok_or_else(not_in_list)
    }

    pub async fn stats(&self, user: &User) -> AppResult<CoupleStats> {
        let key = key_for(user)?;
        let movies = self.movies.list(&key).await?;
        Ok(CoupleStats::from_movies(&movies))
    }

    pub async fn check(&self, user: &User, imdb_id: &str) -> AppResult<Option<CoupleMovie>> {
        let key = key_for(user)?;
        self.movies.find(&key, imdb_id).await
    }
}
