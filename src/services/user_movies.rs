use std::{collections::HashSet, sync::Arc};

use crate::{
    db::UserMovieRepository,
    error::{AppError, AppResult},
    models::{Movie, MovieStatus, User, UserMovieStatus},
    services::movies::MovieService,
};

pub const MIN_USER_RATING: i32 = 1;
pub const MAX_USER_RATING: i32 = 10;
pub const MAX_REVIEW_LEN: usize = 1000;

/// Personal watch status, ratings and reviews
#[derive(Clone)]
pub struct UserMovieService {
    statuses: Arc<dyn UserMovieRepository>,
    movies: MovieService,
}

impl UserMovieService {
    pub fn new(statuses: Arc<dyn UserMovieRepository>, movies: MovieService) -> Self {
        Self { statuses, movies }
    }

    pub async fn list(&self, user: &User) -> AppResult<Vec<UserMovieStatus>> {
        self.statuses.list(user.id).await
    }

    pub async fn update_status(
        &self,
        user: &User,
        imdb_id: &str,
        status: MovieStatus,
    ) -> AppResult<UserMovieStatus> {
        let row = self.statuses.upsert_status(user.id, imdb_id, status).await?;
        self.movies.ensure_cached(imdb_id);
        tracing::debug!(user_id = user.id, imdb_id, status = status.as_str(), "Status updated");
        Ok(row)
    }

    pub async fn rate(
        &self,
        user: &User,
        imdb_id: &str,
        rating: Option<i32>,
        review: Option<String>,
    ) -> AppResult<UserMovieStatus> {
        let rating =
            rating.ok_or_else(|| AppError::InvalidInput("rating is required".to_string()))?;
        if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&rating) {
            return Err(AppError::InvalidInput(
                "Rating must be between 1 and 10".to_string(),
            ));
        }
        if review
            .as_deref()
            .map(|r| r.chars().count() > MAX_REVIEW_LEN)
            .unwrap_or(false)
        {
            return Err(AppError::InvalidInput(
                "Review must be at most 1000 characters".to_string(),
            ));
        }

        let row = self
            .statuses
            .upsert_rating(user.id, imdb_id, rating, review)
            .await?;
        self.movies.ensure_cached(imdb_id);
        Ok(row)
    }

    pub async fn watchlist(&self, user: &User) -> AppResult<Vec<UserMovieStatus>> {
        self.statuses
            .with_status(user.id, MovieStatus::PlanToWatch)
            .await
    }

    /// Movies both partners plan to watch, in the caller's order
    pub async fn shared_watchlist(&self, user: &User) -> AppResult<Vec<Movie>> {
        let Some(partner_id) = user.partner_id else {
            return Ok(Vec::new());
        };

        let partner_ids: HashSet<String> = self
            .statuses
            .with_status(partner_id, MovieStatus::PlanToWatch)
            .await?
            .into_iter()
            .map(|s| s.imdb_id)
            .collect();
        let shared: Vec<String> = self
            .watchlist(user)
            .await?
            .into_iter()
            .map(|s| s.imdb_id)
            .filter(|id| partner_ids.contains(id))
            .collect();

        self.movies.hydrate(shared).await
    }
}
