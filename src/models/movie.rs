use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::omdb::{OmdbMovieDetails, OmdbMovieSummary};
use crate::error::AppError;

/// Minimum IMDb rating (exclusive) for a movie to count as nostalgic
pub const NOSTALGIC_MIN_RATING: f64 = 9.0;

/// How many years old a movie must be to count as nostalgic
pub const NOSTALGIC_MIN_AGE_YEARS: i32 = 10;

/// A movie in the local cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub movie_type: Option<String>,
    pub poster: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub imdb_rating: Option<f64>,
}

impl Movie {
    /// Leading four-digit year, if the year field has one ("1999", "2010–2015")
    pub fn release_year(&self) -> Option<i32> {
        let year = self.year.as_deref()?;
        year.get(..4)?.parse().ok()
    }

    pub fn is_nostalgic(&self, current_year: i32) -> bool {
        let rated = self
            .imdb_rating
            .map(|r| r > NOSTALGIC_MIN_RATING)
            .unwrap_or(false);
        let old_enough = self
            .release_year()
            .map(|y| y <= current_year - NOSTALGIC_MIN_AGE_YEARS)
            .unwrap_or(false);
        rated && old_enough
    }
}

/// Filter movies down to the nostalgic ones as of today
pub fn nostalgic(movies: Vec<Movie>) -> Vec<Movie> {
    let current_year = Utc::now().year();
    movies
        .into_iter()
        .filter(|m| m.is_nostalgic(current_year))
        .collect()
}

/// OMDb reports missing ratings as "N/A"; those and anything unparsable become 0.0
pub fn parse_imdb_rating(raw: Option<&str>) -> f64 {
    match raw {
        Some(value) if value != "N/A" => value.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

impl From<&OmdbMovieDetails> for Movie {
    fn from(details: &OmdbMovieDetails) -> Self {
        Self {
            imdb_id: details.imdb_id.clone(),
            title: details.title.clone(),
            year: details.year.clone(),
            movie_type: details.movie_type.clone(),
            poster: details.poster.clone(),
            genre: details.genre.clone(),
            director: details.director.clone(),
            plot: details.plot.clone(),
            imdb_rating: Some(parse_imdb_rating(details.imdb_rating.as_deref())),
        }
    }
}

impl From<&OmdbMovieSummary> for Movie {
    fn from(summary: &OmdbMovieSummary) -> Self {
        Self {
            imdb_id: summary.imdb_id.clone(),
            title: summary.title.clone(),
            year: summary.year.clone(),
            movie_type: summary.movie_type.clone(),
            poster: summary.poster.clone(),
            genre: None,
            director: None,
            plot: None,
            imdb_rating: None,
        }
    }
}

/// Document stored in the `movies` search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDocument {
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl From<&Movie> for MovieDocument {
    fn from(movie: &Movie) -> Self {
        Self {
            imdb_id: movie.imdb_id.clone(),
            title: movie.title.clone(),
            year: movie.year.clone(),
            genre: movie.genre.clone(),
        }
    }
}

/// A per-user favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub imdb_id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub genre: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub user_id: i64,
    pub imdb_id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub genre: String,
}

/// Movie fields a client sends when saving a favorite or a shared movie
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveMovieRequest {
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub poster: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
}

impl SaveMovieRequest {
    /// The trimmed IMDb id, or `InvalidInput` when it is missing
    pub fn require_imdb_id(&self) -> Result<String, AppError> {
        self.imdb_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("imdb_id is required".to_string()))
    }
}

/// Personal watch status of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovieStatus {
    PlanToWatch,
    Watching,
    Watched,
    Dropped,
}

impl MovieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::PlanToWatch => "PLAN_TO_WATCH",
            MovieStatus::Watching => "WATCHING",
            MovieStatus::Watched => "WATCHED",
            MovieStatus::Dropped => "DROPPED",
        }
    }
}

impl TryFrom<String> for MovieStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "PLAN_TO_WATCH" => Ok(MovieStatus::PlanToWatch),
            "WATCHING" => Ok(MovieStatus::Watching),
            "WATCHED" => Ok(MovieStatus::Watched),
            "DROPPED" => Ok(MovieStatus::Dropped),
            other => Err(format!("unknown movie status: {}", other)),
        }
    }
}

/// A user's status, rating and review for one movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserMovieStatus {
    pub id: i64,
    pub user_id: i64,
    pub imdb_id: String,
    #[sqlx(try_from = "String")]
    pub status: MovieStatus,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Mood label mapped to the genres it suggests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmotionGenreMap {
    pub id: i64,
    pub emotion: String,
    pub genres: Vec<String>,
}
