use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{Movie, OmdbSearchResponse},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    title: String,
}

#[derive(Debug, Deserialize)]
pub struct AdvancedQuery {
    query: String,
}

#[derive(Debug, Deserialize)]
pub struct GenresQuery {
    genres: String,
}

#[derive(Debug, Deserialize)]
pub struct EmotionQuery {
    emotion: String,
}

#[derive(Debug, Deserialize)]
pub struct EmotionsQuery {
    emotions: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    genres: Option<String>,
    emotions: Option<String>,
    #[serde(default)]
    nostalgic: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchRatingsRequest {
    #[serde(default)]
    ids: Vec<String>,
}

/// Split a comma-separated query value, dropping blank entries
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<OmdbSearchResponse>> {
    Ok(Json(state.movies.search(&query.title).await?))
}

pub async fn search_all(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<OmdbSearchResponse>> {
    Ok(Json(state.movies.search_all(&query.title).await?))
}

pub async fn advanced_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdvancedQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.movies.advanced_search(&query.query).await?))
}

pub async fn by_genres(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenresQuery>,
) -> Json<Vec<Movie>> {
    let genres = split_list(Some(&query.genres));
    Json(state.movies.by_genres(&genres).await)
}

pub async fn by_emotion(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmotionQuery>,
) -> Json<Vec<Movie>> {
    Json(state.movies.by_emotion(&query.emotion).await)
}

pub async fn by_emotions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmotionsQuery>,
) -> Json<Vec<Movie>> {
    let emotions = split_list(Some(&query.emotions));
    Json(state.movies.by_emotions(&emotions).await)
}

pub async fn filter(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Json<Vec<Movie>> {
    let genres = split_list(query.genres.as_deref());
    let emotions = split_list(query.emotions.as_deref());
    Json(state.movies.filter(&genres, &emotions, query.nostalgic).await)
}

pub async fn random(State(state): State<Arc<AppState>>) -> AppResult<Json<Movie>> {
    Ok(Json(state.movies.random().await?))
}

pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.movies.details(&imdb_id).await?))
}

pub async fn batch_ratings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRatingsRequest>,
) -> AppResult<Json<HashMap<String, Option<f64>>>> {
    Ok(Json(state.movies.batch_ratings(request.ids).await?))
}
