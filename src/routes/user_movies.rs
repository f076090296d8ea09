use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{Movie, MovieStatus, UserMovieStatus},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    status: MovieStatus,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    rating: Option<i32>,
    review: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<UserMovieStatus>>> {
    Ok(Json(state.user_movies.list(&user).await?))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(imdb_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<UserMovieStatus>> {
    let row = state
        .user_movies
        .update_status(&user, &imdb_id, query.status)
        .await?;
    Ok(Json(row))
}

pub async fn rate(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(imdb_id): Path<String>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<UserMovieStatus>> {
    let row = state
        .user_movies
        .rate(&user, &imdb_id, request.rating, request.review)
        .await?;
    Ok(Json(row))
}

pub async fn watchlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<UserMovieStatus>>> {
    Ok(Json(state.user_movies.watchlist(&user).await?))
}

pub async fn shared_watchlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.user_movies.shared_watchlist(&user).await?))
}
