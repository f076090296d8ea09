use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{CoupleMovieView, CoupleStats, CoupleWatchStatus, SaveMovieRequest},
    routes::MessageResponse,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    watch_status: CoupleWatchStatus,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AddedResponse {
    pub id: i64,
    pub imdb_id: String,
    pub title: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub imdb_id: String,
    pub watch_status: CoupleWatchStatus,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RatedResponse {
    pub imdb_id: String,
    pub your_rating: Option<f64>,
    pub watch_status: CoupleWatchStatus,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub in_list: bool,
    pub is_match: bool,
    pub watch_status: Option<CoupleWatchStatus>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<CoupleMovieView>>> {
    Ok(Json(state.couple_movies.list(&user).await?))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<SaveMovieRequest>,
) -> AppResult<Json<AddedResponse>> {
    let movie = state.couple_movies.add(&user, request).await?;
    Ok(Json(AddedResponse {
        id: movie.id,
        imdb_id: movie.imdb_id,
        title: movie.title,
        message: "Added to shared favorites",
    }))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.couple_movies.remove(&user, &imdb_id).await?;
    Ok(MessageResponse::new("Removed from shared favorites"))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(imdb_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> AppResult<Json<StatusResponse>> {
    let movie = state
        .couple_movies
        .update_status(&user, &imdb_id, request.watch_status)
        .await?;
    Ok(Json(StatusResponse {
        imdb_id: movie.imdb_id,
        watch_status: movie.watch_status,
        message: "Updated successfully",
    }))
}

pub async fn rate(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(imdb_id): Path<String>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<RatedResponse>> {
    let movie = state
        .couple_movies
        .rate(&user, &imdb_id, request.rating)
        .await?;
    let (your_rating, _) = movie.ratings_for(user.id);
    Ok(Json(RatedResponse {
        imdb_id: movie.imdb_id,
        your_rating,
        watch_status: movie.watch_status,
        message: "Rated successfully",
    }))
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<CoupleStats>> {
    Ok(Json(state.couple_movies.stats(&user).await?))
}

pub async fn check(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<CheckResponse>> {
    let movie = state.couple_movies.check(&user, &imdb_id).await?;
    Ok(Json(CheckResponse {
        in_list: movie.is_some(),
        is_match: movie.as_ref().map(|m| m.is_match()).unwrap_or(false),
        watch_status: movie.map(|m| m.watch_status),
    }))
}
