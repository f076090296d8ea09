use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::{AuthUser, MaybeAuthUser},
    models::{Favorite, SaveMovieRequest},
    routes::MessageResponse,
    services::AddFavorite,
    state::AppState,
};

pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<Favorite>>> {
    Ok(Json(state.favorites.list(&user).await?))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<SaveMovieRequest>,
) -> AppResult<Json<Value>> {
    let body = match state.favorites.add(&user, request).await? {
        AddFavorite::AlreadyFavorited => json!({ "message": "Already favorited" }),
        AddFavorite::Added(favorite) => json!({
            "id": favorite.id,
            "imdb_id": favorite.imdb_id,
            "title": favorite.title,
            "message": "Added to favorites",
        }),
    };
    Ok(Json(body))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.favorites.remove(&user, &imdb_id).await?;
    Ok(MessageResponse::new("Removed from favorites"))
}

pub async fn check(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<Value>> {
    let is_favorite = state.favorites.is_favorite(user.as_ref(), &imdb_id).await?;
    Ok(Json(json!({ "is_favorite": is_favorite })))
}
