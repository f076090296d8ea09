use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::EmotionGenreMap, state::AppState};

#[derive(Debug, Deserialize)]
pub struct EmotionQuery {
    emotion: String,
}

#[derive(Debug, Serialize)]
pub struct EmotionGenres {
    pub emotion: String,
    pub genres: Vec<String>,
}

pub async fn all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<EmotionGenreMap>>> {
    Ok(Json(state.emotions.all().await?))
}

pub async fn genres(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmotionQuery>,
) -> Json<EmotionGenres> {
    let genres = state.emotions.genres_for_emotion(&query.emotion).await;
    Json(EmotionGenres {
        emotion: query.emotion,
        genres,
    })
}
