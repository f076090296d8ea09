use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{CoupleRequest, UserProfile},
    routes::MessageResponse,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct InviteQuery {
    email: Option<String>,
}

pub async fn invite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<InviteQuery>,
) -> AppResult<Json<CoupleRequest>> {
    Ok(Json(state.couples.invite(&user, query.email).await?))
}

pub async fn received(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<CoupleRequest>>> {
    Ok(Json(state.couples.received(&user).await?))
}

pub async fn sent(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<CoupleRequest>>> {
    Ok(Json(state.couples.sent(&user).await?))
}

pub async fn accept(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.couples.accept(&user, id).await?;
    Ok(MessageResponse::new("Invite accepted"))
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.couples.reject(&user, id).await?;
    Ok(MessageResponse::new("Invite rejected"))
}

pub async fn partner(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<UserProfile>> {
    let partner = state.couples.partner(&user).await?;
    Ok(Json(UserProfile::from(&partner)))
}

pub async fn unpair(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<MessageResponse>> {
    state.couples.unpair(&user).await?;
    Ok(MessageResponse::new("Partner removed"))
}
