use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    state::AppState,
};

pub mod auth;
pub mod couple;
pub mod couple_movies;
pub mod emotions;
pub mod favorites;
pub mod movies;
pub mod oauth;
pub mod user_movies;

/// `{"message": ...}` body used by endpoints that only confirm an action
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.frontend_url);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(frontend_url, "Frontend URL is not a valid origin, allowing any");
            CorsLayer::permissive()
        }
    }
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/authenticate", post(auth::authenticate))
        .route("/auth/me", get(auth::me).put(auth::update_me))
        .route("/auth/reset-password", post(auth::change_password))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/resend-verification", post(auth::resend_verification))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password-token", post(auth::reset_password_with_token))
        .route("/oauth2/authorize/google", get(oauth::authorize))
        .route("/oauth2/callback/google", get(oauth::callback))
        .route("/couple/invite", post(couple::invite))
        .route("/couple/invites", get(couple::received))
        .route("/couple/invites/sent", get(couple::sent))
        .route("/couple/accept/:id", post(couple::accept))
        .route("/couple/reject/:id", post(couple::reject))
        .route("/couple/partner", get(couple::partner).delete(couple::unpair))
        .route(
            "/couple/movies",
            get(couple_movies::list).post(couple_movies::add),
        )
        .route("/couple/movies/stats", get(couple_movies::stats))
        .route("/couple/movies/check/:imdb_id", get(couple_movies::check))
        .route(
            "/couple/movies/:imdb_id",
            delete(couple_movies::remove).patch(couple_movies::update_status),
        )
        .route("/couple/movies/:imdb_id/rate", post(couple_movies::rate))
        .route("/favorites", get(favorites::list).post(favorites::add))
        .route("/favorites/:imdb_id", delete(favorites::remove))
        .route("/favorites/check/:imdb_id", get(favorites::check))
        .route("/user/movies", get(user_movies::list))
        .route("/user/movies/watchlist", get(user_movies::watchlist))
        .route("/user/movies/shared-watchlist", get(user_movies::shared_watchlist))
        .route("/user/movies/:imdb_id/status", post(user_movies::update_status))
        .route("/user/movies/:imdb_id/rate", post(user_movies::rate))
        .route("/movies/search", get(movies::search))
        .route("/movies/search-all", get(movies::search_all))
        .route("/movies/advanced-search", get(movies::advanced_search))
        .route("/movies/by-genres", get(movies::by_genres))
        .route("/movies/by-emotion", get(movies::by_emotion))
        .route("/movies/by-emotions", get(movies::by_emotions))
        .route("/movies/filter", get(movies::filter))
        .route("/movies/random", get(movies::random))
        .route("/movies/batch-ratings", post(movies::batch_ratings))
        .route("/movies/:imdb_id", get(movies::details))
        .route("/emotions", get(emotions::all))
        .route("/emotions/genres", get(emotions::genres))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
