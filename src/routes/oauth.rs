use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::IdentityProvider,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn provider(state: &AppState) -> AppResult<&Arc<dyn IdentityProvider>> {
    state
        .identity
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Google sign-in is not configured".to_string()))
}

/// Send the browser to Google's consent page
pub async fn authorize(State(state): State<Arc<AppState>>) -> AppResult<Redirect> {
    let provider = provider(&state)?;
    let oauth_state = state.auth.jwt().issue_state()?;
    Ok(Redirect::to(&provider.authorization_url(&oauth_state)?))
}

/// Finish the code flow and hand the JWT to the frontend
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Redirect> {
    let provider = provider(&state)?;
    if let Some(error) = query.error {
        tracing::warn!(%error, "Google sign-in was not completed");
        return Err(AppError::Unauthorized(format!("Google sign-in failed: {}", error)));
    }

    let oauth_state = query
        .state
        .ok_or_else(|| AppError::Unauthorized("Missing OAuth2 state".to_string()))?;
    state
        .auth
        .jwt()
        .verify_state(&oauth_state)
        .map_err(|_| AppError::Unauthorized("Invalid OAuth2 state".to_string()))?;
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    let profile = provider.exchange_code(&code).await?;
    let token = state.auth.oauth_login(profile).await?;
    Ok(Redirect::to(&format!(
        "{}/oauth2/redirect?token={}",
        state.frontend_url, token
    )))
}
