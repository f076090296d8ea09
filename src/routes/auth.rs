use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{
        auth::{
            AuthenticationRequest, AuthenticationResponse, ChangePasswordRequest, EmailRequest,
            RegisterRequest, ResetWithTokenRequest, TokenRequest, UpdateProfileRequest,
        },
        UserProfile,
    },
    routes::MessageResponse,
    state::AppState,
};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<AuthenticationResponse>> {
    Ok(Json(state.auth.register(request).await?))
}

pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AuthenticationRequest>,
) -> AppResult<Json<AuthenticationResponse>> {
    Ok(Json(state.auth.authenticate(request).await?))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    let updated = state.auth.update_profile(&user, request).await?;
    Ok(Json(UserProfile::from(&updated)))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.change_password(&user, request).await?;
    Ok(MessageResponse::new("Password updated successfully"))
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.verify_email(request.token).await?;
    Ok(MessageResponse::new("Email verified successfully"))
}

pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.resend_verification(request.email).await?;
    Ok(MessageResponse::new("Verification email sent"))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.forgot_password(request.email).await?;
    Ok(MessageResponse::new("Password reset email sent"))
}

pub async fn reset_password_with_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetWithTokenRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.reset_password_with_token(request).await?;
    Ok(MessageResponse::new("Password reset successfully"))
}
