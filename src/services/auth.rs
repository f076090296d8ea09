use std::sync::Arc;

use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    db::{ProfileChanges, TokenRepository, UserRepository},
    error::{AppError, AppResult},
    models::{
        auth::{
            normalize_email, validate_username, AuthenticationRequest, AuthenticationResponse,
            ChangePasswordRequest, RegisterRequest, ResetWithTokenRequest, UpdateProfileRequest,
            MIN_RESET_PASSWORD_LEN,
        },
        AuthToken, NewAuthToken, NewUser, Role, TokenType, User,
    },
    services::{
        email::EmailService,
        jwt::JwtKeys,
        oauth::OAuthProfile,
        password::{hash_password, verify_password},
    },
};

const VERIFY_EMAIL_TTL_HOURS: i64 = 24;
const RESET_PASSWORD_TTL_HOURS: i64 = 1;

fn required(value: Option<String>, message: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(message.to_string()))
}

/// Accounts, credentials and emailed one-time tokens
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    jwt: JwtKeys,
    email: EmailService,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        jwt: JwtKeys,
        email: EmailService,
    ) -> Self {
        Self {
            users,
            tokens,
            jwt,
            email,
        }
    }

    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }

    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, mut request: RegisterRequest) -> AppResult<AuthenticationResponse> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        let email = request.email.clone();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
        if self
            .users
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let user = self
            .users
            .create(NewUser {
                email,
                username: Some(request.username),
                password_hash: Some(hash_password(&request.password)?),
                first_name: Some(request.first_name),
                last_name: Some(request.last_name),
                role: Role::User,
                google_id: None,
                avatar_url: None,
                is_verified: false,
            })
            .await?;
        tracing::info!(user_id = user.id, "User registered");

        let token = self
            .issue_token(user.id, TokenType::VerifyEmail, VERIFY_EMAIL_TTL_HOURS)
            .await?;
        self.email.send_verification(&user.email, &token).await;

        Ok(AuthenticationResponse {
            token: self.jwt.issue(user.id, &user.email)?,
        })
    }

    pub async fn authenticate(
        &self,
        request: AuthenticationRequest,
    ) -> AppResult<AuthenticationResponse> {
        let rejected = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or_else(rejected)?;
        let hash = user.password_hash.as_deref().ok_or_else(rejected)?;
        if !verify_password(&request.password, hash) {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(rejected());
        }

        Ok(AuthenticationResponse {
            token: self.jwt.issue(user.id, &user.email)?,
        })
    }

    /// Resolve a bearer token to its user
    pub async fn user_from_token(&self, token: &str) -> AppResult<User> {
        let claims = self
            .jwt
            .verify(token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
        self.users
            .find_by_id(claims.uid)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))
    }

    pub async fn update_profile(&self, user: &User, request: UpdateProfileRequest) -> AppResult<User> {
        if let Some(username) = request.username.as_deref() {
            validate_username(username).map_err(|e| {
                AppError::InvalidInput(
                    e.message
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Username is invalid".to_string()),
                )
            })?;
            if let Some(owner) = self.users.find_by_username(username).await? {
                if owner.id != user.id {
                    return Err(AppError::Conflict("Username is already taken".to_string()));
                }
            }
        }

        self.users
            .update_profile(
                user.id,
                ProfileChanges {
                    first_name: request.firstname,
                    last_name: request.lastname,
                    username: request.username,
                    avatar_url: request.avatar_url,
                },
            )
            .await
    }

    /// Change the password of a signed-in user who knows the current one
    pub async fn change_password(&self, user: &User, request: ChangePasswordRequest) -> AppResult<()> {
        let (current, new) = match (request.current_password, request.new_password) {
            (Some(current), Some(new)) if !new.trim().is_empty() => (current, new),
            _ => {
                return Err(AppError::InvalidInput(
                    "Current password and new password are required".to_string(),
                ))
            }
        };

        let hash = user.password_hash.as_deref().ok_or_else(|| {
            AppError::InvalidInput("Cannot reset password for Google-only accounts".to_string())
        })?;
        if !verify_password(&current, hash) {
            return Err(AppError::InvalidInput(
                "Current password is incorrect".to_string(),
            ));
        }
        if new.chars().count() < MIN_RESET_PASSWORD_LEN {
            return Err(AppError::InvalidInput(
                "New password must be at least 6 characters".to_string(),
            ));
        }

        self.users
            .update_password(user.id, hash_password(&new)?)
            .await?;
        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    pub async fn verify_email(&self, token: Option<String>) -> AppResult<()> {
        let token = required(token, "Token is required")?;
        let auth_token = self.load_token(&token, TokenType::VerifyEmail).await?;

        self.users.mark_verified(auth_token.user_id).await?;
        self.tokens.delete(auth_token.id).await?;
        tracing::info!(user_id = auth_token.user_id, "Email verified");
        Ok(())
    }

    /// Replace any outstanding verification tokens with a fresh one
    pub async fn resend_verification(&self, email: Option<String>) -> AppResult<()> {
        let user = self.user_by_email(email).await?;
        if user.is_verified {
            return Err(AppError::InvalidInput(
                "User is already verified".to_string(),
            ));
        }

        self.tokens
            .delete_for_user(user.id, TokenType::VerifyEmail)
            .await?;
        let token = self
            .issue_token(user.id, TokenType::VerifyEmail, VERIFY_EMAIL_TTL_HOURS)
            .await?;
        self.email.send_verification(&user.email, &token).await;
        Ok(())
    }

    pub async fn forgot_password(&self, email: Option<String>) -> AppResult<()> {
        let user = self.user_by_email(email).await?;
        let token = self
            .issue_token(user.id, TokenType::ResetPassword, RESET_PASSWORD_TTL_HOURS)
            .await?;
        self.email.send_password_reset(&user.email, &token).await;
        Ok(())
    }

    pub async fn reset_password_with_token(&self, request: ResetWithTokenRequest) -> AppResult<()> {
        let (token, new_password) = match (request.token, request.new_password) {
            (Some(token), Some(new))
                if !token.trim().is_empty() && !new.trim().is_empty() =>
            {
                (token, new)
            }
            _ => {
                return Err(AppError::InvalidInput(
                    "Token and new password are required".to_string(),
                ))
            }
        };
        if new_password.chars().count() < MIN_RESET_PASSWORD_LEN {
            return Err(AppError::InvalidInput(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let auth_token = self.load_token(&token, TokenType::ResetPassword).await?;
        self.users
            .update_password(auth_token.user_id, hash_password(&new_password)?)
            .await?;
        self.tokens.delete(auth_token.id).await?;
        tracing::info!(user_id = auth_token.user_id, "Password reset with emailed token");
        Ok(())
    }

    /// Find or create the account behind an OAuth2 identity and sign it in
    pub async fn oauth_login(&self, profile: OAuthProfile) -> AppResult<String> {
        let email = profile
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Google account has no email address".to_string())
            })?;

        let user = match self.users.find_by_email(&email).await? {
            Some(existing) if existing.google_id.is_none() => {
                tracing::info!(user_id = existing.id, "Linking Google account to existing user");
                self.users
                    .link_google(existing.id, profile.sub, profile.picture)
                    .await?
            }
            Some(existing) => existing,
            None => {
                let created = self
                    .users
                    .create(NewUser {
                        email,
                        username: None,
                        password_hash: None,
                        first_name: profile.given_name,
                        last_name: profile.family_name,
                        role: Role::User,
                        google_id: Some(profile.sub),
                        avatar_url: profile.picture,
                        is_verified: profile.email_verified,
                    })
                    .await?;
                tracing::info!(user_id = created.id, "User created from Google sign-in");
                created
            }
        };

        self.jwt.issue(user.id, &user.email)
    }

    async fn user_by_email(&self, email: Option<String>) -> AppResult<User> {
        let email = required(email, "Email is required")?;
        self.users
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn issue_token(&self, user_id: i64, token_type: TokenType, ttl_hours: i64) -> AppResult<String> {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens
            .create(NewAuthToken {
                token: token.clone(),
                user_id,
                token_type,
                expires_at: Utc::now() + Duration::hours(ttl_hours),
            })
            .await?;
        Ok(token)
    }

    async fn load_token(&self, token: &str, expected: TokenType) -> AppResult<AuthToken> {
        let auth_token = self
            .tokens
            .find(token)
            .await?
            .ok_or_else(|| AppError::InvalidInput("Invalid token".to_string()))?;

        if auth_token.token_type != expected {
            return Err(AppError::InvalidInput("Invalid token type".to_string()));
        }
        if auth_token.is_expired(Utc::now()) {
            return Err(AppError::InvalidInput("Token expired".to_string()));
        }
        Ok(auth_token)
    }
}
