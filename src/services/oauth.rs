use reqwest::{Client as HttpClient, Url};
use serde::Deserialize;

use crate::{
    config::GoogleOAuthConfig,
    error::{AppError, AppResult},
};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPES: &str = "openid email profile";

/// Identity returned by the provider's userinfo endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OAuthProfile {
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// An OAuth2 authorization-code provider
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page URL carrying the given `state`
    fn authorization_url(&self, state: &str) -> AppResult<String>;

    /// Trade an authorization code for the user's profile
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthProfile>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleOAuthClient {
    http_client: HttpClient,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            http_client: HttpClient::new(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> AppResult<String> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", GOOGLE_SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Internal(format!("Invalid authorization URL: {}", e)))?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> AppResult<OAuthProfile> {
        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Google token exchange failed");
            return Err(AppError::Unauthorized(
                "Google sign-in failed".to_string(),
            ));
        }

        let token: TokenResponse = response.json().await?;

        let response = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Google userinfo returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
