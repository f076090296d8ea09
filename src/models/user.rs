use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    /// Argon2 PHC string; `None` for accounts created through Google sign-in
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub partner_id: Option<i64>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
    }
}

/// Fields required to insert a new account
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
}

/// Profile returned to clients; never exposes credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub full_name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
    pub created_date: DateTime<Utc>,
    pub is_verified: bool,
    pub partner_id: Option<i64>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            firstname: user.first_name.clone().unwrap_or_default(),
            lastname: user.last_name.clone().unwrap_or_default(),
            full_name: user.full_name(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
            username: user.username.clone(),
            created_date: user.created_at,
            is_verified: user.is_verified,
            partner_id: user.partner_id,
        }
    }
}

/// Purpose of a one-time emailed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    VerifyEmail,
    ResetPassword,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::VerifyEmail => "VERIFY_EMAIL",
            TokenType::ResetPassword => "RESET_PASSWORD",
        }
    }
}

impl TryFrom<String> for TokenType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "VERIFY_EMAIL" => Ok(TokenType::VerifyEmail),
            "RESET_PASSWORD" => Ok(TokenType::ResetPassword),
            other => Err(format!("unknown token type: {}", other)),
        }
    }
}

/// One-time token for email verification or password reset
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AuthToken {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthToken {
    pub token: String,
    pub user_id: i64,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
}
