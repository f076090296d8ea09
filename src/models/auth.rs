use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const MIN_RESET_PASSWORD_LEN: usize = 6;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::from(message))
}

fn is_ascii_letters(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn validate_first_name(value: &str) -> Result<(), ValidationError> {
    if is_ascii_letters(value) {
        Ok(())
    } else {
        Err(invalid("first_name", "First name must contain only letters"))
    }
}

pub fn validate_last_name(value: &str) -> Result<(), ValidationError> {
    if is_ascii_letters(value) {
        Ok(())
    } else {
        Err(invalid("last_name", "Last name must contain only letters"))
    }
}

/// A letter followed by at least three letters or digits
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    let mut chars = value.chars();
    let starts_with_letter = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric());
    if starts_with_letter && rest_ok && value.len() >= 4 {
        Ok(())
    } else {
        Err(invalid(
            "username",
            "Username must start with a letter, be at least 4 characters long, and contain no special characters",
        ))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_first_name"))]
    pub first_name: String,
    #[validate(custom(function = "validate_last_name"))]
    pub last_name: String,
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticationResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub avatar_url: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetWithTokenRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// Trimmed, lowercased email used for lookups and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
