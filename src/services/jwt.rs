use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

const OAUTH_STATE_AUDIENCE: &str = "oauth2-state";
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Account email
    pub sub: String,
    pub uid: i64,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    nonce: String,
    aud: String,
    exp: i64,
}

/// HS256 signing keys for access tokens and OAuth2 state values
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: i64, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            uid: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }

    /// Signed, short-lived OAuth2 `state` value
    pub fn issue_state(&self) -> AppResult<String> {
        let claims = StateClaims {
            nonce: uuid::Uuid::new_v4().to_string(),
            aud: OAUTH_STATE_AUDIENCE.to_string(),
            exp: (Utc::now() + Duration::minutes(OAUTH_STATE_TTL_MINUTES)).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify_state(&self, state: &str) -> AppResult<()> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[OAUTH_STATE_AUDIENCE]);
        decode::<StateClaims>(state, &self.decoding, &validation)?;
        Ok(())
    }
}
