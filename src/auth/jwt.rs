//! JWT issue and validation.

use crate::config::ConfigLoadError;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens are valid for exactly one day from issuance.
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub name: String, // username
    #[serde(default)]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Signing secret, issuer and audience. Only constructible with all three present.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    issuer: String,
    audience: String,
}

impl JwtConfig {
    pub fn from_parts(
        secret: Option<String>,
        issuer: Option<String>,
        audience: Option<String>,
    ) -> Result<Self, ConfigLoadError> {
        fn required(value: Option<String>, var: &'static str) -> Result<String, ConfigLoadError> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigLoadError::Missing(var))
        }

        Ok(Self {
            secret: required(secret, "JWT_SECRET")?,
            issuer: required(issuer, "JWT_ISSUER")?,
            audience: required(audience, "JWT_AUDIENCE")?,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Produces and checks HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
        }
    }

    pub fn issue<I, S>(&self, user_name: &str, roles: I) -> AppResult<IssuedToken>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issue_at(Utc::now(), user_name, roles)
    }

    fn issue_at<I, S>(&self, now: DateTime<Utc>, user_name: &str, roles: I) -> AppResult<IssuedToken>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expires_at = now + Duration::seconds(TOKEN_LIFETIME_SECS);
        let claims = Claims {
            name: user_name.to_string(),
            role: roles.into_iter().map(Into::into).collect(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("sign token: {}", e)))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, issuer, audience and expiry.
    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;
        Ok(data.claims)
    }
}
