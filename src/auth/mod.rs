//! Session token verification
//!
//! The identity provider issues ES256 JWTs. A token is accepted when its
//! signature checks out against the app's verification key, the issuer is the
//! provider and the audience is our app id. Tokens arrive either as a bearer
//! header or in the provider's session cookie.

use crate::config::AuthConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Verified session, in the shape returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub app_id: String,
    pub user_id: String,
    pub issuer: String,
    pub issued_at: i64,
    pub expiration: i64,
    pub session_id: String,
}

/// Raw token payload
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sid: String,
    sub: String,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl From<TokenClaims> for SessionClaims {
    fn from(claims: TokenClaims) -> Self {
        Self {
            app_id: claims.aud,
            user_id: claims.sub,
            issuer: claims.iss,
            issued_at: claims.iat,
            expiration: claims.exp,
            session_id: claims.sid,
        }
    }
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Verify a raw token, returning its claims or `Error::Unauthorized`
    async fn verify(&self, token: &str) -> Result<SessionClaims>;
}

pub struct PrivyVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl PrivyVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(Error::Config("auth app id not set".to_string()));
        }
        let pem = config
            .verification_key
            .as_deref()
            .ok_or_else(|| Error::Config("auth verification key not set".to_string()))?;
        let decoding_key = DecodingKey::from_ec_pem(pem.as_bytes())
            .map_err(|e| Error::Config(format!("Invalid verification key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.app_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

#[async_trait]
impl SessionVerifier for PrivyVerifier {
    async fn verify(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| Error::Unauthorized(e.to_string()))?;
        Ok(data.claims.into())
    }
}

/// Token from `Authorization: Bearer …`, else from the session cookie
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
