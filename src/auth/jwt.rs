use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::AppError;

/// Identity token payload: who, minted when, valid until.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Signing and verification keys derived from the server-held secret.
/// Tokens are stateless; there is no revocation before expiry.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub ttl_seconds: i64,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl_seconds: cfg.ttl_seconds,
        }
    }

    /// Signs a token for `user_id` with the configured TTL.
    pub fn sign(&self, user_id: Uuid) -> Result<String, AppError> {
        self.sign_with_ttl(user_id, self.ttl_seconds)
    }

    pub fn sign_with_ttl(&self, user_id: Uuid, ttl_seconds: i64) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl_seconds);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(e.into()))?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Re-derives the signature and checks expiry. A token whose `exp` is at
    /// or before now is expired, so ttl=0 tokens never verify.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;
        if data.claims.exp as i64 <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(AppError::TokenExpired);
        }
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Strips the fixed `"Bearer "` scheme from an Authorization header value.
/// `None` means no credential was supplied, not a parse error.
pub fn strip_bearer(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Extracts and verifies the caller's identity, rejecting before any handler
/// body runs.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::MissingToken)?;

        let token = strip_bearer(header).ok_or(AppError::MissingToken)?;

        let claims = keys.verify(token).map_err(|e| {
            warn!("rejected token: {e}");
            e
        })?;

        Ok(AuthUser(claims.sub))
    }
}
