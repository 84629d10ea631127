//! Service account sign-in (OAuth 2.0 JWT bearer grant).
//!
//! A service account key file holds an RSA private key. Each exchange signs a
//! short-lived assertion with it and trades the assertion at the key's
//! `token_uri` for an access token. Tokens are cached until a minute before
//! they expire.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use unlock_engine::SourceError;

use crate::auth::AccessToken;

pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime; Google rejects anything over an hour.
const ASSERTION_TTL_SECS: i64 = 3600;

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service account key file that sign-in needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// Signed RS256 assertion for the read-only calendar scope, issued at `now`.
    pub fn assertion(&self, now: i64) -> Result<String, SourceError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: CALENDAR_READONLY_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| {
            SourceError::Access(format!(
                "service account {}: unusable private key: {}",
                self.client_email, e
            ))
        })?;
        jsonwebtoken::encode(&header, &claims, &key).map_err(|e| {
            SourceError::Access(format!("service account {}: signing failed: {}", self.client_email, e))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct IssuedToken {
    token: AccessToken,
    expires_at: Option<i64>,
}

impl IssuedToken {
    fn is_fresh(&self, now: i64) -> bool {
        match self.expires_at {
            Some(exp) => now < exp - EXPIRY_MARGIN_SECS,
            None => true,
        }
    }
}

/// Access tokens for one service account, exchanged on demand and cached.
#[derive(Debug, Clone)]
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    cached: Arc<Mutex<Option<IssuedToken>>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// A valid access token, exchanging a new assertion when the cached one
    /// is missing or about to expire.
    pub async fn token(&self, http: &reqwest::Client) -> Result<AccessToken, SourceError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();
        if let Some(issued) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(issued.token.clone());
        }

        let issued = self.exchange(http, now).await?;
        let token = issued.token.clone();
        *cached = Some(issued);
        Ok(token)
    }

    async fn exchange(&self, http: &reqwest::Client, now: i64) -> Result<IssuedToken, SourceError> {
        let assertion = self.key.assertion(now)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = http
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| SourceError::Transient(format!("token request failed: {}", e)))?;
        let status = response.status();
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(format!("token response ({}): {}", status, e)))?;

        if let Some(error) = body.error {
            let detail = body.error_description.unwrap_or_default();
            let message = format!(
                "service account {} was refused a token: {} {}",
                self.key.client_email, error, detail
            );
            return Err(if status.is_server_error() {
                SourceError::Transient(message)
            } else {
                SourceError::Access(message)
            });
        }

        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::Malformed(format!("token response ({}) has no access_token", status)))?;
        debug!(
            client_email = %self.key.client_email,
            expires_in = ?body.expires_in,
            "exchanged service account assertion"
        );
        Ok(IssuedToken {
            token: AccessToken::new(token),
            expires_at: body.expires_in.map(|secs| now + secs),
        })
    }
}
