//! Credential discovery.
//!
//! `GOOGLE_OAUTH_ACCESS_TOKEN` wins when set. Otherwise the credentials file
//! is read: a service account key (`"type": "service_account"`) signs in
//! through [`crate::service_account`], and any other JSON file must carry a
//! ready `access_token`.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use unlock_engine::SourceError;

use crate::service_account::ServiceAccountKey;

pub const TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// An OAuth access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// How the client authenticates.
#[derive(Debug, Clone)]
pub enum Credentials {
    Token(AccessToken),
    ServiceAccount(ServiceAccountKey),
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Find credentials through `lookup` (an environment reader) or in
/// `credentials_file`.
///
/// # Errors
/// `SourceError::Access` when nothing usable is found or the file is
/// missing, unreadable, not JSON, or an incomplete service account key.
pub fn load_credentials<F>(credentials_file: Option<&Path>, lookup: F) -> Result<Credentials, SourceError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        return Ok(Credentials::Token(AccessToken::new(token.trim())));
    }

    let Some(path) = credentials_file else {
        return Err(SourceError::Access(format!(
            "no Google credentials: set {} or GOOGLE_APPLICATION_CREDENTIALS",
            TOKEN_ENV
        )));
    };
    if !path.is_file() {
        return Err(SourceError::Access(format!(
            "credentials path does not point to a file: {}",
            path.display()
        )));
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| SourceError::Access(format!("{}: {}", path.display(), e)))?;
    let parsed: TokenFile = serde_json::from_str(&raw)
        .map_err(|e| SourceError::Access(format!("{}: not a credentials file: {}", path.display(), e)))?;

    if parsed.kind.as_deref() == Some("service_account") {
        let key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
            SourceError::Access(format!("{}: incomplete service account key: {}", path.display(), e))
        })?;
        return Ok(Credentials::ServiceAccount(key));
    }

    match parsed.access_token {
        Some(token) if !token.trim().is_empty() => Ok(Credentials::Token(AccessToken::new(token.trim()))),
        _ => Err(SourceError::Access(format!(
            "{} has no access_token field",
            path.display()
        ))),
    }
}
