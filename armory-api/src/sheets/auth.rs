//! OAuth access tokens for the Sheets API.
//!
//! Either a pre-issued bearer token, or a service-account key exchanged for
//! short-lived tokens with the JWT bearer grant. Exchanged tokens are cached
//! until shortly before they expire.

use std::path::Path;

use armory_core::{ConfigError, StorageError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::SheetsCredentials;

/// OAuth scope for reading and writing spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime; Google caps it at one hour.
const ASSERTION_TTL_SECS: i64 = 3600;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service-account JSON key that the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::InvalidValue {
            field: "ARMORY_SERVICE_ACCOUNT_FILE".to_string(),
            value: "<service account json>".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text)
    }
}

/// JWT claims for the bearer grant.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS
}

/// An exchanged access token and when it lapses.
#[derive(Debug, Clone)]
pub struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Where `SheetsClient` gets its bearer token.
pub enum TokenSource {
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl TokenSource {
    pub fn from_credentials(credentials: &SheetsCredentials) -> Result<Self, ConfigError> {
        match credentials {
            SheetsCredentials::BearerToken(token) => Ok(TokenSource::Static(token.clone())),
            SheetsCredentials::ServiceAccountFile(path) => Ok(TokenSource::ServiceAccount {
                key: ServiceAccountKey::from_file(path)?,
                cached: Mutex::new(None),
            }),
        }
    }

    /// A valid access token, exchanging a new one when the cache is stale.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, StorageError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount { key, cached } => {
                let mut guard = cached.lock().await;
                let now = Utc::now();
                if let Some(token) = guard.as_ref().filter(|t| t.is_fresh(now)) {
                    return Ok(token.value.clone());
                }

                let token = exchange(http, key, now).await?;
                let value = token.value.clone();
                *guard = Some(token);
                tracing::debug!(client_email = %key.client_email, "Exchanged service-account token");
                Ok(value)
            }
        }
    }
}

/// Signed RS256 assertion for the JWT bearer grant.
pub fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, StorageError> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: &key.token_uri,
        iat,
        exp: iat + ASSERTION_TTL_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StorageError::unavailable("authenticate", format!("bad private key: {}", e)))?;
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| StorageError::unavailable("authenticate", format!("signing failed: {}", e)))
}

async fn exchange(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
    now: DateTime<Utc>,
) -> Result<CachedToken, StorageError> {
    let assertion = sign_assertion(key, now)?;
    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| StorageError::unavailable("authenticate", e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StorageError::unavailable(
            "authenticate",
            format!("token endpoint returned {}: {}", status, body),
        ));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| StorageError::unavailable("authenticate", e.to_string()))?;
    Ok(CachedToken {
        value: token.access_token,
        expires_at: now + Duration::seconds(token.expires_in),
    })
}
