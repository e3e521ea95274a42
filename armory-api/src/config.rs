//! API Configuration Module
//!
//! Server, CORS and spreadsheet connection settings. Configuration is loaded
//! from environment variables with sensible defaults for development.

use armory_core::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Default Google Sheets REST endpoint.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Which `LedgerStore` the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Google Sheets over REST.
    Sheets,
    /// In-process grid; contents are lost on restart.
    Memory,
}

/// API configuration for binding, CORS and store selection.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,
    pub port: u16,
    pub store: StoreKind,
    /// Create missing worksheets and headers at startup.
    pub bootstrap_on_start: bool,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8000,
            store: StoreKind::Sheets,
            bootstrap_on_start: false,

            // CORS defaults: permissive for development
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ARMORY_API_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` or `ARMORY_API_PORT`: port (default: 8000)
    /// - `ARMORY_STORE`: "sheets" or "memory" (default: sheets)
    /// - `ARMORY_BOOTSTRAP`: "true" to create missing worksheets on start
    /// - `ARMORY_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `ARMORY_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `ARMORY_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match get("PORT").or_else(|| get("ARMORY_API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                field: "ARMORY_API_PORT".to_string(),
                value: raw.clone(),
                reason: "must be a port number".to_string(),
            })?,
            None => defaults.port,
        };

        let store = match get("ARMORY_STORE").map(|s| s.trim().to_lowercase()) {
            None => StoreKind::Sheets,
            Some(s) if s.is_empty() || s == "sheets" => StoreKind::Sheets,
            Some(s) if s == "memory" => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "ARMORY_STORE".to_string(),
                    value: other,
                    reason: "expected 'sheets' or 'memory'".to_string(),
                })
            }
        };

        let cors_origins = get("ARMORY_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_host: get("ARMORY_API_BIND").unwrap_or(defaults.bind_host),
            port,
            store,
            bootstrap_on_start: flag(get("ARMORY_BOOTSTRAP")),
            cors_origins,
            cors_allow_credentials: flag(get("ARMORY_CORS_ALLOW_CREDENTIALS")),
            cors_max_age_secs: get("ARMORY_CORS_MAX_AGE_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cors_max_age_secs),
        })
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.org
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

fn flag(value: Option<String>) -> bool {
    value
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

// ============================================================================
// SHEETS CONFIGURATION
// ============================================================================

/// How `SheetsClient` authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsCredentials {
    /// A pre-issued OAuth access token.
    BearerToken(String),
    /// Path to a service-account JSON key file.
    ServiceAccountFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub credentials: SheetsCredentials,
    pub base_url: String,
    pub timeout: Duration,
}

impl SheetsConfig {
    /// Environment variables:
    /// - `ARMORY_SHEET_ID` (required)
    /// - `ARMORY_SHEETS_TOKEN` or `ARMORY_SERVICE_ACCOUNT_FILE` (one required)
    /// - `ARMORY_SHEETS_BASE_URL` (default: Google endpoint)
    /// - `ARMORY_SHEETS_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let spreadsheet_id = non_blank("ARMORY_SHEET_ID").ok_or_else(|| ConfigError::MissingRequired {
            field: "ARMORY_SHEET_ID".to_string(),
        })?;

        let credentials = match (
            non_blank("ARMORY_SHEETS_TOKEN"),
            non_blank("ARMORY_SERVICE_ACCOUNT_FILE"),
        ) {
            (Some(token), _) => SheetsCredentials::BearerToken(token),
            (None, Some(path)) => SheetsCredentials::ServiceAccountFile(PathBuf::from(path)),
            (None, None) => {
                return Err(ConfigError::MissingRequired {
                    field: "ARMORY_SHEETS_TOKEN or ARMORY_SERVICE_ACCOUNT_FILE".to_string(),
                })
            }
        };

        let timeout_secs = match non_blank("ARMORY_SHEETS_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                field: "ARMORY_SHEETS_TIMEOUT_SECS".to_string(),
                value: raw.clone(),
                reason: "must be a whole number of seconds".to_string(),
            })?,
            None => 30,
        };

        Ok(Self {
            spreadsheet_id,
            credentials,
            base_url: non_blank("ARMORY_SHEETS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
