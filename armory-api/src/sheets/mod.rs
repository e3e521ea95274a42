//! Google Sheets REST Adapter
//!
//! `SheetsClient` implements `LedgerStore` over the Sheets v4 REST API:
//! values endpoints for reads and cell writes, `batchUpdate` for worksheet
//! structure (new sheets, inserted rows, added columns).
//!
//! A missing worksheet surfaces from the values endpoints as HTTP 400
//! "Unable to parse range"; it is mapped to `WorksheetNotFound`. Every other
//! non-success status or transport failure is `StoreUnavailable`.

pub mod auth;

use armory_core::{column_letter, ConfigError, StorageError};
use armory_storage::{LedgerStore, StoreResult};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SheetsConfig;
use auth::TokenSource;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

/// Properties of one worksheet as reported by the spreadsheet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub grid_properties: GridProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub column_count: usize,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn into_rows(range: ValueRange) -> Vec<Vec<String>> {
    range
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect()
}

// ============================================================================
// A1 NOTATION
// ============================================================================

/// Quote a worksheet title for A1 notation: `'title'`, with `'` doubled.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// `'title'!C5`
pub fn cell_range(title: &str, row: usize, col: usize) -> String {
    format!("{}!{}{}", quote_title(title), column_letter(col), row)
}

/// `'title'!3:3`
pub fn row_range(title: &str, row: usize) -> String {
    format!("{}!{}:{}", quote_title(title), row, row)
}

/// `'title'!C:C`
pub fn col_range(title: &str, col: usize) -> String {
    let letter = column_letter(col);
    format!("{}!{}:{}", quote_title(title), letter, letter)
}

/// Classify a failed response body for one worksheet operation.
fn status_error(sheet: Option<&str>, operation: &str, status: StatusCode, body: &str) -> StorageError {
    match sheet {
        Some(sheet) if status == StatusCode::BAD_REQUEST && body.contains("Unable to parse range") => {
            StorageError::worksheet_not_found(sheet)
        }
        _ => StorageError::unavailable(operation, format!("HTTP {}: {}", status, body)),
    }
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct SheetsClient {
    http: reqwest::Client,
    tokens: TokenSource,
    base: Url,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn from_config(config: &SheetsConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "ARMORY_SHEETS_TIMEOUT_SECS".to_string(),
                value: format!("{:?}", config.timeout),
                reason: e.to_string(),
            })?;
        let base = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "ARMORY_SHEETS_BASE_URL".to_string(),
            value: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "ARMORY_SHEETS_BASE_URL".to_string(),
                value: config.base_url.clone(),
                reason: "not a base URL".to_string(),
            });
        }

        Ok(Self {
            http,
            tokens: TokenSource::from_credentials(&config.credentials)?,
            base,
            spreadsheet_id: config.spreadsheet_id.clone(),
        })
    }

    /// `{base}/{spreadsheet_id}{suffix}` followed by the given path segments.
    fn url(&self, spreadsheet_suffix: &str, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StorageError::unavailable("build_url", "base URL cannot hold a path"))?;
            path.pop_if_empty();
            path.push(&format!("{}{}", self.spreadsheet_id, spreadsheet_suffix));
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Send an authorized request and decode the JSON reply.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        sheet: Option<&str>,
        operation: &str,
    ) -> StoreResult<Value> {
        let token = self.tokens.access_token(&self.http).await?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::unavailable(operation, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(operation = %operation, status = %status, "Sheets request failed");
            return Err(status_error(sheet, operation, status, &body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| StorageError::unavailable(operation, e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| StorageError::unavailable(operation, e.to_string()))
    }

    async fn properties(&self) -> StoreResult<Vec<SheetProperties>> {
        let mut url = self.url("", &[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        let reply = self.send(Method::GET, url, None, None, "get_metadata").await?;
        let meta: SpreadsheetMeta = serde_json::from_value(reply)
            .map_err(|e| StorageError::unavailable("get_metadata", e.to_string()))?;
        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }

    async fn properties_of(&self, sheet: &str) -> StoreResult<SheetProperties> {
        self.properties()
            .await?
            .into_iter()
            .find(|p| p.title == sheet)
            .ok_or_else(|| StorageError::worksheet_not_found(sheet))
    }

    async fn batch_update(&self, requests: Value, operation: &str) -> StoreResult<()> {
        let url = self.url(":batchUpdate", &[])?;
        self.send(Method::POST, url, Some(json!({ "requests": requests })), None, operation)
            .await?;
        Ok(())
    }

    async fn get_values(&self, sheet: &str, range: &str, by_columns: bool) -> StoreResult<Vec<Vec<String>>> {
        let mut url = self.url("", &["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "FORMATTED_VALUE")
            .append_pair("majorDimension", if by_columns { "COLUMNS" } else { "ROWS" });
        let reply = self.send(Method::GET, url, None, Some(sheet), "get_values").await?;
        let range: ValueRange = serde_json::from_value(reply)
            .map_err(|e| StorageError::unavailable("get_values", e.to_string()))?;
        Ok(into_rows(range))
    }

    async fn put_values(&self, sheet: &str, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        let mut url = self.url("", &["values", range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        self.send(Method::PUT, url, Some(body), Some(sheet), "update_values")
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SheetsClient {
    async fn worksheet_titles(&self) -> StoreResult<Vec<String>> {
        Ok(self.properties().await?.into_iter().map(|p| p.title).collect())
    }

    async fn create_worksheet(&self, title: &str, rows: usize, cols: usize) -> StoreResult<()> {
        if self.properties().await?.iter().any(|p| p.title == title) {
            return Err(StorageError::AlreadyExists {
                worksheet: title.to_string(),
            });
        }
        self.batch_update(
            json!([{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]),
            "create_worksheet",
        )
        .await?;
        tracing::debug!(sheet = %title, rows, cols, "Created worksheet");
        Ok(())
    }

    async fn all_values(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        self.get_values(sheet, &quote_title(sheet), false).await
    }

    async fn row_values(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>> {
        let rows = self.get_values(sheet, &row_range(sheet, row), false).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn col_values(&self, sheet: &str, col: usize) -> StoreResult<Vec<String>> {
        let cols = self.get_values(sheet, &col_range(sheet, col), true).await?;
        Ok(cols.into_iter().next().unwrap_or_default())
    }

    async fn cell(&self, sheet: &str, row: usize, col: usize) -> StoreResult<String> {
        let rows = self.get_values(sheet, &cell_range(sheet, row, col), false).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| r.into_iter().next())
            .unwrap_or_default())
    }

    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> StoreResult<()> {
        self.put_values(sheet, &cell_range(sheet, row, col), vec![vec![value.to_string()]])
            .await
    }

    async fn append_rows(&self, sheet: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let start = self.all_values(sheet).await?.len() + 1;
        let range = format!("{}!A{}", quote_title(sheet), start);
        let mut url = self.url("", &["values", &format!("{}:append", range)])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "OVERWRITE");
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        self.send(Method::POST, url, Some(body), Some(sheet), "append_rows")
            .await?;
        Ok(())
    }

    async fn insert_row(&self, sheet: &str, values: Vec<String>, index: usize) -> StoreResult<()> {
        let props = self.properties_of(sheet).await?;
        let start = index.saturating_sub(1);
        self.batch_update(
            json!([{
                "insertDimension": {
                    "range": {
                        "sheetId": props.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start,
                        "endIndex": start + 1
                    },
                    "inheritFromBefore": start > 0
                }
            }]),
            "insert_row",
        )
        .await?;
        let range = format!("{}!A{}", quote_title(sheet), index);
        self.put_values(sheet, &range, vec![values]).await
    }

    async fn add_cols(&self, sheet: &str, count: usize) -> StoreResult<()> {
        if count == 0 {
            return Ok(());
        }
        let props = self.properties_of(sheet).await?;
        self.batch_update(
            json!([{
                "appendDimension": {
                    "sheetId": props.sheet_id,
                    "dimension": "COLUMNS",
                    "length": count
                }
            }]),
            "add_cols",
        )
        .await
    }

    async fn clear(&self, sheet: &str) -> StoreResult<()> {
        let url = self.url("", &["values", &format!("{}:clear", quote_title(sheet))])?;
        self.send(Method::POST, url, Some(json!({})), Some(sheet), "clear")
            .await?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
