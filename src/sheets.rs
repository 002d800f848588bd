use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::auth::{AuthError, TokenProvider};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

lazy_static! {
    static ref SPREADSHEET_ID_RE: Regex =
        Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").unwrap();
}

/// Failures surfaced by the spreadsheet backend.
///
/// `SpreadsheetNotFound` and `WorksheetNotFound` are the two kinds the form
/// reports specifically; everything else is shown with its underlying
/// message text.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("spreadsheet not found")]
    SpreadsheetNotFound,
    #[error("worksheet '{0}' not found")]
    WorksheetNotFound(String),
    #[error("not a Google Sheets URL: {0}")]
    InvalidUrl(String),
    #[error("credential error: {0}")]
    Auth(#[from] AuthError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sheets API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

/// Extract the spreadsheet id from a Google Sheets URL
/// (`https://docs.google.com/spreadsheets/d/<id>/...`).
pub fn spreadsheet_id_from_url(url: &str) -> Result<String, SheetError> {
    SPREADSHEET_ID_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| SheetError::InvalidUrl(url.to_string()))
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: ApiErrorDetail,
}

#[derive(Deserialize, Default)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Thin client for the Sheets v4 REST API, restricted to what the form
/// needs: list worksheet titles, read the A:D range, overwrite it.
///
/// Constructed once at startup and passed explicitly to the append
/// operation; there is no module-level client state.
pub struct SheetsClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    base_url: String,
}

impl SheetsClient {
    pub fn new(tokens: TokenProvider) -> Self {
        Self::with_base_url(tokens, SHEETS_API_BASE.to_string())
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(tokens: TokenProvider, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        SheetsClient {
            http,
            tokens,
            base_url,
        }
    }

    /// Titles of every worksheet tab in the spreadsheet.
    ///
    /// HTTP 404 and 403 both map to [`SheetError::SpreadsheetNotFound`]: a
    /// sheet the credential cannot see is indistinguishable from a missing
    /// one as far as the operator is concerned.
    pub async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetError> {
        let url = format!(
            "{}/{}?fields=sheets.properties.title",
            self.base_url, spreadsheet_id
        );
        let response = self.get(&url).await?;

        if response.status().as_u16() == 404 || response.status().as_u16() == 403 {
            return Err(SheetError::SpreadsheetNotFound);
        }
        let response = Self::check(response).await?;

        let meta = response.json::<SpreadsheetMeta>().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|entry| entry.properties.title)
            .collect())
    }

    /// Fetch the worksheet's content as a grid of display strings, first
    /// four columns only, header row included.
    pub async fn read_table(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let url = format!(
            "{}/{}/values/{}",
            self.base_url,
            spreadsheet_id,
            encode_range(worksheet)
        );
        let response = self.get(&url).await?;

        if response.status().as_u16() == 404 {
            return Err(SheetError::SpreadsheetNotFound);
        }
        let response = Self::check(response).await?;

        let range = response.json::<ValueRange>().await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    /// Overwrite the worksheet with the full grid, starting at A1, in one
    /// `values.update` call. `USER_ENTERED` lets the backend re-type
    /// numeric cells the way a manual entry would.
    pub async fn write_table(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetError> {
        let url = format!(
            "{}/{}/values/{}?valueInputOption=USER_ENTERED",
            self.base_url,
            spreadsheet_id,
            encode_range(worksheet)
        );
        let token = self.tokens.token().await?;
        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": values }))
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(SheetError::SpreadsheetNotFound);
        }
        Self::check(response).await?;
        Ok(())
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SheetError> {
        let token = self.tokens.token().await?;
        Ok(self.http.get(url).bearer_auth(token).send().await?)
    }

    /// Turn a non-success response into a typed API error carrying the
    /// backend's own message text.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
            _ => body,
        };
        Err(SheetError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// A1-range for the first four columns of the worksheet, percent-encoded
/// for the URL path.
fn encode_range(worksheet: &str) -> String {
    let quoted = worksheet.replace('\'', "''");
    urlencoding::encode(&format!("'{}'!A1:D", quoted)).into_owned()
}

/// Display text for one API cell value. Formatted values usually arrive as
/// strings; anything else is rendered the way the sheet would show it.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}
