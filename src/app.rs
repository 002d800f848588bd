use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::append::append_record;
use crate::record::{DEFAULT_WORKSHEET, Record, Sex};
use crate::sheets::{SheetError, SheetsClient};

pub struct AppState {
    client: SheetsClient,
}

#[derive(Deserialize)]
struct SubmitRequest {
    sheet_url: String,
    #[serde(default = "default_worksheet")]
    worksheet: String,
    name: String,
    sex: Sex,
    age_months: u32,
    height_cm: f64,
}

fn default_worksheet() -> String {
    DEFAULT_WORKSHEET.to_string()
}

#[derive(Serialize)]
struct SubmitResponse {
    status: String,
    message: String,
}

impl SubmitResponse {
    fn ok(message: String) -> Self {
        SubmitResponse {
            status: "ok".to_string(),
            message,
        }
    }

    fn warning(message: &str) -> Self {
        SubmitResponse {
            status: "warning".to_string(),
            message: message.to_string(),
        }
    }

    fn error(message: String) -> Self {
        SubmitResponse {
            status: "error".to_string(),
            message,
        }
    }
}

/// Serve the entry form over the given address, using the injected Sheets
/// client for every submission.
pub async fn run(client: SheetsClient, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Setup app state
    let app_state = Arc::new(AppState { client });

    // Build router
    let app = Router::new()
        .route("/", get(serve_form))
        .route("/api/submit", post(submit))
        .route("/healthz", get(healthz))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(app_state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_form() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Pre-submission guard: an empty spreadsheet URL or child name means the
/// submission is rejected before any network call is made.
fn blank_field_warning(sheet_url: &str, name: &str) -> Option<&'static str> {
    if sheet_url.trim().is_empty() {
        return Some("Spreadsheet URL must not be empty!");
    }
    if name.trim().is_empty() {
        return Some("Child name must not be empty!");
    }
    None
}

/// Handle one form submission: guard, validate, then run the append
/// operation. Every outcome is a 200 with a `{status, message}` body; the
/// form stays usable after a failure and nothing is retried.
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitRequest>,
) -> impl IntoResponse {
    if let Some(warning) = blank_field_warning(&payload.sheet_url, &payload.name) {
        return Json(SubmitResponse::warning(warning));
    }

    let record = match Record::new(
        &payload.name,
        payload.sex,
        payload.age_months,
        payload.height_cm,
    ) {
        Ok(record) => record,
        Err(e) => return Json(SubmitResponse::error(e.to_string())),
    };

    let worksheet = if payload.worksheet.trim().is_empty() {
        DEFAULT_WORKSHEET
    } else {
        payload.worksheet.trim()
    };

    match append_record(&state.client, &payload.sheet_url, worksheet, &record).await {
        Ok(report) => Json(SubmitResponse::ok(format!(
            "Data for {} sent to Google Sheets ({} rows in '{}').",
            record.name(),
            report.written_rows,
            worksheet
        ))),
        Err(SheetError::SpreadsheetNotFound) => {
            log::warn!("spreadsheet not found for submitted URL");
            Json(SubmitResponse::error(
                "Spreadsheet not found! Check the URL and make sure it is shared with the service account email.".to_string(),
            ))
        }
        Err(SheetError::WorksheetNotFound(name)) => {
            log::warn!("worksheet '{}' not found", name);
            Json(SubmitResponse::error(format!(
                "Worksheet '{}' was not found in that spreadsheet.",
                name
            )))
        }
        Err(e) => {
            log::error!("append failed: {}", e);
            Json(SubmitResponse::error(format!("Something went wrong: {}", e)))
        }
    }
}
