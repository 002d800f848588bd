use std::env;

use growthsheet::app;
use growthsheet::auth::{ServiceAccountKey, TokenProvider};
use growthsheet::sheets::SheetsClient;

/// Main entry point for the growth-entry web form.
///
/// Reads the Sheets credential from the environment, builds the client
/// once, and serves the form. `GSHEETS_ACCESS_TOKEN` (a pre-issued bearer
/// token) takes precedence; otherwise a service-account key is loaded from
/// `GSHEETS_SERVICE_ACCOUNT_JSON` or `GSHEETS_SERVICE_ACCOUNT_FILE`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let tokens = match env::var("GSHEETS_ACCESS_TOKEN") {
        Ok(token) => TokenProvider::with_static_token(token),
        Err(_) => TokenProvider::new(ServiceAccountKey::from_env()?),
    };
    let client = SheetsClient::new(tokens);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    // Start the web application
    app::run(client, &addr).await
}
