//! Example: Listing customers with tokens persisted in a file
//!
//! Reads `ADFIN_*` environment variables (or `adfin.toml` / `adfin.json`),
//! connects, and prints customers with their financial details.
//!
//! # Setup
//!
//! 1. Export credentials and a one-time authorization code:
//!
//! ```bash
//! export ADFIN_CLIENT_ID=... ADFIN_CLIENT_SECRET=... ADFIN_CODE=...
//! ```
//!
//! 2. Point the token store at a file so later runs skip the code exchange:
//!
//! ```bash
//! export ADFIN_TOKEN_FILE=.adfin-tokens.json
//! ```
//!
//! 3. Run this example:
//!
//! ```bash
//! cargo run --example list_customers
//! ```

use adfin_infra::Adfin;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let adfin = Adfin::from_env().await?;
    println!("Connected to {} ({:?})", adfin.origin(), adfin.bootstrap_outcome());

    if !adfin.is_authenticated().await {
        println!("Not authenticated: set ADFIN_CODE or ADFIN_TOKEN_FILE");
        return Ok(());
    }

    match adfin.customers().list_with_financial_details().await {
        Ok(Some(customers)) => println!("{}", serde_json::to_string_pretty(&customers)?),
        Ok(None) => println!("No content"),
        Err(e) => {
            if let Some(classified) = e.classify() {
                println!("Request failed ({}): {}", classified.kind, classified.message());
            } else {
                println!("Request failed: {e}");
            }
        }
    }

    let info = adfin.token_info().await;
    println!("Token expires at {:?}", info.expires_at);
    Ok(())
}
