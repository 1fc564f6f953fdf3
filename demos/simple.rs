//! Example of using the Swimlane SDK
//!
//! SWIMLANE_HOST=swimlane.example.com SWIMLANE_USER=admin SWIMLANE_PASSWORD=... \
//!     cargo run --example simple -- SI
use serde_json::json;
use std::env;
use std::error::Error;
use swimlane::ClientBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Enable logging
    env_logger::init();

    let host = env::var("SWIMLANE_HOST")?;
    let user = env::var("SWIMLANE_USER")?;
    let password = env::var("SWIMLANE_PASSWORD")?;
    let acronym = env::args().nth(1).unwrap_or_else(|| "SI".to_string());

    // Initialize client
    let mut builder =
        ClientBuilder::new().host(host).credentials(user, password).verify_ssl(env::var("SWIMLANE_INSECURE").is_err());
    if let Some(secs) = env::var("SWIMLANE_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()) {
        builder = builder.timeout_secs(secs);
    }
    let swimlane = builder.connect().await?;
    println!("Connected: {}", swimlane);
    println!("Server version: {}", swimlane.version().await?);

    // List all applications
    for app in swimlane.apps().list().await? {
        println!("  {}", app);
    }

    // Search open high severity records
    let app = swimlane.apps().get_by_acronym(&acronym).await?;
    let mut report = app.reports().build("High severity").await?;
    report.filter("Severity", "equals", json!("High"))?;

    let mut records = report.records();
    while let Some(record) = records.next().await {
        let record = record?;
        println!("{}: {:?}", record, record.get("Title")?);
    }

    // Saved reports of the app
    for report in app.reports().list().await? {
        println!("Report: {}", report);
    }

    Ok(())
}
