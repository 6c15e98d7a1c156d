use std::env;

use anyhow::Result;
use care_api::build_app;
use care_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("care_api");

    let bind = env::var("CARE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build_app().await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "care concierge api started");

    axum::serve(listener, app).await?;
    Ok(())
}
