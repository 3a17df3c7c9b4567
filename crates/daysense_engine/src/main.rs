//! Run one fetch cycle against the health-bridge gateway and print the
//! resulting cycle as JSON. Intended for smoke-testing a bridge setup.

use std::sync::Arc;

use daysense_engine::WellnessService;
use daysense_provider::config::Config;
use daysense_provider::http_client::ReqwestHealthProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from `DAYSENSE_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("DAYSENSE_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let config = Config::from_env()?;
    tracing::info!(base_url = %config.base_url, "connecting to health bridge");

    let provider = ReqwestHealthProvider::new(&config.base_url, config.access_token);
    let service = WellnessService::new(Arc::new(provider));

    let cycle = service.fetch(true).await?;
    println!("{}", serde_json::to_string_pretty(&*cycle)?);
    Ok(())
}
