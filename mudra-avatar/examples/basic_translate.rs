//! Basic translation example
//!
//! Expects the translation backend and asset host on port 5001.
//! Override with MUDRA_TRANSLATOR_ENDPOINT / MUDRA_ASSET_BASE_URL.

use mudra_avatar::{HostedSignEngine, IslAvatar, MudraConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = MudraConfig::from_env();
    config.validate().map_err(|e| format!("bad config: {}", e))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .init();

    let engine = Arc::new(HostedSignEngine::new(&config.avatar.assets)?);
    let avatar = IslAvatar::with_http_translator(config.avatar, engine)?;

    avatar.start();

    println!("Waiting for avatar engine...");
    if !avatar.wait_until_ready(Duration::from_secs(30)).await {
        eprintln!("Engine did not become ready: {}", avatar.status_message());
        return Ok(());
    }
    println!("{}", avatar.status_message());

    avatar.translate("I love apples").await;

    if let Some(alert) = avatar.last_alert() {
        eprintln!("{}", alert);
    } else {
        println!("ISL: {}", avatar.translated_text());
    }

    Ok(())
}
