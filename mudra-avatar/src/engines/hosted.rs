//! Engine client for a CWASA-style engine served from a static asset host

use crate::config::{AssetConfig, EngineInitConfig};
use crate::engines::SignEngine;
use crate::error::AvatarError;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default script self-registration latency in milliseconds
const DEFAULT_REGISTRATION_LATENCY_MS: u64 = 250;

/// Engine client backed by a static asset host
///
/// Fetches the engine's stylesheet and executable over HTTP, holds the
/// payloads for the embedding host, and exposes the engine's init and
/// playback entry points. The executable registers its handle a short
/// latency after it loads; the host cannot observe that registration
/// directly and has to poll `is_registered`.
pub struct HostedSignEngine {
    client: Client,
    stylesheet_url: Url,
    script_url: Url,
    registration_latency: Duration,
    stylesheet: Arc<RwLock<Option<Bytes>>>,
    script: Arc<RwLock<Option<Bytes>>>,
    registered: Arc<AtomicBool>,
    init_payload: RwLock<Option<EngineInitConfig>>,
}

impl HostedSignEngine {
    /// Create an engine client for the configured asset host
    pub fn new(assets: &AssetConfig) -> Result<Self, AvatarError> {
        assets.validate().map_err(AvatarError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(assets.fetch_timeout_secs))
            .build()
            .map_err(|e| AvatarError::Engine(format!("Failed to create HTTP client: {}", e)))?;

        let stylesheet_url = assets
            .resolve(&assets.stylesheet_path)
            .map_err(AvatarError::Config)?;
        let script_url = assets
            .resolve(&assets.script_path)
            .map_err(AvatarError::Config)?;

        Ok(Self {
            client,
            stylesheet_url,
            script_url,
            registration_latency: Duration::from_millis(DEFAULT_REGISTRATION_LATENCY_MS),
            stylesheet: Arc::new(RwLock::new(None)),
            script: Arc::new(RwLock::new(None)),
            registered: Arc::new(AtomicBool::new(false)),
            init_payload: RwLock::new(None),
        })
    }

    /// Override the script self-registration latency
    pub fn with_registration_latency(mut self, latency: Duration) -> Self {
        self.registration_latency = latency;
        self
    }

    /// Stylesheet payload, once fetched, for the embedding host
    pub fn stylesheet(&self) -> Option<Bytes> {
        self.stylesheet.read().clone()
    }

    /// Executable payload, once fetched, for the embedding host
    pub fn script(&self) -> Option<Bytes> {
        self.script.read().clone()
    }

    /// The recorded init payload, if init has run
    pub fn init_payload(&self) -> Option<EngineInitConfig> {
        self.init_payload.read().clone()
    }

    async fn fetch_asset(&self, url: &Url, what: &str) -> Result<Bytes, AvatarError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AvatarError::AssetLoad(format!("{} fetch from {} failed: {}", what, url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::AssetLoad(format!(
                "{} fetch from {} returned {}",
                what, url, status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| AvatarError::AssetLoad(format!("{} body read failed: {}", what, e)))
    }
}

#[async_trait]
impl SignEngine for HostedSignEngine {
    async fn fetch_stylesheet(&self) -> Result<(), AvatarError> {
        let body = self.fetch_asset(&self.stylesheet_url, "stylesheet").await?;
        debug!("fetched engine stylesheet ({} bytes)", body.len());
        *self.stylesheet.write() = Some(body);
        Ok(())
    }

    async fn fetch_script(&self) -> Result<(), AvatarError> {
        let body = self.fetch_asset(&self.script_url, "script").await?;
        info!("fetched engine script ({} bytes)", body.len());
        *self.script.write() = Some(body);

        // The script registers its handle some time after it loads;
        // the latency is not observable from outside the engine.
        let registered = Arc::clone(&self.registered);
        let latency = self.registration_latency;
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            registered.store(true, Ordering::SeqCst);
            debug!("engine handle registered");
        });

        Ok(())
    }

    fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    fn init(&self, config: &EngineInitConfig) -> Result<(), AvatarError> {
        if !self.is_registered() {
            return Err(AvatarError::Init(
                "engine handle is not registered yet".to_string(),
            ));
        }

        config.validate().map_err(AvatarError::Init)?;

        let mut payload = self.init_payload.write();
        if payload.is_some() {
            return Err(AvatarError::Init("engine already initialized".to_string()));
        }

        info!(
            "initializing avatar engine with avatar '{}' ({}x{})",
            config.initial_avatar, config.width, config.height
        );
        *payload = Some(config.clone());
        Ok(())
    }

    async fn play_sign(&self, sigml_url: &Url) -> Result<(), AvatarError> {
        if self.init_payload.read().is_none() {
            return Err(AvatarError::Playback(
                "engine is not initialized".to_string(),
            ));
        }

        let response = self
            .client
            .get(sigml_url.clone())
            .send()
            .await
            .map_err(|e| AvatarError::Playback(format!("sign fetch from {} failed: {}", sigml_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::Playback(format!(
                "sign file {} returned {}",
                sigml_url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AvatarError::Playback(format!("sign body read failed: {}", e)))?;

        debug!("playing sign animation {} ({} bytes)", sigml_url, body.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "cwasa"
    }
}
