//! Shared test doubles for the avatar orchestration tests

#![allow(dead_code)]

use async_trait::async_trait;
use mudra_avatar::avatar::AvatarEvent;
use mudra_avatar::config::{EngineInitConfig, TimingConfig};
use mudra_avatar::engines::SignEngine;
use mudra_avatar::error::AvatarError;
use mudra_avatar::translator::SignTranslator;
use mudra_core::{SignToken, TokenSequence};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use url::Url;

/// Timing config small enough to keep tests fast
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        script_settle_ms: 5,
        register_poll_interval_ms: 5,
        register_poll_max_attempts: 20,
        ready_settle_ms: 5,
        sign_gap_ms: 30,
    }
}

/// A fresh event channel sender
pub fn events() -> broadcast::Sender<AvatarEvent> {
    broadcast::channel(64).0
}

/// In-memory engine that records every call
#[derive(Default)]
pub struct FakeEngine {
    pub fail_stylesheet: bool,
    pub fail_script: bool,
    pub fail_init: bool,
    pub never_register: bool,
    /// Zero-based index of the play call that should fail
    pub fail_play_at: Option<usize>,
    pub registered: AtomicBool,
    pub stylesheet_fetches: AtomicUsize,
    pub script_fetches: AtomicUsize,
    pub init_calls: AtomicUsize,
    pub plays: Mutex<Vec<(Url, Instant)>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// File names of the played sign URLs, in call order
    pub fn played_files(&self) -> Vec<String> {
        self.plays
            .lock()
            .iter()
            .map(|(url, _)| {
                url.path_segments()
                    .and_then(|segments| segments.last())
                    .unwrap_or("")
                    .to_string()
            })
            .collect()
    }

    /// Instants at which play calls arrived, in call order
    pub fn play_instants(&self) -> Vec<Instant> {
        self.plays.lock().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl SignEngine for FakeEngine {
    async fn fetch_stylesheet(&self) -> Result<(), AvatarError> {
        self.stylesheet_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_stylesheet {
            return Err(AvatarError::AssetLoad("stylesheet unreachable".to_string()));
        }
        Ok(())
    }

    async fn fetch_script(&self) -> Result<(), AvatarError> {
        self.script_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_script {
            return Err(AvatarError::AssetLoad("script unreachable".to_string()));
        }
        if !self.never_register {
            self.registered.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    fn init(&self, _config: &EngineInitConfig) -> Result<(), AvatarError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(AvatarError::Init("engine rejected init".to_string()));
        }
        Ok(())
    }

    async fn play_sign(&self, sigml_url: &Url) -> Result<(), AvatarError> {
        let mut plays = self.plays.lock();
        if self.fail_play_at == Some(plays.len()) {
            return Err(AvatarError::Playback("animation crashed".to_string()));
        }
        plays.push((sigml_url.clone(), Instant::now()));
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Translator returning a fixed token list, optionally slow or failing
#[derive(Default)]
pub struct ScriptedTranslator {
    tokens: Vec<String>,
    fail: bool,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedTranslator {
    pub fn with_tokens(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl SignTranslator for ScriptedTranslator {
    async fn translate(&self, _text: &str) -> Result<TokenSequence, AvatarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail {
            return Err(AvatarError::Translation(
                "translation service returned 500 Internal Server Error".to_string(),
            ));
        }

        let tokens = self
            .tokens
            .iter()
            .map(|t| SignToken::new(t))
            .collect::<mudra_core::Result<Vec<_>>>()?;
        Ok(TokenSequence::new(tokens))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
