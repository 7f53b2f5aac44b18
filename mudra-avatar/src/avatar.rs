//! Avatar orchestrator facade for the presentation layer

use crate::bootstrap::{EngineBootstrapper, EngineState};
use crate::config::AvatarConfig;
use crate::engines::SignEngine;
use crate::sequencer::{SequencerState, TranslationOutcome, TranslationSequencer};
use crate::translator::{HttpTranslator, SignTranslator};
use mudra_core::Error;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::error;

const EVENT_BUFFER_SIZE: usize = 1000;

/// Events published to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub enum AvatarEvent {
    /// Engine lifecycle transition
    EngineStatus {
        state: String,
        message: String,
        timestamp: u64,
    },
    /// A translation request was accepted
    TranslationStarted { text: String, timestamp: u64 },
    /// One sign animation started playing
    SignPlaying {
        token: String,
        position: usize,
        total: usize,
        timestamp: u64,
    },
    /// A sequence played through all its tokens
    TranslationCompleted { text: String, timestamp: u64 },
    /// User-visible failure
    Alert { message: String, timestamp: u64 },
}

/// Event timestamp in nanoseconds since the epoch
pub(crate) fn event_timestamp() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|ts| if ts >= 0 { ts.try_into().ok() } else { None })
        .unwrap_or(0u64)
}

/// Orchestrator handed to the presentation layer
///
/// Owns the bootstrapper and sequencer; the UI reads engine readiness,
/// the status message, the playback cursor, the translated text and
/// the last alert through this object, and nothing else.
pub struct IslAvatar {
    config: Arc<AvatarConfig>,
    bootstrapper: Arc<EngineBootstrapper>,
    sequencer: Arc<TranslationSequencer>,
    events: broadcast::Sender<AvatarEvent>,
    last_alert: RwLock<Option<String>>,
}

impl IslAvatar {
    /// Create an orchestrator over the given engine and translator
    pub fn new(
        config: AvatarConfig,
        engine: Arc<dyn SignEngine>,
        translator: Arc<dyn SignTranslator>,
    ) -> Result<Self, Error> {
        config
            .validate()
            .map_err(|e| Error::Configuration(format!("Invalid avatar config: {}", e)))?;

        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);

        let bootstrapper = Arc::new(EngineBootstrapper::new(
            Arc::clone(&engine),
            config.engine.clone(),
            config.timing.clone(),
            events.clone(),
        ));

        let sequencer = Arc::new(TranslationSequencer::new(
            Arc::clone(&bootstrapper),
            engine,
            translator,
            config.assets.clone(),
            config.timing.clone(),
            events.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            bootstrapper,
            sequencer,
            events,
            last_alert: RwLock::new(None),
        })
    }

    /// Create an orchestrator using the HTTP translation client
    pub fn with_http_translator(
        config: AvatarConfig,
        engine: Arc<dyn SignEngine>,
    ) -> Result<Self, Error> {
        let translator = Arc::new(HttpTranslator::new(&config.translator)?);
        Self::new(config, engine, translator)
    }

    /// Start the engine bootstrap sequence
    pub fn start(&self) {
        self.bootstrapper.start();
    }

    /// Wait for the engine to become ready
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        self.bootstrapper.wait_until_ready(timeout).await
    }

    /// Translate text and play it as a sign sequence
    ///
    /// Failures never propagate: they are logged, stored as the last
    /// alert and published as an `Alert` event.
    pub async fn translate(&self, text: &str) {
        match self.sequencer.translate(text).await {
            Ok(TranslationOutcome::Completed) | Ok(TranslationOutcome::Ignored) => {}
            Err(e) => {
                error!("translation failed: {}", e);
                let message = format!(
                    "Error translating text: {}. Make sure the translation backend is running at {}.",
                    e, self.config.translator.endpoint
                );
                *self.last_alert.write() = Some(message.clone());
                let _ = self.events.send(AvatarEvent::Alert {
                    message,
                    timestamp: event_timestamp(),
                });
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.bootstrapper.is_ready()
    }

    pub fn engine_state(&self) -> EngineState {
        self.bootstrapper.state()
    }

    pub fn status_message(&self) -> String {
        self.bootstrapper.status_message()
    }

    pub fn sequencer_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    /// The sign currently playing, or None when idle
    pub fn current_sign(&self) -> Option<String> {
        self.sequencer.current_sign().map(|t| t.to_string())
    }

    /// The displayed translated text
    pub fn translated_text(&self) -> String {
        self.sequencer.translated_text()
    }

    /// The most recent user-visible failure, if any
    pub fn last_alert(&self) -> Option<String> {
        self.last_alert.read().clone()
    }

    /// Subscribe to avatar events
    pub fn subscribe(&self) -> broadcast::Receiver<AvatarEvent> {
        self.events.subscribe()
    }
}
