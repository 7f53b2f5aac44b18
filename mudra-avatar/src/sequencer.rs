//! Translation-playback sequencer

use crate::avatar::{event_timestamp, AvatarEvent};
use crate::bootstrap::EngineBootstrapper;
use crate::config::{AssetConfig, TimingConfig};
use crate::engines::SignEngine;
use crate::error::AvatarError;
use crate::translator::SignTranslator;
use mudra_core::SignToken;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;
use url::Url;

/// Sequencer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerState {
    /// No sequence running; new requests are accepted
    Idle,
    /// Waiting on the translation service
    Requesting,
    /// Playing sign animations
    Playing,
}

impl std::fmt::Display for SequencerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SequencerState::Idle => "idle",
            SequencerState::Requesting => "requesting",
            SequencerState::Playing => "playing",
        };
        write!(f, "{}", name)
    }
}

/// What a `translate` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The sequence ran to completion
    Completed,
    /// The request was ignored: empty input, engine not ready, or a
    /// sequence already running
    Ignored,
}

/// Runs one translation-playback sequence at a time
///
/// Owns the sequencer state, the playback cursor and the displayed
/// translated text; all three are exposed read-only. A request is
/// accepted only when the engine is ready and no sequence is running;
/// anything else is a silent no-op, never an error.
pub struct TranslationSequencer {
    bootstrapper: Arc<EngineBootstrapper>,
    engine: Arc<dyn SignEngine>,
    translator: Arc<dyn SignTranslator>,
    assets: AssetConfig,
    timing: TimingConfig,
    state: RwLock<SequencerState>,
    current_sign: RwLock<Option<SignToken>>,
    translated_text: RwLock<String>,
    events: broadcast::Sender<AvatarEvent>,
}

impl TranslationSequencer {
    pub fn new(
        bootstrapper: Arc<EngineBootstrapper>,
        engine: Arc<dyn SignEngine>,
        translator: Arc<dyn SignTranslator>,
        assets: AssetConfig,
        timing: TimingConfig,
        events: broadcast::Sender<AvatarEvent>,
    ) -> Self {
        Self {
            bootstrapper,
            engine,
            translator,
            assets,
            timing,
            state: RwLock::new(SequencerState::Idle),
            current_sign: RwLock::new(None),
            translated_text: RwLock::new(String::new()),
            events,
        }
    }

    /// Translate text and play the resulting sign sequence
    ///
    /// Preconditions (engine ready, sequencer idle, non-empty input)
    /// failing make this a no-op. Once accepted, the sequence runs to
    /// completion or failure; it cannot be cancelled, and concurrent
    /// requests are rejected rather than queued. The sequencer is back
    /// to `Idle` with an empty cursor on every exit path.
    pub async fn translate(&self, text: &str) -> Result<TranslationOutcome, AvatarError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring empty translation request");
            return Ok(TranslationOutcome::Ignored);
        }

        if !self.bootstrapper.is_ready() {
            debug!("ignoring translation request, engine not ready");
            return Ok(TranslationOutcome::Ignored);
        }

        {
            let mut state = self.state.write();
            if *state != SequencerState::Idle {
                debug!("ignoring translation request while {}", state);
                return Ok(TranslationOutcome::Ignored);
            }
            *state = SequencerState::Requesting;
        }

        *self.current_sign.write() = None;
        self.translated_text.write().clear();

        let result = self.run_sequence(trimmed).await;

        *self.current_sign.write() = None;
        *self.state.write() = SequencerState::Idle;

        result.map(|_| TranslationOutcome::Completed)
    }

    async fn run_sequence(&self, text: &str) -> Result<(), AvatarError> {
        let _ = self.events.send(AvatarEvent::TranslationStarted {
            text: text.to_string(),
            timestamp: event_timestamp(),
        });

        let tokens = self.translator.translate(text).await?;
        if tokens.is_empty() {
            debug!("translation produced no sign tokens");
            return Ok(());
        }

        let joined = tokens.joined();
        *self.translated_text.write() = joined.clone();
        *self.state.write() = SequencerState::Playing;

        let total = tokens.len();
        for (position, token) in tokens.iter().enumerate() {
            *self.current_sign.write() = Some(token.clone());
            let _ = self.events.send(AvatarEvent::SignPlaying {
                token: token.to_string(),
                position: position + 1,
                total,
                timestamp: event_timestamp(),
            });

            let sigml_url = self.sign_url(token)?;
            self.engine.play_sign(&sigml_url).await?;

            tokio::time::sleep(self.timing.sign_gap()).await;
        }

        let _ = self.events.send(AvatarEvent::TranslationCompleted {
            text: joined,
            timestamp: event_timestamp(),
        });
        Ok(())
    }

    fn sign_url(&self, token: &SignToken) -> Result<Url, AvatarError> {
        self.assets
            .resolve(&format!("{}/{}.sigml", self.assets.sign_dir, token.as_str()))
            .map_err(AvatarError::Config)
    }

    pub fn state(&self) -> SequencerState {
        *self.state.read()
    }

    /// The token currently playing, if any
    pub fn current_sign(&self) -> Option<SignToken> {
        self.current_sign.read().clone()
    }

    /// The displayed translated text for the last accepted request
    pub fn translated_text(&self) -> String {
        self.translated_text.read().clone()
    }
}
