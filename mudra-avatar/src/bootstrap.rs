//! Engine bootstrap state machine

use crate::avatar::{event_timestamp, AvatarEvent};
use crate::config::{EngineInitConfig, TimingConfig};
use crate::engines::SignEngine;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Engine lifecycle state
///
/// Transitions run forward along
/// `Unloaded -> AssetsLoading -> AssetsLoaded -> Initializing -> Ready`;
/// any pre-Ready state may divert to `Failed`. `Ready` and `Failed` are
/// terminal for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Nothing loaded yet
    Unloaded,
    /// Bootstrap assets are being fetched
    AssetsLoading,
    /// Engine script fetched, waiting for it to register
    AssetsLoaded,
    /// One-time init call in progress
    Initializing,
    /// Engine initialized and settled
    Ready,
    /// Terminal failure, recoverable only by restarting the process
    Failed,
}

impl EngineState {
    fn rank(&self) -> u8 {
        match self {
            EngineState::Unloaded => 0,
            EngineState::AssetsLoading => 1,
            EngineState::AssetsLoaded => 2,
            EngineState::Initializing => 3,
            EngineState::Ready => 4,
            EngineState::Failed => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineState::Ready | EngineState::Failed)
    }

    fn can_advance(&self, next: EngineState) -> bool {
        if self.is_terminal() {
            return false;
        }

        if next == EngineState::Failed {
            return true;
        }

        next.rank() == self.rank() + 1
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineState::Unloaded => "unloaded",
            EngineState::AssetsLoading => "assets-loading",
            EngineState::AssetsLoaded => "assets-loaded",
            EngineState::Initializing => "initializing",
            EngineState::Ready => "ready",
            EngineState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Shared state + status cells, advanced only through the legality check
#[derive(Clone)]
struct StateCell {
    state: Arc<RwLock<EngineState>>,
    status: Arc<RwLock<String>>,
    events: broadcast::Sender<AvatarEvent>,
}

impl StateCell {
    fn advance(&self, next: EngineState, message: impl Into<String>) -> bool {
        let message = message.into();

        {
            let mut state = self.state.write();
            if !state.can_advance(next) {
                warn!("refused engine state transition {} -> {}", *state, next);
                return false;
            }
            *state = next;
        }

        info!("engine state {}: {}", next, message);
        *self.status.write() = message.clone();
        let _ = self.events.send(AvatarEvent::EngineStatus {
            state: next.to_string(),
            message,
            timestamp: event_timestamp(),
        });
        true
    }

    fn get(&self) -> EngineState {
        *self.state.read()
    }
}

/// Drives the rendering engine from unloaded to ready exactly once
///
/// Owns the engine lifecycle state and the human-readable status
/// message; both are exposed read-only. Consumers gate playback on
/// `is_ready`.
pub struct EngineBootstrapper {
    engine: Arc<dyn SignEngine>,
    init_config: EngineInitConfig,
    timing: TimingConfig,
    cell: StateCell,
    init_done: Arc<AtomicBool>,
    started: Arc<AtomicBool>,
}

impl EngineBootstrapper {
    pub fn new(
        engine: Arc<dyn SignEngine>,
        init_config: EngineInitConfig,
        timing: TimingConfig,
        events: broadcast::Sender<AvatarEvent>,
    ) -> Self {
        Self {
            engine,
            init_config,
            timing,
            cell: StateCell {
                state: Arc::new(RwLock::new(EngineState::Unloaded)),
                status: Arc::new(RwLock::new("Avatar engine not loaded".to_string())),
                events,
            },
            init_done: Arc::new(AtomicBool::new(false)),
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the bootstrap sequence in a background task
    ///
    /// Idempotent: a second call is ignored.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("bootstrapper already started, ignoring");
            return;
        }

        let engine = Arc::clone(&self.engine);
        let init_config = self.init_config.clone();
        let timing = self.timing.clone();
        let cell = self.cell.clone();
        let init_done = Arc::clone(&self.init_done);

        tokio::spawn(async move {
            run_bootstrap(engine, init_config, timing, cell, init_done).await;
        });
    }

    pub fn state(&self) -> EngineState {
        self.cell.get()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    pub fn status_message(&self) -> String {
        self.cell.status.read().clone()
    }

    /// Wait for the engine to reach `Ready`
    ///
    /// Returns false if the engine fails or the timeout elapses first.
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.state() {
                EngineState::Ready => return true,
                EngineState::Failed => return false,
                _ => {}
            }

            if tokio::time::Instant::now() >= deadline {
                return false;
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn run_bootstrap(
    engine: Arc<dyn SignEngine>,
    init_config: EngineInitConfig,
    timing: TimingConfig,
    cell: StateCell,
    init_done: Arc<AtomicBool>,
) {
    cell.advance(
        EngineState::AssetsLoading,
        "Loading avatar engine assets...",
    );

    // Stylesheet load is fire-and-forget; a failure degrades styling
    // but never blocks the engine.
    let stylesheet_engine = Arc::clone(&engine);
    tokio::spawn(async move {
        if let Err(e) = stylesheet_engine.fetch_stylesheet().await {
            warn!("stylesheet load failed: {}", e);
        }
    });

    if let Err(e) = engine.fetch_script().await {
        error!("engine script load failed: {}", e);
        cell.advance(
            EngineState::Failed,
            format!("Error loading engine script: {}", e),
        );
        return;
    }

    cell.advance(
        EngineState::AssetsLoaded,
        "Engine script loaded. Waiting for engine to register...",
    );

    tokio::time::sleep(timing.script_settle()).await;

    let mut attempts = 0u32;
    while !engine.is_registered() {
        attempts += 1;
        if attempts >= timing.register_poll_max_attempts {
            error!("engine never registered after {} checks", attempts);
            cell.advance(
                EngineState::Failed,
                format!(
                    "Engine did not register after {} checks. Is the asset host serving the engine script?",
                    attempts
                ),
            );
            return;
        }
        tokio::time::sleep(timing.register_poll_interval()).await;
    }

    if init_done
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        cell.advance(
            EngineState::Initializing,
            "Engine registered. Initializing avatar...",
        );

        if let Err(e) = engine.init(&init_config) {
            error!("engine init failed: {}", e);
            cell.advance(
                EngineState::Failed,
                format!("Error initializing avatar: {}", e),
            );
            return;
        }
    } else {
        debug!("engine init already performed, skipping");
        cell.advance(
            EngineState::Initializing,
            "Engine registered. Avatar already initialized.",
        );
    }

    // The engine loads its avatar model internally with no completion
    // signal; a fixed settle delay stands in for it.
    tokio::time::sleep(timing.ready_settle()).await;

    cell.advance(EngineState::Ready, "Avatar initialized. Ready to translate.");
}
