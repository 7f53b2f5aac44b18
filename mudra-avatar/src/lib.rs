//! mudra-avatar: ISL avatar orchestration
//!
//! Drives a hosted sign-language avatar engine:
//! - a bootstrap state machine that fetches the engine's assets, waits
//!   for it to register and performs the one-time init
//! - a translation sequencer that sends text to the translation
//!   service and plays the returned tokens as an ordered, paced
//!   animation sequence
//! - an orchestrator facade exposing read-only state to the UI

pub mod avatar;
pub mod bootstrap;
pub mod config;
pub mod engines;
pub mod error;
pub mod sequencer;
pub mod translator;

pub use avatar::{AvatarEvent, IslAvatar};
pub use bootstrap::{EngineBootstrapper, EngineState};
pub use config::{
    AssetConfig, AvatarConfig, EngineInitConfig, MudraConfig, TimingConfig, TranslatorConfig,
};
pub use engines::{HostedSignEngine, SignEngine};
pub use error::AvatarError;
pub use sequencer::{SequencerState, TranslationOutcome, TranslationSequencer};
pub use translator::{HttpTranslator, SignTranslator};
