//! Error types for mudra-avatar

use mudra_core::Error as CoreError;
use thiserror::Error;

/// Avatar orchestration errors
#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Asset load error: {0}")]
    AssetLoad(String),

    #[error("Engine init error: {0}")]
    Init(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<AvatarError> for CoreError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::Core(inner) => inner,
            AvatarError::Config(msg) => CoreError::Configuration(msg),
            AvatarError::AssetLoad(msg) => CoreError::Asset(msg),
            AvatarError::Translation(msg) => CoreError::Translation(msg),
            other => CoreError::Engine(format!("Avatar error: {}", other)),
        }
    }
}
