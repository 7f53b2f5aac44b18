//! Rendering engine implementations

pub mod hosted;

use crate::config::EngineInitConfig;
use crate::error::AvatarError;
use async_trait::async_trait;
use url::Url;

/// Trait for sign-language rendering engines
///
/// Models the boundary of the third-party avatar engine: bootstrap
/// assets, a registration probe, a one-time init entry point and a
/// per-animation playback entry point. Rendering internals live on the
/// other side of this trait.
#[async_trait]
pub trait SignEngine: Send + Sync {
    /// Fetch the engine's stylesheet asset
    async fn fetch_stylesheet(&self) -> Result<(), AvatarError>;

    /// Fetch the engine's executable asset
    async fn fetch_script(&self) -> Result<(), AvatarError>;

    /// Whether the engine handle has appeared after script
    /// self-registration
    fn is_registered(&self) -> bool;

    /// One-time initialization entry point
    fn init(&self, config: &EngineInitConfig) -> Result<(), AvatarError>;

    /// Play one sign animation file
    async fn play_sign(&self, sigml_url: &Url) -> Result<(), AvatarError>;

    /// Get engine name
    fn name(&self) -> &str;
}

pub use hosted::HostedSignEngine;
