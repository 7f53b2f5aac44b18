//! Remote translation service client

use crate::config::TranslatorConfig;
use crate::error::AvatarError;
use async_trait::async_trait;
use mudra_core::TokenSequence;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Trait for text-to-sign translation services
#[async_trait]
pub trait SignTranslator: Send + Sync {
    /// Translate text into an ordered sign token sequence
    async fn translate(&self, text: &str) -> Result<TokenSequence, AvatarError>;

    /// Get translator name
    fn name(&self) -> &str;
}

/// HTTP translation client
///
/// Posts the input text form-encoded to the translation service and
/// parses the JSON response into an ordered token sequence.
pub struct HttpTranslator {
    client: Client,
    endpoint: Url,
}

impl HttpTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self, AvatarError> {
        config.validate().map_err(AvatarError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AvatarError::Translation(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AvatarError::Config(format!("invalid translator endpoint: {}", e)))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SignTranslator for HttpTranslator {
    async fn translate(&self, text: &str) -> Result<TokenSequence, AvatarError> {
        debug!("requesting translation for {} chars", text.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("text", text)])
            .send()
            .await
            .map_err(|e| {
                AvatarError::Translation(format!(
                    "translation request to {} failed: {}",
                    self.endpoint, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(AvatarError::Translation(format!(
                "translation service returned {}: {}",
                status, snippet
            )));
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            AvatarError::Translation(format!("translation response is not valid JSON: {}", e))
        })?;

        let tokens = TokenSequence::from_json(&value)?;
        debug!("translation produced {} sign tokens", tokens.len());
        Ok(tokens)
    }

    fn name(&self) -> &str {
        "http"
    }
}
