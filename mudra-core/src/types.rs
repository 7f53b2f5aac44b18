//! Shared domain types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Maximum length of a single sign token in characters
const MAX_TOKEN_CHARS: usize = 64;

/// One unit of translated output, addressable as a single animation file
///
/// Tokens are interpolated into animation asset URLs, so construction
/// rejects anything that could escape the sign-file directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignToken(String);

impl SignToken {
    /// Create a token, validating it is safe to use in an asset URL
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Translation("empty sign token".to_string()));
        }

        if token.chars().count() > MAX_TOKEN_CHARS {
            return Err(Error::Translation(format!(
                "sign token too long (max {} chars)",
                MAX_TOKEN_CHARS
            )));
        }

        if token.contains("..") {
            return Err(Error::Translation(format!(
                "sign token '{}' contains path traversal",
                token
            )));
        }

        if token
            .chars()
            .any(|c| c.is_control() || c == '/' || c == '\\' || c == '?' || c == '#' || c == '%')
        {
            return Err(Error::Translation(format!(
                "sign token '{}' contains invalid characters",
                token
            )));
        }

        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for SignToken {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// An ordered sequence of sign tokens for one translation
///
/// Order is playback order and is preserved exactly: no reordering,
/// no deduplication, no sorting beyond the explicit numeric-key
/// ordering of the object wire form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenSequence {
    tokens: Vec<SignToken>,
}

impl TokenSequence {
    pub fn new(tokens: Vec<SignToken>) -> Self {
        Self { tokens }
    }

    /// Parse a translation service response body.
    ///
    /// Accepts either a JSON array of strings, or a JSON object whose
    /// keys all parse as integers (the wire shape the translation
    /// backend emits: `{"0":"I","1":"love","2":"apples"}`). Object
    /// entries are ordered by numeric key. The service contract is an
    /// explicitly ordered list: an object with a non-numeric key is
    /// rejected rather than relying on key iteration order.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Array(items) => {
                let mut tokens = Vec::with_capacity(items.len());
                for item in items {
                    tokens.push(Self::string_token(item)?);
                }
                Ok(Self { tokens })
            }
            JsonValue::Object(entries) => {
                let mut keyed: Vec<(usize, SignToken)> = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    let index: usize = key.parse().map_err(|_| {
                        Error::Translation(format!(
                            "non-numeric key '{}' in translation response",
                            key
                        ))
                    })?;
                    keyed.push((index, Self::string_token(item)?));
                }
                keyed.sort_by_key(|(index, _)| *index);
                Ok(Self {
                    tokens: keyed.into_iter().map(|(_, token)| token).collect(),
                })
            }
            other => Err(Error::Translation(format!(
                "unexpected translation response shape: {}",
                other
            ))),
        }
    }

    fn string_token(item: &JsonValue) -> Result<SignToken> {
        let text = item.as_str().ok_or_else(|| {
            Error::Translation(format!("expected string token, got {}", item))
        })?;
        SignToken::new(text)
    }

    /// Tokens joined by single spaces, for display
    pub fn joined(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SignToken> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> IntoIterator for &'a TokenSequence {
    type Item = &'a SignToken;
    type IntoIter = std::slice::Iter<'a, SignToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
