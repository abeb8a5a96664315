//! `provider/model` identifiers such as `openai/gpt-4o-mini`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Provider assumed when the identifier has no `provider/` prefix.
pub const DEFAULT_PROVIDER: &str = "openai";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelIdError {
    #[error("model id is empty")]
    Empty,
    #[error("model id {0:?} has an empty provider or model name")]
    Malformed(String),
}

/// Parsed model identifier. The provider is lowercased; the model name is kept as given
/// (it may itself contain `/`, e.g. `openrouter/meta-llama/llama-3`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: String,
    pub model: String,
}

impl ModelId {
    pub fn parse(s: &str) -> Result<Self, ModelIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ModelIdError::Empty);
        }
        match s.split_once('/') {
            Some((provider, model)) => {
                let provider = provider.trim();
                let model = model.trim();
                if provider.is_empty() || model.is_empty() {
                    return Err(ModelIdError::Malformed(s.to_string()));
                }
                Ok(Self {
                    provider: provider.to_lowercase(),
                    model: model.to_string(),
                })
            }
            None => Ok(Self {
                provider: DEFAULT_PROVIDER.to_string(),
                model: s.to_string(),
            }),
        }
    }
}

impl FromStr for ModelId {
    type Err = ModelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
