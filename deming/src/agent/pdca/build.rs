//! Builds the model client, the search tool and the runner from [`PdcaConfig`].

use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use thiserror::Error;

use crate::graph::CompilationError;
use crate::llm::{ChatOpenAI, LlmClient, ModelId, ModelIdError};
use crate::tool_source::ToolSource;
use crate::tools::{ExaSearch, SearchProvider, SearchToolSource, TavilySearch};

use super::config::{PdcaConfig, SearchProviderKind};
use super::runner::PdcaRunner;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),
    #[error("unsupported model provider: {0} (supported: openai)")]
    UnsupportedProvider(String),
    #[error("invalid model id: {0}")]
    InvalidModel(#[from] ModelIdError),
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Chat model for `config.model`. Only the `openai` provider (and OpenAI-compatible endpoints
/// through `openai_base_url`) is supported.
pub fn build_llm(config: &PdcaConfig) -> Result<Arc<dyn LlmClient>, BuildError> {
    let id = ModelId::parse(&config.model)?;
    if id.provider != "openai" {
        return Err(BuildError::UnsupportedProvider(id.provider));
    }
    let api_key = non_empty(config.openai_api_key.as_deref())
        .ok_or(BuildError::MissingApiKey("OPENAI_API_KEY"))?;
    let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = non_empty(config.openai_base_url.as_deref()) {
        openai_config = openai_config.with_api_base(base.trim_end_matches('/'));
    }
    let mut llm = ChatOpenAI::with_config(openai_config, id.model);
    if let Some(t) = config.temperature {
        llm = llm.with_temperature(t);
    }
    tracing::debug!(model = %llm.model(), "built chat model");
    Ok(Arc::new(llm))
}

pub fn build_search_provider(config: &PdcaConfig) -> Result<Arc<dyn SearchProvider>, BuildError> {
    match config.search_provider {
        SearchProviderKind::Tavily => {
            let key = non_empty(config.tavily_api_key.as_deref())
                .ok_or(BuildError::MissingApiKey("TAVILY_API_KEY"))?;
            Ok(Arc::new(TavilySearch::new(key)))
        }
        SearchProviderKind::Exa => {
            let key = non_empty(config.exa_api_key.as_deref())
                .ok_or(BuildError::MissingApiKey("EXA_API_KEY"))?;
            Ok(Arc::new(ExaSearch::new(key)))
        }
    }
}

/// Runner from config alone: OpenAI chat model plus the configured search provider.
pub fn build_pdca_runner(config: PdcaConfig, verbose: bool) -> Result<PdcaRunner, BuildError> {
    let llm = build_llm(&config)?;
    let provider = build_search_provider(&config)?;
    let tools: Arc<dyn ToolSource> =
        Arc::new(SearchToolSource::new(provider, config.max_search_results));
    Ok(PdcaRunner::new(llm, tools, config, verbose)?)
}
