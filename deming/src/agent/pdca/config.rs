//! Configuration for building a PDCA runner.

use std::path::Path;
use std::str::FromStr;

use crate::graph::DEFAULT_RECURSION_LIMIT;

use super::prompts::SYSTEM_PROMPT;

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// One search round per Do attempt.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 1;

/// Name under which `.env` / XDG config are looked up.
pub const APP_NAME: &str = "deming";

/// Which web search backend the `search` tool uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchProviderKind {
    #[default]
    Tavily,
    Exa,
}

impl SearchProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProviderKind::Tavily => "tavily",
            SearchProviderKind::Exa => "exa",
        }
    }
}

impl FromStr for SearchProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tavily" => Ok(Self::Tavily),
            "exa" => Ok(Self::Exa),
            _ => Err(format!("unknown search provider: {} (use tavily or exa)", s)),
        }
    }
}

/// Configuration for a PDCA run.
#[derive(Clone, Debug)]
pub struct PdcaConfig {
    /// `provider/model`, e.g. `openai/gpt-4o-mini`.
    pub model: String,
    pub max_search_results: usize,
    /// System prompt template rendered before every phase.
    pub system_prompt: String,
    /// Do attempts per step before Act is forced.
    pub max_retries: u32,
    /// Search rounds Do may take within one attempt.
    pub max_tool_rounds: u32,
    pub recursion_limit: usize,
    pub temperature: Option<f32>,
    pub search_provider: SearchProviderKind,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub tavily_api_key: Option<String>,
    pub exa_api_key: Option<String>,
}

impl Default for PdcaConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            temperature: None,
            search_provider: SearchProviderKind::default(),
            openai_api_key: None,
            openai_base_url: None,
            tavily_api_key: None,
            exa_api_key: None,
        }
    }
}

impl PdcaConfig {
    /// Builds config from environment variables. Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads `.env` and `$XDG_CONFIG_HOME/deming/config.toml` into the environment (existing
    /// variables win), then reads the config from it.
    ///
    /// `dir` is where `.env` is looked for; the current directory when `None`.
    pub fn load(dir: Option<&Path>) -> Result<Self, env_config::LoadError> {
        let applied = env_config::load_and_apply(APP_NAME, dir)?;
        if !applied.vars.is_empty() {
            let names: Vec<&str> = applied.vars.iter().map(|(k, _)| k.as_str()).collect();
            tracing::debug!(vars = ?names, "applied config variables");
        }
        Ok(Self::from_env())
    }

    /// Builds config from a variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: FromStr>(raw: Option<String>) -> Option<T> {
            raw.and_then(|s| s.trim().parse().ok())
        }
        let defaults = Self::default();
        Self {
            model: get("MODEL")
                .or_else(|| get("OPENAI_MODEL"))
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.model),
            max_search_results: parsed(get("MAX_SEARCH_RESULTS"))
                .unwrap_or(defaults.max_search_results),
            system_prompt: get("DEMING_SYSTEM_PROMPT")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.system_prompt),
            max_retries: parsed(get("MAX_RETRIES")).unwrap_or(defaults.max_retries),
            max_tool_rounds: parsed(get("MAX_TOOL_ROUNDS")).unwrap_or(defaults.max_tool_rounds),
            recursion_limit: parsed(get("RECURSION_LIMIT"))
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.recursion_limit),
            temperature: parsed(get("TEMPERATURE")),
            search_provider: parsed(get("SEARCH_PROVIDER")).unwrap_or(defaults.search_provider),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            tavily_api_key: get("TAVILY_API_KEY"),
            exa_api_key: get("EXA_API_KEY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let c = PdcaConfig::from_lookup(lookup(&[]));
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.max_search_results, 10);
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.max_tool_rounds, 1);
        assert_eq!(c.recursion_limit, 100);
        assert_eq!(c.search_provider, SearchProviderKind::Tavily);
        assert_eq!(c.system_prompt, SYSTEM_PROMPT);
        assert!(c.temperature.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let c = PdcaConfig::from_lookup(lookup(&[
            ("MODEL", "openai/gpt-4o"),
            ("MAX_SEARCH_RESULTS", "5"),
            ("MAX_RETRIES", "2"),
            ("MAX_TOOL_ROUNDS", "3"),
            ("RECURSION_LIMIT", "40"),
            ("TEMPERATURE", "0.2"),
            ("SEARCH_PROVIDER", "Exa"),
            ("DEMING_SYSTEM_PROMPT", "custom {phase}"),
            ("OPENAI_API_KEY", "sk"),
            ("TAVILY_API_KEY", "tvly"),
        ]));
        assert_eq!(c.model, "openai/gpt-4o");
        assert_eq!(c.max_search_results, 5);
        assert_eq!(c.max_retries, 2);
        assert_eq!(c.max_tool_rounds, 3);
        assert_eq!(c.recursion_limit, 40);
        assert_eq!(c.temperature, Some(0.2));
        assert_eq!(c.search_provider, SearchProviderKind::Exa);
        assert_eq!(c.system_prompt, "custom {phase}");
        assert_eq!(c.openai_api_key.as_deref(), Some("sk"));
        assert_eq!(c.tavily_api_key.as_deref(), Some("tvly"));
        assert!(c.exa_api_key.is_none());
    }

    #[test]
    fn openai_model_is_a_fallback_for_model() {
        let c = PdcaConfig::from_lookup(lookup(&[("OPENAI_MODEL", "gpt-4.1")]));
        assert_eq!(c.model, "gpt-4.1");
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let c = PdcaConfig::from_lookup(lookup(&[
            ("MAX_RETRIES", "many"),
            ("RECURSION_LIMIT", "0"),
            ("SEARCH_PROVIDER", "bing"),
        ]));
        assert_eq!(c.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(c.recursion_limit, DEFAULT_RECURSION_LIMIT);
        assert_eq!(c.search_provider, SearchProviderKind::Tavily);
    }
}
