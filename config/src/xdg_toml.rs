//! `$XDG_CONFIG_HOME/<app>/config.toml`: an `[env]` table of raw variables and an `[agent]`
//! table of typed agent settings that are flattened into the same variable names.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::LoadError;

/// Resolves the config file path. `XDG_CONFIG_HOME` wins over the platform default so the
/// location can be redirected (tests, containers).
pub(crate) fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    let base = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()
            .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))?,
    };
    Ok(base.join(app_name).join("config.toml"))
}

/// Typed `[agent]` table. Every key is optional; present keys become env variables.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgentTable {
    pub model: Option<String>,
    pub max_search_results: Option<u32>,
    pub max_retries: Option<u32>,
    pub max_tool_rounds: Option<u32>,
    pub recursion_limit: Option<u32>,
    pub temperature: Option<f32>,
    pub search_provider: Option<String>,
    pub system_prompt: Option<String>,
}

impl AgentTable {
    /// Env variable name and value for each key that is set.
    pub fn to_env_pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                out.push((key.to_string(), v));
            }
        };
        push("MODEL", self.model.clone());
        push(
            "MAX_SEARCH_RESULTS",
            self.max_search_results.map(|v| v.to_string()),
        );
        push("MAX_RETRIES", self.max_retries.map(|v| v.to_string()));
        push("MAX_TOOL_ROUNDS", self.max_tool_rounds.map(|v| v.to_string()));
        push("RECURSION_LIMIT", self.recursion_limit.map(|v| v.to_string()));
        push("TEMPERATURE", self.temperature.map(|v| v.to_string()));
        push("SEARCH_PROVIDER", self.search_provider.clone());
        push("DEMING_SYSTEM_PROMPT", self.system_prompt.clone());
        out
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    agent: AgentTable,
}

/// Variables from the config file. `[env]` entries win over `[agent]` entries with the same
/// name. A missing file yields an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_path(app_name)?;
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let file: ConfigFile = toml::from_str(&content)?;
    let mut map: HashMap<String, String> = file.agent.to_env_pairs().into_iter().collect();
    map.extend(file.env);
    Ok(map)
}
