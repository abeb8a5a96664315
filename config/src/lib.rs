//! Load configuration from XDG `config.toml` and project `.env`, then apply it to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! The XDG file may carry two tables:
//!
//! ```toml
//! [env]
//! OPENAI_API_KEY = "sk-..."
//! TAVILY_API_KEY = "tvly-..."
//!
//! [agent]
//! model = "openai/gpt-4o-mini"
//! max_search_results = 10
//! max_retries = 3
//! ```
//!
//! `[agent]` keys are flattened to the variable names the agent reads (`MODEL`,
//! `MAX_SEARCH_RESULTS`, ...); `[env]` wins when both name the same variable.

mod dotenv;
mod xdg_toml;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use xdg_toml::AgentTable;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Where an applied variable came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Dotenv,
    XdgConfig,
}

/// Names (never values) of the variables `load_and_apply` set, sorted by name.
#[derive(Debug, Default)]
pub struct Applied {
    pub vars: Vec<(String, Source)>,
}

impl Applied {
    pub fn contains(&self, key: &str) -> bool {
        self.vars.iter().any(|(k, _)| k == key)
    }
}

/// Path of the XDG config file for `app_name` (it may not exist).
pub fn config_file_path(app_name: &str) -> Result<PathBuf, LoadError> {
    xdg_toml::config_path(app_name)
}

/// Loads `.env` and the XDG config file and sets every variable that is **not** already present
/// in the process environment.
///
/// * `app_name`: e.g. `"deming"`, giving `$XDG_CONFIG_HOME/deming/config.toml`.
/// * `override_dir`: directory holding `.env`; defaults to the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Applied, LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let keys: HashSet<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    let mut applied = Applied::default();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        let picked = match (dotenv_map.get(key), xdg_map.get(key)) {
            (Some(v), _) => Some((v, Source::Dotenv)),
            (None, Some(v)) => Some((v, Source::XdgConfig)),
            (None, None) => None,
        };
        if let Some((value, source)) = picked {
            std::env::set_var(key, value);
            applied.vars.push((key.clone(), source));
        }
    }
    applied.vars.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(applied)
}


#[cfg(test)]
mod tests {
    use super::test_env::{lock_env, with_xdg_home};
    use super::*;
    use std::env;

    fn write_xdg(dir: &Path, body: &str) {
        let app_dir = dir.join("deming");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn existing_env_wins() {
        let _guard = lock_env();
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "[env]\nDEMING_TEST_EXISTING = \"from_xdg\"\n");
        env::set_var("DEMING_TEST_EXISTING", "from_env");

        let applied =
            with_xdg_home(xdg.path(), || load_and_apply("deming", Some(xdg.path()))).unwrap();
        assert_eq!(env::var("DEMING_TEST_EXISTING").as_deref(), Ok("from_env"));
        assert!(!applied.contains("DEMING_TEST_EXISTING"));
        env::remove_var("DEMING_TEST_EXISTING");
    }

    #[test]
    fn no_config_anywhere_is_ok() {
        let _guard = lock_env();
        let xdg = tempfile::tempdir().unwrap();
        let empty = tempfile::tempdir().unwrap();
        let applied =
            with_xdg_home(xdg.path(), || load_and_apply("deming", Some(empty.path()))).unwrap();
        assert!(applied.vars.is_empty());
    }

    #[test]
    fn dotenv_overrides_xdg() {
        let _guard = lock_env();
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "[env]\nDEMING_TEST_PRIORITY = \"from_xdg\"\n");
        let project = tempfile::tempdir().unwrap();
        std::fs::write(
            project.path().join(".env"),
            "DEMING_TEST_PRIORITY=from_dotenv\n",
        )
        .unwrap();
        env::remove_var("DEMING_TEST_PRIORITY");

        let applied =
            with_xdg_home(xdg.path(), || load_and_apply("deming", Some(project.path()))).unwrap();
        let val = env::var("DEMING_TEST_PRIORITY").unwrap();
        env::remove_var("DEMING_TEST_PRIORITY");

        assert_eq!(val, "from_dotenv");
        assert_eq!(
            applied.vars,
            vec![("DEMING_TEST_PRIORITY".to_string(), Source::Dotenv)]
        );
    }

    #[test]
    fn agent_table_applies_when_nothing_else_sets_it() {
        let _guard = lock_env();
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "[agent]\nmax_tool_rounds = 2\n");
        let empty = tempfile::tempdir().unwrap();
        let prev = env::var_os("MAX_TOOL_ROUNDS");
        env::remove_var("MAX_TOOL_ROUNDS");

        let applied =
            with_xdg_home(xdg.path(), || load_and_apply("deming", Some(empty.path()))).unwrap();
        let val = env::var("MAX_TOOL_ROUNDS").unwrap();
        match prev {
            Some(v) => env::set_var("MAX_TOOL_ROUNDS", v),
            None => env::remove_var("MAX_TOOL_ROUNDS"),
        }

        assert_eq!(val, "2");
        assert!(applied.contains("MAX_TOOL_ROUNDS"));
    }

    #[test]
    fn invalid_xdg_toml_fails_with_xdg_parse_error() {
        let _guard = lock_env();
        let xdg = tempfile::tempdir().unwrap();
        write_xdg(xdg.path(), "invalid [[[\n");

        let result = with_xdg_home(xdg.path(), || load_and_apply("deming", Some(xdg.path())));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }

    #[test]
    fn config_file_path_follows_xdg_home() {
        let _guard = lock_env();
        let xdg = tempfile::tempdir().unwrap();
        let path = with_xdg_home(xdg.path(), || config_file_path("deming")).unwrap();
        assert_eq!(path, xdg.path().join("deming").join("config.toml"));
    }
}
