//! Loads Formloom settings from `~/.config/formloom/config.toml` and a project `.env`
//! into the process environment.
//!
//! Precedence per key: **existing env > .env > config.toml**. Values are only ever set
//! for keys the environment does not already define.

mod dotenv;
mod xdg_toml;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use xdg_toml::config_path;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read config file: {0}")]
    XdgRead(std::io::Error),
    #[error("parse config toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Picks, for every key in either source, the value to apply: `.env` over config file,
/// skipping keys `is_set` reports as already present.
fn merge(
    xdg: HashMap<String, String>,
    dotenv: HashMap<String, String>,
    is_set: impl Fn(&str) -> bool,
) -> HashMap<String, String> {
    let mut merged = xdg;
    merged.extend(dotenv);
    merged.retain(|key, _| !is_set(key));
    merged
}

/// Values that [`load_and_apply`] would set, without touching the environment.
pub fn resolve(
    app_name: &str,
    dotenv_dir: Option<&Path>,
) -> Result<HashMap<String, String>, LoadError> {
    let xdg = xdg_toml::load_env_map(app_name)?;
    let dotenv = dotenv::load_env_map(dotenv_dir).map_err(LoadError::DotenvRead)?;
    Ok(merge(xdg, dotenv, |key| std::env::var_os(key).is_some()))
}

/// Applies `.env` (from `dotenv_dir`, default current directory) and the app's
/// `config.toml` to the environment. Returns the keys that were set.
///
/// Call once at startup, before spawning threads.
pub fn load_and_apply(app_name: &str, dotenv_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let values = resolve(app_name, dotenv_dir)?;
    let mut keys: Vec<String> = values.keys().cloned().collect();
    keys.sort();
    for (key, value) in values {
        std::env::set_var(key, value);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// **Scenario**: env > .env > config.toml.
    #[test]
    fn merge_precedence() {
        let xdg = map(&[("LLM_MODEL", "xdg"), ("HISTORY_LENGTH", "9"), ("OPENAI_API_KEY", "xdg")]);
        let dotenv = map(&[("LLM_MODEL", "dotenv"), ("OPENAI_API_KEY", "dotenv")]);
        let merged = merge(xdg, dotenv, |k| k == "OPENAI_API_KEY");
        assert_eq!(merged, map(&[("LLM_MODEL", "dotenv"), ("HISTORY_LENGTH", "9")]));
    }

    #[test]
    fn dotenv_values_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "FORMLOOM_CONFIG_TEST_APPLIED=yes\n",
        )
        .unwrap();
        std::env::remove_var("FORMLOOM_CONFIG_TEST_APPLIED");
        let keys = load_and_apply("formloom-config-test-no-such-app", Some(dir.path())).unwrap();
        let value = std::env::var("FORMLOOM_CONFIG_TEST_APPLIED");
        std::env::remove_var("FORMLOOM_CONFIG_TEST_APPLIED");
        assert!(keys.contains(&"FORMLOOM_CONFIG_TEST_APPLIED".to_string()));
        assert_eq!(value.as_deref(), Ok("yes"));
    }

    #[test]
    fn existing_env_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "FORMLOOM_CONFIG_TEST_KEPT=dotenv\n").unwrap();
        std::env::set_var("FORMLOOM_CONFIG_TEST_KEPT", "env");
        let keys = load_and_apply("formloom-config-test-no-such-app", Some(dir.path())).unwrap();
        let value = std::env::var("FORMLOOM_CONFIG_TEST_KEPT");
        std::env::remove_var("FORMLOOM_CONFIG_TEST_KEPT");
        assert!(keys.is_empty());
        assert_eq!(value.as_deref(), Ok("env"));
    }
}
