//! `$XDG_CONFIG_HOME/<app>/config.toml`: free-form `[env]` plus typed `[agent]` settings.
//!
//! ```toml
//! [env]
//! OPENAI_API_KEY = "sk-..."
//!
//! [agent]
//! model = "gpt-4o-mini"
//! temperature = 0.2
//! history_length = 10
//! ```
//!
//! `[agent]` keys are flattened to the environment names the agent reads
//! (`LLM_MODEL`, `LLM_TEMPERATURE`, ...). A key set in both tables takes the `[env]` value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

const CONFIG_FILE: &str = "config.toml";

/// Config root: `XDG_CONFIG_HOME` when set, else the platform config directory.
fn config_home() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

/// Path of the app's config file, if the config root is known.
pub fn config_path(app_name: &str) -> Option<PathBuf> {
    config_home().map(|home| home.join(app_name).join(CONFIG_FILE))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentSection {
    model: Option<String>,
    temperature: Option<f32>,
    history_length: Option<usize>,
    recursion_limit: Option<usize>,
    max_intermediate_steps: Option<usize>,
    state_db_path: Option<PathBuf>,
    prompts_dir: Option<PathBuf>,
}

impl AgentSection {
    fn into_env(self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut put = |key: &'static str, value: Option<String>| {
            if let Some(v) = value {
                out.push((key, v));
            }
        };
        put("LLM_MODEL", self.model);
        put("LLM_TEMPERATURE", self.temperature.map(|t| t.to_string()));
        put("HISTORY_LENGTH", self.history_length.map(|n| n.to_string()));
        put("RECURSION_LIMIT", self.recursion_limit.map(|n| n.to_string()));
        put(
            "MAX_INTERMEDIATE_STEPS",
            self.max_intermediate_steps.map(|n| n.to_string()),
        );
        put(
            "STATE_DB_PATH",
            self.state_db_path.map(|p| p.display().to_string()),
        );
        put("PROMPTS_DIR", self.prompts_dir.map(|p| p.display().to_string()));
        out
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    agent: AgentSection,
}

pub(crate) fn parse(content: &str) -> Result<HashMap<String, String>, LoadError> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut map: HashMap<String, String> = file
        .agent
        .into_env()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    map.extend(file.env);
    Ok(map)
}

/// Reads `path`; a missing file is an empty map.
pub fn load_file(path: &Path) -> Result<HashMap<String, String>, LoadError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(LoadError::XdgRead)?;
    parse(&content)
}

/// Env pairs from the app's config file; no config root or no file gives an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    match config_path(app_name) {
        Some(path) => load_file(&path),
        None => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: `[agent]` keys map to env names; `[env]` wins on conflicts.
    #[test]
    fn agent_table_flattens_and_env_wins() {
        let map = parse(
            r#"
[env]
OPENAI_API_KEY = "sk-test"
LLM_MODEL = "from-env-table"

[agent]
model = "gpt-4o-mini"
temperature = 0.5
recursion_limit = 30
state_db_path = "/var/lib/formloom/state.db"
"#,
        )
        .unwrap();
        assert_eq!(map["OPENAI_API_KEY"], "sk-test");
        assert_eq!(map["LLM_MODEL"], "from-env-table");
        assert_eq!(map["LLM_TEMPERATURE"], "0.5");
        assert_eq!(map["RECURSION_LIMIT"], "30");
        assert_eq!(map["STATE_DB_PATH"], "/var/lib/formloom/state.db");
        assert!(!map.contains_key("HISTORY_LENGTH"));
    }

    #[test]
    fn unknown_agent_key_is_a_parse_error() {
        let err = parse("[agent]\nmodle = \"typo\"\n").unwrap_err();
        assert!(matches!(err, LoadError::XdgParse(_)));
    }

    #[test]
    fn missing_file_and_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(load_file(&path).unwrap().is_empty());
        std::fs::write(&path, "[env]\n[other]\nx = 1\n").unwrap();
        assert!(load_file(&path).unwrap().is_empty());
    }
}
