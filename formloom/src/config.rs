//! Agent settings read from the environment.
//!
//! The CLI runs `formloom_config::load_and_apply("formloom", None)` first so `.env` and
//! `~/.config/formloom/config.toml` values are visible here.

use std::path::PathBuf;
use std::str::FromStr;

use crate::agent::DEFAULT_MAX_INTERMEDIATE_STEPS;
use crate::graph::DEFAULT_RECURSION_LIMIT;
use crate::memory::DEFAULT_HISTORY_LENGTH;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Planner model name (`LLM_MODEL`).
    pub model: String,
    /// Sampling temperature (`LLM_TEMPERATURE`).
    pub temperature: f32,
    /// Chat exchanges kept per conversation (`HISTORY_LENGTH`).
    pub history_length: usize,
    /// Node executions per turn (`RECURSION_LIMIT`).
    pub recursion_limit: usize,
    /// Tool steps shown to the planner (`MAX_INTERMEDIATE_STEPS`).
    pub max_intermediate_steps: usize,
    /// SQLite file for conversation state (`STATE_DB_PATH`); `None` keeps state in memory.
    pub state_db_path: Option<PathBuf>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            history_length: DEFAULT_HISTORY_LENGTH,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            max_intermediate_steps: DEFAULT_MAX_INTERMEDIATE_STEPS,
            state_db_path: None,
            openai_api_key: None,
            openai_base_url: None,
        }
    }
}

impl AgentConfig {
    /// Reads `LLM_MODEL`, `LLM_TEMPERATURE`, `HISTORY_LENGTH`, `RECURSION_LIMIT`,
    /// `MAX_INTERMEDIATE_STEPS`, `STATE_DB_PATH`, `OPENAI_API_KEY`, `OPENAI_BASE_URL`.
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            model: non_empty("LLM_MODEL").unwrap_or(defaults.model),
            temperature: parsed(non_empty("LLM_TEMPERATURE")).unwrap_or(defaults.temperature),
            history_length: parsed(non_empty("HISTORY_LENGTH"))
                .unwrap_or(defaults.history_length),
            recursion_limit: parsed(non_empty("RECURSION_LIMIT"))
                .unwrap_or(defaults.recursion_limit),
            max_intermediate_steps: parsed(non_empty("MAX_INTERMEDIATE_STEPS"))
                .unwrap_or(defaults.max_intermediate_steps),
            state_db_path: non_empty("STATE_DB_PATH").map(PathBuf::from),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL"),
        }
    }
}

fn parsed<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = AgentConfig::from_lookup(|_| None);
        assert_eq!(cfg, AgentConfig::default());
        assert_eq!(cfg.model, "gpt-3.5-turbo-0125");
        assert_eq!(cfg.recursion_limit, 25);
        assert_eq!(cfg.max_intermediate_steps, 5);
        assert_eq!(cfg.history_length, 20);
    }

    /// **Scenario**: Set values override defaults; garbage numbers fall back.
    #[test]
    fn lookup_overrides_and_lenient_numbers() {
        let vars: HashMap<&str, &str> = [
            ("LLM_MODEL", "gpt-4o-mini"),
            ("LLM_TEMPERATURE", "0.3"),
            ("RECURSION_LIMIT", "many"),
            ("HISTORY_LENGTH", " 4 "),
            ("STATE_DB_PATH", "/tmp/state.db"),
        ]
        .into_iter()
        .collect();
        let cfg = AgentConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert!((cfg.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(cfg.recursion_limit, 25);
        assert_eq!(cfg.history_length, 4);
        assert_eq!(cfg.state_db_path, Some(PathBuf::from("/tmp/state.db")));
    }

    /// **Scenario**: Every numeric key parses into its own type.
    #[test]
    fn lookup_parses_all_numeric_keys() {
        let vars: HashMap<&str, &str> = [
            ("LLM_TEMPERATURE", "0.7"),
            ("HISTORY_LENGTH", "8"),
            ("RECURSION_LIMIT", "40"),
            ("MAX_INTERMEDIATE_STEPS", "3"),
        ]
        .into_iter()
        .collect();
        let cfg = AgentConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.history_length, 8);
        assert_eq!(cfg.recursion_limit, 40);
        assert_eq!(cfg.max_intermediate_steps, 3);
        assert_eq!(cfg.model, DEFAULT_MODEL);
    }
}
