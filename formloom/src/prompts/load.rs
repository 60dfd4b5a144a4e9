//! Load planner prompts from YAML and apply env overrides.
//!
//! Default text lives in `formloom/prompts/form_agent.yaml`, embedded at compile time.
//! A `form_agent.yaml` in the prompts directory (argument, else `PROMPTS_DIR`, else
//! `./prompts`) overrides individual keys; `FORM_AGENT_BASE_PROMPT` overrides the persona.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::FormAgentPrompts;

const EMBED_FORM_AGENT: &str = include_str!("../../prompts/form_agent.yaml");

const FORM_AGENT_FILE: &str = "form_agent.yaml";
const DEFAULT_PROMPTS_DIR: &str = "prompts";
const BASE_PROMPT_ENV: &str = "FORM_AGENT_BASE_PROMPT";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("prompts directory not found or not readable: {0}")]
    DirNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

/// On-disk shape; every key optional so a file may override only some prompts.
#[derive(Debug, Default, Deserialize)]
struct PromptsFile {
    base_prompt: Option<String>,
    error_prompt: Option<String>,
    collect_field_prompt: Option<String>,
    confirm_prompt: Option<String>,
}

impl PromptsFile {
    fn over(self, base: FormAgentPrompts) -> FormAgentPrompts {
        FormAgentPrompts {
            base_prompt: self.base_prompt.unwrap_or(base.base_prompt),
            error_prompt: self.error_prompt.unwrap_or(base.error_prompt),
            collect_field_prompt: self
                .collect_field_prompt
                .unwrap_or(base.collect_field_prompt),
            confirm_prompt: self.confirm_prompt.unwrap_or(base.confirm_prompt),
        }
    }
}

fn prompts_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(PathBuf::from).unwrap_or_else(|| {
        std::env::var("PROMPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

fn read_prompts_file(dir: &Path) -> Result<Option<PromptsFile>, LoadError> {
    let path = dir.join(FORM_AGENT_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LoadError::ReadFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| LoadError::ParseYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

fn apply_env(mut prompts: FormAgentPrompts) -> FormAgentPrompts {
    if let Ok(s) = std::env::var(BASE_PROMPT_ENV) {
        prompts.base_prompt = s;
    }
    prompts
}

fn embedded() -> FormAgentPrompts {
    serde_yaml::from_str::<PromptsFile>(EMBED_FORM_AGENT)
        .unwrap_or_default()
        .over(FormAgentPrompts::empty())
}

/// Embedded defaults plus env overrides.
pub fn default_from_embedded() -> FormAgentPrompts {
    apply_env(embedded())
}

/// Embedded defaults overridden by `form_agent.yaml` in the prompts directory, then env.
///
/// A directory without the file is fine (defaults kept); a missing directory or a file
/// that fails to parse is an error.
pub fn load(dir: Option<&Path>) -> Result<FormAgentPrompts, LoadError> {
    let base = prompts_dir(dir);
    if !base.is_dir() {
        return Err(LoadError::DirNotFound(base.display().to_string()));
    }
    let prompts = match read_prompts_file(&base)? {
        Some(file) => file.over(embedded()),
        None => embedded(),
    };
    Ok(apply_env(prompts))
}

/// [`load`], falling back to [`default_from_embedded`] on any error.
pub fn load_or_default(dir: Option<&Path>) -> FormAgentPrompts {
    load(dir).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "using embedded prompts");
        default_from_embedded()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_have_placeholders() {
        let p = embedded();
        assert!(p.base_prompt.contains("{now}"));
        assert!(p.error_prompt.contains("{error}"));
        assert!(p.collect_field_prompt.contains("{field}"));
        assert!(p.confirm_prompt.contains("confirm=true"));
    }

    #[test]
    fn load_nonexistent_dir_returns_error() {
        let err = load(Some(Path::new("/nonexistent_prompts_dir_formloom"))).unwrap_err();
        assert!(matches!(err, LoadError::DirNotFound(_)));
    }

    /// **Scenario**: A file overriding one key keeps the embedded text for the others.
    #[test]
    fn load_partial_override() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(FORM_AGENT_FILE),
            "error_prompt: \"Oops: {error}\"\n",
        )
        .unwrap();
        let p = load(Some(temp.path())).unwrap();
        assert_eq!(p.error_prompt, "Oops: {error}");
        assert_eq!(p.confirm_prompt, embedded().confirm_prompt);
    }

    #[test]
    fn load_invalid_yaml_returns_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(FORM_AGENT_FILE), "base_prompt: [not closed").unwrap();
        let err = load(Some(temp.path())).unwrap_err();
        assert!(matches!(err, LoadError::ParseYaml { .. }));
        let fallback = load_or_default(Some(temp.path()));
        assert_eq!(fallback.error_prompt, embedded().error_prompt);
    }
}
