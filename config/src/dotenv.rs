//! `.env` reader. Produces a map; applying it to the environment happens in the crate root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DOTENV_FILE: &str = ".env";

fn dotenv_path(dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(DOTENV_FILE);
    path.is_file().then_some(path)
}

/// Strips matching quotes. Double quotes honour `\"` and `\n`; single quotes are literal.
fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return raw[1..raw.len() - 1]
            .replace("\\n", "\n")
            .replace("\\\"", "\"");
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    // unquoted: ` #` starts a trailing comment
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// One `KEY=VALUE` line; `export ` prefixes are accepted. Blank lines, `#` comments and
/// lines without `=` or with an empty key yield `None`.
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), unquote(value.trim())))
}

pub(crate) fn parse(content: &str) -> HashMap<String, String> {
    content.lines().filter_map(parse_line).collect()
}

/// Reads `.env` from `dir` (default: current directory). No file means an empty map.
pub fn load_env_map(dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_path(dir) {
        Some(path) => Ok(parse(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}
