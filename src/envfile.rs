//! Minimal dotenv reader used to fill credentials the process environment lacks.

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("env file {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("read env file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("env file line {line}: {reason}")]
    Syntax { line: usize, reason: String },
}

pub fn read(path: &Path) -> Result<HashMap<String, String>, EnvFileError> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            EnvFileError::NotFound(path.to_path_buf())
        } else {
            EnvFileError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<HashMap<String, String>, EnvFileError> {
    let mut vars = HashMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").map(str::trim).unwrap_or(line);
        let Some((name, value)) = line.split_once('=') else {
            return Err(syntax(line_no, "expected NAME=VALUE"));
        };

        let name = name.trim();
        if !NAME_RE.is_match(name) {
            return Err(syntax(line_no, format!("invalid name {name:?}")));
        }

        let value = unquote(value.trim()).map_err(|reason| syntax(line_no, reason))?;
        vars.insert(name.to_string(), value);
    }

    Ok(vars)
}

fn unquote(value: &str) -> Result<String, &'static str> {
    if value.starts_with('"') {
        if !value.ends_with('"') || value.len() == 1 {
            return Err("unterminated quoted value");
        }
        return serde_json::from_str::<String>(value).map_err(|_| "invalid double-quoted value");
    }

    if let Some(rest) = value.strip_prefix('\'') {
        return rest
            .strip_suffix('\'')
            .map(str::to_string)
            .ok_or("unterminated quoted value");
    }

    let bare = match value.find(" #") {
        Some(idx) => value[..idx].trim_end(),
        None => value,
    };
    Ok(bare.to_string())
}

fn syntax(line: usize, reason: impl Into<String>) -> EnvFileError {
    EnvFileError::Syntax {
        line,
        reason: reason.into(),
    }
}
