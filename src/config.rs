use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

pub const CURRENT_VERSION: i32 = 1;
pub const DEFAULT_PATH: &str = "./cloudops.yml";
pub const DEFAULT_VARS_FILE: &str = "env_vars.yml";
pub const DEFAULT_GROUP: &str = "default";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

static GROUP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

const RESERVED_GROUPS: &[&str] = &["_meta", "all", "ungrouped"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub version: i32,
    pub poll: Poll,
    pub inventory: Inventory,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            poll: Poll::default(),
            inventory: Inventory::default(),
            endpoints: Endpoints::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Poll {
    pub grace: String,
    pub interval: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
    Secret,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Inventory {
    pub vars_file: String,
    pub group: String,
    pub hosts: Vec<String>,
    /// Variable sources in ascending priority.
    pub sources: Vec<SourceKind>,
    pub remote: Option<RemoteSource>,
    pub secret: Option<SecretSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSource {
    pub table: String,
    pub key_name: String,
    pub key_value: String,
    pub attribute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SecretSource {
    pub name: String,
    pub region: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Endpoints {
    pub codebuild: String,
    pub logs: String,
    pub secretsmanager: String,
    pub dynamodb: String,
}

impl Endpoints {
    pub fn codebuild(&self) -> Option<&str> {
        non_blank(&self.codebuild)
    }

    pub fn logs(&self) -> Option<&str> {
        non_blank(&self.logs)
    }

    pub fn secretsmanager(&self) -> Option<&str> {
        non_blank(&self.secretsmanager)
    }

    pub fn dynamodb(&self) -> Option<&str> {
        non_blank(&self.dynamodb)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub grace: Duration,
    pub interval: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
            interval: DEFAULT_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedInventory {
    pub vars_file: PathBuf,
    pub group: String,
    pub hosts: Vec<String>,
    pub sources: Vec<SourceKind>,
    pub remote: Option<RemoteSource>,
    pub secret: Option<SecretSource>,
}

impl ResolvedInventory {
    pub fn needs_credentials(&self) -> bool {
        self.sources
            .iter()
            .any(|source| matches!(source, SourceKind::Remote | SourceKind::Secret))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    pub issues: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.issues.push(ValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.issues.first() {
            write!(
                f,
                "configuration validation failed: {}: {}",
                first.field, first.message
            )
        } else {
            write!(f, "configuration validation failed")
        }
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let cfg = parse(path)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Loads the settings file when present. A missing file is only an error when the
/// caller named it explicitly.
pub fn load_optional(path: &Path, explicit: bool) -> Result<Config, ConfigError> {
    match parse(path) {
        Err(ConfigError::NotFound(_)) if !explicit => Ok(Config::default()),
        Err(err) => Err(err),
        Ok(cfg) => {
            validate(&cfg)?;
            Ok(cfg)
        }
    }
}

pub fn parse(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(serde_yaml::from_str(&text)?)
}

pub fn validate(cfg: &Config) -> Result<(), ValidationErrors> {
    let mut issues = ValidationErrors::new();

    if cfg.version != CURRENT_VERSION {
        issues.add("version", format!("must be {CURRENT_VERSION}"));
    }

    validate_poll(&mut issues, &cfg.poll);
    validate_inventory(&mut issues, &cfg.inventory);
    validate_endpoints(&mut issues, &cfg.endpoints);

    if issues.has_issues() {
        Err(issues)
    } else {
        Ok(())
    }
}

impl Config {
    pub fn resolve_poll(
        &self,
        grace_flag: &str,
        interval_flag: &str,
    ) -> Result<PollTiming, String> {
        let grace = resolve_duration(grace_flag, &self.poll.grace, DEFAULT_GRACE)
            .map_err(|e| format!("poll.grace: {e}"))?;
        let interval = resolve_duration(interval_flag, &self.poll.interval, DEFAULT_INTERVAL)
            .map_err(|e| format!("poll.interval: {e}"))?;

        if interval.is_zero() {
            return Err("poll.interval: must be greater than zero".to_string());
        }

        Ok(PollTiming { grace, interval })
    }

    pub fn resolve_inventory(&self) -> ResolvedInventory {
        let inv = &self.inventory;

        ResolvedInventory {
            vars_file: PathBuf::from(non_empty_or(&inv.vars_file, DEFAULT_VARS_FILE)),
            group: non_empty_or(&inv.group, DEFAULT_GROUP),
            hosts: if inv.hosts.is_empty() {
                vec![DEFAULT_HOST.to_string()]
            } else {
                inv.hosts.clone()
            },
            sources: if inv.sources.is_empty() {
                vec![SourceKind::Local]
            } else {
                inv.sources.clone()
            },
            remote: inv.remote.clone(),
            secret: inv.secret.clone(),
        }
    }
}

fn validate_poll(issues: &mut ValidationErrors, poll: &Poll) {
    if !poll.grace.is_empty() && parse_duration(&poll.grace).is_err() {
        issues.add("poll.grace", "must be a valid duration");
    }

    if !poll.interval.is_empty() {
        match parse_duration(&poll.interval) {
            Ok(d) if d.is_zero() => issues.add("poll.interval", "must be greater than zero"),
            Ok(_) => {}
            Err(_) => issues.add("poll.interval", "must be a valid duration"),
        }
    }
}

fn validate_inventory(issues: &mut ValidationErrors, inv: &Inventory) {
    if !inv.group.is_empty() {
        if !GROUP_NAME_RE.is_match(&inv.group) {
            issues.add("inventory.group", "name must match ^[A-Za-z_][A-Za-z0-9_]*$");
        }
        if RESERVED_GROUPS.contains(&inv.group.as_str()) {
            issues.add("inventory.group", "name is reserved");
        }
    }

    for (idx, host) in inv.hosts.iter().enumerate() {
        if host.trim().is_empty() {
            issues.add(format!("inventory.hosts[{idx}]"), "must not be empty");
        }
    }

    for (idx, source) in inv.sources.iter().enumerate() {
        if inv.sources[..idx].contains(source) {
            issues.add(format!("inventory.sources[{idx}]"), "is listed twice");
        }
    }

    if inv.sources.contains(&SourceKind::Remote) {
        match &inv.remote {
            None => issues.add("inventory.remote", "is required when sources include remote"),
            Some(remote) => {
                for (field, value) in [
                    ("table", &remote.table),
                    ("key_name", &remote.key_name),
                    ("key_value", &remote.key_value),
                    ("attribute", &remote.attribute),
                ] {
                    if value.trim().is_empty() {
                        issues.add(format!("inventory.remote.{field}"), "is required");
                    }
                }
            }
        }
    }

    if inv.sources.contains(&SourceKind::Secret) {
        match &inv.secret {
            None => issues.add("inventory.secret", "is required when sources include secret"),
            Some(secret) => {
                if secret.name.trim().is_empty() {
                    issues.add("inventory.secret.name", "is required");
                }
                if !secret.endpoint.is_empty() && reqwest::Url::parse(&secret.endpoint).is_err() {
                    issues.add("inventory.secret.endpoint", "must be a valid URL");
                }
            }
        }
    }
}

fn validate_endpoints(issues: &mut ValidationErrors, endpoints: &Endpoints) {
    for (field, value) in [
        ("codebuild", &endpoints.codebuild),
        ("logs", &endpoints.logs),
        ("secretsmanager", &endpoints.secretsmanager),
        ("dynamodb", &endpoints.dynamodb),
    ] {
        if !value.is_empty() && reqwest::Url::parse(value).is_err() {
            issues.add(format!("endpoints.{field}"), "must be a valid URL");
        }
    }
}

fn parse_duration(text: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(text)
}

fn resolve_duration(
    primary: &str,
    fallback: &str,
    default_value: Duration,
) -> Result<Duration, String> {
    let value = if !primary.is_empty() {
        primary
    } else if !fallback.is_empty() {
        fallback
    } else {
        return Ok(default_value);
    };

    parse_duration(value).map_err(|_| "must be a valid duration".to_string())
}

fn non_empty_or(value: &str, default_value: &str) -> String {
    if value.trim().is_empty() {
        default_value.to_string()
    } else {
        value.to_string()
    }
}
