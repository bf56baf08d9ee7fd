//! Ansible dynamic inventory document assembly.

use crate::aws::ServiceError;
use crate::config::{RemoteSource, ResolvedInventory, SecretSource, SourceKind};
use crate::kvstore::KeyValueStore;
use crate::secrets::{self, SecretError, SecretService};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Variables = Map<String, Value>;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("vars file {} could not be opened: {source}", path.display())]
    VarsFileMissing { path: PathBuf, source: io::Error },
    #[error("{origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("item {key_value:?} in table {table} has no attribute {attribute:?}")]
    RemoteMissing {
        table: String,
        key_value: String,
        attribute: String,
    },
    #[error("no client available for the {0:?} variable source")]
    SourceUnavailable(SourceKind),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub hosts: Vec<String>,
    pub vars: Variables,
}

/// Group name to group. An empty document serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InventoryDocument {
    pub groups: BTreeMap<String, Group>,
}

impl InventoryDocument {
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// The single-group, single-host document for `--list`.
pub fn list(vars: Variables) -> InventoryDocument {
    list_with(
        crate::config::DEFAULT_GROUP,
        &[crate::config::DEFAULT_HOST.to_string()],
        vars,
    )
}

pub fn list_with(group: &str, hosts: &[String], vars: Variables) -> InventoryDocument {
    let mut groups = BTreeMap::new();
    groups.insert(
        group.to_string(),
        Group {
            hosts: hosts.to_vec(),
            vars,
        },
    );
    InventoryDocument { groups }
}

/// Per-host variables for `--host`. Everything lives at group level, so this is always empty.
pub fn host(_name: &str) -> InventoryDocument {
    InventoryDocument::default()
}

pub fn load_local_vars(path: &Path) -> Result<Variables, InventoryError> {
    let text = fs::read_to_string(path).map_err(|source| InventoryError::VarsFileMissing {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml_vars(&path.display().to_string(), &text)
}

pub fn parse_yaml_vars(origin: &str, text: &str) -> Result<Variables, InventoryError> {
    // An empty file means "no variables", so the group still carries `"vars": {}`
    // rather than null.
    if text.trim().is_empty() {
        return Ok(Variables::new());
    }

    let value: Value = serde_yaml::from_str(text).map_err(|e| InventoryError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    into_variables(origin, value)
}

pub fn parse_json_vars(origin: &str, text: &str) -> Result<Variables, InventoryError> {
    let value: Value = serde_json::from_str(text).map_err(|e| InventoryError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    into_variables(origin, value)
}

fn into_variables(origin: &str, value: Value) -> Result<Variables, InventoryError> {
    match value {
        Value::Object(map) => Ok(map),
        // A bare `~` or `null` document is treated like an empty file.
        Value::Null => Ok(Variables::new()),
        other => Err(InventoryError::Parse {
            origin: origin.to_string(),
            message: format!("expected a mapping at the top level, found {}", kind(&other)),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Merges variable sources given in ascending priority: a key in a later source
/// replaces the same key from any earlier one. Nested values are not merged.
pub fn merge_sources(sources: &[Variables]) -> Variables {
    let mut merged = Variables::new();
    for source in sources {
        for (key, value) in source {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Variables stored in one attribute of a key-value item. A string attribute must hold
/// a JSON object; a map attribute is used as is.
pub fn remote_vars<K>(store: &K, remote: &RemoteSource) -> Result<Variables, InventoryError>
where
    K: KeyValueStore + ?Sized,
{
    let missing = || InventoryError::RemoteMissing {
        table: remote.table.clone(),
        key_value: remote.key_value.clone(),
        attribute: remote.attribute.clone(),
    };

    let mut item = store
        .get_item(&remote.table, &remote.key_name, &remote.key_value)?
        .ok_or_else(missing)?;
    let origin = format!("{}.{}", remote.table, remote.attribute);

    match item.remove(&remote.attribute).ok_or_else(missing)? {
        Value::String(text) => parse_json_vars(&origin, &text),
        other => into_variables(&origin, other),
    }
}

/// Variables stored as a JSON object in a secret. `None` when the lookup
/// failed in one of the non-fatal, already logged ways.
pub fn secret_vars<S>(
    service: &S,
    secret: &SecretSource,
) -> Result<Option<Variables>, InventoryError>
where
    S: SecretService + ?Sized,
{
    match secrets::lookup_secret(service, &secret.name)? {
        Some(text) => parse_json_vars(&format!("secret {}", secret.name), &text).map(Some),
        None => Ok(None),
    }
}

/// Optional collaborators for the non-local variable sources.
#[derive(Default)]
pub struct Collaborators<'a> {
    pub store: Option<&'a dyn KeyValueStore>,
    pub secrets: Option<&'a dyn SecretService>,
}

/// Builds the `--list` document from every configured source, lowest priority first.
pub fn generate(
    settings: &ResolvedInventory,
    collaborators: &Collaborators<'_>,
) -> Result<InventoryDocument, InventoryError> {
    let mut layers = Vec::with_capacity(settings.sources.len());

    for source in &settings.sources {
        match source {
            SourceKind::Local => layers.push(load_local_vars(&settings.vars_file)?),
            SourceKind::Remote => {
                let store = collaborators
                    .store
                    .ok_or(InventoryError::SourceUnavailable(SourceKind::Remote))?;
                let remote = settings
                    .remote
                    .as_ref()
                    .ok_or(InventoryError::SourceUnavailable(SourceKind::Remote))?;
                layers.push(remote_vars(store, remote)?);
            }
            SourceKind::Secret => {
                let service = collaborators
                    .secrets
                    .ok_or(InventoryError::SourceUnavailable(SourceKind::Secret))?;
                let secret = settings
                    .secret
                    .as_ref()
                    .ok_or(InventoryError::SourceUnavailable(SourceKind::Secret))?;
                if let Some(vars) = secret_vars(service, secret)? {
                    layers.push(vars);
                }
            }
        }
    }

    Ok(list_with(
        &settings.group,
        &settings.hosts,
        merge_sources(&layers),
    ))
}
