use cloudops::aws::ServiceError;
use cloudops::config::{RemoteSource, ResolvedInventory, SecretSource, SourceKind};
use cloudops::inventory::{
    Collaborators, InventoryError, Variables, generate, host, list, load_local_vars,
    merge_sources, parse_yaml_vars, remote_vars,
};
use cloudops::kvstore::{Item, KeyValueStore};
use cloudops::secrets::{SecretService, SecretValue};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn vars(value: Value) -> Variables {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

struct FakeStore {
    item: Option<Item>,
}

impl KeyValueStore for FakeStore {
    fn get_item(
        &self,
        _table: &str,
        _key_name: &str,
        _key_value: &str,
    ) -> Result<Option<Item>, ServiceError> {
        Ok(self.item.clone())
    }
}

struct FakeSecrets {
    result: fn() -> Result<SecretValue, ServiceError>,
}

impl SecretService for FakeSecrets {
    fn get_secret_value(&self, _name: &str) -> Result<SecretValue, ServiceError> {
        (self.result)()
    }
}

fn settings(vars_file: PathBuf, sources: Vec<SourceKind>) -> ResolvedInventory {
    ResolvedInventory {
        vars_file,
        group: "default".to_string(),
        hosts: vec!["localhost".to_string()],
        sources,
        remote: Some(RemoteSource {
            table: "ansible-vars".to_string(),
            key_name: "service".to_string(),
            key_value: "capsule".to_string(),
            attribute: "vars".to_string(),
        }),
        secret: Some(SecretSource {
            name: "test".to_string(),
            ..SecretSource::default()
        }),
    }
}

#[test]
fn list_wraps_vars_in_default_group() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("env_vars.yml");
    fs::write(&path, "env: staging\nregion: eu-west-2\n").expect("write vars");

    let document = list(load_local_vars(&path).expect("load vars"));
    let text = document.to_json(false).expect("json");

    assert!(!text.contains('\n'));
    let parsed: Value = serde_json::from_str(&text).expect("parse");
    assert_eq!(
        parsed,
        json!({
            "default": {
                "hosts": ["localhost"],
                "vars": {"env": "staging", "region": "eu-west-2"}
            }
        })
    );
}

#[test]
fn list_accepts_json_flavoured_yaml() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("env_vars.yml");
    fs::write(&path, r#"{"env": "staging", "region": "eu-west-2"}"#).expect("write vars");

    let loaded = load_local_vars(&path).expect("load vars");
    assert_eq!(loaded, vars(json!({"env": "staging", "region": "eu-west-2"})));
}

#[test]
fn nested_vars_are_embedded_verbatim() {
    let loaded = parse_yaml_vars(
        "inline",
        "app:\n  port: 8080\n  debug: false\npackages:\n  - nginx\n  - git\n",
    )
    .expect("parse");

    let document = list(loaded);
    let value = serde_json::to_value(&document).expect("to value");
    assert_eq!(value["default"]["vars"]["app"]["port"], 8080);
    assert_eq!(value["default"]["vars"]["app"]["debug"], false);
    assert_eq!(value["default"]["vars"]["packages"], json!(["nginx", "git"]));
}

#[test]
fn missing_vars_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    let err = load_local_vars(&dir.path().join("env_vars.yml")).expect_err("expected missing");
    assert!(matches!(err, InventoryError::VarsFileMissing { .. }));
}

#[test]
fn empty_vars_file_is_an_empty_mapping() {
    assert!(parse_yaml_vars("inline", "").expect("parse").is_empty());
    assert!(parse_yaml_vars("inline", "~\n").expect("parse").is_empty());

    let document = list(parse_yaml_vars("inline", "").expect("parse"));
    assert_eq!(
        document.to_json(false).expect("json"),
        r#"{"default":{"hosts":["localhost"],"vars":{}}}"#
    );
}

#[test]
fn non_mapping_vars_are_rejected() {
    let err = parse_yaml_vars("inline", "- a\n- b\n").expect_err("expected parse error");
    assert!(err.to_string().contains("mapping"));
}

#[test]
fn host_is_always_empty() {
    let document = host("localhost");
    assert!(document.groups.is_empty());
    assert_eq!(document.to_json(false).expect("json"), "{}");
}

#[test]
fn merge_sources_later_wins() {
    let secret = vars(json!({"db_password": "s3cret", "tier": "secret"}));
    let remote = vars(json!({"tier": "web", "replicas": 2}));

    let merged = merge_sources(&[secret, remote]);
    assert_eq!(
        merged,
        vars(json!({"db_password": "s3cret", "tier": "web", "replicas": 2}))
    );
    assert!(merge_sources(&[]).is_empty());
}

#[test]
fn remote_vars_parses_string_attribute() {
    let store = FakeStore {
        item: Some(vars(json!({"service": "capsule", "vars": r#"{"tier": "web"}"#}))),
    };
    let remote = settings(PathBuf::new(), vec![]).remote.expect("remote");

    let loaded = remote_vars(&store, &remote).expect("remote vars");
    assert_eq!(loaded, vars(json!({"tier": "web"})));
}

#[test]
fn remote_vars_missing_attribute_is_an_error() {
    let store = FakeStore {
        item: Some(vars(json!({"service": "capsule"}))),
    };
    let remote = settings(PathBuf::new(), vec![]).remote.expect("remote");

    let err = remote_vars(&store, &remote).expect_err("expected missing attribute");
    assert!(matches!(err, InventoryError::RemoteMissing { .. }));
}

#[test]
fn generate_with_default_sources_reads_only_local_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("env_vars.yml");
    fs::write(&path, "env: staging\n").expect("write vars");

    let document = generate(
        &settings(path, vec![SourceKind::Local]),
        &Collaborators::default(),
    )
    .expect("generate");
    assert_eq!(
        serde_json::to_value(&document).expect("value"),
        json!({"default": {"hosts": ["localhost"], "vars": {"env": "staging"}}})
    );
}

#[test]
fn generate_merges_sources_by_priority() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("env_vars.yml");
    fs::write(&path, "env: staging\ntier: local\n").expect("write vars");

    let store = FakeStore {
        item: Some(vars(json!({"vars": {"tier": "remote", "replicas": 2}}))),
    };
    let secrets = FakeSecrets {
        result: || {
            Ok(SecretValue::Text(
                r#"{"db_password": "s3cret", "replicas": 3}"#.to_string(),
            ))
        },
    };

    let document = generate(
        &settings(
            path,
            vec![SourceKind::Local, SourceKind::Remote, SourceKind::Secret],
        ),
        &Collaborators {
            store: Some(&store),
            secrets: Some(&secrets),
        },
    )
    .expect("generate");

    let value = serde_json::to_value(&document).expect("value");
    assert_eq!(
        value["default"]["vars"],
        json!({"env": "staging", "tier": "remote", "replicas": 3, "db_password": "s3cret"})
    );
}

#[test]
fn generate_skips_secret_that_was_not_found() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("env_vars.yml");
    fs::write(&path, "env: staging\n").expect("write vars");

    let secrets = FakeSecrets {
        result: || {
            Err(ServiceError::Api {
                service: "secretsmanager".to_string(),
                status: 400,
                code: "ResourceNotFoundException".to_string(),
                message: "missing".to_string(),
            })
        },
    };

    let document = generate(
        &settings(path, vec![SourceKind::Local, SourceKind::Secret]),
        &Collaborators {
            store: None,
            secrets: Some(&secrets),
        },
    )
    .expect("generate");

    let value = serde_json::to_value(&document).expect("value");
    assert_eq!(value["default"]["vars"], json!({"env": "staging"}));
}

#[test]
fn generate_without_collaborator_fails() {
    let err = generate(
        &settings(PathBuf::from("unused.yml"), vec![SourceKind::Remote]),
        &Collaborators::default(),
    )
    .expect_err("expected missing collaborator");
    assert!(matches!(
        err,
        InventoryError::SourceUnavailable(SourceKind::Remote)
    ));
}
