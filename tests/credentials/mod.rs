use cloudops::credentials::{Credentials, CredentialsError};
use cloudops::envfile::{EnvFileError, parse, read};
use std::collections::HashMap;
use tempfile::tempdir;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn from_lookup_reads_all_four_values() {
    let creds = Credentials::from_lookup(lookup_from(&[
        ("ACCESS_KEY", "AKID"),
        ("SECRET_KEY", "secret"),
        ("SESSION_TOKEN", "token"),
        ("REGION", "eu-west-2"),
    ]))
    .expect("credentials");

    assert_eq!(creds.access_key, "AKID");
    assert_eq!(creds.secret_key, "secret");
    assert_eq!(creds.session_token, "token");
    assert_eq!(creds.region, "eu-west-2");
}

#[test]
fn from_lookup_names_every_missing_value() {
    let err = Credentials::from_lookup(lookup_from(&[
        ("ACCESS_KEY", "AKID"),
        ("SESSION_TOKEN", "   "),
    ]))
    .expect_err("expected missing values");

    assert_eq!(
        err,
        CredentialsError::Missing(vec![
            "SECRET_KEY".to_string(),
            "SESSION_TOKEN".to_string(),
            "REGION".to_string(),
        ])
    );
    assert!(err.to_string().contains("SECRET_KEY, SESSION_TOKEN, REGION"));
}

#[test]
fn debug_output_redacts_secrets() {
    let creds = Credentials {
        access_key: "AKID".to_string(),
        secret_key: "super-secret".to_string(),
        session_token: "tok-123".to_string(),
        region: "eu-west-2".to_string(),
    };

    let debug = format!("{creds:?}");
    assert!(debug.contains("AKID"));
    assert!(!debug.contains("super-secret"));
    assert!(!debug.contains("tok-123"));
}

#[test]
fn with_region_keeps_keys() {
    let creds = Credentials {
        access_key: "AKID".to_string(),
        secret_key: "secret".to_string(),
        session_token: "token".to_string(),
        region: "us-east-1".to_string(),
    };

    let moved = creds.with_region("eu-west-2");
    assert_eq!(moved.region, "eu-west-2");
    assert_eq!(moved.access_key, creds.access_key);
}

#[test]
fn parse_envfile() {
    let text = r#"
# credentials for the sandbox account
ACCESS_KEY=AKID
export SECRET_KEY='abc def'
SESSION_TOKEN="tok=en"
REGION=eu-west-2 # london
EMPTY=
"#;

    let vars = parse(text).expect("parse env file");
    assert_eq!(vars.get("ACCESS_KEY").map(String::as_str), Some("AKID"));
    assert_eq!(vars.get("SECRET_KEY").map(String::as_str), Some("abc def"));
    assert_eq!(vars.get("SESSION_TOKEN").map(String::as_str), Some("tok=en"));
    assert_eq!(vars.get("REGION").map(String::as_str), Some("eu-west-2"));
    assert_eq!(vars.get("EMPTY").map(String::as_str), Some(""));
}

#[test]
fn parse_rejects_bad_lines() {
    assert!(matches!(
        parse("not-valid"),
        Err(EnvFileError::Syntax { line: 1, .. })
    ));
    assert!(matches!(
        parse("OK=1\n9BAD=2"),
        Err(EnvFileError::Syntax { line: 2, .. })
    ));
    assert!(parse("QUOTED=\"open").is_err());
}

#[test]
fn read_missing_file() {
    let dir = tempdir().expect("tempdir");
    let err = read(&dir.path().join("missing.env")).expect_err("expected missing");
    assert!(matches!(err, EnvFileError::NotFound(_)));
}

#[test]
fn parse_decodes_double_quoted_escapes() {
    let vars = parse("SECRET_KEY=\"a\\\"b\\nc\"\nRAW='a\\\"b'\n").expect("parse env file");
    assert_eq!(vars.get("SECRET_KEY").map(String::as_str), Some("a\"b\nc"));
    assert_eq!(vars.get("RAW").map(String::as_str), Some("a\\\"b"));
    assert!(parse("BAD=\"\\q\"").is_err());
}
