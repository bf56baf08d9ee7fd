use cloudops::aws::ServiceError;
use cloudops::secrets::{SecretError, SecretService, SecretValue, lookup_secret};

struct FakeSecrets {
    outcome: Result<SecretValue, (u16, &'static str)>,
}

impl SecretService for FakeSecrets {
    fn get_secret_value(&self, _name: &str) -> Result<SecretValue, ServiceError> {
        match &self.outcome {
            Ok(value) => Ok(value.clone()),
            Err((status, code)) => Err(api_error(*status, code)),
        }
    }
}

fn api_error(status: u16, code: &str) -> ServiceError {
    ServiceError::Api {
        service: "secretsmanager".to_string(),
        status,
        code: code.to_string(),
        message: format!("{code} raised"),
    }
}

fn failing(code: &'static str) -> FakeSecrets {
    FakeSecrets {
        outcome: Err((400, code)),
    }
}

#[test]
fn classify_maps_each_provider_code() {
    assert!(matches!(
        SecretError::classify("test", api_error(400, "ResourceNotFoundException")),
        SecretError::NotFound { ref name } if name == "test"
    ));
    assert!(matches!(
        SecretError::classify("test", api_error(400, "InvalidRequestException")),
        SecretError::InvalidRequest { .. }
    ));
    assert!(matches!(
        SecretError::classify("test", api_error(400, "InvalidParameterException")),
        SecretError::InvalidParameter { .. }
    ));
    assert!(matches!(
        SecretError::classify("test", api_error(400, "DecryptionFailure")),
        SecretError::Service(_)
    ));
}

#[test]
fn classified_conditions_are_not_fatal() {
    assert!(!SecretError::classify("t", api_error(400, "ResourceNotFoundException")).is_fatal());
    assert!(!SecretError::classify("t", api_error(400, "InvalidRequestException")).is_fatal());
    assert!(!SecretError::classify("t", api_error(400, "InvalidParameterException")).is_fatal());
    assert!(SecretError::classify("t", api_error(500, "InternalServiceError")).is_fatal());
}

#[test]
fn not_found_message_names_the_secret() {
    let err = SecretError::classify("test", api_error(400, "ResourceNotFoundException"));
    assert_eq!(err.to_string(), "the requested secret test was not found");
}

#[test]
fn lookup_returns_text_payload() {
    let service = FakeSecrets {
        outcome: Ok(SecretValue::Text(r#"{"k":"v"}"#.to_string())),
    };
    assert_eq!(
        lookup_secret(&service, "test").expect("lookup"),
        Some(r#"{"k":"v"}"#.to_string())
    );
}

#[test]
fn lookup_binary_secret_is_sentinel() {
    let service = FakeSecrets {
        outcome: Ok(SecretValue::Binary("AAEC".to_string())),
    };
    assert_eq!(lookup_secret(&service, "test").expect("lookup"), None);
}

#[test]
fn lookup_classified_failures_are_sentinels() {
    for code in [
        "ResourceNotFoundException",
        "InvalidRequestException",
        "InvalidParameterException",
    ] {
        assert_eq!(
            lookup_secret(&failing(code), "test").expect("non-fatal"),
            None,
            "{code}"
        );
    }
}

#[test]
fn lookup_other_failures_propagate() {
    let err = lookup_secret(&failing("AccessDeniedException"), "test").expect_err("fatal");
    assert!(matches!(err, SecretError::Service(_)));
}
