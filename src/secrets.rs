use crate::aws::{self, JsonClient, Protocol, ServiceError};
use crate::credentials::Credentials;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SIGNING_NAME: &str = "secretsmanager";
const TARGET_PREFIX: &str = "secretsmanager";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    Text(String),
    /// Base64 payload exactly as the service returned it.
    Binary(String),
}

pub trait SecretService {
    fn get_secret_value(&self, name: &str) -> Result<SecretValue, ServiceError>;
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("the requested secret {name} was not found")]
    NotFound { name: String },
    #[error("the request for secret {name} was invalid: {message}")]
    InvalidRequest { name: String, message: String },
    #[error("the request for secret {name} had invalid params: {message}")]
    InvalidParameter { name: String, message: String },
    #[error(transparent)]
    Service(ServiceError),
}

impl SecretError {
    pub fn classify(name: &str, err: ServiceError) -> Self {
        let message = err.to_string();
        match err.code() {
            Some("ResourceNotFoundException") => SecretError::NotFound {
                name: name.to_string(),
            },
            Some("InvalidRequestException") => SecretError::InvalidRequest {
                name: name.to_string(),
                message,
            },
            Some("InvalidParameterException") => SecretError::InvalidParameter {
                name: name.to_string(),
                message,
            },
            _ => SecretError::Service(err),
        }
    }

    /// Whether the lookup must abort rather than fall back to "no secret".
    pub fn is_fatal(&self) -> bool {
        matches!(self, SecretError::Service(_))
    }
}

/// Fetches a text secret. The three classified provider conditions are logged and
/// reported as `Ok(None)`, as is a secret holding only binary data.
pub fn lookup_secret<S>(service: &S, name: &str) -> Result<Option<String>, SecretError>
where
    S: SecretService + ?Sized,
{
    match service.get_secret_value(name) {
        Ok(SecretValue::Text(text)) => Ok(Some(text)),
        Ok(SecretValue::Binary(_)) => {
            tracing::warn!(secret = name, "secret holds binary data only; ignoring");
            Ok(None)
        }
        Err(err) => {
            let classified = SecretError::classify(name, err);
            if classified.is_fatal() {
                return Err(classified);
            }
            tracing::warn!(secret = name, "{classified}");
            Ok(None)
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecretsManagerClient {
    client: JsonClient,
}

impl SecretsManagerClient {
    pub fn new(credentials: &Credentials, endpoint: Option<&str>) -> Result<Self, ServiceError> {
        let endpoint = aws::endpoint_or_default(endpoint, SIGNING_NAME, &credentials.region);
        let client = JsonClient::new(
            credentials,
            SIGNING_NAME,
            TARGET_PREFIX,
            Protocol::Json11,
            &endpoint,
        )?;
        Ok(Self { client })
    }
}

#[derive(Debug, Serialize)]
struct GetSecretValueRequest<'a> {
    #[serde(rename = "SecretId")]
    secret_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GetSecretValueResponse {
    #[serde(rename = "SecretString")]
    secret_string: Option<String>,
    #[serde(rename = "SecretBinary")]
    secret_binary: Option<String>,
}

impl SecretService for SecretsManagerClient {
    fn get_secret_value(&self, name: &str) -> Result<SecretValue, ServiceError> {
        let response: GetSecretValueResponse = self
            .client
            .call("GetSecretValue", &GetSecretValueRequest { secret_id: name })?;

        match (response.secret_string, response.secret_binary) {
            (Some(text), _) => Ok(SecretValue::Text(text)),
            (None, binary) => Ok(SecretValue::Binary(binary.unwrap_or_default())),
        }
    }
}
