pub mod client;
pub mod sigv4;

pub use client::{JsonClient, Protocol};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },
    #[error("{service} returned {code} (status {status}): {message}")]
    Api {
        service: String,
        status: u16,
        code: String,
        message: String,
    },
    #[error("{service} response could not be decoded: {message}")]
    Decode { service: String, message: String },
}

impl ServiceError {
    /// Provider error code such as `ResourceNotFoundException`, when the service sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ServiceError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Regional endpoint for a service, e.g. `https://codebuild.eu-west-2.amazonaws.com`.
pub fn default_endpoint(service: &str, region: &str) -> String {
    format!("https://{service}.{region}.amazonaws.com")
}

pub(crate) fn endpoint_or_default(endpoint: Option<&str>, service: &str, region: &str) -> String {
    match endpoint {
        Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
        _ => default_endpoint(service, region),
    }
}
