use crate::aws::ServiceError;
use crate::aws::sigv4::{self, SignableRequest, SigningParams};
use crate::credentials::Credentials;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Json10,
    Json11,
}

impl Protocol {
    fn content_type(self) -> &'static str {
        match self {
            Protocol::Json10 => "application/x-amz-json-1.0",
            Protocol::Json11 => "application/x-amz-json-1.1",
        }
    }
}

/// Blocking client for services speaking the AWS JSON protocol (`POST /` with `X-Amz-Target`).
#[derive(Debug, Clone)]
pub struct JsonClient {
    http: Client,
    endpoint: Url,
    host: String,
    signing_name: &'static str,
    target_prefix: &'static str,
    protocol: Protocol,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl JsonClient {
    pub fn new(
        credentials: &Credentials,
        signing_name: &'static str,
        target_prefix: &'static str,
        protocol: Protocol,
        endpoint: &str,
    ) -> Result<Self, ServiceError> {
        let transport = |message: String| ServiceError::Transport {
            service: signing_name.to_string(),
            message,
        };

        let endpoint = Url::parse(endpoint)
            .map_err(|e| transport(format!("invalid endpoint {endpoint}: {e}")))?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(transport(format!("endpoint {endpoint} has no host"))),
        };

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| transport(format!("build client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            host,
            signing_name,
            target_prefix,
            protocol,
            credentials: credentials.clone(),
        })
    }

    pub fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, ServiceError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)
            .map_err(|e| self.decode_error(format!("encode {operation}: {e}")))?;
        let target = format!("{}.{operation}", self.target_prefix);
        let content_type = self.protocol.content_type();

        let signed = sigv4::sign(
            &SignableRequest {
                method: "POST",
                path: self.endpoint.path(),
                query: "",
                headers: vec![
                    ("host".to_string(), self.host.clone()),
                    ("content-type".to_string(), content_type.to_string()),
                    ("x-amz-target".to_string(), target.clone()),
                ],
                payload: &body,
            },
            &SigningParams {
                access_key: &self.credentials.access_key,
                secret_key: &self.credentials.secret_key,
                session_token: Some(self.credentials.session_token.as_str())
                    .filter(|token| !token.is_empty()),
                region: &self.credentials.region,
                service: self.signing_name,
                time: OffsetDateTime::now_utc(),
            },
        )
        .map_err(|e| self.transport_error(format!("sign {operation}: {e}")))?;

        tracing::debug!(
            service = self.signing_name,
            %target,
            endpoint = %self.endpoint,
            "sending request"
        );

        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, content_type)
            .header("x-amz-target", &target)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization);
        if let Some(token) = &signed.security_token {
            builder = builder.header("x-amz-security-token", token);
        }

        let response = builder
            .body(body)
            .send()
            .map_err(|e| self.transport_error(format!("{operation}: {e}")))?;

        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .map_err(|e| self.transport_error(format!("{operation}: read body: {e}")))?;

        tracing::debug!(
            service = self.signing_name,
            %target,
            status = status.as_u16(),
            "received response"
        );

        if !status.is_success() {
            return Err(self.api_error(status.as_u16(), error_type, &text));
        }

        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| self.decode_error(format!("{operation}: {e}")))
    }

    fn api_error(&self, status: u16, header_type: Option<String>, body: &str) -> ServiceError {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let (kind, message) = match parsed {
            Some(err) => (err.kind, err.message),
            None => (None, None),
        };

        let code = kind
            .or(header_type)
            .map(|raw| error_code(&raw))
            .unwrap_or_else(|| "UnknownError".to_string());

        ServiceError::Api {
            service: self.signing_name.to_string(),
            status,
            code,
            message: message.unwrap_or_else(|| body.trim().to_string()),
        }
    }

    fn transport_error(&self, message: String) -> ServiceError {
        ServiceError::Transport {
            service: self.signing_name.to_string(),
            message,
        }
    }

    fn decode_error(&self, message: String) -> ServiceError {
        ServiceError::Decode {
            service: self.signing_name.to_string(),
            message,
        }
    }
}

/// Strips the namespace and any trailing detail from an error type,
/// e.g. `com.amazonaws.secretsmanager#ResourceNotFoundException` -> `ResourceNotFoundException`.
pub fn error_code(raw: &str) -> String {
    let tail = raw.rsplit('#').next().unwrap_or(raw);
    tail.split(':').next().unwrap_or(tail).trim().to_string()
}
