use crate::aws::{self, JsonClient, Protocol, ServiceError};
use crate::credentials::Credentials;
use crate::model::LogEvent;
use serde::{Deserialize, Serialize};

pub const SIGNING_NAME: &str = "logs";
const TARGET_PREFIX: &str = "Logs_20140328";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    pub next_forward_token: Option<String>,
}

/// Reads a log stream from its earliest event forward.
pub trait LogService {
    fn get_log_events(
        &self,
        group: &str,
        stream: &str,
        next_token: Option<&str>,
    ) -> Result<LogPage, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct CloudWatchLogsClient {
    client: JsonClient,
}

impl CloudWatchLogsClient {
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
#[serde(rename_all = "camelCase")]
struct GetLogEventsRequest<'a> {
    log_group_name: &'a str,
    log_stream_name: &'a str,
    start_from_head: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetLogEventsResponse {
    #[serde(default)]
    events: Vec<EventRecord>,
    next_forward_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    timestamp: Option<i64>,
    #[serde(default)]
    message: String,
}

impl LogService for CloudWatchLogsClient {
    fn get_log_events(
        &self,
        group: &str,
        stream: &str,
        next_token: Option<&str>,
    ) -> Result<LogPage, ServiceError> {
        let response: GetLogEventsResponse = self.client.call(
            "GetLogEvents",
            &GetLogEventsRequest {
                log_group_name: group,
                log_stream_name: stream,
                start_from_head: true,
                next_token,
            },
        )?;

        Ok(LogPage {
            events: response
                .events
                .into_iter()
                .map(|event| LogEvent {
                    timestamp: event.timestamp,
                    message: event.message,
                })
                .collect(),
            next_forward_token: response.next_forward_token,
        })
    }
}
