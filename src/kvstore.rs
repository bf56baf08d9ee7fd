use crate::aws::{self, JsonClient, Protocol, ServiceError};
use crate::credentials::Credentials;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};

pub const SIGNING_NAME: &str = "dynamodb";
const TARGET_PREFIX: &str = "DynamoDB_20120810";

/// An item with its attribute values decoded into plain JSON.
pub type Item = Map<String, Value>;

pub trait KeyValueStore {
    /// Looks an item up by a string partition key. `None` when no item matches.
    fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
    ) -> Result<Option<Item>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct DynamoDbClient {
    client: JsonClient,
}

impl DynamoDbClient {
    pub fn new(credentials: &Credentials, endpoint: Option<&str>) -> Result<Self, ServiceError> {
        let endpoint = aws::endpoint_or_default(endpoint, SIGNING_NAME, &credentials.region);
        let client = JsonClient::new(
            credentials,
            SIGNING_NAME,
            TARGET_PREFIX,
            Protocol::Json10,
            &endpoint,
        )?;
        Ok(Self { client })
    }
}

#[derive(Debug, Serialize)]
struct GetItemRequest<'a> {
    #[serde(rename = "TableName")]
    table_name: &'a str,
    #[serde(rename = "Key")]
    key: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GetItemResponse {
    #[serde(rename = "Item")]
    item: Option<Map<String, Value>>,
}

impl KeyValueStore for DynamoDbClient {
    fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
    ) -> Result<Option<Item>, ServiceError> {
        let mut key = Map::new();
        key.insert(key_name.to_string(), json!({ "S": key_value }));

        let response: GetItemResponse = self.client.call(
            "GetItem",
            &GetItemRequest {
                table_name: table,
                key,
            },
        )?;

        Ok(response.item.map(|raw| {
            raw.into_iter()
                .map(|(name, value)| (name, decode_attribute(&value)))
                .collect()
        }))
    }
}

/// Converts a typed attribute value (`{"S": "x"}`, `{"M": {...}}`, ...) into plain JSON.
/// Numbers that do not fit a JSON number are kept as strings.
pub fn decode_attribute(value: &Value) -> Value {
    let Some((tag, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Value::Null;
    };

    match (tag.as_str(), inner) {
        ("S", Value::String(s)) | ("B", Value::String(s)) => Value::String(s.clone()),
        ("N", Value::String(n)) => decode_number(n),
        ("BOOL", Value::Bool(b)) => Value::Bool(*b),
        ("NULL", _) => Value::Null,
        ("M", Value::Object(fields)) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), decode_attribute(v)))
                .collect(),
        ),
        ("L", Value::Array(items)) => Value::Array(items.iter().map(decode_attribute).collect()),
        ("SS", Value::Array(items)) | ("BS", Value::Array(items)) => Value::Array(items.clone()),
        ("NS", Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::String(n) => decode_number(n),
                    other => other.clone(),
                })
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn decode_number(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }

    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
