use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub const ACCESS_KEY_VAR: &str = "ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const SESSION_TOKEN_VAR: &str = "SESSION_TOKEN";
pub const REGION_VAR: &str = "REGION";

pub const REQUIRED_VARS: [&str; 4] = [ACCESS_KEY_VAR, SECRET_KEY_VAR, SESSION_TOKEN_VAR, REGION_VAR];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),
}

/// Access material for every remote client, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
    pub region: String,
}

impl Credentials {
    /// Reads the process environment, falling back to `fallback` (usually a dotenv file)
    /// for names the environment does not define.
    pub fn from_env(fallback: &HashMap<String, String>) -> Result<Self, CredentialsError> {
        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.is_empty())
                .or_else(|| fallback.get(name).cloned())
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut values: HashMap<&str, String> = HashMap::new();

        for name in REQUIRED_VARS {
            match lookup(name).map(|v| v.trim().to_string()) {
                Some(value) if !value.is_empty() => {
                    values.insert(name, value);
                }
                _ => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(CredentialsError::Missing(missing));
        }

        let mut take = |name: &str| values.remove(name).unwrap_or_default();
        Ok(Self {
            access_key: take(ACCESS_KEY_VAR),
            secret_key: take(SECRET_KEY_VAR),
            session_token: take(SESSION_TOKEN_VAR),
            region: take(REGION_VAR),
        })
    }

    pub fn with_region(&self, region: &str) -> Self {
        Self {
            region: region.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}
