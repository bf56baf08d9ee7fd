use crate::config::ConfigError;
use crate::credentials::CredentialsError;
use crate::envfile::EnvFileError;
use crate::inventory::InventoryError;
use crate::poller::BuildError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    RuntimeFailure = 1,
    Usage = 2,
    Internal = 3,
}

#[derive(Debug)]
pub struct AppError {
    code: ExitCode,
    message: String,
}

impl AppError {
    pub fn usage<T: Into<String>>(message: T) -> Self {
        Self {
            code: ExitCode::Usage,
            message: message.into(),
        }
    }

    pub fn runtime<T: Into<String>>(message: T) -> Self {
        Self {
            code: ExitCode::RuntimeFailure,
            message: message.into(),
        }
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self {
            code: ExitCode::Internal,
            message: message.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code as i32
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<CredentialsError> for AppError {
    fn from(err: CredentialsError) -> Self {
        AppError::usage(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Read { .. } => AppError::internal(err.to_string()),
            _ => AppError::usage(err.to_string()),
        }
    }
}

impl From<EnvFileError> for AppError {
    fn from(err: EnvFileError) -> Self {
        AppError::usage(err.to_string())
    }
}

impl From<BuildError> for AppError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::EmptyProject => AppError::usage(err.to_string()),
            BuildError::Output(_) => AppError::internal(err.to_string()),
            _ => AppError::runtime(err.to_string()),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::SourceUnavailable(_) => AppError::internal(err.to_string()),
            _ => AppError::runtime(err.to_string()),
        }
    }
}
