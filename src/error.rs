use crate::audit::db::DbLookupError;
use crate::audit::extract::ExtractError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Top-level error for callers wiring the crate into their own tooling.
/// Extraction and lookup failures are normally recovered into conclusions
/// inside the audit service; these variants exist for callers driving the
/// lower-level modules directly.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Extract(ExtractError),
    DbLookup(DbLookupError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Extract(err) => write!(f, "extraction error: {}", err),
            AppError::DbLookup(err) => write!(f, "database lookup error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Extract(err) => Some(err),
            AppError::DbLookup(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ExtractError> for AppError {
    fn from(value: ExtractError) -> Self {
        Self::Extract(value)
    }
}

impl From<DbLookupError> for AppError {
    fn from(value: DbLookupError) -> Self {
        Self::DbLookup(value)
    }
}
