use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::audit::owners::ErrorOwnerMap;

/// Distinguishes runtime behavior for different stages of the tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the audit tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub audit: AuditConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let error_owners = match env::var("AUDIT_ERROR_OWNERS") {
            Ok(path) => {
                let path = PathBuf::from(path);
                ErrorOwnerMap::from_path(&path)
                    .map_err(|source| ConfigError::OwnerMap { path, source })?
            }
            Err(_) => ErrorOwnerMap::new(),
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            audit: AuditConfig { error_owners },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Settings injected into the audit service.
#[derive(Debug, Clone, Default)]
pub struct AuditConfig {
    pub error_owners: ErrorOwnerMap,
}

#[derive(Debug)]
pub enum ConfigError {
    OwnerMap {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OwnerMap { path, .. } => {
                write!(
                    f,
                    "AUDIT_ERROR_OWNERS file '{}' could not be read",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::OwnerMap { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("AUDIT_ERROR_OWNERS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.audit.error_owners.is_empty());
    }

    #[test]
    fn missing_owner_file_is_a_config_error() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("AUDIT_ERROR_OWNERS", "./does-not-exist.txt");
        let error = AppConfig::load().expect_err("file is missing");
        assert!(matches!(error, ConfigError::OwnerMap { .. }));
        reset_env();
    }

    #[test]
    fn environment_names_parse_loosely() {
        assert_eq!(AppEnvironment::from_str(" PROD "), AppEnvironment::Production);
        assert_eq!(AppEnvironment::from_str("ci"), AppEnvironment::Test);
        assert_eq!(AppEnvironment::from_str("anything"), AppEnvironment::Development);
    }
}
