use reqwest::Url;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub backend_url: Url,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None, None)
    }

    /// Loads configuration, letting explicit values (e.g. from command-line
    /// flags) take precedence over the environment.
    pub fn resolve(
        backend_url: Option<String>,
        log_level: Option<String>,
    ) -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let backend_url_str = match backend_url {
            Some(url) => url,
            None => std::env::var("LANGCHAT_BACKEND_URL")
                .map_err(|_| ConfigError::MissingVar("LANGCHAT_BACKEND_URL".to_string()))?,
        };
        let backend_url = Url::parse(&backend_url_str).map_err(|e| {
            ConfigError::InvalidValue("LANGCHAT_BACKEND_URL".to_string(), e.to_string())
        })?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "LANGCHAT_BACKEND_URL".to_string(),
                format!("'{}' is not an http(s) URL", backend_url_str),
            ));
        }

        let log_level_str = log_level
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            backend_url,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("LANGCHAT_BACKEND_URL");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal() {
        clear_env_vars();
        unsafe {
            env::set_var("LANGCHAT_BACKEND_URL", "http://localhost:8000");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.backend_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("LANGCHAT_BACKEND_URL", "https://chat.example.com/api");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.backend_url.host_str(), Some("chat.example.com"));
        assert_eq!(config.backend_url.path(), "/api");
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn test_explicit_values_override_env() {
        clear_env_vars();
        unsafe {
            env::set_var("LANGCHAT_BACKEND_URL", "http://from-env:8000");
            env::set_var("RUST_LOG", "error");
        }

        let config = Config::resolve(
            Some("http://from-flag:9000".to_string()),
            Some("trace".to_string()),
        )
        .expect("Config should load successfully");

        assert_eq!(config.backend_url.host_str(), Some("from-flag"));
        assert_eq!(config.backend_url.port(), Some(9000));
        assert_eq!(config.log_level, Level::TRACE);
    }

    #[test]
    #[serial]
    fn test_config_missing_backend_url() {
        clear_env_vars();

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "LANGCHAT_BACKEND_URL"),
            _ => panic!("Expected MissingVar for LANGCHAT_BACKEND_URL"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_backend_url() {
        clear_env_vars();
        unsafe {
            env::set_var("LANGCHAT_BACKEND_URL", "localhost:8000/chat");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "LANGCHAT_BACKEND_URL"),
            _ => panic!("Expected InvalidValue for LANGCHAT_BACKEND_URL"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("LANGCHAT_BACKEND_URL", "http://localhost:8000");
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }
}
