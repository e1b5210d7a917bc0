//! Environment configuration for different deployment stages

use std::env;

use tracing::Level;

use super::ConfigError;

/// Port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 5000;

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `APP_ENV` contains an unknown value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Environment::from_env`] but reads variables through `lookup`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `APP_ENV` contains an unknown value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = lookup("APP_ENV")
            .unwrap_or_else(|| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::Invalid {
                name: "APP_ENV",
                value: env,
            }),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Port the HTTP server listens on, from `PORT`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `PORT` is not a valid port number
    pub fn port(lookup: impl Fn(&str) -> Option<String>) -> Result<u16, ConfigError> {
        lookup("PORT").map_or(Ok(DEFAULT_PORT), |value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })
        })
    }

    /// Default tracing level when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_environment_from_env() {
        // Test development (default)
        env::remove_var("APP_ENV");
        assert_eq!(Environment::from_env().unwrap(), Environment::Development);

        env::set_var("APP_ENV", "development");
        assert_eq!(Environment::from_env().unwrap(), Environment::Development);

        env::set_var("APP_ENV", " Staging ");
        assert_eq!(Environment::from_env().unwrap(), Environment::Staging);

        env::set_var("APP_ENV", "production");
        assert_eq!(Environment::from_env().unwrap(), Environment::Production);

        env::remove_var("APP_ENV");
    }

    #[test]
    fn test_invalid_environment() {
        let err = Environment::from_lookup(|_| Some("invalid".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for APP_ENV: invalid");
    }

    #[test]
    fn test_port_defaults_to_5000() {
        assert_eq!(Environment::port(|_| None).unwrap(), 5000);
        assert_eq!(Environment::port(|_| Some("8080".to_string())).unwrap(), 8080);
        assert!(Environment::port(|_| Some("not-a-port".to_string())).is_err());
    }

    #[test]
    fn test_docs_and_log_format() {
        assert!(Environment::Development.show_api_docs());
        assert!(Environment::Staging.show_api_docs());
        assert!(!Environment::Production.show_api_docs());

        assert!(!Environment::Development.json_logs());
        assert!(Environment::Production.json_logs());
    }
}
