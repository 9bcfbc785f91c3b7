use crate::insights::{InsightConfig, InsightConfigError, ScoreUnit, DEFAULT_TARGET_CATEGORY};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the service and CLI. The engine itself only
/// ever sees the [`InsightConfig`] built here.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub insights: InsightConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            insights: insight_config_from_env()?,
        })
    }
}

fn insight_config_from_env() -> Result<InsightConfig, ConfigError> {
    let defaults = InsightConfig::default();

    let window_months = match env::var("INSIGHT_WINDOW_MONTHS") {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidWindow)?,
        Err(_) => defaults.window_months,
    };

    let target_category = env::var("INSIGHT_TARGET_CATEGORY")
        .unwrap_or_else(|_| DEFAULT_TARGET_CATEGORY.to_string());

    let score_unit = match env::var("INSIGHT_SCORE_UNIT") {
        Ok(raw) => ScoreUnit::parse(&raw).ok_or(ConfigError::InvalidScoreUnit(raw))?,
        Err(_) => defaults.score_unit,
    };

    let config = InsightConfig {
        window_months,
        target_category,
        score_unit,
        ..defaults
    };
    config.validate()?;
    Ok(config)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWindow,
    InvalidScoreUnit(String),
    Insights(InsightConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWindow => {
                write!(f, "INSIGHT_WINDOW_MONTHS must be a positive whole number")
            }
            ConfigError::InvalidScoreUnit(value) => write!(
                f,
                "INSIGHT_SCORE_UNIT must be 'points' or 'rupiah' (got '{}')",
                value
            ),
            ConfigError::Insights(err) => write!(f, "invalid insight settings: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Insights(err) => Some(err),
            ConfigError::InvalidPort
            | ConfigError::InvalidWindow
            | ConfigError::InvalidScoreUnit(_) => None,
        }
    }
}

impl From<InsightConfigError> for ConfigError {
    fn from(value: InsightConfigError) -> Self {
        Self::Insights(value)
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
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("INSIGHT_WINDOW_MONTHS");
        env::remove_var("INSIGHT_TARGET_CATEGORY");
        env::remove_var("INSIGHT_SCORE_UNIT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.insights, InsightConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_insight_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INSIGHT_WINDOW_MONTHS", "12");
        env::set_var("INSIGHT_TARGET_CATEGORY", "Kertas");
        env::set_var("INSIGHT_SCORE_UNIT", "rupiah");

        let config = AppConfig::load().expect("config loads");

        assert_eq!(config.insights.window_months, 12);
        assert_eq!(config.insights.target_category, "Kertas");
        assert_eq!(config.insights.score_unit, ScoreUnit::Rupiah);
        reset_env();
    }

    #[test]
    fn rejects_single_month_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INSIGHT_WINDOW_MONTHS", "1");

        let err = AppConfig::load().expect_err("window too short");

        assert!(matches!(
            err,
            ConfigError::Insights(InsightConfigError::WindowTooShort(1))
        ));
        reset_env();
    }

    #[test]
    fn rejects_oversized_window_before_allocating() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INSIGHT_WINDOW_MONTHS", "100000000000");

        let err = AppConfig::load().expect_err("window too long");

        assert!(matches!(
            err,
            ConfigError::Insights(InsightConfigError::WindowTooLong(_))
        ));
        reset_env();
    }
}
