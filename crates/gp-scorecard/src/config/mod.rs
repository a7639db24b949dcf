use chrono_tz::Tz;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_REPORT_CRON: &str = "0 0 6 1 * *";
const DEFAULT_REPORT_TIMEZONE: &str = "Europe/Tallinn";
const DEFAULT_TEAM_TIMEOUT_SECS: u64 = 120;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub reports: ReportScheduleConfig,
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
            reports: ReportScheduleConfig::from_env()?,
        })
    }
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

/// When and how the monthly report job fires.
#[derive(Debug, Clone)]
pub struct ReportScheduleConfig {
    pub enabled: bool,
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    pub timezone: Tz,
    /// Deadline applied to the collaborator calls for a single team.
    pub team_timeout: Duration,
}

impl Default for ReportScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron_expression: DEFAULT_REPORT_CRON.to_string(),
            timezone: chrono_tz::Europe::Tallinn,
            team_timeout: Duration::from_secs(DEFAULT_TEAM_TIMEOUT_SECS),
        }
    }
}

impl ReportScheduleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = match env::var("APP_REPORTS_ENABLED") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_REPORTS_ENABLED",
                value: raw,
            })?,
            Err(_) => true,
        };

        let cron_expression =
            env::var("APP_REPORTS_CRON").unwrap_or_else(|_| DEFAULT_REPORT_CRON.to_string());

        let zone =
            env::var("APP_REPORTS_TIMEZONE").unwrap_or_else(|_| DEFAULT_REPORT_TIMEZONE.to_string());
        let timezone = zone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone { value: zone.clone() })?;

        let team_timeout = env::var("APP_REPORTS_TEAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TEAM_TIMEOUT_SECS.to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidTimeout)?;

        Ok(Self {
            enabled,
            cron_expression,
            timezone,
            team_timeout,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimezone { value: String },
    InvalidTimeout,
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimezone { value } => {
                write!(f, "APP_REPORTS_TIMEZONE '{value}' is not a known IANA timezone")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "APP_REPORTS_TEAM_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimezone { .. }
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidFlag { .. } => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_REPORTS_ENABLED",
            "APP_REPORTS_CRON",
            "APP_REPORTS_TIMEZONE",
            "APP_REPORTS_TEAM_TIMEOUT_SECS",
        ] {
            env::remove_var(name);
        }
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
        assert!(config.reports.enabled);
        assert_eq!(config.reports.cron_expression, "0 0 6 1 * *");
        assert_eq!(config.reports.timezone, chrono_tz::Europe::Tallinn);
        assert_eq!(config.reports.team_timeout, Duration::from_secs(120));
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
    fn rejects_unknown_timezone() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REPORTS_TIMEZONE", "Mars/Olympus");
        match AppConfig::load() {
            Err(ConfigError::InvalidTimezone { value }) => assert_eq!(value, "Mars/Olympus"),
            other => panic!("expected timezone error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn report_overrides_are_applied() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REPORTS_ENABLED", "off");
        env::set_var("APP_REPORTS_TIMEZONE", "UTC");
        env::set_var("APP_REPORTS_TEAM_TIMEOUT_SECS", "15");
        let config = AppConfig::load().expect("config loads");
        assert!(!config.reports.enabled);
        assert_eq!(config.reports.timezone, chrono_tz::UTC);
        assert_eq!(config.reports.team_timeout, Duration::from_secs(15));
        reset_env();
    }

    #[test]
    fn zero_team_timeout_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REPORTS_TEAM_TIMEOUT_SECS", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTimeout)));
        reset_env();
    }
}
