use chrono::FixedOffset;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_CONTACT_EMAIL: &str = "leads@example.com";
const DEFAULT_FROM_EMAIL: &str = "noreply@example.com";

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
    pub rate_limit: RateLimitConfig,
    pub notifications: NotificationConfig,
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
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let max_requests = parse_number::<u32>("RATE_LIMIT_MAX_REQUESTS", 5)?;
        let window_ms = parse_number::<u64>("RATE_LIMIT_WINDOW_MS", 900_000)?;

        let timeout_secs = parse_number::<u64>("NOTIFY_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                var: "NOTIFY_TIMEOUT_SECS",
            });
        }
        let utc_offset = match env::var("NOTIFY_UTC_OFFSET") {
            Ok(raw) => parse_utc_offset(&raw).ok_or(ConfigError::InvalidUtcOffset { value: raw })?,
            Err(_) => pacific_standard(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            rate_limit: RateLimitConfig {
                max_requests,
                window_ms,
            },
            notifications: NotificationConfig {
                recipient: env::var("CONTACT_EMAIL")
                    .unwrap_or_else(|_| DEFAULT_CONTACT_EMAIL.to_string()),
                sender: env::var("FROM_EMAIL").unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string()),
                resend_api_key: env::var("RESEND_API_KEY").ok(),
                sendgrid_api_key: env::var("SENDGRID_API_KEY").ok(),
                timeout: Duration::from_secs(timeout_secs),
                utc_offset,
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Default notification offset. Fixed, so daylight saving time is not applied.
fn pacific_standard() -> FixedOffset {
    FixedOffset::west_opt(8 * 3600).expect("UTC-08:00 is valid")
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("zero offset is valid")
}

/// Parses offsets of the form `+HH:MM`, `-HH:MM`, or `Z`.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(utc());
    }

    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
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

/// Output layout for the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Full,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "full" => Self::Full,
            _ => Self::Compact,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Quota applied to contact form submissions per client address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,
}

/// Outbound notification settings. Credentials are optional; when none is
/// present the console provider is selected.
#[derive(Clone)]
pub struct NotificationConfig {
    pub recipient: String,
    pub sender: String,
    pub resend_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub timeout: Duration,
    pub utc_offset: FixedOffset,
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("recipient", &self.recipient)
            .field("sender", &self.sender)
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "sendgrid_api_key",
                &self.sendgrid_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .field("utc_offset", &self.utc_offset)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str, value: String },
    InvalidUtcOffset { value: String },
    InvalidTimeout { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer (found '{value}')")
            }
            ConfigError::InvalidUtcOffset { value } => {
                write!(f, "NOTIFY_UTC_OFFSET must look like +HH:MM or -HH:MM (found '{value}')")
            }
            ConfigError::InvalidTimeout { var } => {
                write!(f, "{var} must be at least 1 second")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidUtcOffset { .. }
            | ConfigError::InvalidTimeout { .. } => None,
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
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "RATE_LIMIT_MAX_REQUESTS",
            "RATE_LIMIT_WINDOW_MS",
            "CONTACT_EMAIL",
            "FROM_EMAIL",
            "RESEND_API_KEY",
            "SENDGRID_API_KEY",
            "NOTIFY_TIMEOUT_SECS",
            "NOTIFY_UTC_OFFSET",
        ] {
            env::remove_var(var);
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
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_ms, 900_000);
        assert_eq!(config.notifications.timeout, Duration::from_secs(10));
        assert_eq!(config.notifications.utc_offset.local_minus_utc(), -8 * 3600);
        assert!(config.notifications.resend_api_key.is_none());
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
    fn rejects_non_numeric_rate_limit() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RATE_LIMIT_MAX_REQUESTS", "five");
        let err = AppConfig::load().expect_err("invalid quota rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                var: "RATE_LIMIT_MAX_REQUESTS",
                ..
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_zero_notification_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("NOTIFY_TIMEOUT_SECS", "0");
        let err = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidTimeout {
                var: "NOTIFY_TIMEOUT_SECS"
            }
        ));

        env::set_var("NOTIFY_TIMEOUT_SECS", "3");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.notifications.timeout, Duration::from_secs(3));
        reset_env();
    }

    #[test]
    fn reads_rate_limit_and_offset_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RATE_LIMIT_MAX_REQUESTS", "3");
        env::set_var("RATE_LIMIT_WINDOW_MS", "60000");
        env::set_var("NOTIFY_UTC_OFFSET", "+01:00");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.notifications.utc_offset.local_minus_utc(), 3600);
        reset_env();
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("Z").map(|o| o.local_minus_utc()), Some(0));
        assert_eq!(
            parse_utc_offset("+05:30").map(|o| o.local_minus_utc()),
            Some(5 * 3600 + 30 * 60)
        );
        assert!(parse_utc_offset("0800").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let config = NotificationConfig {
            recipient: "leads@example.com".to_string(),
            sender: "noreply@example.com".to_string(),
            resend_api_key: Some("re_secret".to_string()),
            sendgrid_api_key: None,
            timeout: Duration::from_secs(5),
            utc_offset: utc(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("re_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
