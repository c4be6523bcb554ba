use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Outbound email channel
    #[serde(default)]
    pub email: EmailConfig,
    /// Outbound SMS gateway
    #[serde(default)]
    pub sms: SmsConfig,
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Pool settings in the form the persistence crate takes.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Email channel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether email reminders are sent at all
    #[serde(default)]
    pub enabled: bool,

    /// Email provider: smtp, or console (for development)
    #[serde(default = "default_email_provider")]
    pub provider: String,

    /// SMTP relay host (for smtp provider)
    #[serde(default)]
    pub smtp_host: String,

    /// SMTP relay port, STARTTLS (for smtp provider)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP PLAIN auth username
    #[serde(default)]
    pub smtp_username: String,

    /// SMTP PLAIN auth password
    #[serde(default)]
    pub smtp_password: String,

    /// Sender email address (From header)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            timeout_secs: default_send_timeout(),
        }
    }
}

/// SMS gateway configuration (Twilio-compatible REST API).
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Gateway API base, e.g. https://api.twilio.com/2010-04-01
    #[serde(default = "default_sms_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    /// Sender number in E.164 form
    #[serde(default)]
    pub from_number: String,

    /// Delivery status callback URL passed to the gateway
    #[serde(default)]
    pub status_callback_url: Option<String>,

    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: default_sms_api_base(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            status_callback_url: None,
            timeout_secs: default_send_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemindersConfig {
    /// Public base URL used in reminder links, e.g. https://rsvp.example.com
    pub base_url: String,

    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    #[serde(default = "default_max_concurrent_sends")]
    pub max_concurrent_sends: usize,

    /// Run the reminder batch every N minutes; 0 disables the job
    #[serde(default)]
    pub schedule_minutes: u64,

    /// Offset used to render game times in messages
    #[serde(default)]
    pub display_utc_offset_minutes: i32,
}

impl RemindersConfig {
    pub fn lookahead(&self) -> Duration {
        Duration::days(i64::from(self.lookahead_days))
    }

    /// Falls back to UTC when the configured offset is out of range.
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokensConfig {
    #[serde(default = "default_reminder_ttl_days")]
    pub reminder_ttl_days: u32,

    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: u32,

    /// Purge expired tokens every N minutes; 0 disables the job
    #[serde(default = "default_cleanup_minutes")]
    pub cleanup_minutes: u64,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            reminder_ttl_days: default_reminder_ttl_days(),
            session_ttl_days: default_session_ttl_days(),
            cleanup_minutes: default_cleanup_minutes(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_email_provider() -> String {
    "console".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_sender_email() -> String {
    "noreply@rsvp.example.com".to_string()
}
fn default_sender_name() -> String {
    "Game Reminders".to_string()
}
fn default_send_timeout() -> u64 {
    10
}
fn default_sms_api_base() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}
fn default_lookahead_days() -> u32 {
    5
}
fn default_max_concurrent_sends() -> usize {
    4
}
fn default_reminder_ttl_days() -> u32 {
    7
}
fn default_session_ttl_days() -> u32 {
    30
}
fn default_cleanup_minutes() -> u64 {
    60
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

const TEST_DEFAULTS: &str = r#"
    [server]
    host = "0.0.0.0"
    port = 8080
    request_timeout_secs = 30

    [database]
    url = ""
    max_connections = 20
    min_connections = 5
    connect_timeout_secs = 10
    idle_timeout_secs = 600

    [logging]
    level = "info"
    format = "json"

    [email]
    enabled = false
    provider = "console"
    sender_email = "test@example.com"
    sender_name = "Test"

    [sms]
    enabled = false

    [reminders]
    base_url = "https://rsvp.test"
    lookahead_days = 5
    max_concurrent_sends = 4
    schedule_minutes = 0
    display_utc_offset_minutes = 0

    [tokens]
    reminder_ttl_days = 7
    session_ttl_days = 30
    cleanup_minutes = 0
"#;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with RSVP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("RSVP").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for tests from embedded defaults plus overrides.
    ///
    /// Does not touch the file system and skips validation.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(TEST_DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RSVP__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.email.enabled && self.email.provider == "smtp" && self.email.smtp_host.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "email.smtp_host is required for the smtp provider".to_string(),
            ));
        }

        if self.sms.enabled
            && (self.sms.account_sid.is_empty()
                || self.sms.auth_token.is_empty()
                || self.sms.from_number.is_empty())
        {
            return Err(ConfigValidationError::MissingRequired(
                "sms.account_sid, sms.auth_token and sms.from_number are required when SMS is enabled"
                    .to_string(),
            ));
        }

        if self.reminders.lookahead_days == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "reminders.lookahead_days must be at least 1".to_string(),
            ));
        }

        if self.reminders.base_url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "reminders.base_url must be set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
