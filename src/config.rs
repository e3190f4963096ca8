use std::env;

/// Which outbound relay delivers invitation emails
#[derive(Debug, Clone, PartialEq)]
pub enum MailTransport {
    Resend {
        api_key: String,
    },
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub redis_url: String,
    pub rsvp_base_url: String,
    pub mail_from: String,
    pub mail_transport: MailTransport,
    pub trigger_consumer: String,
    pub trigger_block_ms: usize,
    pub trigger_batch: usize,
    pub trigger_retry_seconds: u64,
    pub request_timeout_seconds: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let mail_transport = match var("MAIL_TRANSPORT", "resend").to_lowercase().as_str() {
            "resend" => MailTransport::Resend {
                api_key: required("RESEND_API_KEY")?,
            },
            "smtp" => MailTransport::Smtp {
                host: required("SMTP_HOST")?,
                port: var("SMTP_PORT", "587")
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("SMTP_PORT"))?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
            },
            other => return Err(ConfigError::UnknownTransport(other.to_string())),
        };

        let log_format = match var("LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port: var("SERVER_PORT", "4000")
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            redis_url: var("REDIS_URL", "redis://localhost:6379"),
            rsvp_base_url: var("RSVP_BASE_URL", "http://localhost:4000/rsvp")
                .trim_end_matches('/')
                .to_string(),
            mail_from: required("MAIL_FROM")?,
            mail_transport,
            trigger_consumer: var("TRIGGER_CONSUMER", "notifier-1"),
            trigger_block_ms: var("TRIGGER_BLOCK_MS", "5000").parse().unwrap_or(5000),
            trigger_batch: var("TRIGGER_BATCH", "16").parse().unwrap_or(16),
            trigger_retry_seconds: var("TRIGGER_RETRY_SECONDS", "30").parse().unwrap_or(30),
            request_timeout_seconds: var("REQUEST_TIMEOUT_SECONDS", "30")
                .parse()
                .unwrap_or(30),
            log_format,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
    #[error("Unknown MAIL_TRANSPORT: {0}")]
    UnknownTransport(String),
}
