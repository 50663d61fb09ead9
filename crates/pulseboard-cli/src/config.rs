use pulseboard_app::AppConfig;
use pulseboard_egress::{AnalyticsConfig, HttpClientConfig, IdentityConfig};
use pulseboard_sync::PollerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_user_service_url")]
    pub user_service_url: String,

    #[serde(default = "default_analytics_service_url")]
    pub analytics_service_url: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_session_file")]
    pub session_file: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout; unset means the transport default (none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_service_url: default_user_service_url(),
            analytics_service_url: default_analytics_service_url(),
            poll_interval_secs: default_poll_interval_secs(),
            session_file: default_session_file(),
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config: ClientConfig = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Service URLs (no PULSEBOARD_ prefix, shared with the services)
        if let Ok(val) = std::env::var("USER_SERVICE_URL") {
            self.user_service_url = val;
        }

        if let Ok(val) = std::env::var("ANALYTICS_SERVICE_URL") {
            self.analytics_service_url = val;
        }

        if let Ok(val) = std::env::var("PULSEBOARD_POLL_INTERVAL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => self.poll_interval_secs = secs,
                _ => eprintln!(
                    "Warning: Invalid PULSEBOARD_POLL_INTERVAL_SECS '{}', using {}",
                    val, self.poll_interval_secs
                ),
            }
        }

        if let Ok(val) = std::env::var("PULSEBOARD_SESSION_FILE") {
            self.session_file = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("PULSEBOARD_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("PULSEBOARD_LOG_JSON") {
            if let Ok(enabled) = val.parse::<bool>() {
                self.logging.json = enabled;
            }
        }
    }

    /// Session file with `~` expanded
    pub fn session_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.session_file).to_string())
    }

    pub fn app_config(&self) -> pulseboard_core::Result<AppConfig> {
        let client_config = HttpClientConfig {
            timeout_secs: self.http.timeout_secs,
            connect_timeout_secs: self.http.connect_timeout_secs,
            ..Default::default()
        };

        Ok(AppConfig {
            identity: IdentityConfig {
                base_url: self.user_service_url.clone(),
                client_config: client_config.clone(),
            },
            analytics: AnalyticsConfig {
                base_url: self.analytics_service_url.clone(),
                client_config,
            },
            poller: PollerConfig::from_secs(self.poll_interval_secs)?,
            initial_range: None,
        })
    }
}

fn default_user_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_analytics_service_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_session_file() -> String {
    match dirs::home_dir() {
        Some(home) => home
            .join(".pulseboard")
            .join("session.json")
            .to_string_lossy()
            .to_string(),
        None => "./.pulseboard/session.json".to_string(),
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_false() -> bool {
    false
}
