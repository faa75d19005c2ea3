use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use courtlistener_mcp::{RuntimeInfo, ToolContext};
use courtlistener_sdk::config::{COURTLISTENER_BASE_URL, ECFR_BASE_URL};
use courtlistener_sdk::{CourtListenerClient, EcfrClient, RateLimitConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "courtlistener.toml";

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Http,
    Stdio,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Http => "http",
            TransportKind::Stdio => "stdio",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub courtlistener: CourtListenerConfig,
    pub ecfr: EcfrConfig,
    pub rate_limit: RateLimitSettings,
    pub server: ListenConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtListenerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CourtListenerConfig {
    fn default() -> Self {
        Self {
            base_url: COURTLISTENER_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcfrConfig {
    pub base_url: String,
}

impl Default for EcfrConfig {
    fn default() -> Self {
        Self {
            base_url: ECFR_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub per_minute: u32,
    pub burst: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            per_minute: defaults.requests_per_minute,
            burst: defaults.burst,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub transport: TransportKind,
    pub environment: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8785,
            transport: TransportKind::Http,
            environment: "production".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub debug: bool,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            debug: false,
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directive for the subscriber; `debug` wins over `level`.
    pub fn filter(&self) -> String {
        let level = if self.debug {
            "debug".to_string()
        } else {
            self.level.trim().to_lowercase()
        };
        format!("{level},hyper=warn,reqwest=warn")
    }
}

/// Values taken from the command line or the environment. Set fields win
/// over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub courtlistener_base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub ecfr_base_url: Option<String>,
    pub rate_limit_per_minute: Option<u32>,
    pub rate_limit_burst: Option<u32>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub transport: Option<TransportKind>,
    pub environment: Option<String>,
    pub log_level: Option<String>,
    pub debug: bool,
    pub log_json: bool,
}

impl ServerConfig {
    /// Read the TOML file at `path`, or `courtlistener.toml` when it exists.
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                bail!("Configuration file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        let Overrides {
            courtlistener_base_url,
            api_key,
            timeout_secs,
            ecfr_base_url,
            rate_limit_per_minute,
            rate_limit_burst,
            host,
            port,
            transport,
            environment,
            log_level,
            debug,
            log_json,
        } = overrides;

        if let Some(url) = courtlistener_base_url {
            self.courtlistener.base_url = url;
        }
        if let Some(key) = api_key {
            self.courtlistener.api_key = Some(key);
        }
        if let Some(secs) = timeout_secs {
            self.courtlistener.timeout_secs = secs;
        }
        if let Some(url) = ecfr_base_url {
            self.ecfr.base_url = url;
        }
        if let Some(per_minute) = rate_limit_per_minute {
            self.rate_limit.per_minute = per_minute;
        }
        if let Some(burst) = rate_limit_burst {
            self.rate_limit.burst = burst;
        }
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(transport) = transport {
            self.server.transport = transport;
        }
        if let Some(environment) = environment {
            self.server.environment = environment;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
        self.logging.debug |= debug;
        self.logging.json |= log_json;

        // Blank keys count as unset.
        if self
            .courtlistener
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.courtlistener.api_key = None;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build both upstream clients with the shared timeout and rate limit.
    pub fn build_context(&self) -> Result<ToolContext> {
        let timeout = Duration::from_secs(self.courtlistener.timeout_secs);
        let rate_limit = RateLimitConfig::new(self.rate_limit.per_minute, self.rate_limit.burst);

        let mut courtlistener = CourtListenerClient::builder()
            .base_url(&self.courtlistener.base_url)
            .timeout(timeout)
            .rate_limit(rate_limit);
        if let Some(key) = &self.courtlistener.api_key {
            courtlistener = courtlistener.api_key(key);
        }
        let courtlistener = courtlistener
            .build()
            .context("Invalid CourtListener client configuration")?;

        let ecfr = EcfrClient::builder()
            .base_url(&self.ecfr.base_url)
            .timeout(timeout)
            .rate_limit(rate_limit)
            .build()
            .context("Invalid eCFR client configuration")?;

        let runtime = RuntimeInfo {
            transport: self.server.transport.to_string(),
            host: self.server.host.clone(),
            port: self.server.port,
            environment: self.server.environment.clone(),
            ..RuntimeInfo::default()
        };

        Ok(ToolContext::new(courtlistener, ecfr, runtime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(
            config.courtlistener.base_url,
            "https://www.courtlistener.com/api/rest/v4/"
        );
        assert_eq!(config.courtlistener.timeout_secs, 30);
        assert_eq!(config.ecfr.base_url, "https://www.ecfr.gov/");
        assert_eq!(config.rate_limit.per_minute, 60);
        assert_eq!(config.rate_limit.burst, 10);
        assert_eq!(config.server.port, 8785);
        assert_eq!(config.server.transport, TransportKind::Http);
        assert_eq!(config.bind_addr(), "0.0.0.0:8785");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[courtlistener]
api_key = "from-file"
timeout_secs = 10

[server]
transport = "stdio"
port = 9000
"#
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.courtlistener.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.courtlistener.timeout_secs, 10);
        assert_eq!(config.server.transport, TransportKind::Stdio);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerConfig::load(Some(dir.path().join("missing.toml").as_path())).is_err());

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = ServerConfig::load(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse configuration file"));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = ServerConfig::default();
        config.courtlistener.api_key = Some("from-file".to_string());
        config.server.port = 9000;

        let config = config.apply(Overrides {
            api_key: Some("from-env".to_string()),
            transport: Some(TransportKind::Stdio),
            debug: true,
            ..Overrides::default()
        });

        assert_eq!(config.courtlistener.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.transport, TransportKind::Stdio);
        assert!(config.logging.debug);
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = ServerConfig::default().apply(Overrides {
            api_key: Some("   ".to_string()),
            ..Overrides::default()
        });
        assert_eq!(config.courtlistener.api_key, None);
    }

    #[test]
    fn test_log_filter() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.filter(), "info,hyper=warn,reqwest=warn");
        logging.debug = true;
        assert_eq!(logging.filter(), "debug,hyper=warn,reqwest=warn");
    }

    #[test]
    fn test_build_context() {
        let mut config = ServerConfig::default().apply(Overrides {
            api_key: Some("token".to_string()),
            transport: Some(TransportKind::Stdio),
            ..Overrides::default()
        });
        let context = config.build_context().unwrap();
        assert!(context.courtlistener.has_api_key());
        assert_eq!(context.runtime.transport, "stdio");
        assert_eq!(context.ecfr.base_url(), "https://www.ecfr.gov/");

        config.courtlistener.base_url = "ftp://example.com".to_string();
        assert!(config.build_context().is_err());
    }
}
