use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use lib_common::markets::finnhub::FINNHUB_BASE_URL;
use lib_common::markets::yahoo::YAHOO_QUERY_URL;

const DEFAULT_CONFIG_FILE: &str = "server_stock.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "Stock data HTTP gateway over Yahoo Finance and Finnhub", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "STOCK_PORT", help = "Port to listen on for client connections.")]
    pub port: Option<u16>,

    #[clap(long, env = "STOCK_HOST", help = "Address to bind the listener to.")]
    pub host: Option<String>,

    #[clap(long, env = "STOCK_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "STOCK_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "STOCK_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "FINNHUB_API_KEY", hide_env_values = true, help = "Finnhub API key used for peer lookups.")]
    pub finnhub_api_key: Option<String>,

    #[clap(long, env = "FINNHUB_BASE_URL", help = "Finnhub REST base URL.")]
    pub finnhub_base_url: Option<String>,

    #[clap(long, env = "YAHOO_QUERY_URL", help = "Yahoo Finance query base URL.")]
    pub yahoo_query_url: Option<String>,

    #[clap(long, env = "TLS_CERT_PATH", help = "Path to the TLS certificate file.")]
    pub tls_cert_path: Option<PathBuf>,

    #[clap(long, env = "TLS_KEY_PATH", help = "Path to the TLS private key file.")]
    pub tls_key_path: Option<PathBuf>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            port: other.port.or(self.port),
            host: other.host.or(self.host),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            finnhub_api_key: other.finnhub_api_key.or(self.finnhub_api_key),
            finnhub_base_url: other.finnhub_base_url.or(self.finnhub_base_url),
            yahoo_query_url: other.yahoo_query_url.or(self.yahoo_query_url),
            tls_cert_path: other.tls_cert_path.or(self.tls_cert_path),
            tls_key_path: other.tls_key_path.or(self.tls_key_path),
        }
    }

    fn defaults() -> Config {
        Config {
            port: Some(5000),
            host: Some("0.0.0.0".to_string()),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            finnhub_base_url: Some(FINNHUB_BASE_URL.to_string()),
            yahoo_query_url: Some(YAHOO_QUERY_URL.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
}

/// Certificate and key for the rustls listener.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Fully resolved server settings.
#[derive(Clone)]
pub struct Settings {
    pub port: u16,
    pub host: String,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub finnhub_api_key: String,
    pub finnhub_base_url: String,
    pub yahoo_query_url: String,
    pub tls: Option<TlsPaths>,
}

// The API key stays out of debug output
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("log_dir", &self.log_dir)
            .field("log_level", &self.log_level)
            .field("finnhub_api_key", &"<redacted>")
            .field("finnhub_base_url", &self.finnhub_base_url)
            .field("yahoo_query_url", &self.yahoo_query_url)
            .field("tls", &self.tls)
            .finish()
    }
}

impl TryFrom<Config> for Settings {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let finnhub_api_key = config
            .finnhub_api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("FINNHUB_API_KEY"))?;

        let tls = match (config.tls_cert_path, config.tls_key_path) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert, key }),
            _ => None,
        };

        Ok(Settings {
            port: config.port.ok_or(ConfigError::Missing("STOCK_PORT"))?,
            host: config.host.ok_or(ConfigError::Missing("STOCK_HOST"))?,
            log_dir: config.log_dir.ok_or(ConfigError::Missing("STOCK_LOG_DIR"))?,
            log_level: config.log_level.ok_or(ConfigError::Missing("STOCK_LOG_LEVEL"))?,
            finnhub_api_key,
            finnhub_base_url: config
                .finnhub_base_url
                .ok_or(ConfigError::Missing("FINNHUB_BASE_URL"))?,
            yahoo_query_url: config
                .yahoo_query_url
                .ok_or(ConfigError::Missing("YAHOO_QUERY_URL"))?,
            tls,
        })
    }
}

pub fn load_config() -> Result<Settings, ConfigError> {
    // clap handles both CLI args and env vars
    resolve(Config::parse())
}

/// Layers defaults, the config file and `cli` (highest priority).
pub fn resolve(cli: Config) -> Result<Settings, ConfigError> {
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = Config::defaults();

    if let Some(file_config) = read_config_file(&config_file_path) {
        current_config = current_config.merge(file_config);
    }

    current_config = current_config.merge(cli);
    Settings::try_from(current_config)
}

fn read_config_file(path: &Path) -> Option<Config> {
    if !path.exists() {
        log::info!(
            "Config file not found at {}. Using defaults and environment/CLI variables.",
            path.display()
        );
        return None;
    }

    let Ok(config_str) = fs::read_to_string(path) else {
        log::warn!("Failed to read config file: {}. Falling back to other sources.", path.display());
        return None;
    };

    match serde_json::from_str::<Config>(&config_str) {
        Ok(file_config) => Some(file_config),
        Err(e) => {
            log::warn!(
                "Failed to parse config file: {} ({}). Falling back to other sources.",
                path.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli_with_key(config_path: PathBuf) -> Config {
        Config {
            config_path: Some(config_path),
            finnhub_api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = resolve(cli_with_key(dir.path().join("absent.conf"))).unwrap();

        assert_eq!(settings.port, 5000);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.yahoo_query_url, YAHOO_QUERY_URL);
        assert_eq!(settings.finnhub_base_url, FINNHUB_BASE_URL);
        assert!(settings.tls.is_none());
    }

    #[test]
    fn file_overrides_defaults_and_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 8080, "logLevel": "debug", "host": "127.0.0.1"}}"#).unwrap();

        let mut cli = cli_with_key(file.path().to_path_buf());
        cli.port = Some(9000);

        let settings = resolve(cli).unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.host, "127.0.0.1");
    }

    #[test]
    fn unparsable_file_is_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "port = 8080").unwrap();

        let settings = resolve(cli_with_key(file.path().to_path_buf())).unwrap();
        assert_eq!(settings.port, 5000);
    }

    #[test]
    fn api_key_may_come_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"finnhubApiKey": "from-file"}}"#).unwrap();

        let cli = Config {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(resolve(cli).unwrap().finnhub_api_key, "from-file");
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Config {
            config_path: Some(dir.path().join("absent.conf")),
            finnhub_api_key: Some("  ".to_string()),
            ..Default::default()
        };

        let err = resolve(cli).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FINNHUB_API_KEY")));
        assert_eq!(err.to_string(), "missing required setting FINNHUB_API_KEY");
    }

    #[test]
    fn tls_needs_both_paths() {
        let dir = tempfile::tempdir().unwrap();

        let mut cli = cli_with_key(dir.path().join("absent.conf"));
        cli.tls_cert_path = Some(PathBuf::from("cert.pem"));
        assert!(resolve(cli.clone()).unwrap().tls.is_none());

        cli.tls_key_path = Some(PathBuf::from("key.pem"));
        assert_eq!(
            resolve(cli).unwrap().tls,
            Some(TlsPaths {
                cert: PathBuf::from("cert.pem"),
                key: PathBuf::from("key.pem"),
            })
        );
    }

    #[test]
    fn debug_output_hides_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = resolve(cli_with_key(dir.path().join("absent.conf"))).unwrap();

        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
