//! Configuration management for hostmapper.
//!
//! Settings are loaded from `./config/hostmapper.toml`; the embedded
//! template below is the only place defaults exist. A missing file falls
//! back to the template, a malformed one is fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Configuration file path relative to the working directory.
pub const CONFIG_PATH: &str = "./config/hostmapper.toml";

/// Default configuration file content.
pub const DEFAULT_CONFIG: &str = include_str!("../config/hostmapper.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Configuration file already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub dns: DnsConfig,
    pub enrichment: EnrichmentConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Timeout for each ASN / geo lookup request, in seconds.
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DnsConfig {
    /// Timeout for each forward DNS lookup, in seconds.
    pub lookup_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Number of top domains (by bookmark count) to enrich.
    pub top_domains: usize,
    /// Pause between enriched domains, in milliseconds.
    pub inter_domain_delay_ms: u64,
    /// ASN / ownership lookup endpoint (RIPEstat prefix-overview API).
    pub asn_api_url: String,
    /// Geo-IP lookup endpoint (ip-api.com JSON API).
    pub geo_api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub bookmarks_file: String,
    pub domains_file: String,
    pub domains_by_folder_file: String,
    pub hostmap_file: String,
}

impl AppConfig {
    /// Load configuration from `./config/hostmapper.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the embedded default template.
    pub fn embedded_default() -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration file, creating `./config/` if needed.
    /// Refuses to overwrite an existing file.
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = PathBuf::from(CONFIG_PATH);
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG)?;
        Ok(path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("enrichment.asn_api_url", &self.enrichment.asn_api_url)?;
        validate_url("enrichment.geo_api_url", &self.enrichment.geo_api_url)?;
        for (field, value) in [
            ("http.user_agent", &self.http.user_agent),
            ("output.bookmarks_file", &self.output.bookmarks_file),
            ("output.domains_file", &self.output.domains_file),
            ("output.domains_by_folder_file", &self.output.domains_by_folder_file),
            ("output.hostmap_file", &self.output.hostmap_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyRequired { field: field.to_string() });
            }
        }
        Ok(())
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    Url::parse(url).map_err(|_| ConfigError::InvalidUrl {
        field: field.to_string(),
        url: url.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_default_parses_and_validates() {
        let config = AppConfig::embedded_default().expect("default template must be valid");
        assert_eq!(config.enrichment.top_domains, 1000);
        assert_eq!(config.enrichment.inter_domain_delay_ms, 1000);
        assert_eq!(config.http.request_timeout_secs, 10);
        assert_eq!(config.output.bookmarks_file, "bookmarks_flat.csv");
        assert_eq!(config.output.hostmap_file, "hostmap_references.csv");
    }

    #[test]
    fn invalid_endpoint_url_is_rejected() {
        let mut config = AppConfig::embedded_default().unwrap();
        config.enrichment.geo_api_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn empty_output_file_name_is_rejected() {
        let mut config = AppConfig::embedded_default().unwrap();
        config.output.domains_file = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRequired { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let missing = Path::new("./does-not-exist/hostmapper.toml");
        assert!(matches!(
            AppConfig::load_from(missing),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
