use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use crate::xmltv::parse_xmltv_timestamp;
use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub epg: EpgConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON channel catalog (`{"channels": [...]}`)
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    /// Newline-delimited guide-id hand-off file written by the catalog stage
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
    /// Group label used when an entry has no `group-title`
    #[serde(default = "default_group")]
    pub default_group: String,
    /// Hosts (and their subdomains) whose URLs are video-platform pages, not streams
    #[serde(default = "default_video_platform_domains")]
    pub video_platform_domains: Vec<String>,
    /// Channels that always exist regardless of the catalog contents
    #[serde(default = "default_builtin_specials")]
    pub builtin_specials: Vec<BuiltinSpecialConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuiltinSpecialConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub group: Option<String>,
    pub tvg_id: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgConfig {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Value of the `generator-info-name` attribute on the output root
    #[serde(default = "default_generator_name")]
    pub generator_name: String,
    /// Total time allowed for a single feed download
    #[serde(default = "default_fetch_timeout", with = "duration_serde::duration")]
    pub fetch_timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
    /// Feeds fetched and parsed at the same time; merging always follows list order
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    pub user_agent: Option<String>,
    /// Feed sources in priority order: earlier sources win channel conflicts
    #[serde(default = "default_epg_sources")]
    pub sources: Vec<EpgSourceConfig>,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpgSourceConfig {
    pub url: String,
    /// Force (or disable) gzip handling; derived from the `.gz` suffix when unset
    pub compressed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_title")]
    pub title: String,
    #[serde(default = "default_fallback_description")]
    pub description: String,
    /// XMLTV timestamp (`YYYYMMDDhhmmss +zzzz`) opening the placeholder interval
    #[serde(default = "default_fallback_start")]
    pub start: String,
    #[serde(default = "default_fallback_stop")]
    pub stop: String,
}

// Catalog defaults
fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}

fn default_registry_path() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTRY_PATH)
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_video_platform_domains() -> Vec<String> {
    DEFAULT_VIDEO_PLATFORM_DOMAINS
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_builtin_specials() -> Vec<BuiltinSpecialConfig> {
    DEFAULT_BUILTIN_SPECIALS
        .iter()
        .map(|(id, name, url, group)| BuiltinSpecialConfig {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            group: Some(group.to_string()),
            tvg_id: Some(id.to_string()),
            logo: None,
        })
        .collect()
}

// EPG defaults
fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_generator_name() -> String {
    DEFAULT_GENERATOR_NAME.to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

fn default_epg_sources() -> Vec<EpgSourceConfig> {
    DEFAULT_EPG_SOURCES
        .iter()
        .map(|url| EpgSourceConfig {
            url: url.to_string(),
            compressed: None,
        })
        .collect()
}

fn default_fallback_title() -> String {
    DEFAULT_FALLBACK_TITLE.to_string()
}

fn default_fallback_description() -> String {
    DEFAULT_FALLBACK_DESCRIPTION.to_string()
}

fn default_fallback_start() -> String {
    DEFAULT_FALLBACK_START.to_string()
}

fn default_fallback_stop() -> String {
    DEFAULT_FALLBACK_STOP.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            registry_path: default_registry_path(),
            default_group: default_group(),
            video_platform_domains: default_video_platform_domains(),
            builtin_specials: default_builtin_specials(),
        }
    }
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            generator_name: default_generator_name(),
            fetch_timeout: default_fetch_timeout(),
            connect_timeout: default_connect_timeout(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            user_agent: None,
            sources: default_epg_sources(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            title: default_fallback_title(),
            description: default_fallback_description(),
            start: default_fallback_start(),
            stop: default_fallback_stop(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            epg: EpgConfig::default(),
        }
    }
}

impl EpgConfig {
    /// User agent sent with every feed request
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
    }
}

impl Config {
    /// Load the configuration, writing a default file when none exists yet
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        let config = if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str::<Self>(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.epg.max_concurrent_fetches == 0 {
            return Err(AppError::configuration(
                "epg.max_concurrent_fetches must be at least 1",
            ));
        }
        if self.epg.fetch_timeout.is_zero() {
            return Err(AppError::configuration("epg.fetch_timeout must be non-zero"));
        }

        let fallback = &self.epg.fallback;
        let start = parse_xmltv_timestamp(&fallback.start).ok_or_else(|| {
            AppError::configuration(format!("Invalid fallback start '{}'", fallback.start))
        })?;
        let stop = parse_xmltv_timestamp(&fallback.stop).ok_or_else(|| {
            AppError::configuration(format!("Invalid fallback stop '{}'", fallback.stop))
        })?;
        if start >= stop {
            return Err(AppError::configuration(
                "epg.fallback.start must precede epg.fallback.stop",
            ));
        }

        for special in &self.catalog.builtin_specials {
            if special.id.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "Builtin special '{}' has an empty id",
                    special.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.epg.sources.len(), DEFAULT_EPG_SOURCES.len());
        assert_eq!(config.catalog.builtin_specials.len(), 2);
        assert_eq!(config.epg.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [epg]
            fetch_timeout = "5s"
            max_concurrent_fetches = 2

            [[epg.sources]]
            url = "http://localhost/a.xml"

            [[epg.sources]]
            url = "http://localhost/b"
            compressed = true
            "#,
        )
        .unwrap();

        assert_eq!(config.epg.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.epg.max_concurrent_fetches, 2);
        assert_eq!(config.epg.sources.len(), 2);
        assert_eq!(config.epg.sources[1].compressed, Some(true));
        assert_eq!(config.epg.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(config.catalog.default_group, DEFAULT_GROUP);
    }

    #[test]
    fn test_validation_rejects_inverted_fallback_interval() {
        let mut config = Config::default();
        config.epg.fallback.start = "20300101000000 +0000".to_string();
        config.epg.fallback.stop = "20240101000000 +0000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.epg.max_concurrent_fetches = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from_file(&path).unwrap();
        assert!(path.exists());

        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded.epg.sources, config.epg.sources);
        assert_eq!(reloaded.epg.fallback, config.epg.fallback);
        assert_eq!(reloaded.catalog.builtin_specials, config.catalog.builtin_specials);
    }

    #[test]
    fn test_user_agent_default() {
        let config = EpgConfig::default();
        assert!(config.user_agent().starts_with("iptv-guide/"));
    }
}
