//! Configuration loading and resolution
//!
//! Two layers, resolved once at startup:
//! 1. **Overrides**: command-line flags and environment variables (merged by clap
//!    in the binary and handed over as [`ConfigOverrides`])
//! 2. **TOML bootstrap**: optional file, missing file means compiled defaults
//!
//! Priority: CLI/ENV > TOML > compiled default. The remote generation credential
//! is resolved here and becomes the pipeline's capability flag; nothing reads it
//! from global state later.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DB_NAME: &str = "stdg.db";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o";
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BULK_DELAY_MS: u64 = 2000;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub host: Option<String>,
    /// Directory holding the SQLite database
    pub data_dir: Option<PathBuf>,
    /// Database file name inside `data_dir`
    pub db_name: Option<String>,
    /// Replacement affiliate catalog (TOML file)
    pub affiliate_catalog: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub generation: GenerationConfig,
    pub mailing_list: MailingListConfig,
    pub auto_publish: AutoPublishConfig,
    pub bulk: BulkConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Remote text-generation settings as written in TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Mailing-list forwarding settings as written in TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MailingListConfig {
    pub api_key: Option<String>,
    pub list_id: Option<String>,
    pub base_url: Option<String>,
}

/// Daily auto-publish schedule (UTC wall clock)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AutoPublishConfig {
    pub enabled: bool,
    pub hour: u32,
    pub minute: u32,
    pub check_interval_secs: u64,
}

impl Default for AutoPublishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: 9,
            minute: 0,
            check_interval_secs: 60,
        }
    }
}

/// Bulk-generation pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Pause between generated articles, to stay under the remote rate limit
    pub delay_ms: u64,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_BULK_DELAY_MS,
        }
    }
}

/// Values taken from the command line or environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub db_name: Option<String>,
    pub affiliate_catalog: Option<PathBuf>,
    pub openai_api_key: Option<String>,
    pub mailchimp_api_key: Option<String>,
    pub mailchimp_list_id: Option<String>,
}

/// Resolved remote generation settings (present only with a credential)
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Resolved mailing-list settings (present only with credential and list id)
#[derive(Debug, Clone)]
pub struct MailingListSettings {
    pub api_key: String,
    pub list_id: String,
    pub base_url: String,
}

/// Complete resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub host: String,
    pub data_dir: PathBuf,
    pub db_name: String,
    pub affiliate_catalog: Option<PathBuf>,
    pub generation: Option<GenerationSettings>,
    pub mailing_list: Option<MailingListSettings>,
    pub auto_publish: AutoPublishConfig,
    pub bulk_delay: Duration,
}

impl ServiceConfig {
    /// Merge overrides on top of the TOML bootstrap
    pub fn resolve(toml_config: TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let generation = resolve_secret(
            "Text generation API key",
            overrides.openai_api_key,
            toml_config.generation.api_key.clone(),
        )
        .map(|api_key| GenerationSettings {
            api_key,
            model: toml_config
                .generation
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            base_url: toml_config
                .generation
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GENERATION_BASE_URL.to_string()),
            timeout: Duration::from_secs(toml_config.generation.timeout_secs.unwrap_or(120)),
        });

        let mailing_api_key = resolve_secret(
            "Mailing list API key",
            overrides.mailchimp_api_key,
            toml_config.mailing_list.api_key.clone(),
        );
        let mailing_list_id = overrides
            .mailchimp_list_id
            .or(toml_config.mailing_list.list_id.clone())
            .filter(|id| is_valid_key(id));
        let mailing_list = match (mailing_api_key, mailing_list_id) {
            (Some(api_key), Some(list_id)) => {
                let base_url = match toml_config.mailing_list.base_url.clone() {
                    Some(url) => url,
                    None => mailchimp_base_url(&api_key)?,
                };
                Some(MailingListSettings {
                    api_key,
                    list_id,
                    base_url,
                })
            }
            (Some(_), None) => {
                warn!("Mailing list API key configured without a list id; forwarding disabled");
                None
            }
            _ => None,
        };

        let auto_publish = toml_config.auto_publish.clone();
        if auto_publish.hour > 23 || auto_publish.minute > 59 {
            return Err(Error::Config(format!(
                "auto_publish time {:02}:{:02} is not a valid UTC time of day",
                auto_publish.hour, auto_publish.minute
            )));
        }
        if auto_publish.check_interval_secs == 0 {
            return Err(Error::Config(
                "auto_publish.check_interval_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            port: overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            host: overrides
                .host
                .or(toml_config.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            data_dir: overrides
                .data_dir
                .or(toml_config.data_dir)
                .unwrap_or_else(default_data_dir),
            db_name: overrides
                .db_name
                .or(toml_config.db_name)
                .unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            affiliate_catalog: overrides.affiliate_catalog.or(toml_config.affiliate_catalog),
            generation,
            mailing_list,
            auto_publish,
            bulk_delay: Duration::from_millis(toml_config.bulk.delay_ms),
        })
    }

    /// Full path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_name)
    }

    /// Whether the remote generator is available
    pub fn remote_generation_enabled(&self) -> bool {
        self.generation.is_some()
    }
}

/// Load the TOML bootstrap file
///
/// A missing file is not an error: a warning is logged and defaults are used.
/// A file that exists but does not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Default location of the TOML bootstrap file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("stdg").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("stdg.toml"))
}

/// OS-dependent default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("stdg"))
        .unwrap_or_else(|| PathBuf::from("./stdg_data"))
}

/// Pick a secret from override and TOML sources
///
/// Warns when both sources carry a usable value; the override wins.
pub fn resolve_secret(
    label: &str,
    override_value: Option<String>,
    toml_value: Option<String>,
) -> Option<String> {
    let override_value = override_value.filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    match (override_value, toml_value) {
        (Some(value), Some(_)) => {
            warn!(
                "{} found in environment/command line and TOML. Using environment/command line.",
                label
            );
            Some(value)
        }
        (Some(value), None) => {
            info!("{} loaded from environment/command line", label);
            Some(value)
        }
        (None, Some(value)) => {
            info!("{} loaded from TOML config", label);
            Some(value)
        }
        (None, None) => None,
    }
}

/// Validate key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Derive the Mailchimp API base URL from the data-center suffix of a key
/// (`<hex>-us21` → `https://us21.api.mailchimp.com/3.0`)
pub fn mailchimp_base_url(api_key: &str) -> Result<String> {
    match api_key.rsplit_once('-') {
        Some((_, dc)) if !dc.is_empty() && dc.chars().all(|c| c.is_ascii_alphanumeric()) => {
            Ok(format!("https://{}.api.mailchimp.com/3.0", dc))
        }
        _ => Err(Error::Config(
            "Mailing list API key has no data-center suffix; set mailing_list.base_url".to_string(),
        )),
    }
}
