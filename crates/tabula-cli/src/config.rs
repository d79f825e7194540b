//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabula_domain::{ColumnPolicy, DuplicateFieldNames, ValidationPolicy};
use tabula_workflow::{SessionOptions, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Environment variable overriding the active profile's service URL.
pub const SERVICE_URL_ENV: &str = "TABULA_SERVICE_URL";

const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// File this configuration was loaded from and is saved to
    #[serde(skip)]
    path: Option<PathBuf>,
}

/// Connection profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Extraction service base URL
    pub service_url: String,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Initial chunk size for processing
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i64,

    /// Initial chunk overlap for processing
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: i64,

    /// Directory exported CSV files are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Whether repeated field names are accepted
    #[serde(default)]
    pub duplicate_field_names: DuplicateFieldNames,

    /// How result columns are derived
    #[serde(default)]
    pub column_policy: ColumnPolicy,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Command history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(tabula_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path, or defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from `path`, or defaults when absent.
    ///
    /// Either way the configuration remembers `path` for [`Config::save`].
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            Self::default()
        };
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Whether the configuration file exists yet.
    pub fn exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }

    /// Save configuration to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&Profile> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Service URL to use, honoring [`SERVICE_URL_ENV`].
    pub fn service_url(&self) -> Result<String> {
        self.resolve_service_url(std::env::var(SERVICE_URL_ENV).ok())
    }

    fn resolve_service_url(&self, env_override: Option<String>) -> Result<String> {
        match env_override.filter(|url| !url.trim().is_empty()) {
            Some(url) => Ok(url),
            None => Ok(self.get_active_profile()?.service_url.clone()),
        }
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }

    /// Session tunables derived from the settings.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            validation: ValidationPolicy {
                duplicate_field_names: self.settings.duplicate_field_names,
            },
            columns: self.settings.column_policy,
            chunk_size: self.settings.chunk_size,
            chunk_overlap: self.settings.chunk_overlap,
        }
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.request_timeout_secs)
    }

    /// Where an exported file named `file_name` is written by default.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        match &self.settings.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "default".to_string(),
            Profile {
                service_url: DEFAULT_SERVICE_URL.to_string(),
            },
        );

        Self {
            active_profile: "default".to_string(),
            profiles,
            settings: Settings::default(),
            path: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            output_dir: None,
            duplicate_field_names: DuplicateFieldNames::default(),
            column_policy: ColumnPolicy::default(),
            request_timeout_secs: tabula_sdk::DEFAULT_TIMEOUT_SECS,
            history_size: 1000,
        }
    }
}

/// `~/.tabula`, holding the config file and REPL history.
pub fn tabula_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".tabula"))
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> i64 {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> i64 {
    DEFAULT_CHUNK_OVERLAP
}

fn default_timeout() -> u64 {
    tabula_sdk::DEFAULT_TIMEOUT_SECS
}

fn default_history_size() -> usize {
    1000
}
