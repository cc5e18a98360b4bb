//! Configuration management for docmirror.
//!
//! Parses `docmirror.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `remote.api_url`
//! - `remote.raw_url`
//! - `remote.access_token`
//!
//! ## Example
//!
//! ```toml
//! [mirror]
//! data_dir = "var"
//! languages = ["en-US", "zh-CN"]
//!
//! [remote]
//! access_token = "${GITHUB_TOKEN:-}"
//!
//! [[apps]]
//! name = "gitea"
//! repo = "go-gitea/docs"
//! ```

mod expand;
mod stamp;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docmirror_manifest::layout::{CONF_DIR, MIRROR_DIR};
use serde::Deserialize;

pub use stamp::CheckStamp;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the data directory.
    pub data_dir: Option<PathBuf>,
    /// Override the runtime mode.
    pub mode: Option<RuntimeMode>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docmirror.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local mirror and scheduling settings.
    pub mirror: MirrorConfig,
    /// Remote host settings.
    pub remote: RemoteConfig,
    /// Mirrored applications.
    pub apps: Vec<AppConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// How documents are served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Serve from the in-memory cache, kept fresh by the scheduler.
    #[default]
    Prod,
    /// Re-read documents from disk on every request; no scheduler.
    Dev,
}

impl RuntimeMode {
    #[must_use]
    pub fn is_dev(self) -> bool {
        self == Self::Dev
    }
}

/// Local mirror configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Root for the `docs/` mirror and `conf/` state. Relative paths are
    /// resolved against the config file's directory.
    pub data_dir: PathBuf,
    /// Display languages; each is a top-level directory in every repository.
    pub languages: Vec<String>,
    /// Runtime mode.
    pub mode: RuntimeMode,
    /// Seconds between scheduled sync cycles.
    pub interval_secs: u64,
    /// Age in seconds after which the last check is stale at startup.
    pub stale_after_secs: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            languages: vec!["en-US".to_owned(), "zh-CN".to_owned()],
            mode: RuntimeMode::Prod,
            interval_secs: 300,
            stale_after_secs: 300,
        }
    }
}

impl MirrorConfig {
    /// Directory holding mirrored repository content (`<data_dir>/docs`).
    #[must_use]
    pub fn mirror_dir(&self) -> PathBuf {
        self.data_dir.join(MIRROR_DIR)
    }

    /// Directory holding manifests and the check stamp (`<data_dir>/conf`).
    #[must_use]
    pub fn conf_dir(&self) -> PathBuf {
        self.data_dir.join(CONF_DIR)
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

/// Remote host configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// REST API base URL.
    pub api_url: String,
    /// Raw content base URL.
    pub raw_url: String,
    /// Branch mirrored from every repository.
    pub branch: String,
    /// Access credential. Empty strings count as unset.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_owned(),
            raw_url: "https://raw.githubusercontent.com".to_owned(),
            branch: "master".to_owned(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Credential, if one is configured and non-empty.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One mirrored application.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Application name, used as the local directory and manifest name.
    pub name: String,
    /// Remote repository identifier (`owner/name`).
    pub repo: String,
}

impl AppConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`remote.access_token`").
        field: String,
        /// Error message (e.g., "${`GITHUB_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a duration field to be positive.
fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docmirror.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated last.
    ///
    /// # Errors
    ///
    /// Returns error if no config file is found, parsing or expansion fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => Self::discover_config()
                .ok_or_else(|| ConfigError::NotFound(PathBuf::from(CONFIG_FILENAME)))?,
        };

        let mut config = Self::load_from_file(&path)?;
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            apps = config.apps.len(),
            mode = ?config.mirror.mode,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(data_dir) = &settings.data_dir {
            self.mirror.data_dir.clone_from(data_dir);
        }
        if let Some(mode) = settings.mode {
            self.mirror.mode = mode;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Look up an application by name.
    #[must_use]
    pub fn app(&self, name: &str) -> Option<&AppConfig> {
        self.apps.iter().find(|a| a.name == name)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_mirror()?;
        self.validate_remote()?;
        self.validate_apps()?;
        Ok(())
    }

    fn validate_mirror(&self) -> Result<(), ConfigError> {
        if self.mirror.languages.is_empty() {
            return Err(ConfigError::Validation(
                "mirror.languages cannot be empty".to_owned(),
            ));
        }
        for lang in &self.mirror.languages {
            require_non_empty(lang, "mirror.languages")?;
            if lang.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "mirror.languages entry {lang:?} cannot contain '/'"
                )));
            }
        }
        require_positive(self.mirror.interval_secs, "mirror.interval_secs")?;
        require_positive(self.mirror.stale_after_secs, "mirror.stale_after_secs")?;
        Ok(())
    }

    fn validate_remote(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.remote.api_url, "remote.api_url")?;
        require_http_url(&self.remote.api_url, "remote.api_url")?;
        require_non_empty(&self.remote.raw_url, "remote.raw_url")?;
        require_http_url(&self.remote.raw_url, "remote.raw_url")?;
        require_non_empty(&self.remote.branch, "remote.branch")?;
        require_positive(self.remote.timeout_secs, "remote.timeout_secs")?;
        Ok(())
    }

    fn validate_apps(&self) -> Result<(), ConfigError> {
        if self.apps.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[apps]] entry is required".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for app in &self.apps {
            require_non_empty(&app.name, "apps.name")?;
            if app.name.contains(['/', '\\']) || app.name == "." || app.name == ".." {
                return Err(ConfigError::Validation(format!(
                    "apps.name {:?} is not a valid directory name",
                    app.name
                )));
            }
            if !seen.insert(app.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate application name {:?}",
                    app.name
                )));
            }

            let valid_repo = app
                .repo
                .split_once('/')
                .is_some_and(|(owner, name)| {
                    !owner.is_empty() && !name.is_empty() && !name.contains('/')
                });
            if !valid_repo {
                return Err(ConfigError::Validation(format!(
                    "apps.repo {:?} for {:?} must be of the form owner/name",
                    app.repo, app.name
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.remote.api_url = expand::expand_env(&self.remote.api_url, "remote.api_url")?;
        self.remote.raw_url = expand::expand_env(&self.remote.raw_url, "remote.raw_url")?;
        if let Some(ref token) = self.remote.access_token {
            self.remote.access_token = Some(expand::expand_env(token, "remote.access_token")?);
        }
        Ok(())
    }

    /// Resolve a relative data directory against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if self.mirror.data_dir.is_relative() {
            self.mirror.data_dir = config_dir.join(&self.mirror.data_dir);
        }
    }
}
