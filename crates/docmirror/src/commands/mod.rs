//! CLI command implementations.

pub(crate) mod run;
pub(crate) mod show;
pub(crate) mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use docmirror_config::{CliSettings, Config, RemoteConfig, RuntimeMode};
use docmirror_remote::{GithubClient, GithubConfig};
use docmirror_sync::Docs;

use crate::error::CliError;

pub(crate) use run::RunArgs;
pub(crate) use show::ShowArgs;
pub(crate) use sync::SyncArgs;

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover docmirror.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory holding docs/ and conf/ (overrides config).
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Serve documents straight from disk and disable the scheduler.
    #[arg(long)]
    dev: bool,

    /// Enable verbose output (sync progress logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration with CLI overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            data_dir: self.data_dir.clone(),
            mode: self.dev.then_some(RuntimeMode::Dev),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// GitHub client settings from the `[remote]` section.
pub(crate) fn github_config(remote: &RemoteConfig) -> GithubConfig {
    GithubConfig {
        api_url: remote.api_url.clone(),
        raw_url: remote.raw_url.clone(),
        branch: remote.branch.clone(),
        access_token: remote.credential().map(str::to_owned),
        timeout: remote.timeout(),
    }
}

/// Build the documentation engine backed by GitHub.
pub(crate) fn open_docs(config: &Config) -> Arc<Docs> {
    let remote = GithubClient::new(github_config(&config.remote));
    Arc::new(Docs::new(config, Arc::new(remote)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_github_config_from_remote_section() {
        let remote = RemoteConfig {
            api_url: "https://ghe.example.com/api/v3".to_owned(),
            branch: "main".to_owned(),
            access_token: Some("secret".to_owned()),
            timeout_secs: 5,
            ..RemoteConfig::default()
        };

        let github = github_config(&remote);

        assert_eq!(github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(github.raw_url, "https://raw.githubusercontent.com");
        assert_eq!(github.branch, "main");
        assert_eq!(github.access_token.as_deref(), Some("secret"));
        assert_eq!(github.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_github_config_drops_empty_token() {
        let remote = RemoteConfig {
            access_token: Some(String::new()),
            ..RemoteConfig::default()
        };
        assert_eq!(github_config(&remote).access_token, None);
    }
}
