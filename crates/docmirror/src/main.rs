//! docmirror CLI - Documentation mirror and render cache.
//!
//! Provides commands for:
//! - `run`: Keep the mirror in sync on a schedule until interrupted
//! - `sync`: Run one sync cycle now
//! - `show`: Print one rendered document

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RunArgs, ShowArgs, SyncArgs};
use error::CliError;
use output::Output;

/// docmirror - Documentation mirror and render cache.
#[derive(Parser)]
#[command(name = "docmirror", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the document cache, syncing on a schedule until Ctrl-C.
    Run(RunArgs),
    /// Run one sync cycle and record the check time.
    Sync(SyncArgs),
    /// Print a rendered document.
    Show(ShowArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Run(args) => args.common.verbose,
            Self::Sync(args) => args.common.verbose,
            Self::Show(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::from)
            .and_then(|rt| rt.block_on(args.execute())),
        Commands::Sync(args) => args.execute(),
        Commands::Show(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show_with_overrides() {
        let cli = Cli::try_parse_from([
            "docmirror", "show", "gitea", "intro/setup", "--lang", "zh-CN", "--dev", "-v",
        ])
        .unwrap();

        let Commands::Show(args) = &cli.command else {
            panic!("expected show command");
        };
        assert!(cli.command.verbose());
        assert!(args.common.verbose);
    }

    #[test]
    fn test_parse_sync_requires_no_arguments() {
        let cli = Cli::try_parse_from(["docmirror", "sync", "--data-dir", "/srv/docs"]).unwrap();
        assert!(matches!(cli.command, Commands::Sync(_)));
        assert!(!cli.command.verbose());
    }

    #[test]
    fn test_show_requires_app_and_name() {
        assert!(Cli::try_parse_from(["docmirror", "show", "gitea"]).is_err());
    }
}
