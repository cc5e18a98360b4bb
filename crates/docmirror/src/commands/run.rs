//! `docmirror run` command implementation.

use clap::Args;

use super::{CommonArgs, open_docs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the run command.
#[derive(Args)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl RunArgs {
    /// Execute the run command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the Ctrl-C handler cannot
    /// be installed.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config()?;

        output.info(&format!(
            "Data directory: {}",
            config.mirror.data_dir.display()
        ));
        output.info(&format!(
            "Applications: {}",
            config
                .apps
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        let docs = open_docs(&config);
        let scheduler = docs.initialize();

        match &scheduler {
            Some(_) => output.info(&format!(
                "Syncing every {}s",
                config.mirror.interval_secs
            )),
            None => output.warning("Dev mode: documents are read from disk on every request"),
        }

        let cached: usize = docs
            .cache()
            .applications()
            .iter()
            .filter_map(|app| docs.cache().snapshot(app))
            .map(|snapshot| snapshot.len())
            .sum();
        output.success(&format!("Loaded {cached} documents from the local mirror"));

        tokio::signal::ctrl_c().await?;
        output.info("Shutdown signal received, stopping...");

        if let Some(handle) = scheduler {
            handle.shutdown().await;
        }
        Ok(())
    }
}
