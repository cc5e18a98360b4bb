//! `docmirror sync` command implementation.

use clap::Args;

use super::{CommonArgs, open_docs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any application failed to
    /// sync.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config()?;
        let docs = open_docs(&config);

        output.info(&format!(
            "Syncing {} application(s) into {}",
            config.apps.len(),
            config.mirror.data_dir.display()
        ));

        let outcomes = docs.sync_now();
        docs.record_check();

        let mut failed = 0;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(report) => {
                    output.success(&format!(
                        "{}: {} tracked, {} updated",
                        outcome.app,
                        report.tracked,
                        report.updated.len()
                    ));
                    for name in &report.failed {
                        output.warning(&format!("  Failed to write {name}, will retry"));
                    }
                }
                Err(e) => {
                    failed += 1;
                    output.error(&format!("{}: {e}", outcome.app));
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Sync(format!(
                "{failed} of {} applications failed to sync",
                outcomes.len()
            )));
        }
        Ok(())
    }
}
