//! `docmirror show` command implementation.

use clap::Args;

use super::{CommonArgs, open_docs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Application name.
    app: String,

    /// Document name relative to the language directory (e.g. "intro/setup").
    name: String,

    /// Display language.
    #[arg(short, long, default_value = "en-US")]
    lang: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ShowArgs {
    /// Execute the show command.
    ///
    /// Renders from the local mirror only; nothing is fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, or the application or
    /// document is unknown.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config()?;
        let app = config
            .app(&self.app)
            .ok_or_else(|| CliError::NotFound(format!("Unknown application: {}", self.app)))?;

        let docs = open_docs(&config);
        if !docs.mode().is_dev() {
            docs.rebuild(app);
        }

        let doc = docs
            .get_document(&self.app, &self.name, &self.lang)
            .ok_or_else(|| {
                CliError::NotFound(format!(
                    "Document not found: {}/{}/{}",
                    self.app, self.lang, self.name
                ))
            })?;

        if let Some(title) = &doc.title {
            output.highlight(title);
        }
        output.content(&doc.body);
        Ok(())
    }
}
