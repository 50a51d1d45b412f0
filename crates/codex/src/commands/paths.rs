//! `codex paths` command implementation.

use clap::Args;
use codex_config::CliSettings;

use super::{ConfigArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the paths command.
#[derive(Args)]
pub(crate) struct PathsArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print the full path set as JSON instead of one id per line.
    #[arg(long)]
    json: bool,
}

impl PathsArgs {
    /// Execute the paths command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the data cannot be listed.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(CliSettings::default())?;
        let store = open_store(&config, version)?;

        let paths = store.static_paths()?;
        if self.json {
            output.data(&serde_json::to_string_pretty(paths.as_ref())?);
            return Ok(());
        }

        for params in &paths.paths {
            output.data(&params.id);
        }
        output.info(&format!(
            "{} pages listed under locale {}",
            paths.paths.len(),
            store.route().reference_locale()
        ));
        Ok(())
    }
}
