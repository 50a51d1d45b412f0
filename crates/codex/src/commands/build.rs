//! `codex build` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use codex_config::CliSettings;
use codex_site::StaticSiteBuilder;

use super::{ConfigArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Pre-render every configured locale, not only the default one.
    #[arg(long)]
    all_locales: bool,

    /// Worker threads (default: one per CPU).
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a provider fails, or the
    /// output cannot be written.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(CliSettings {
            output_dir: self.output_dir,
            prerender_all_locales: self.all_locales.then_some(true),
            ..CliSettings::default()
        })?;

        let locales = config.prerender_locales();
        output.info(&format!(
            "Data directory: {}",
            config.data_resolved.data_dir.display()
        ));
        output.info(&format!("Locales: {}", locales.join(", ")));

        let store = open_store(&config, version)?;
        let start = Instant::now();
        let report = StaticSiteBuilder::new(config.build_resolved.output_dir.clone(), locales)
            .with_threads(self.threads)
            .build(&store)?;

        for (locale, id) in &report.not_found {
            output.warning(&format!("No {locale} data for listed page {id}"));
        }
        output.success(&format!(
            "Wrote {} pages ({} generated) to {} in {:.2?}",
            report.written,
            report.generated,
            config.build_resolved.output_dir.display(),
            start.elapsed()
        ));
        Ok(())
    }
}
