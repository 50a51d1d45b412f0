//! `codex page` command implementation.

use clap::Args;
use codex_config::CliSettings;
use codex_site::{PageDocument, PageProps, StaticRoute};

use super::{ConfigArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Faction type to resolve (e.g. "rana").
    id: String,

    /// Locale to resolve in (default: the configured default locale).
    #[arg(short, long)]
    locale: Option<String>,
}

impl PageArgs {
    /// Execute the page command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotFound`] if no faction has this id in the
    /// locale, or another error if configuration or a provider fails.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(CliSettings::default())?;
        let locale = self
            .locale
            .unwrap_or_else(|| config.i18n.default_locale.clone());

        let store = open_store(&config, version)?;
        let route = store.route();
        let page = match store.get(&self.id, &locale)? {
            PageProps::Found(page) => page,
            PageProps::NotFound => {
                return Err(CliError::NotFound(format!(
                    "/{locale}/{}/{}",
                    route.name(),
                    self.id
                )));
            }
        };

        let document = PageDocument::new(route, &locale, &self.id, page.props.as_ref());
        output.data(&serde_json::to_string_pretty(&document)?);
        Ok(())
    }
}
