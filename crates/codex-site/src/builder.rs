//! Static pre-rendering of a route.
//!
//! [`StaticSiteBuilder`] resolves every enumerated page of a route for every
//! requested locale, in parallel, and writes one JSON document per page:
//!
//! ```text
//! {output_dir}/
//! +-- paths/{route}.json                # StaticPaths of the route
//! +-- {locale}/{route}/{id}.json        # PageDocument per page
//! ```
//!
//! Pages are resolved through a [`PageStore`], so a build warms the same
//! store that later serves on-demand requests.

use std::fs;
use std::path::{Path, PathBuf};

use codex_data::ProviderError;
use rayon::prelude::*;
use serde::Serialize;

use crate::page_cache::path_segment;
use crate::page_store::{PageSource, PageStore};
use crate::route::{EntityLink, PageHead, PageProps, StaticRoute};

/// Error returned by the static site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Document written for one page.
#[derive(Debug, Serialize)]
pub struct PageDocument<'a, T> {
    /// Route name.
    pub route: &'static str,
    /// Page locale.
    pub locale: &'a str,
    /// Entity identifier.
    pub id: &'a str,
    /// Document head.
    pub head: PageHead,
    /// Links to related pages.
    pub links: Vec<EntityLink>,
    /// Resolved payload.
    pub props: &'a T,
}

impl<'a, T> PageDocument<'a, T> {
    /// Assemble the document for a resolved page.
    pub fn new<R>(route: &R, locale: &'a str, id: &'a str, props: &'a T) -> Self
    where
        R: StaticRoute<Props = T>,
    {
        Self {
            route: route.name(),
            locale,
            id,
            head: route.head(props),
            links: route.links(props),
            props,
        }
    }
}

/// Summary of a build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written to the output directory.
    pub written: usize,
    /// Written pages that had to be generated.
    pub generated: usize,
    /// Listed pages with no entity under a locale.
    pub not_found: Vec<(String, String)>,
}

enum Outcome {
    Written(PageSource),
    NotFound(String, String),
}

/// Pre-renders the listed pages of a route.
#[derive(Clone, Debug)]
pub struct StaticSiteBuilder {
    output_dir: PathBuf,
    locales: Vec<String>,
    threads: usize,
}

impl StaticSiteBuilder {
    /// Create a builder.
    ///
    /// # Arguments
    ///
    /// * `output_dir` - Directory receiving the documents
    /// * `locales` - Locales to pre-render every listed page in
    #[must_use]
    pub fn new(output_dir: PathBuf, locales: Vec<String>) -> Self {
        Self {
            output_dir,
            locales,
            threads: 0,
        }
    }

    /// Limit the worker threads (0 uses one per CPU).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Build every listed page of the store's route.
    ///
    /// Stops at the first provider or I/O error. Pages already written stay
    /// on disk.
    pub fn build<R: StaticRoute>(&self, store: &PageStore<R>) -> Result<BuildReport, BuildError> {
        let route = store.route();
        let paths = store.static_paths()?;

        let paths_file = self
            .output_dir
            .join("paths")
            .join(format!("{}.json", route.name()));
        write_json(&paths_file, paths.as_ref())?;

        let jobs: Vec<(&str, &str)> = self
            .locales
            .iter()
            .flat_map(|locale| paths.paths.iter().map(move |p| (locale.as_str(), p.id.as_str())))
            .collect();

        tracing::info!(
            route = route.name(),
            locales = self.locales.len(),
            pages = jobs.len(),
            "Building static pages"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;

        let outcomes: Vec<Outcome> = pool.install(|| {
            jobs.par_iter()
                .map(|&(locale, id)| self.build_page(store, locale, id))
                .collect::<Result<Vec<_>, BuildError>>()
        })?;

        let mut report = BuildReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Written(source) => {
                    report.written += 1;
                    if source == PageSource::Generated {
                        report.generated += 1;
                    }
                }
                Outcome::NotFound(locale, id) => report.not_found.push((locale, id)),
            }
        }

        tracing::info!(
            route = route.name(),
            written = report.written,
            generated = report.generated,
            not_found = report.not_found.len(),
            "Build finished"
        );
        Ok(report)
    }

    fn build_page<R: StaticRoute>(
        &self,
        store: &PageStore<R>,
        locale: &str,
        id: &str,
    ) -> Result<Outcome, BuildError> {
        let page = match store.get(id, locale)? {
            PageProps::Found(page) => page,
            PageProps::NotFound => {
                tracing::warn!(locale, id, "Listed page has no entity in this locale");
                return Ok(Outcome::NotFound(locale.to_owned(), id.to_owned()));
            }
        };

        let route = store.route();
        let document = PageDocument::new(route, locale, id, page.props.as_ref());
        let path = self
            .output_dir
            .join(path_segment(locale))
            .join(route.name())
            .join(format!("{}.json", path_segment(id)));
        write_json(&path, &document)?;

        Ok(Outcome::Written(page.source))
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), BuildError> {
    let io_err = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json).map_err(io_err)
}
