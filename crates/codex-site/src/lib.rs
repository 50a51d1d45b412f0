//! Static page generation for Codex.
//!
//! This crate provides:
//! - [`StaticRoute`]: contract of a parameterized page family
//! - [`FactionRoute`]: the `factions/[type]` pages
//! - [`PageStore`]: generate-on-miss, store-forever page serving
//! - [`StaticSiteBuilder`]: parallel pre-rendering of the listed pages
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use codex_data_fs::FsProvider;
//! use codex_site::{FactionRoute, PageStore, StaticSiteBuilder};
//!
//! let provider = Arc::new(FsProvider::new(PathBuf::from("data")));
//! let store = PageStore::new(FactionRoute::new(provider.clone(), provider, "en"));
//!
//! // Pre-render the listed pages
//! StaticSiteBuilder::new(PathBuf::from("out"), vec!["en".to_owned()]).build(&store)?;
//!
//! // Serve an unlisted page on demand
//! let page = store.get("water", "de")?;
//! ```

mod builder;
mod faction;
mod page_cache;
mod page_store;
mod route;

pub use builder::{BuildError, BuildReport, PageDocument, StaticSiteBuilder};
pub use faction::{FactionPage, FactionRoute, FactionTerms, UNITS_TERM, WIELDERS_TERM};
pub use page_cache::{FilePageCache, NullPageCache, PageCache};
pub use page_store::{PageSource, PageStore, StoredPage};
pub use route::{
    EntityLink, Fallback, PageHead, PageProps, RouteParams, StaticPaths, StaticRoute,
};
