//! Static route contract.
//!
//! A [`StaticRoute`] is one parameterized page family (e.g. `factions/[type]`).
//! It answers two questions:
//!
//! - which parameters to pre-render ([`StaticRoute::paths`])
//! - what a page contains for one parameter and locale ([`StaticRoute::props`])
//!
//! The locale is never part of [`RouteParams`]; it is a separate dimension
//! resolved by whoever serves the page.

use codex_data::ProviderError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parameters of one page within a route.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteParams {
    /// Entity identifier (e.g. a faction type).
    pub id: String,
}

impl RouteParams {
    /// Create params for an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// How requests outside the pre-rendered set are answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Generate on first request, then serve the stored page forever.
    #[default]
    Blocking,
    /// Answer "not found" without generating.
    Reject,
}

/// Pages a route wants pre-rendered, plus its policy for everything else.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPaths {
    /// Parameters to pre-render, without duplicates.
    pub paths: Vec<RouteParams>,
    /// Policy for parameters outside `paths`.
    pub fallback: Fallback,
}

impl StaticPaths {
    /// True if `id` is in the pre-rendered set.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.paths.iter().any(|p| p.id == id)
    }
}

/// Result of resolving one page.
///
/// `NotFound` is an ordinary answer, not an error: the serving layer turns
/// it into a "page does not exist" response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageProps<T> {
    /// The page exists.
    Found(T),
    /// No entity for this parameter and locale.
    NotFound,
}

impl<T> PageProps<T> {
    /// True for [`PageProps::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Extract the payload, if found.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(props) => Some(props),
            Self::NotFound => None,
        }
    }
}

/// Document head for a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHead {
    /// `<title>` text.
    pub title: String,
    /// `<meta name="description">` text.
    pub description: String,
}

/// Link from a page to a related entity's page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLink {
    /// Target URL path.
    pub href: String,
    /// Display name for the popover.
    pub name: String,
    /// Description for the popover.
    pub description: String,
}

/// A family of statically generated pages.
///
/// Implementations must be side-effect free: `props` is only a read over the
/// providers, and the same inputs give structurally equal results while the
/// data is unchanged.
pub trait StaticRoute: Send + Sync {
    /// Page payload handed to the presentation layer.
    type Props: Serialize + DeserializeOwned + Send + Sync;

    /// Route name, also the first output path segment (e.g. `"factions"`).
    fn name(&self) -> &'static str;

    /// Policy for ids outside the pre-render set.
    fn fallback(&self) -> Fallback {
        Fallback::Blocking
    }

    /// Enumerate the pages to pre-render.
    ///
    /// The returned `fallback` must equal [`StaticRoute::fallback`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the data provider cannot answer.
    fn paths(&self) -> Result<StaticPaths, ProviderError>;

    /// Resolve the payload for one page.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if a provider cannot answer. A missing
    /// entity is `Ok(PageProps::NotFound)`.
    fn props(&self, id: &str, locale: &str) -> Result<PageProps<Self::Props>, ProviderError>;

    /// Fingerprint of everything `props` reads for `locale`.
    ///
    /// Persistent caches only reuse a page stored under the same revision.
    /// Routes without external inputs keep the constant default.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if a provider cannot fingerprint its data.
    fn revision(&self, _locale: &str) -> Result<String, ProviderError> {
        Ok(String::new())
    }

    /// Document head for a resolved payload.
    fn head(&self, props: &Self::Props) -> PageHead;

    /// Links to related pages shown alongside the payload.
    fn links(&self, _props: &Self::Props) -> Vec<EntityLink> {
        Vec::new()
    }
}
