//! On-demand page generation with single-flight semantics.
//!
//! [`PageStore`] serves pages of one [`StaticRoute`]. A page is generated at
//! most once per `(id, locale)`: concurrent requests for the same page wait
//! for the first one instead of calling the providers again, and every later
//! request gets the stored result.
//!
//! Only found pages are stored. A `NotFound` answer or a provider error is
//! returned to the caller and forgotten, so an entity added to the data later
//! becomes reachable and a transient outage does not stick.
//!
//! With a persistent [`PageCache`], a page is read back only if it was stored
//! under the route's current [`StaticRoute::revision`]. Pages generated from
//! older data are regenerated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use codex_data::ProviderError;

use crate::page_cache::{NullPageCache, PageCache};
use crate::route::{Fallback, PageProps, StaticPaths, StaticRoute};

/// Where a served page came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSource {
    /// Already held in memory.
    Memory,
    /// Read back from the persistent cache.
    Disk,
    /// Generated by this request.
    Generated,
}

/// A page held by the store.
#[derive(Debug)]
pub struct StoredPage<T> {
    /// Page payload, shared with every other request for the page.
    pub props: Arc<T>,
    /// Where this answer came from.
    pub source: PageSource,
}

type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

/// Serves the pages of a route, generating each one at most once.
///
/// # Thread Safety
///
/// The slot map lock is only held to look up or insert a slot, never while
/// generating. Generation holds the per-page slot lock, so requests for
/// different pages run in parallel and requests for the same page queue up.
/// A slot is removed from the map only by the holder of its lock.
pub struct PageStore<R: StaticRoute> {
    route: R,
    cache: Box<dyn PageCache>,
    slots: Mutex<HashMap<(String, String), Slot<R::Props>>>,
    paths: RwLock<Option<Arc<StaticPaths>>>,
    paths_lock: Mutex<()>,
}

impl<R: StaticRoute> PageStore<R> {
    /// Create a store without persistent caching.
    #[must_use]
    pub fn new(route: R) -> Self {
        Self::with_cache(route, Box::new(NullPageCache))
    }

    /// Create a store backed by a persistent page cache.
    #[must_use]
    pub fn with_cache(route: R, cache: Box<dyn PageCache>) -> Self {
        Self {
            route,
            cache,
            slots: Mutex::new(HashMap::new()),
            paths: RwLock::new(None),
            paths_lock: Mutex::new(()),
        }
    }

    /// The served route.
    #[must_use]
    pub fn route(&self) -> &R {
        &self.route
    }

    /// Pre-render set of the route, enumerated once and then reused.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if enumeration fails. Failures are not
    /// remembered; the next call enumerates again.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn static_paths(&self) -> Result<Arc<StaticPaths>, ProviderError> {
        if let Some(paths) = self.paths.read().unwrap().as_ref() {
            return Ok(Arc::clone(paths));
        }

        let _guard = self.paths_lock.lock().unwrap();
        if let Some(paths) = self.paths.read().unwrap().as_ref() {
            return Ok(Arc::clone(paths));
        }

        let paths = Arc::new(self.route.paths()?);
        *self.paths.write().unwrap() = Some(Arc::clone(&paths));
        Ok(paths)
    }

    /// Serve one page.
    ///
    /// Under [`Fallback::Reject`], ids outside the pre-render set are
    /// `NotFound` without consulting the providers.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if enumeration or generation fails.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn get(
        &self,
        id: &str,
        locale: &str,
    ) -> Result<PageProps<StoredPage<R::Props>>, ProviderError> {
        if !self.admits(id)? {
            tracing::debug!(route = self.route.name(), id, "Rejected unlisted page");
            return Ok(PageProps::NotFound);
        }

        let key = (id.to_owned(), locale.to_owned());
        loop {
            let slot = Arc::clone(self.slots.lock().unwrap().entry(key.clone()).or_default());
            let mut stored = slot.lock().unwrap();

            if let Some(props) = stored.as_ref() {
                return Ok(PageProps::Found(StoredPage {
                    props: Arc::clone(props),
                    source: PageSource::Memory,
                }));
            }

            // A failed generation retires its slot while waiters still hold
            // it. Only the slot in the map may be filled.
            if !self.is_current(&key, &slot) {
                continue;
            }

            match self.load(id, locale) {
                Ok(PageProps::Found((props, source))) => {
                    let props = Arc::new(props);
                    *stored = Some(Arc::clone(&props));
                    return Ok(PageProps::Found(StoredPage { props, source }));
                }
                other => {
                    // Drop the empty slot so unknown ids do not accumulate.
                    self.retire(&key, &slot);
                    drop(stored);

                    return match other {
                        Ok(_) => {
                            tracing::debug!(route = self.route.name(), locale, id, "Page not found");
                            Ok(PageProps::NotFound)
                        }
                        Err(e) => {
                            tracing::warn!(
                                route = self.route.name(),
                                locale,
                                id,
                                error = %e,
                                "Page generation failed"
                            );
                            Err(e)
                        }
                    };
                }
            }
        }
    }

    /// Number of pages held in memory.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    #[must_use]
    pub fn stored_pages(&self) -> usize {
        let slots: Vec<_> = self.slots.lock().unwrap().values().map(Arc::clone).collect();
        slots.iter().filter(|s| s.lock().unwrap().is_some()).count()
    }

    fn admits(&self, id: &str) -> Result<bool, ProviderError> {
        match self.route.fallback() {
            Fallback::Blocking => Ok(true),
            Fallback::Reject => Ok(self.static_paths()?.contains(id)),
        }
    }

    fn is_current(&self, key: &(String, String), slot: &Slot<R::Props>) -> bool {
        self.slots
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|s| Arc::ptr_eq(s, slot))
    }

    fn retire(&self, key: &(String, String), slot: &Slot<R::Props>) {
        let mut slots = self.slots.lock().unwrap();
        if slots.get(key).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            slots.remove(key);
        }
    }

    /// Read the page from the persistent cache, or generate it.
    fn load(
        &self,
        id: &str,
        locale: &str,
    ) -> Result<PageProps<(R::Props, PageSource)>, ProviderError> {
        let revision = self.route.revision(locale)?;

        if let Some(props) = self.read_cached(id, locale, &revision) {
            return Ok(PageProps::Found((props, PageSource::Disk)));
        }

        match self.route.props(id, locale)? {
            PageProps::Found(props) => {
                tracing::info!(route = self.route.name(), locale, id, "Generated page");
                self.write_cached(id, locale, &revision, &props);
                Ok(PageProps::Found((props, PageSource::Generated)))
            }
            PageProps::NotFound => Ok(PageProps::NotFound),
        }
    }

    fn read_cached(&self, id: &str, locale: &str, revision: &str) -> Option<R::Props> {
        let bytes = self.cache.get(self.route.name(), locale, id, revision)?;
        match serde_json::from_slice(&bytes) {
            Ok(props) => {
                tracing::debug!(route = self.route.name(), locale, id, "Page cache hit");
                Some(props)
            }
            Err(e) => {
                tracing::warn!(
                    route = self.route.name(),
                    locale,
                    id,
                    error = %e,
                    "Discarding unreadable cached page"
                );
                None
            }
        }
    }

    fn write_cached(&self, id: &str, locale: &str, revision: &str, props: &R::Props) {
        match serde_json::to_vec(props) {
            Ok(bytes) => self.cache.set(self.route.name(), locale, id, revision, &bytes),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize page for cache"),
        }
    }
}
