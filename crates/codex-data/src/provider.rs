//! Provider traits and error types.
//!
//! Provides the [`DataProvider`] and [`TermProvider`] traits that page
//! generation reads through, along with [`ProviderError`] for unified error
//! handling across backends.
//!
//! # Locale Convention
//!
//! Locales are plain tags (e.g., `"en"`, `"de"`, `"zh-CN"`). Providers decide
//! how a tag maps onto their storage; callers never build paths from it.

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderErrorKind {
    /// Key contains characters the backend refuses to look up.
    InvalidKey,
    /// Stored data could not be decoded.
    Malformed,
    /// Backend cannot be reached or read.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Provider error with semantic kind, lookup context and backend-specific source.
#[derive(Debug)]
pub struct ProviderError {
    /// Semantic error category.
    pub kind: ProviderErrorKind,
    /// Locale being read (if applicable).
    pub locale: Option<String>,
    /// Entity or term key being read (if applicable).
    pub key: Option<String>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Create a new provider error.
    #[must_use]
    pub fn new(kind: ProviderErrorKind) -> Self {
        Self {
            kind,
            locale: None,
            key: None,
            backend: None,
            source: None,
        }
    }

    /// Attach locale context.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Attach key context.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a provider error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::InvalidData => ProviderErrorKind::Malformed,
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::PermissionDenied
            | std::io::ErrorKind::TimedOut => ProviderErrorKind::Unavailable,
            _ => ProviderErrorKind::Other,
        };
        Self::new(kind).with_source(err)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (locale: en, key: arleon)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            ProviderErrorKind::InvalidKey => "Invalid key",
            ProviderErrorKind::Malformed => "Malformed data",
            ProviderErrorKind::Unavailable => "Unavailable",
            ProviderErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        match (&self.locale, &self.key) {
            (Some(locale), Some(key)) => write!(f, " (locale: {locale}, key: {key})")?,
            (Some(locale), None) => write!(f, " (locale: {locale})")?,
            (None, Some(key)) => write!(f, " (key: {key})")?,
            (None, None) => {}
        }

        Ok(())
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Localized entity lookups.
///
/// Implementations must be deterministic for an unchanged data set: the same
/// `(key, locale)` yields structurally equal DTOs on every call.
pub trait DataProvider: Send + Sync {
    /// Fetch one faction by its identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(dto))` - the faction exists under `locale`
    /// - `Ok(None)` - no faction with this identifier exists under `locale`
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the backend cannot answer.
    fn faction(
        &self,
        faction_type: &str,
        locale: &str,
    ) -> Result<Option<crate::FactionDto>, ProviderError>;

    /// Fetch every faction under `locale`, in provider order.
    ///
    /// An empty data set yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the backend cannot answer.
    fn factions(&self, locale: &str) -> Result<Vec<crate::FactionDto>, ProviderError>;

    /// Fingerprint of the data behind `locale`.
    ///
    /// Changes whenever lookups under `locale` may answer differently.
    /// Persistent page caches store it next to each page and discard pages
    /// stamped with another revision.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the backend cannot answer.
    fn revision(&self, locale: &str) -> Result<String, ProviderError>;
}

/// Translated display strings.
pub trait TermProvider: Send + Sync {
    /// Translate a slash-separated term key (e.g., `"Common/Wielders"`).
    ///
    /// Missing translations are the backend's concern; the returned string
    /// is always displayable.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the backend cannot answer.
    fn term(&self, key: &str, locale: &str) -> Result<String, ProviderError>;

    /// Fingerprint of the translations served for `locale`, fallbacks included.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the backend cannot answer.
    fn revision(&self, locale: &str) -> Result<String, ProviderError>;
}
