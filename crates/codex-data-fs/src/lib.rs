//! JSON directory data provider for Codex.
//!
//! This crate provides [`FsProvider`], a filesystem-based implementation of
//! the [`DataProvider`] and [`TermProvider`] traits. Data lives in one
//! directory per locale:
//!
//! ```text
//! {root}/
//! ├── en/
//! │   ├── factions.json   # array of FactionDto, already localized
//! │   └── terms.json      # term key -> string (flat or nested objects)
//! └── de/
//!     └── ...
//! ```
//!
//! Each locale is parsed once on first use and kept in memory. A locale
//! without a directory is an empty data set, so lookups under it answer
//! "not found" instead of failing.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use codex_data::DataProvider;
//! use codex_data_fs::FsProvider;
//!
//! let provider = FsProvider::new(PathBuf::from("data")).with_fallback_locale("en");
//! for faction in provider.factions("en")? {
//!     println!("{}: {}", faction.faction_type, faction.name);
//! }
//! ```

mod bundle;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use codex_data::{DataProvider, FactionDto, ProviderError, ProviderErrorKind, TermProvider};

use bundle::LocaleBundle;

/// Backend identifier for error messages.
pub(crate) const BACKEND: &str = "Fs";

/// Filesystem-backed data provider.
///
/// # Thread Safety
///
/// Parsed locales are shared behind an `RwLock`; loading a locale is
/// serialized by a `Mutex` so concurrent first reads parse the files once.
#[derive(Debug)]
pub struct FsProvider {
    root: PathBuf,
    fallback_locale: Option<String>,
    bundles: RwLock<HashMap<String, Arc<LocaleBundle>>>,
    load_lock: Mutex<()>,
}

impl FsProvider {
    /// Create a provider rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            fallback_locale: None,
            bundles: RwLock::new(HashMap::new()),
            load_lock: Mutex::new(()),
        }
    }

    /// Translate missing terms from `locale` before falling back to the key.
    #[must_use]
    pub fn with_fallback_locale(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }

    /// Get the parsed bundle for a locale, loading it on first use.
    ///
    /// Load failures are returned and not remembered, so a fixed file is
    /// picked up on the next call.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    fn bundle(&self, locale: &str) -> Result<Arc<LocaleBundle>, ProviderError> {
        validate_locale(locale)?;

        // Fast path: already loaded
        if let Some(bundle) = self.bundles.read().unwrap().get(locale) {
            return Ok(Arc::clone(bundle));
        }

        // Slow path: serialize loading
        let _guard = self.load_lock.lock().unwrap();

        // Double-check after acquiring lock
        if let Some(bundle) = self.bundles.read().unwrap().get(locale) {
            return Ok(Arc::clone(bundle));
        }

        let bundle = Arc::new(LocaleBundle::load(&self.root.join(locale), locale)?);
        tracing::debug!(
            locale,
            factions = bundle.factions.len(),
            terms = bundle.terms.len(),
            "Loaded locale data"
        );
        self.bundles
            .write()
            .unwrap()
            .insert(locale.to_owned(), Arc::clone(&bundle));

        Ok(bundle)
    }
}

/// Reject locale tags that could escape the data root.
fn validate_locale(locale: &str) -> Result<(), ProviderError> {
    let valid = !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProviderError::new(ProviderErrorKind::InvalidKey)
            .with_backend(BACKEND)
            .with_locale(locale))
    }
}

impl DataProvider for FsProvider {
    fn faction(
        &self,
        faction_type: &str,
        locale: &str,
    ) -> Result<Option<FactionDto>, ProviderError> {
        Ok(self.bundle(locale)?.faction(faction_type).cloned())
    }

    fn factions(&self, locale: &str) -> Result<Vec<FactionDto>, ProviderError> {
        Ok(self.bundle(locale)?.factions.clone())
    }

    /// Stamp of the `factions.json` the served bundle was read from.
    fn revision(&self, locale: &str) -> Result<String, ProviderError> {
        Ok(self.bundle(locale)?.factions_stamp.clone())
    }
}

impl TermProvider for FsProvider {
    fn term(&self, key: &str, locale: &str) -> Result<String, ProviderError> {
        if let Some(value) = self.bundle(locale)?.terms.get(key) {
            return Ok(value.clone());
        }

        if let Some(fallback) = self.fallback_locale.as_deref()
            && fallback != locale
            && let Some(value) = self.bundle(fallback)?.terms.get(key)
        {
            tracing::debug!(key, locale, fallback, "Term missing, using fallback locale");
            return Ok(value.clone());
        }

        tracing::debug!(key, locale, "Term missing, using key");
        Ok(key.to_owned())
    }

    /// Stamps of the `terms.json` files consulted for `locale`.
    fn revision(&self, locale: &str) -> Result<String, ProviderError> {
        let mut revision = self.bundle(locale)?.terms_stamp.clone();
        if let Some(fallback) = self.fallback_locale.as_deref()
            && fallback != locale
        {
            revision.push('+');
            revision.push_str(&self.bundle(fallback)?.terms_stamp);
        }
        Ok(revision)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    const FACTIONS_EN: &str = r#"[
        {
            "type": "fire",
            "name": "Fire",
            "description": "Burns.",
            "bannerSprite": {"spriteSheet": "/b/fire.png", "x": 0, "y": 0, "width": 10, "height": 10},
            "symbolSprite": {"spriteSheet": "/s/fire.png", "x": 0, "y": 0, "width": 5, "height": 5}
        },
        {
            "type": "water",
            "name": "Water",
            "description": "Flows.",
            "bannerSprite": {"spriteSheet": "/b/water.png", "x": 0, "y": 0, "width": 10, "height": 10},
            "symbolSprite": null
        }
    ]"#;

    fn write_locale(root: &Path, locale: &str, factions: Option<&str>, terms: Option<&str>) {
        let dir = root.join(locale);
        fs::create_dir_all(&dir).unwrap();
        if let Some(factions) = factions {
            fs::write(dir.join("factions.json"), factions).unwrap();
        }
        if let Some(terms) = terms {
            fs::write(dir.join("terms.json"), terms).unwrap();
        }
    }

    fn provider_with_data() -> (tempfile::TempDir, FsProvider) {
        let temp_dir = tempfile::tempdir().unwrap();
        write_locale(
            temp_dir.path(),
            "en",
            Some(FACTIONS_EN),
            Some(r#"{"Common/Wielders": "Wielders", "Tutorial": {"CodexCategory": {"Units": "Units"}}}"#),
        );
        write_locale(temp_dir.path(), "de", None, Some(r#"{"Common/Wielders": "Anführer"}"#));
        let provider = FsProvider::new(temp_dir.path().to_path_buf()).with_fallback_locale("en");
        (temp_dir, provider)
    }

    #[test]
    fn test_factions_in_file_order() {
        let (_temp_dir, provider) = provider_with_data();

        let types: Vec<_> = provider
            .factions("en")
            .unwrap()
            .into_iter()
            .map(|f| f.faction_type)
            .collect();

        assert_eq!(types, vec!["fire", "water"]);
    }

    #[test]
    fn test_faction_lookup() {
        let (_temp_dir, provider) = provider_with_data();

        let fire = provider.faction("fire", "en").unwrap().unwrap();
        assert_eq!(fire.name, "Fire");
        assert!(fire.has_symbol());

        let water = provider.faction("water", "en").unwrap().unwrap();
        assert!(!water.has_symbol());
    }

    #[test]
    fn test_faction_missing_is_none() {
        let (_temp_dir, provider) = provider_with_data();

        assert!(provider.faction("lava", "en").unwrap().is_none());
    }

    #[test]
    fn test_unknown_locale_is_empty() {
        let (_temp_dir, provider) = provider_with_data();

        assert!(provider.factions("fr").unwrap().is_empty());
        assert!(provider.faction("fire", "fr").unwrap().is_none());
    }

    #[test]
    fn test_invalid_locale_rejected() {
        let (_temp_dir, provider) = provider_with_data();

        for locale in ["", "../en", "en/..", "e n"] {
            let err = provider.factions(locale).unwrap_err();
            assert_eq!(err.kind, ProviderErrorKind::InvalidKey, "locale {locale:?}");
        }
    }

    #[test]
    fn test_duplicate_faction_first_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let factions = r#"[
            {"type": "fire", "name": "First", "description": "",
             "bannerSprite": {"spriteSheet": "/b.png", "x": 0, "y": 0, "width": 1, "height": 1}},
            {"type": "fire", "name": "Second", "description": "",
             "bannerSprite": {"spriteSheet": "/b.png", "x": 0, "y": 0, "width": 1, "height": 1}}
        ]"#;
        write_locale(temp_dir.path(), "en", Some(factions), None);
        let provider = FsProvider::new(temp_dir.path().to_path_buf());

        assert_eq!(provider.factions("en").unwrap().len(), 1);
        assert_eq!(provider.faction("fire", "en").unwrap().unwrap().name, "First");
    }

    #[test]
    fn test_term_lookup_flat_and_nested() {
        let (_temp_dir, provider) = provider_with_data();

        assert_eq!(provider.term("Common/Wielders", "en").unwrap(), "Wielders");
        assert_eq!(
            provider.term("Tutorial/CodexCategory/Units", "en").unwrap(),
            "Units"
        );
    }

    #[test]
    fn test_term_uses_fallback_locale() {
        let (_temp_dir, provider) = provider_with_data();

        assert_eq!(provider.term("Common/Wielders", "de").unwrap(), "Anführer");
        assert_eq!(
            provider.term("Tutorial/CodexCategory/Units", "de").unwrap(),
            "Units"
        );
    }

    #[test]
    fn test_term_missing_everywhere_returns_key() {
        let (_temp_dir, provider) = provider_with_data();

        assert_eq!(provider.term("Common/Nope", "de").unwrap(), "Common/Nope");
    }

    #[test]
    fn test_term_without_fallback_returns_key() {
        let (temp_dir, _) = provider_with_data();
        let provider = FsProvider::new(temp_dir.path().to_path_buf());

        assert_eq!(
            provider.term("Tutorial/CodexCategory/Units", "de").unwrap(),
            "Tutorial/CodexCategory/Units"
        );
    }

    #[test]
    fn test_malformed_data_is_not_cached() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_locale(temp_dir.path(), "en", Some("[{"), None);
        let provider = FsProvider::new(temp_dir.path().to_path_buf());

        let err = provider.factions("en").unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Malformed);

        write_locale(temp_dir.path(), "en", Some(FACTIONS_EN), None);
        assert_eq!(provider.factions("en").unwrap().len(), 2);
    }

    #[test]
    fn test_revision_changes_with_data_file() {
        let (temp_dir, provider) = provider_with_data();
        let before = DataProvider::revision(&provider, "en").unwrap();
        assert_eq!(DataProvider::revision(&provider, "en").unwrap(), before);

        let edited = FACTIONS_EN.replace("\"Fire\"", "\"Fire Reforged\"");
        write_locale(temp_dir.path(), "en", Some(&edited), None);
        let reloaded = FsProvider::new(temp_dir.path().to_path_buf());

        assert_ne!(DataProvider::revision(&reloaded, "en").unwrap(), before);
    }

    #[test]
    fn test_revision_differs_between_data_roots() {
        let (_first_dir, first) = provider_with_data();
        let (_second_dir, second) = provider_with_data();

        assert_ne!(
            DataProvider::revision(&first, "en").unwrap(),
            DataProvider::revision(&second, "en").unwrap()
        );
    }

    #[test]
    fn test_term_revision_includes_fallback_locale() {
        let (temp_dir, provider) = provider_with_data();
        let de = TermProvider::revision(&provider, "de").unwrap();
        let en = TermProvider::revision(&provider, "en").unwrap();

        assert!(de.contains(&en), "{de:?} should contain {en:?}");

        write_locale(
            temp_dir.path(),
            "en",
            None,
            Some(r#"{"Common/Wielders": "Wielders of Old"}"#),
        );
        let reloaded = FsProvider::new(temp_dir.path().to_path_buf()).with_fallback_locale("en");

        assert_ne!(TermProvider::revision(&reloaded, "de").unwrap(), de);
    }

    #[test]
    fn test_loaded_locale_is_reused() {
        let (temp_dir, provider) = provider_with_data();
        assert_eq!(provider.factions("en").unwrap().len(), 2);

        // Later edits are not observed once a locale is loaded
        fs::remove_file(temp_dir.path().join("en/factions.json")).unwrap();
        assert_eq!(provider.factions("en").unwrap().len(), 2);
    }
}
