//! Mock provider implementation for testing.
//!
//! Provides [`MockProvider`] for unit testing without a data directory, plus
//! small fixture builders for DTOs.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::dto::{FactionDto, SpriteSheetDto};
use crate::provider::{DataProvider, ProviderError, ProviderErrorKind, TermProvider};

/// Build a sprite pointing at `sheet`.
#[must_use]
pub fn sprite_fixture(sheet: &str) -> SpriteSheetDto {
    SpriteSheetDto {
        sprite_sheet: sheet.to_owned(),
        x: 0,
        y: 0,
        width: 64,
        height: 64,
    }
}

/// Build a faction with a banner, no symbol, no commanders and no units.
#[must_use]
pub fn faction_fixture(faction_type: &str, name: &str) -> FactionDto {
    FactionDto {
        faction_type: faction_type.to_owned(),
        name: name.to_owned(),
        description: format!("{name} description"),
        banner_sprite: sprite_fixture(&format!("/sprites/banners/{faction_type}.png")),
        symbol_sprite: None,
        commanders: Vec::new(),
        units: Vec::new(),
    }
}

/// Mock provider for testing.
///
/// Stores factions and terms in memory per locale. Use the builder methods
/// to configure the mock with test data, and the lookup counters to assert
/// how often page generation hit the provider.
///
/// # Example
///
/// ```ignore
/// use codex_data::{DataProvider, MockProvider, faction_fixture};
///
/// let provider = MockProvider::new()
///     .with_faction("en", faction_fixture("fire", "Fire"))
///     .with_term("en", "Common/Wielders", "Wielders");
///
/// assert!(provider.faction("fire", "en").unwrap().is_some());
/// assert_eq!(provider.faction_lookups(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockProvider {
    factions: RwLock<HashMap<String, Vec<FactionDto>>>,
    terms: RwLock<HashMap<(String, String), String>>,
    failure: RwLock<Option<ProviderErrorKind>>,
    faction_lookups: AtomicUsize,
    listings: AtomicUsize,
    term_lookups: AtomicUsize,
    mutations: AtomicUsize,
}

impl MockProvider {
    /// Create a new empty mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a faction under `locale`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_faction(self, locale: impl Into<String>, faction: FactionDto) -> Self {
        self.insert_faction(locale, faction);
        self
    }

    /// Add a translated term under `locale`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_term(
        self,
        locale: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.terms
            .write()
            .unwrap()
            .insert((locale.into(), key.into()), value.into());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self
    }

    /// Make every subsequent call fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing(self, kind: ProviderErrorKind) -> Self {
        *self.failure.write().unwrap() = Some(kind);
        self
    }

    /// Add a faction after construction (simulates data arriving later).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert_faction(&self, locale: impl Into<String>, faction: FactionDto) {
        self.factions
            .write()
            .unwrap()
            .entry(locale.into())
            .or_default()
            .push(faction);
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of [`DataProvider::faction`] calls so far.
    pub fn faction_lookups(&self) -> usize {
        self.faction_lookups.load(Ordering::SeqCst)
    }

    /// Number of [`DataProvider::factions`] calls so far.
    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    /// Number of [`TermProvider::term`] calls so far.
    pub fn term_lookups(&self) -> usize {
        self.term_lookups.load(Ordering::SeqCst)
    }

    /// Revision shared by both provider traits; bumped by every data change.
    fn current_revision(&self) -> String {
        format!("mock-{}", self.mutations.load(Ordering::SeqCst))
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match *self.failure.read().unwrap() {
            Some(kind) => Err(ProviderError::new(kind).with_backend("Mock")),
            None => Ok(()),
        }
    }
}

impl DataProvider for MockProvider {
    fn faction(
        &self,
        faction_type: &str,
        locale: &str,
    ) -> Result<Option<FactionDto>, ProviderError> {
        self.faction_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.factions.read().unwrap().get(locale).and_then(|list| {
            list.iter()
                .find(|f| f.faction_type == faction_type)
                .cloned()
        }))
    }

    fn factions(&self, locale: &str) -> Result<Vec<FactionDto>, ProviderError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .factions
            .read()
            .unwrap()
            .get(locale)
            .cloned()
            .unwrap_or_default())
    }

    // Never fails, so pages cached on disk stay readable while lookups fail.
    fn revision(&self, _locale: &str) -> Result<String, ProviderError> {
        Ok(self.current_revision())
    }
}

impl TermProvider for MockProvider {
    fn term(&self, key: &str, locale: &str) -> Result<String, ProviderError> {
        self.term_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        // Untranslated terms fall back to the key itself
        Ok(self
            .terms
            .read()
            .unwrap()
            .get(&(locale.to_owned(), key.to_owned()))
            .cloned()
            .unwrap_or_else(|| key.to_owned()))
    }

    fn revision(&self, _locale: &str) -> Result<String, ProviderError> {
        Ok(self.current_revision())
    }
}
