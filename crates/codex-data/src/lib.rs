//! Localized data access for Codex.
//!
//! This crate defines the read-only contract between page generation and
//! whatever holds the game data:
//!
//! - [`DataProvider`]: fetch one faction or all factions for a locale
//! - [`TermProvider`]: translate a term key for a locale
//! - [`FactionDto`] and friends: denormalized, locale-specific projections
//! - [`ProviderError`]: unified error with semantic kind and context
//! - [`MockProvider`] for testing (behind `mock` feature flag)
//!
//! A missing entity is not an error: [`DataProvider::faction`] returns
//! `Ok(None)`. Errors are reserved for a provider that cannot answer at all.
//!
//! # Example
//!
//! ```ignore
//! use codex_data::{DataProvider, ProviderError, TermProvider};
//!
//! fn banner(provider: &dyn DataProvider, terms: &dyn TermProvider) -> Result<(), ProviderError> {
//!     if let Some(faction) = provider.faction("arleon", "en")? {
//!         let label = terms.term("Common/Wielders", "en")?;
//!         println!("{}: {label}", faction.name);
//!     }
//!     Ok(())
//! }
//! ```

mod dto;
#[cfg(feature = "mock")]
mod mock;
mod provider;

pub use dto::{CommanderDto, FactionDto, SpriteSheetDto, UnitDto, UnitVariantDto};
#[cfg(feature = "mock")]
pub use mock::{MockProvider, faction_fixture, sprite_fixture};
pub use provider::{DataProvider, ProviderError, ProviderErrorKind, TermProvider};
