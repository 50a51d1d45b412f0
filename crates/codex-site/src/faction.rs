//! Faction pages (`factions/[type]`).

use std::collections::HashSet;
use std::sync::Arc;

use codex_data::{DataProvider, FactionDto, ProviderError, TermProvider};
use serde::{Deserialize, Serialize};

use crate::route::{EntityLink, PageHead, PageProps, RouteParams, StaticPaths, StaticRoute};

/// Term key for the wielders section heading.
pub const WIELDERS_TERM: &str = "Common/Wielders";

/// Term key for the units section heading.
pub const UNITS_TERM: &str = "Tutorial/CodexCategory/Units";

/// Site name used in page titles.
const SITE_NAME: &str = "SoC.gg";

/// Game name used in page descriptions.
const GAME_NAME: &str = "Songs of Conquest";

/// Translated labels a faction page needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionTerms {
    /// Wielders section heading.
    pub wielders: String,
    /// Units section heading.
    pub units: String,
}

/// Payload of a faction page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionPage {
    /// The faction, localized.
    pub faction: FactionDto,
    /// Section labels, localized.
    pub terms: FactionTerms,
}

impl FactionPage {
    /// Links to the wielder pages.
    ///
    /// Commanders without a portrait have nothing to click on and get no link.
    #[must_use]
    pub fn wielder_links(&self) -> Vec<EntityLink> {
        self.faction
            .commanders
            .iter()
            .filter(|c| c.portrait.is_some())
            .map(|c| EntityLink {
                href: format!("/wielders/{}", c.commander_type),
                name: c.name.clone(),
                description: c.description.clone(),
            })
            .collect()
    }

    /// Links to the unit pages, keyed by the base variant.
    #[must_use]
    pub fn unit_links(&self) -> Vec<EntityLink> {
        self.faction
            .units
            .iter()
            .map(|u| EntityLink {
                href: format!("/units/{}", u.vanilla.language_key),
                name: u.vanilla.name.clone(),
                description: u.vanilla.description.clone(),
            })
            .collect()
    }
}

/// Route serving one page per faction.
///
/// Only factions with a symbol sprite under the reference locale are
/// pre-rendered; every other faction is still reachable through
/// [`Fallback::Blocking`](crate::Fallback::Blocking).
pub struct FactionRoute {
    data: Arc<dyn DataProvider>,
    terms: Arc<dyn TermProvider>,
    reference_locale: String,
}

impl FactionRoute {
    /// Create the route.
    ///
    /// # Arguments
    ///
    /// * `data` - Faction lookups
    /// * `terms` - Term translations
    /// * `reference_locale` - Locale whose data decides which pages are pre-rendered
    #[must_use]
    pub fn new(
        data: Arc<dyn DataProvider>,
        terms: Arc<dyn TermProvider>,
        reference_locale: impl Into<String>,
    ) -> Self {
        Self {
            data,
            terms,
            reference_locale: reference_locale.into(),
        }
    }

    /// Locale used for path enumeration.
    #[must_use]
    pub fn reference_locale(&self) -> &str {
        &self.reference_locale
    }
}

impl StaticRoute for FactionRoute {
    type Props = FactionPage;

    fn name(&self) -> &'static str {
        "factions"
    }

    fn paths(&self) -> Result<StaticPaths, ProviderError> {
        let factions = self.data.factions(&self.reference_locale)?;
        let total = factions.len();

        let mut seen = HashSet::with_capacity(total);
        let paths: Vec<RouteParams> = factions
            .into_iter()
            .filter(FactionDto::has_symbol)
            .filter(|f| seen.insert(f.faction_type.clone()))
            .map(|f| RouteParams::new(f.faction_type))
            .collect();

        tracing::debug!(
            locale = %self.reference_locale,
            total,
            listed = paths.len(),
            "Enumerated faction paths"
        );

        Ok(StaticPaths {
            paths,
            fallback: self.fallback(),
        })
    }

    fn props(&self, id: &str, locale: &str) -> Result<PageProps<FactionPage>, ProviderError> {
        let Some(faction) = self.data.faction(id, locale)? else {
            return Ok(PageProps::NotFound);
        };

        let terms = FactionTerms {
            wielders: self.terms.term(WIELDERS_TERM, locale)?,
            units: self.terms.term(UNITS_TERM, locale)?,
        };

        Ok(PageProps::Found(FactionPage { faction, terms }))
    }

    fn revision(&self, locale: &str) -> Result<String, ProviderError> {
        Ok(format!(
            "{}|{}",
            self.data.revision(locale)?,
            self.terms.revision(locale)?
        ))
    }

    fn head(&self, props: &FactionPage) -> PageHead {
        let name = &props.faction.name;
        PageHead {
            title: format!("{name} - {SITE_NAME}"),
            description: format!("{name} faction details of {GAME_NAME}"),
        }
    }

    fn links(&self, props: &FactionPage) -> Vec<EntityLink> {
        let mut links = props.wielder_links();
        links.extend(props.unit_links());
        links
    }
}

#[cfg(test)]
mod tests {
    use codex_data::{
        CommanderDto, MockProvider, ProviderErrorKind, UnitDto, UnitVariantDto, faction_fixture,
        sprite_fixture,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::route::Fallback;

    fn with_symbol(mut faction: FactionDto) -> FactionDto {
        faction.symbol_sprite = Some(sprite_fixture(&format!(
            "/sprites/symbols/{}.png",
            faction.faction_type
        )));
        faction
    }

    fn route(provider: &Arc<MockProvider>) -> FactionRoute {
        FactionRoute::new(
            Arc::clone(provider) as Arc<dyn DataProvider>,
            Arc::clone(provider) as Arc<dyn TermProvider>,
            "en",
        )
    }

    fn elements_provider() -> Arc<MockProvider> {
        Arc::new(
            MockProvider::new()
                .with_faction("en", with_symbol(faction_fixture("fire", "Fire")))
                .with_faction("en", faction_fixture("water", "Water"))
                .with_term("en", WIELDERS_TERM, "Wielders")
                .with_term("en", UNITS_TERM, "Units"),
        )
    }

    fn ids(paths: &StaticPaths) -> Vec<&str> {
        paths.paths.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_paths_keep_only_factions_with_symbol() {
        let provider = elements_provider();

        let paths = route(&provider).paths().unwrap();

        assert_eq!(paths.paths, vec![RouteParams::new("fire")]);
        assert_eq!(paths.fallback, Fallback::Blocking);
    }

    #[test]
    fn test_paths_use_reference_locale_only() {
        let provider = Arc::new(
            MockProvider::new()
                .with_faction("en", with_symbol(faction_fixture("fire", "Fire")))
                .with_faction("de", with_symbol(faction_fixture("erde", "Erde"))),
        );

        let paths = route(&provider).paths().unwrap();

        assert_eq!(ids(&paths), vec!["fire"]);
    }

    #[test]
    fn test_paths_exclude_blank_symbol() {
        let mut blank = faction_fixture("void", "Void");
        blank.symbol_sprite = Some(sprite_fixture(""));
        let provider = Arc::new(MockProvider::new().with_faction("en", blank));

        assert!(route(&provider).paths().unwrap().paths.is_empty());
    }

    #[test]
    fn test_paths_list_each_identifier_once() {
        let provider = Arc::new(
            MockProvider::new()
                .with_faction("en", with_symbol(faction_fixture("fire", "Fire")))
                .with_faction("en", with_symbol(faction_fixture("earth", "Earth")))
                .with_faction("en", with_symbol(faction_fixture("fire", "Fire Again"))),
        );

        let paths = route(&provider).paths().unwrap();

        assert_eq!(ids(&paths), vec!["fire", "earth"]);
    }

    #[test]
    fn test_paths_empty_provider() {
        let provider = Arc::new(MockProvider::new());

        let paths = route(&provider).paths().unwrap();

        assert!(paths.paths.is_empty());
        assert_eq!(paths.fallback, Fallback::Blocking);
    }

    #[test]
    fn test_paths_propagate_provider_error() {
        let provider = Arc::new(MockProvider::new().failing(ProviderErrorKind::Unavailable));

        let err = route(&provider).paths().unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Unavailable);
    }

    #[test]
    fn test_props_found() {
        let provider = elements_provider();

        let props = route(&provider).props("fire", "en").unwrap();

        assert_eq!(
            props,
            PageProps::Found(FactionPage {
                faction: with_symbol(faction_fixture("fire", "Fire")),
                terms: FactionTerms {
                    wielders: "Wielders".to_owned(),
                    units: "Units".to_owned(),
                },
            })
        );
    }

    #[test]
    fn test_props_for_unlisted_faction() {
        let provider = elements_provider();

        let page = route(&provider).props("water", "en").unwrap().found().unwrap();

        assert_eq!(page.faction.name, "Water");
        assert!(page.faction.symbol_sprite.is_none());
    }

    #[test]
    fn test_props_unknown_is_not_found() {
        let provider = elements_provider();
        let route = route(&provider);

        assert_eq!(route.props("lava", "en").unwrap(), PageProps::NotFound);
        assert_eq!(route.props("lava", "de").unwrap(), PageProps::NotFound);
        assert_eq!(route.props("fire", "de").unwrap(), PageProps::NotFound);
    }

    #[test]
    fn test_props_not_found_skips_terms() {
        let provider = elements_provider();

        let _ = route(&provider).props("lava", "en").unwrap();

        assert_eq!(provider.faction_lookups(), 1);
        assert_eq!(provider.term_lookups(), 0);
    }

    #[test]
    fn test_props_idempotent() {
        let provider = elements_provider();
        let route = route(&provider);

        let first = route.props("fire", "en").unwrap();
        let second = route.props("fire", "en").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_props_terms_follow_locale() {
        let provider = Arc::new(
            MockProvider::new()
                .with_faction("de", faction_fixture("fire", "Feuer"))
                .with_term("de", WIELDERS_TERM, "Anführer")
                .with_term("de", UNITS_TERM, "Einheiten"),
        );

        let page = route(&provider).props("fire", "de").unwrap().found().unwrap();

        assert_eq!(page.faction.name, "Feuer");
        assert_eq!(page.terms.wielders, "Anführer");
        assert_eq!(page.terms.units, "Einheiten");
    }

    #[test]
    fn test_props_propagate_provider_error() {
        let provider = Arc::new(MockProvider::new().failing(ProviderErrorKind::Malformed));

        let err = route(&provider).props("fire", "en").unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Malformed);
    }

    #[test]
    fn test_revision_changes_with_faction_data() {
        let provider = elements_provider();
        let route = route(&provider);
        let before = route.revision("en").unwrap();

        assert_eq!(route.revision("en").unwrap(), before);

        provider.insert_faction("en", faction_fixture("lava", "Lava"));

        assert_ne!(route.revision("en").unwrap(), before);
    }

    #[test]
    fn test_head() {
        let provider = elements_provider();
        let route = route(&provider);
        let page = route.props("fire", "en").unwrap().found().unwrap();

        assert_eq!(
            route.head(&page),
            PageHead {
                title: "Fire - SoC.gg".to_owned(),
                description: "Fire faction details of Songs of Conquest".to_owned(),
            }
        );
    }

    #[test]
    fn test_links() {
        let mut faction = faction_fixture("fire", "Fire");
        faction.commanders = vec![
            CommanderDto {
                commander_type: "ember".to_owned(),
                name: "Ember".to_owned(),
                description: "Burns bright.".to_owned(),
                portrait: Some(sprite_fixture("/p/ember.png")),
            },
            CommanderDto {
                commander_type: "ash".to_owned(),
                name: "Ash".to_owned(),
                description: String::new(),
                portrait: None,
            },
        ];
        faction.units = vec![UnitDto {
            vanilla: UnitVariantDto {
                language_key: "Unit_Imp".to_owned(),
                name: "Imp".to_owned(),
                description: "Small.".to_owned(),
                sprite: sprite_fixture("/u/imp.png"),
            },
            upgraded: None,
        }];
        let page = FactionPage {
            faction,
            terms: FactionTerms {
                wielders: "Wielders".to_owned(),
                units: "Units".to_owned(),
            },
        };

        assert_eq!(
            page.wielder_links(),
            vec![EntityLink {
                href: "/wielders/ember".to_owned(),
                name: "Ember".to_owned(),
                description: "Burns bright.".to_owned(),
            }]
        );
        assert_eq!(page.unit_links()[0].href, "/units/Unit_Imp");
        assert_eq!(page.unit_links()[0].name, "Imp");

        let provider = Arc::new(MockProvider::new());
        let hrefs: Vec<String> = route(&provider)
            .links(&page)
            .into_iter()
            .map(|l| l.href)
            .collect();
        assert_eq!(hrefs, vec!["/wielders/ember", "/units/Unit_Imp"]);
    }

    #[test]
    fn test_page_serializes_for_components() {
        let provider = elements_provider();
        let page = route(&provider).props("fire", "en").unwrap().found().unwrap();

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["faction"]["type"], "fire");
        assert_eq!(json["terms"]["wielders"], "Wielders");
        assert_eq!(json["terms"]["units"], "Units");
    }
}
