//! Data transfer objects.
//!
//! DTOs are denormalized and already localized: every display string is in
//! the locale the provider was asked for. Field names serialize in camelCase
//! so payloads match what the page components consume.

use serde::{Deserialize, Serialize};

/// Region of a sprite sheet image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteSheetDto {
    /// Image reference (e.g., "/sprites/factions.png").
    pub sprite_sheet: String,
    /// Left offset in pixels.
    pub x: u32,
    /// Top offset in pixels.
    pub y: u32,
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
}

impl SpriteSheetDto {
    /// True if the sprite does not reference an image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprite_sheet.trim().is_empty()
    }
}

/// A faction as shown on its codex page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionDto {
    /// Locale-independent identifier, also the route parameter.
    #[serde(rename = "type")]
    pub faction_type: String,
    /// Display name.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Banner shown at the top of the page.
    pub banner_sprite: SpriteSheetDto,
    /// Faction symbol. Not every faction ships one.
    #[serde(default)]
    pub symbol_sprite: Option<SpriteSheetDto>,
    /// Wielders leading this faction.
    #[serde(default)]
    pub commanders: Vec<CommanderDto>,
    /// Units recruitable by this faction.
    #[serde(default)]
    pub units: Vec<UnitDto>,
}

impl FactionDto {
    /// True if the faction carries a non-empty symbol sprite.
    #[must_use]
    pub fn has_symbol(&self) -> bool {
        self.symbol_sprite.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// A wielder (commander) belonging to a faction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommanderDto {
    /// Identifier used by the wielder route.
    #[serde(rename = "type")]
    pub commander_type: String,
    /// Display name.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Portrait sprite.
    #[serde(default)]
    pub portrait: Option<SpriteSheetDto>,
}

/// A unit with its base and optional upgraded variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDto {
    /// Base variant.
    pub vanilla: UnitVariantDto,
    /// Upgraded variant, if the unit has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded: Option<UnitVariantDto>,
}

/// One variant of a unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitVariantDto {
    /// Language key, also the unit route parameter.
    pub language_key: String,
    /// Display name.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Unit sprite.
    pub sprite: SpriteSheetDto,
}
