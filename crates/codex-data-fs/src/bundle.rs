//! Per-locale data bundle loading.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use codex_data::{FactionDto, ProviderError, ProviderErrorKind};
use serde_json::Value;

use crate::BACKEND;

/// Factions file name inside a locale directory.
pub(crate) const FACTIONS_FILE: &str = "factions.json";

/// Terms file name inside a locale directory.
pub(crate) const TERMS_FILE: &str = "terms.json";

/// Parsed contents of one locale directory.
#[derive(Debug, Default)]
pub(crate) struct LocaleBundle {
    /// Factions in file order, duplicates removed (first wins).
    pub factions: Vec<FactionDto>,
    /// Faction type -> index into `factions`.
    index: HashMap<String, usize>,
    /// Term key -> translated string.
    pub terms: HashMap<String, String>,
    /// Stamp of the factions file this bundle was read from.
    pub factions_stamp: String,
    /// Stamp of the terms file this bundle was read from.
    pub terms_stamp: String,
}

impl LocaleBundle {
    /// Load a locale directory.
    ///
    /// A missing directory or missing file yields an empty part rather than
    /// an error: absent data is answered as "not found" by the provider.
    pub(crate) fn load(dir: &Path, locale: &str) -> Result<Self, ProviderError> {
        // Stamp before reading: a file rewritten in between gets a fresher
        // stamp on the next load, never a stale one.
        let factions_stamp = file_stamp(&dir.join(FACTIONS_FILE));
        let terms_stamp = file_stamp(&dir.join(TERMS_FILE));

        let factions: Vec<FactionDto> =
            read_json(&dir.join(FACTIONS_FILE), locale, FACTIONS_FILE)?.unwrap_or_default();
        let terms = match read_json::<Value>(&dir.join(TERMS_FILE), locale, TERMS_FILE)? {
            Some(value) => flatten_terms(value),
            None => HashMap::new(),
        };

        let mut bundle = Self {
            factions: Vec::with_capacity(factions.len()),
            index: HashMap::with_capacity(factions.len()),
            terms,
            factions_stamp,
            terms_stamp,
        };
        for faction in factions {
            if bundle.index.contains_key(&faction.faction_type) {
                tracing::warn!(
                    locale,
                    faction = %faction.faction_type,
                    "Duplicate faction in data, keeping first"
                );
                continue;
            }
            bundle
                .index
                .insert(faction.faction_type.clone(), bundle.factions.len());
            bundle.factions.push(faction);
        }

        Ok(bundle)
    }

    /// Look up a faction by type.
    pub(crate) fn faction(&self, faction_type: &str) -> Option<&FactionDto> {
        self.index.get(faction_type).map(|&i| &self.factions[i])
    }
}

/// Identify a file version by path, size and modification time.
fn file_stamp(path: &Path) -> String {
    match fs::metadata(path) {
        Ok(meta) => {
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_nanos());
            format!("{}:{}:{mtime}", path.display(), meta.len())
        }
        Err(_) => format!("{}:absent", path.display()),
    }
}

/// Read and decode a JSON file. `Ok(None)` if the file does not exist.
fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    locale: &str,
    key: &str,
) -> Result<Option<T>, ProviderError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ProviderError::io(e)
                .with_backend(BACKEND)
                .with_locale(locale)
                .with_key(key));
        }
    };

    serde_json::from_str(&content).map(Some).map_err(|e| {
        ProviderError::new(ProviderErrorKind::Malformed)
            .with_backend(BACKEND)
            .with_locale(locale)
            .with_key(key)
            .with_source(e)
    })
}

/// Flatten a terms document into slash-separated keys.
///
/// Both layouts are accepted and can be mixed:
///
/// ```text
/// {"Common/Wielders": "Wielders"}
/// {"Common": {"Wielders": "Wielders"}}
/// ```
///
/// Non-string leaves are ignored.
fn flatten_terms(value: Value) -> HashMap<String, String> {
    fn walk(prefix: &str, value: Value, out: &mut HashMap<String, String>) {
        match value {
            Value::String(s) => {
                out.insert(prefix.to_owned(), s);
            }
            Value::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k
                    } else {
                        format!("{prefix}/{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    let mut out = HashMap::new();
    walk("", value, &mut out);
    out
}
