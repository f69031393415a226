//! Country-to-continent lookup table.
//!
//! The table is embedded in the binary, loaded once at startup, and injected
//! wherever the country universe is needed; it is never mutated afterwards.
//! Its keys define the set of countries a multi-country run processes.

use std::collections::BTreeMap;

use crate::error::Result;

/// Embedded table, lowercase country names keyed to continent names.
const CONTINENTS_JSON: &str = include_str!("../data/continents.json");

/// Read-only mapping from country name to continent.
///
/// Country names are normalized to title case on load, so lookups and the
/// enumerated universe use display-ready names ("united states" in the table
/// becomes "United States" everywhere else).
#[derive(Clone, Debug)]
pub struct ContinentMap {
    by_country: BTreeMap<String, String>,
}

impl ContinentMap {
    /// Load the embedded table.
    pub fn load() -> Result<Self> {
        Self::from_json(CONTINENTS_JSON)
    }

    /// Parse a table from raw JSON of the form `{"country": "continent"}`.
    ///
    /// Keys are title-cased; keys that normalize to the same name collapse
    /// into one entry.
    pub fn from_json(raw: &str) -> Result<Self> {
        let raw_map: BTreeMap<String, String> = serde_json::from_str(raw)?;
        let by_country = raw_map
            .into_iter()
            .map(|(country, continent)| (title_case(&country), continent))
            .collect();
        Ok(Self { by_country })
    }

    /// All countries in the table: title-cased, deduplicated, sorted.
    ///
    /// This is the universe a multi-country run iterates over.
    pub fn countries(&self) -> Vec<String> {
        self.by_country.keys().cloned().collect()
    }

    /// Continent for one country; the lookup normalizes case.
    pub fn continent_of(&self, country: &str) -> Option<&str> {
        self.by_country
            .get(&title_case(country))
            .map(String::as_str)
    }

    /// Number of countries in the table.
    pub fn len(&self) -> usize {
        self.by_country.len()
    }

    /// True when the table holds no countries.
    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }
}

/// Title-case a name: every alphabetic character following a non-alphabetic
/// one is uppercased and the rest are lowercased, so hyphens and apostrophes
/// start new words ("guinea-bissau" becomes "Guinea-Bissau").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
