//! Airport resolution: fuzzy suggestions and free text to IATA code.
//!
//! Candidates are scored by summing the weights of every rule in a
//! `ScoringRule` table that matches, plus a bonus for metro-alias membership.
//! Results are ordered by score, then city, then name.

use skyscout_catalog::AirportCatalog;
use skyscout_features::{compact_key, fold_text};
use skyscout_model::{Airport, MatchKeys};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single additive scoring rule.
#[derive(Clone, Copy)]
pub struct ScoringRule {
    /// Rule name for debugging
    pub name: &'static str,
    /// Points added when the rule matches
    pub weight: i32,
    /// Predicate over the airport's match keys and the folded query
    pub applies: fn(&MatchKeys, &str) -> bool,
}

impl fmt::Debug for ScoringRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringRule")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// The default rule table. Every matching rule contributes.
pub fn default_rules() -> Vec<ScoringRule> {
    vec![
        ScoringRule {
            name: "code_exact",
            weight: 200,
            applies: |k, q| k.code == q,
        },
        ScoringRule {
            name: "city_or_name_exact",
            weight: 160,
            applies: |k, q| k.city == q || k.name == q,
        },
        ScoringRule {
            name: "city_prefix",
            weight: 120,
            applies: |k, q| k.city.starts_with(q),
        },
        ScoringRule {
            name: "name_prefix",
            weight: 100,
            applies: |k, q| k.name.starts_with(q),
        },
        ScoringRule {
            name: "country_prefix",
            weight: 60,
            applies: |k, q| k.country.starts_with(q),
        },
        ScoringRule {
            name: "city_substring",
            weight: 40,
            applies: |k, q| k.city.contains(q),
        },
        ScoringRule {
            name: "name_substring",
            weight: 30,
            applies: |k, q| k.name.contains(q),
        },
        ScoringRule {
            name: "country_substring",
            weight: 10,
            applies: |k, q| k.country.contains(q),
        },
        ScoringRule {
            name: "code_substring",
            weight: 80,
            applies: |k, q| k.code.contains(q),
        },
    ]
}

/// Sum the weights of all matching rules.
pub fn score(rules: &[ScoringRule], keys: &MatchKeys, query: &str) -> i32 {
    rules
        .iter()
        .filter(|rule| (rule.applies)(keys, query))
        .map(|rule| rule.weight)
        .sum()
}

/// Metro keys mapped to the (lower-case) codes serving that area.
#[derive(Debug, Clone)]
pub struct CityAliases {
    aliases: HashMap<String, Vec<String>>,
}

impl Default for CityAliases {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("paris", &["cdg", "ory", "par"]),
            ("london", &["lhr", "lgw", "lcy", "stn", "ltn", "lon"]),
            ("newyork", &["jfk", "lga", "ewr", "nyc"]),
            ("tokyo", &["hnd", "nrt", "tyo"]),
            ("rome", &["fco", "cia", "rom"]),
            ("milan", &["mxp", "lin", "bgy", "mil"]),
            ("chicago", &["ord", "mdw", "chi"]),
            ("toronto", &["yyz", "ytz", "yto"]),
            ("sanfrancisco", &["sfo", "sjc", "oak"]),
            ("dubai", &["dxb"]),
            ("delhi", &["del"]),
            ("mumbai", &["bom"]),
            ("vancouver", &["yvr"]),
            ("amsterdam", &["ams"]),
            ("frankfurt", &["fra"]),
            ("madrid", &["mad"]),
            ("zurich", &["zrh"]),
            ("vienna", &["vie"]),
            ("athens", &["ath"]),
            ("istanbul", &["ist", "saw"]),
        ];

        Self::from_pairs(table.iter().map(|(key, codes)| (*key, codes.to_vec())))
    }
}

impl CityAliases {
    /// Build a table from (key, codes) pairs. Keys and codes are folded.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let aliases = pairs
            .into_iter()
            .map(|(key, codes)| {
                (
                    compact_key(key),
                    codes.into_iter().map(|c| c.to_lowercase()).collect(),
                )
            })
            .collect();

        Self { aliases }
    }

    /// Codes aliased to a folded query, trying it as-is and with spaces removed.
    pub fn codes_for(&self, query: &str) -> &[String] {
        self.aliases
            .get(query)
            .or_else(|| self.aliases.get(&compact_key(query)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Configuration for the resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Additive scoring rules
    pub rules: Vec<ScoringRule>,
    /// Points added when the airport is listed under the query's metro alias
    pub alias_bonus: i32,
    /// Maximum suggestions returned
    pub max_results: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            alias_bonus: 120,
            max_results: 10,
        }
    }
}

/// An airport with its ranking score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAirport {
    pub airport: Airport,
    pub score: i32,
}

/// Resolves user text against the airport catalog.
pub struct Resolver {
    catalog: Arc<AirportCatalog>,
    aliases: CityAliases,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(catalog: Arc<AirportCatalog>) -> Self {
        Self {
            catalog,
            aliases: CityAliases::default(),
            config: ResolverConfig::default(),
        }
    }

    pub fn with_aliases(mut self, aliases: CityAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Ranked candidates with their scores, at most `max_results`.
    pub fn rank(&self, query: &str) -> Vec<ScoredAirport> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let q = fold_text(trimmed);
        let alias_codes = self.aliases.codes_for(&q);
        let airports = self.catalog.snapshot();

        let mut scored: Vec<ScoredAirport> = airports
            .iter()
            .filter_map(|airport| {
                let keys = &airport.keys;
                let aliased = alias_codes.contains(&keys.code);
                let matches = keys.city.contains(&q)
                    || keys.country.contains(&q)
                    || keys.name.contains(&q)
                    || keys.code.contains(&q);

                if !matches && !aliased {
                    return None;
                }

                let bonus = if aliased { self.config.alias_bonus } else { 0 };
                Some(ScoredAirport {
                    airport: airport.clone(),
                    score: score(&self.config.rules, keys, &q) + bonus,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.airport.keys.city.cmp(&b.airport.keys.city))
                .then_with(|| a.airport.keys.name.cmp(&b.airport.keys.name))
        });
        scored.truncate(self.config.max_results);

        scored
    }

    /// Autocomplete suggestions for `query`, best first.
    pub fn search(&self, query: &str) -> Vec<Airport> {
        self.rank(query).into_iter().map(|s| s.airport).collect()
    }

    /// Turn user input into an IATA code.
    ///
    /// Order: the picked-suggestion hint, a trailing "(XXX)" code, a bare
    /// three-letter code, the top search result, and finally the input
    /// upper-cased as-is.
    pub fn resolve_code(&self, raw_input: &str, selected_hint: Option<&str>) -> String {
        if let Some(hint) = selected_hint.filter(|h| !h.is_empty()) {
            return hint.to_string();
        }

        let raw = raw_input.trim();

        if let Some(code) = parenthesized_code(raw) {
            return code;
        }

        if raw.len() == 3 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return raw.to_uppercase();
        }

        match self.rank(raw).into_iter().next() {
            Some(top) => top.airport.code,
            None => {
                tracing::debug!(input = %raw, "No airport matched, passing input through");
                raw.to_uppercase()
            }
        }
    }
}

/// Extract "XXX" from text ending in "(XXX)".
fn parenthesized_code(raw: &str) -> Option<String> {
    let inner = raw.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let token = &inner[open + 1..];

    if token.len() == 3 && token.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(token.to_uppercase())
    } else {
        None
    }
}
