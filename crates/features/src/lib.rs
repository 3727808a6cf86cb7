//! Feature extraction for airport matching and offer normalization.
//!
//! Provides pure functions shared by the catalog, resolver and normalizer:
//! - Text folding (lowercase, diacritics stripped)
//! - ISO-8601 itinerary duration parsing
//! - Flight emissions estimate

use unicode_normalization::UnicodeNormalization;

/// Kilograms of CO2e per flight-hour used by the emissions estimate (45 × 1.2).
pub const EMISSIONS_KG_PER_HOUR: f64 = 45.0 * 1.2;

/// Fold text for matching: decompose, drop combining diacritics, lowercase.
///
/// "Zürich" and "zurich" fold to the same key.
pub fn fold_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect::<String>()
        .to_lowercase()
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Fold text and remove all whitespace, for metro-style keys ("New York" -> "newyork").
pub fn compact_key(text: &str) -> String {
    fold_text(text).split_whitespace().collect()
}

/// Parse an itinerary duration of the form `PT<h>H<m>M` into minutes.
///
/// Either component may be absent. Anything unparseable is 0 minutes.
/// Trailing components (e.g. seconds) are ignored.
pub fn parse_iso_duration(token: &str) -> u32 {
    let Some(rest) = token.trim().strip_prefix("PT") else {
        return 0;
    };

    let (hours, rest) = take_component(rest, 'H');
    let (minutes, _) = take_component(rest, 'M');

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .unwrap_or(0)
}

/// Read `<digits><unit>` from the front of `s`; if absent, return 0 and `s` unchanged.
fn take_component(s: &str, unit: char) -> (u32, &str) {
    let digits_len = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits_len == 0 || !s[digits_len..].starts_with(unit) {
        return (0, s);
    }
    match s[..digits_len].parse::<u32>() {
        Ok(value) => (value, &s[digits_len + unit.len_utf8()..]),
        Err(_) => (0, s),
    }
}

/// Rough CO2e estimate for an itinerary of the given length.
pub fn estimate_emissions_kg(total_minutes: u32) -> u32 {
    let hours = f64::from(total_minutes) / 60.0;
    (hours * EMISSIONS_KG_PER_HOUR).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_text() {
        assert_eq!(fold_text("Zürich"), "zurich");
        assert_eq!(fold_text("São Paulo"), "sao paulo");
        assert_eq!(fold_text("MONTRÉAL"), "montreal");
        assert_eq!(fold_text("Charles de Gaulle"), "charles de gaulle");
    }

    #[test]
    fn test_compact_key() {
        assert_eq!(compact_key("New York"), "newyork");
        assert_eq!(compact_key("  san   francisco "), "sanfrancisco");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_iso_duration("PT2H30M"), 150);
        assert_eq!(parse_iso_duration("PT45M"), 45);
        assert_eq!(parse_iso_duration("PT18H"), 1080);
        assert_eq!(parse_iso_duration("PT"), 0);
        assert_eq!(parse_iso_duration("PT2H30M15S"), 150);
    }

    #[test]
    fn test_parse_duration_malformed() {
        assert_eq!(parse_iso_duration(""), 0);
        assert_eq!(parse_iso_duration("two hours"), 0);
        assert_eq!(parse_iso_duration("P1D"), 0);
        assert_eq!(parse_iso_duration("PT15S"), 0);
        assert_eq!(parse_iso_duration("PT99999999999H"), 0);
    }

    #[test]
    fn test_emissions_estimate() {
        assert_eq!(estimate_emissions_kg(120), 108);
        assert_eq!(estimate_emissions_kg(0), 0);
        assert_eq!(estimate_emissions_kg(150), 135);
        assert_eq!(estimate_emissions_kg(45), 41);
    }
}
