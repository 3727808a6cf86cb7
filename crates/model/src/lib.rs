//! Core domain model for SkyScout flight search.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Airport`: A searchable airport record with pre-folded match keys
//! - `FlightItem`: The canonical itinerary shape shared by live and demo data
//! - `SearchRequest` / `OfferQuery`: What the user asked for, before and after resolution
//! - `FlightOffersPayload`: The raw provider response consumed by the normalizer

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Smallest and largest passenger counts accepted by the provider.
pub const MIN_ADULTS: u8 = 1;
pub const MAX_ADULTS: u8 = 9;

/// Clamp a passenger count into the accepted range.
pub fn clamp_adults(adults: u8) -> u8 {
    adults.clamp(MIN_ADULTS, MAX_ADULTS)
}

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    /// Offers returned by the live provider
    Live,
    /// Generated sample offers (provider unavailable)
    Demo,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("Live"),
            Self::Demo => f.write_str("Demo"),
        }
    }
}

/// Cabin class requested for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    /// Parse a loosely formatted cabin name ("business", "Premium Economy", "PREMIUM_ECONOMY").
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect::<String>()
            .to_uppercase();
        match key.as_str() {
            "ECONOMY" => Some(Self::Economy),
            "PREMIUM_ECONOMY" => Some(Self::PremiumEconomy),
            "BUSINESS" => Some(Self::Business),
            "FIRST" => Some(Self::First),
            _ => None,
        }
    }

    /// The value the provider expects for `travelClass`.
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }
}

/// An airport record as it arrives from a dataset, before normalization.
///
/// Missing or `null` fields read as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAirport {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lowercased, diacritic-stripped copies of an airport's searchable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchKeys {
    pub city: String,
    pub country: String,
    pub name: String,
    pub code: String,
}

/// A searchable airport.
///
/// `code` keeps its canonical upper-case form for display and provider calls;
/// matching always goes through `keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Airport {
    /// IATA code, upper case (e.g. "LHR")
    pub code: String,
    pub city: String,
    pub country: String,
    pub name: String,
    #[serde(skip)]
    pub keys: MatchKeys,
}

impl Airport {
    /// The suggestion text shown to users, e.g. "London, United Kingdom - Heathrow (LHR)".
    pub fn label(&self) -> String {
        format!("{}, {} - {} ({})", self.city, self.country, self.name, self.code)
    }
}

/// One non-stop leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub carrier_code: String,
    pub from_code: String,
    pub to_code: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
}

/// An operating carrier shown on a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub code: String,
    pub name: String,
}

/// The canonical itinerary shape consumed by the presentation layer.
///
/// Produced identically by the live normalizer and the demo generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightItem {
    pub from_code: String,
    pub to_code: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub segments: Vec<Segment>,
    /// Itinerary duration as stated by its source (not necessarily arrival minus departure)
    pub total_minutes: u32,
    pub stops: u32,
    pub carriers: Vec<Carrier>,
    /// Decimal amount, kept as the provider stated it
    pub price: String,
    /// ISO 4217 code; symbols are applied at display time
    pub currency: String,
    pub emissions_kg: u32,
}

/// What the user typed and picked, before airport resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub from_raw: String,
    pub to_raw: String,
    /// Code of a picked suggestion; cleared by the caller when the text changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_hint: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_adults")]
    pub adults: u8,
    #[serde(default)]
    pub cabin: Option<CabinClass>,
}

fn default_adults() -> u8 {
    MIN_ADULTS
}

impl SearchRequest {
    pub fn new(from_raw: impl Into<String>, to_raw: impl Into<String>) -> Self {
        Self {
            from_raw: from_raw.into(),
            to_raw: to_raw.into(),
            adults: MIN_ADULTS,
            ..Default::default()
        }
    }

    pub fn with_hints(mut self, from_hint: Option<String>, to_hint: Option<String>) -> Self {
        self.from_hint = from_hint;
        self.to_hint = to_hint;
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_adults(mut self, adults: u8) -> Self {
        self.adults = clamp_adults(adults);
        self
    }

    pub fn with_cabin(mut self, cabin: Option<CabinClass>) -> Self {
        self.cabin = cabin;
        self
    }
}

/// A resolved request, ready for the live-offer transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub adults: u8,
    pub cabin: Option<CabinClass>,
}

/// Flight-offers response body from the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightOffersPayload {
    #[serde(default)]
    pub data: Vec<RawOffer>,
    #[serde(default)]
    pub dictionaries: Option<Dictionaries>,
}

impl FlightOffersPayload {
    /// Carrier names keyed by code, empty when the provider sent none.
    pub fn carrier_names(&self) -> HashMap<String, String> {
        self.dictionaries
            .as_ref()
            .map(|d| d.carriers.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionaries {
    #[serde(default)]
    pub carriers: HashMap<String, String>,
}

/// One priced offer; only its first itinerary (the outbound) is displayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOffer {
    #[serde(default)]
    pub itineraries: Vec<RawItinerary>,
    #[serde(default)]
    pub price: Option<RawPrice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawItinerary {
    /// ISO-8601 duration such as "PT18H30M"
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    #[serde(default)]
    pub carrier_code: Option<String>,
    #[serde(default)]
    pub departure: Option<RawEndpoint>,
    #[serde(default)]
    pub arrival: Option<RawEndpoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEndpoint {
    #[serde(default)]
    pub iata_code: Option<String>,
    /// Local date-time, e.g. "2024-11-01T10:05:00"
    #[serde(default)]
    pub at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPrice {
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}
