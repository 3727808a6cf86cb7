//! Presentation helpers for flight results.
//!
//! Converts canonical `FlightItem`s into display-ready text: currency
//! symbols, duration and time labels, layovers and stop summaries.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use skyscout_model::FlightItem;

/// Shown when a search produced no items.
pub const NO_RESULTS: &str = "No flights found. Try different dates.";

/// A connection gap between two segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layover {
    /// Airport where the connection happens
    pub airport: String,
    /// Minutes between arrival and next departure (at least 1)
    pub minutes: u32,
}

/// One leg rendered for the expanded card view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentLine {
    pub from: String,
    pub departs: String,
    pub to: String,
    pub arrives: String,
}

/// A display-ready flight result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightCard {
    /// First carrier code, "XX" when unknown
    pub badge: String,
    /// e.g. "6:05 AM – 2:25 AM +1"
    pub times: String,
    /// Carrier names joined with ", "
    pub carriers: String,
    pub duration: String,
    pub stops: String,
    /// Connection airports joined with ", "
    pub stop_codes: String,
    pub emissions: String,
    pub price: String,
    pub segments: Vec<SegmentLine>,
    pub layovers: Vec<Layover>,
}

impl FlightCard {
    pub fn from_item(item: &FlightItem) -> Self {
        let offset = day_offset(item.departure, item.arrival);
        let plus = if offset > 0 {
            format!(" +{}", offset)
        } else {
            String::new()
        };

        let stop_codes = item
            .segments
            .iter()
            .take(item.segments.len().saturating_sub(1))
            .map(|s| s.to_code.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            badge: item
                .carriers
                .first()
                .map(|c| c.code.clone())
                .unwrap_or_else(|| "XX".to_string()),
            times: format!(
                "{} – {}{}",
                format_time(item.departure),
                format_time(item.arrival),
                plus
            ),
            carriers: item
                .carriers
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            duration: format_duration(item.total_minutes),
            stops: stops_label(item.stops),
            stop_codes,
            emissions: format!("{} kg CO2e", item.emissions_kg),
            price: format_price(&item.price, &item.currency),
            segments: item
                .segments
                .iter()
                .map(|s| SegmentLine {
                    from: s.from_code.clone(),
                    departs: format_time(s.departure),
                    to: s.to_code.clone(),
                    arrives: format_time(s.arrival),
                })
                .collect(),
            layovers: layovers(item),
        }
    }
}

/// Display prefix for an ISO currency code.
pub fn currency_symbol(code: &str) -> String {
    match code.to_uppercase().as_str() {
        "USD" => "$".to_string(),
        "CAD" => "CA$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        "AUD" => "A$".to_string(),
        _ => format!("{} ", code),
    }
}

pub fn format_price(price: &str, currency: &str) -> String {
    format!("{}{}", currency_symbol(currency), price)
}

/// "2 hr 30 min", "2 hr" or "45 min".
pub fn format_duration(minutes: u32) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{} hr", h),
        (h, m) => format!("{} hr {} min", h, m),
    }
}

/// 12-hour clock, e.g. "6:05 AM".
pub fn format_time(at: NaiveDateTime) -> String {
    at.format("%-I:%M %p").to_string()
}

/// Calendar days between departure and arrival dates.
pub fn day_offset(departure: NaiveDateTime, arrival: NaiveDateTime) -> i64 {
    (arrival.date() - departure.date()).num_days()
}

pub fn stops_label(stops: u32) -> String {
    if stops == 1 {
        "1 stop".to_string()
    } else {
        format!("{} stops", stops)
    }
}

/// Gaps between consecutive segments.
pub fn layovers(item: &FlightItem) -> Vec<Layover> {
    item.segments
        .windows(2)
        .map(|pair| Layover {
            airport: pair[0].to_code.clone(),
            minutes: u32::try_from((pair[1].departure - pair[0].arrival).num_minutes().max(1))
                .unwrap_or(u32::MAX),
        })
        .collect()
}
