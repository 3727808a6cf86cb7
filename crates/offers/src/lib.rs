//! Offer normalization and demo data.
//!
//! Both the live path (`OfferNormalizer`) and the offline path
//! (`MockGenerator`) produce `FlightItem`s through `assemble_item`, so the
//! endpoint, stop and carrier fields mean the same thing on either side.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use skyscout_features::{estimate_emissions_kg, parse_iso_duration};
use skyscout_model::{
    Carrier, FlightItem, FlightOffersPayload, RawOffer, RawSegment, Segment,
};
use std::collections::HashMap;

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_PRICE: &str = "0";

/// Build a `FlightItem` from ordered segments; `None` if there are no segments.
///
/// Endpoints and instants come from the first and last segment, and
/// `stops` is always `segments.len() - 1`.
pub fn assemble_item(
    segments: Vec<Segment>,
    total_minutes: u32,
    carriers: Vec<Carrier>,
    price: String,
    currency: String,
    emissions_kg: u32,
) -> Option<FlightItem> {
    let first = segments.first()?;
    let last = segments.last()?;

    Some(FlightItem {
        from_code: first.from_code.clone(),
        to_code: last.to_code.clone(),
        departure: first.departure,
        arrival: last.arrival,
        stops: segments.len().saturating_sub(1) as u32,
        segments,
        total_minutes,
        carriers,
        price,
        currency,
        emissions_kg,
    })
}

/// Unique carriers across `segments` in first-seen order.
pub fn unique_carriers(segments: &[Segment], name_of: impl Fn(&str) -> String) -> Vec<Carrier> {
    let mut carriers: Vec<Carrier> = Vec::new();
    for segment in segments {
        if !carriers.iter().any(|c| c.code == segment.carrier_code) {
            carriers.push(Carrier {
                code: segment.carrier_code.clone(),
                name: name_of(&segment.carrier_code),
            });
        }
    }
    carriers
}

/// Maps provider offers onto the canonical `FlightItem`.
#[derive(Debug, Clone, Default)]
pub struct OfferNormalizer {
    carrier_names: HashMap<String, String>,
}

impl OfferNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use provider-supplied carrier names (code -> name) where available.
    pub fn with_carrier_names(mut self, carrier_names: HashMap<String, String>) -> Self {
        self.carrier_names = carrier_names;
        self
    }

    /// Normalize a whole provider payload, dropping unusable offers.
    pub fn normalize_payload(payload: &FlightOffersPayload) -> Vec<FlightItem> {
        Self::new()
            .with_carrier_names(payload.carrier_names())
            .normalize_all(&payload.data)
    }

    pub fn normalize_all(&self, offers: &[RawOffer]) -> Vec<FlightItem> {
        let items: Vec<FlightItem> = offers.iter().filter_map(|o| self.normalize(o)).collect();
        if items.len() < offers.len() {
            tracing::debug!(
                dropped = offers.len() - items.len(),
                "Dropped offers without usable segments"
            );
        }
        items
    }

    /// Normalize one offer's outbound itinerary.
    ///
    /// Returns `None` when the itinerary is missing, has no segments, or has
    /// a segment without codes or readable instants.
    pub fn normalize(&self, offer: &RawOffer) -> Option<FlightItem> {
        let itinerary = offer.itineraries.first()?;
        let segments = itinerary
            .segments
            .iter()
            .map(project_segment)
            .collect::<Option<Vec<Segment>>>()?;

        let total_minutes = parse_iso_duration(itinerary.duration.as_deref().unwrap_or("PT0M"));
        let carriers = unique_carriers(&segments, |code| {
            self.carrier_names
                .get(code)
                .cloned()
                .unwrap_or_else(|| code.to_string())
        });

        let price = offer.price.as_ref();
        let amount = price
            .and_then(|p| p.total.clone())
            .unwrap_or_else(|| DEFAULT_PRICE.to_string());
        let currency = price
            .and_then(|p| p.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        assemble_item(
            segments,
            total_minutes,
            carriers,
            amount,
            currency,
            estimate_emissions_kg(total_minutes),
        )
    }
}

fn project_segment(raw: &RawSegment) -> Option<Segment> {
    let departure = raw.departure.as_ref()?;
    let arrival = raw.arrival.as_ref()?;

    Some(Segment {
        carrier_code: raw.carrier_code.clone()?,
        from_code: departure.iata_code.clone()?,
        to_code: arrival.iata_code.clone()?,
        departure: parse_instant(departure.at.as_deref()?)?,
        arrival: parse_instant(arrival.at.as_deref()?)?,
    })
}

/// Airport-local wall-clock time of an ISO-8601 instant.
///
/// Accepts seconds or minute precision; an explicit offset is dropped, keeping the local time.
fn parse_instant(at: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(at)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Carriers used by demo itineraries.
const MOCK_CARRIERS: [(&str, &str); 3] = [("UA", "United"), ("AC", "Air Canada"), ("NH", "ANA")];

/// Demo fares are quoted in Canadian dollars.
const MOCK_CURRENCY: &str = "CAD";

/// Minutes after midnight of the first demo departure (06:05).
const MOCK_BASE_MINUTES: i64 = 6 * 60 + 5;

enum Stop {
    Origin,
    Hub(&'static str),
    Destination,
}

struct MockLeg {
    carrier: &'static str,
    from: Stop,
    to: Stop,
    /// Departure and arrival, minutes after the base time
    depart: i64,
    arrive: i64,
}

struct MockItinerary {
    legs: &'static [MockLeg],
    price: &'static str,
    emissions_kg: u32,
}

const MOCK_ITINERARIES: [MockItinerary; 3] = [
    MockItinerary {
        legs: &[
            MockLeg { carrier: "UA", from: Stop::Origin, to: Stop::Hub("EWR"), depart: 0, arrive: 155 },
            MockLeg { carrier: "NH", from: Stop::Hub("EWR"), to: Stop::Destination, depart: 313, arrive: 1213 },
        ],
        price: "1211",
        emissions_kg: 767,
    },
    MockItinerary {
        legs: &[
            MockLeg { carrier: "AC", from: Stop::Origin, to: Stop::Hub("YYZ"), depart: 260, arrive: 330 },
            MockLeg { carrier: "UA", from: Stop::Hub("YYZ"), to: Stop::Hub("ORD"), depart: 435, arrive: 525 },
            MockLeg { carrier: "NH", from: Stop::Hub("ORD"), to: Stop::Destination, depart: 695, arrive: 1565 },
        ],
        price: "1211",
        emissions_kg: 1099,
    },
    MockItinerary {
        legs: &[
            MockLeg { carrier: "AC", from: Stop::Origin, to: Stop::Hub("YUL"), depart: 390, arrive: 455 },
            MockLeg { carrier: "AC", from: Stop::Hub("YUL"), to: Stop::Destination, depart: 518, arrive: 1298 },
        ],
        price: "1235",
        emissions_kg: 823,
    },
];

/// Generates fixed sample itineraries for demo mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl MockGenerator {
    /// Three sample itineraries from `from` to `to`, leaving from 06:05 on
    /// `start_date` (today when absent).
    ///
    /// `total_minutes` is the sum of leg flight times, so layovers are not counted.
    pub fn generate(&self, from: &str, to: &str, start_date: Option<NaiveDate>) -> Vec<FlightItem> {
        let date = start_date.unwrap_or_else(|| Local::now().date_naive());
        let base = date.and_time(NaiveTime::MIN) + Duration::minutes(MOCK_BASE_MINUTES);

        MOCK_ITINERARIES
            .iter()
            .filter_map(|itinerary| build_mock_item(itinerary, from, to, base))
            .collect()
    }
}

fn build_mock_item(
    itinerary: &MockItinerary,
    from: &str,
    to: &str,
    base: NaiveDateTime,
) -> Option<FlightItem> {
    let code_for = |stop: &Stop| match stop {
        Stop::Origin => from.to_string(),
        Stop::Hub(code) => (*code).to_string(),
        Stop::Destination => to.to_string(),
    };

    let segments: Vec<Segment> = itinerary
        .legs
        .iter()
        .map(|leg| Segment {
            carrier_code: leg.carrier.to_string(),
            from_code: code_for(&leg.from),
            to_code: code_for(&leg.to),
            departure: base + Duration::minutes(leg.depart),
            arrival: base + Duration::minutes(leg.arrive),
        })
        .collect();

    let total_minutes = segments
        .iter()
        .map(|s| (s.arrival - s.departure).num_minutes().max(1) as u32)
        .sum();

    let carriers = unique_carriers(&segments, |code| {
        MOCK_CARRIERS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_else(|| code.to_string())
    });

    assemble_item(
        segments,
        total_minutes,
        carriers,
        itinerary.price.to_string(),
        MOCK_CURRENCY.to_string(),
        itinerary.emissions_kg,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skyscout_model::{RawEndpoint, RawItinerary, RawPrice};

    fn raw_segment(carrier: &str, from: &str, dep: &str, to: &str, arr: &str) -> RawSegment {
        RawSegment {
            carrier_code: Some(carrier.into()),
            departure: Some(RawEndpoint {
                iata_code: Some(from.into()),
                at: Some(dep.into()),
            }),
            arrival: Some(RawEndpoint {
                iata_code: Some(to.into()),
                at: Some(arr.into()),
            }),
        }
    }

    fn raw_offer(duration: Option<&str>, segments: Vec<RawSegment>) -> RawOffer {
        RawOffer {
            itineraries: vec![RawItinerary {
                duration: duration.map(str::to_string),
                segments,
            }],
            price: Some(RawPrice {
                total: Some("842.17".into()),
                currency: Some("EUR".into()),
            }),
        }
    }

    fn two_leg_offer(duration: &str) -> RawOffer {
        raw_offer(
            Some(duration),
            vec![
                raw_segment("AC", "YOW", "2024-11-01T06:05:00", "YYZ", "2024-11-01T07:15:00"),
                raw_segment("NH", "YYZ", "2024-11-01T09:00:00", "NRT", "2024-11-02T12:10:00"),
            ],
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()
    }

    #[test]
    fn test_unusable_offers() {
        let normalizer = OfferNormalizer::new();
        assert!(normalizer.normalize(&RawOffer::default()).is_none());
        assert!(normalizer.normalize(&raw_offer(Some("PT1H"), vec![])).is_none());

        let mut broken = two_leg_offer("PT3H");
        broken.itineraries[0].segments[1].arrival = None;
        assert!(normalizer.normalize(&broken).is_none());

        let mut bad_instant = two_leg_offer("PT3H");
        bad_instant.itineraries[0].segments[0].departure = Some(RawEndpoint {
            iata_code: Some("YOW".into()),
            at: Some("tomorrow".into()),
        });
        assert!(normalizer.normalize(&bad_instant).is_none());
    }

    #[test]
    fn test_normalize_projection() {
        let item = OfferNormalizer::new().normalize(&two_leg_offer("PT2H30M")).unwrap();

        assert_eq!(item.from_code, "YOW");
        assert_eq!(item.to_code, "NRT");
        assert_eq!(item.departure, item.segments[0].departure);
        assert_eq!(item.arrival, item.segments[1].arrival);
        assert_eq!(item.segments.len(), 2);
        assert_eq!(item.segments[1].from_code, "YYZ");
        assert_eq!(item.stops, 1);
        assert_eq!(item.total_minutes, 150);
        assert_eq!(item.price, "842.17");
        assert_eq!(item.currency, "EUR");
    }

    #[test]
    fn test_instant_forms() {
        let expected = date().and_hms_opt(6, 5, 0).unwrap();
        for at in [
            "2024-11-01T06:05:00",
            "2024-11-01T06:05:00.000",
            "2024-11-01T06:05",
            "2024-11-01T06:05:00-04:00",
            "2024-11-01T06:05:00Z",
        ] {
            assert_eq!(parse_instant(at), Some(expected), "{}", at);
        }
        assert_eq!(parse_instant("2024-11-01"), None);
    }

    #[test]
    fn test_normalize_minute_and_offset_instants() {
        let payload: FlightOffersPayload = serde_json::from_value(serde_json::json!({
            "data": [
                {"itineraries": [{"duration": "PT1H10M", "segments": [{
                    "carrierCode": "AC",
                    "departure": {"iataCode": "YOW", "at": "2024-11-01T06:05"},
                    "arrival": {"iataCode": "YYZ", "at": "2024-11-01T07:15"}
                }]}]},
                {"itineraries": [{"duration": "PT1H10M", "segments": [{
                    "carrierCode": "AC",
                    "departure": {"iataCode": "YOW", "at": "2024-11-01T06:05:00-04:00"},
                    "arrival": {"iataCode": "YYZ", "at": "2024-11-01T07:15:00-04:00"}
                }]}]}
            ]
        }))
        .unwrap();

        let items = OfferNormalizer::normalize_payload(&payload);
        assert_eq!(items.len(), 2);
        for item in &items {
            assert_eq!(item.departure, date().and_hms_opt(6, 5, 0).unwrap());
            assert_eq!(item.arrival, date().and_hms_opt(7, 15, 0).unwrap());
        }
    }

    #[test]
    fn test_durations() {
        let normalizer = OfferNormalizer::new();
        let minutes = |d: Option<&str>| {
            let mut offer = two_leg_offer("PT0M");
            offer.itineraries[0].duration = d.map(str::to_string);
            normalizer.normalize(&offer).unwrap().total_minutes
        };

        assert_eq!(minutes(Some("PT2H30M")), 150);
        assert_eq!(minutes(Some("PT45M")), 45);
        assert_eq!(minutes(Some("soon")), 0);
        assert_eq!(minutes(None), 0);
    }

    #[test]
    fn test_emissions_follow_duration() {
        let item = OfferNormalizer::new().normalize(&two_leg_offer("PT2H")).unwrap();
        assert_eq!(item.total_minutes, 120);
        assert_eq!(item.emissions_kg, 108);
    }

    #[test]
    fn test_carriers_unique_first_seen() {
        let offer = raw_offer(
            Some("PT9H"),
            vec![
                raw_segment("UA", "YOW", "2024-11-01T06:00:00", "ORD", "2024-11-01T08:00:00"),
                raw_segment("NH", "ORD", "2024-11-01T09:00:00", "HND", "2024-11-01T20:00:00"),
                raw_segment("UA", "HND", "2024-11-01T22:00:00", "NRT", "2024-11-01T23:00:00"),
            ],
        );
        let item = OfferNormalizer::new().normalize(&offer).unwrap();

        let codes: Vec<&str> = item.carriers.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["UA", "NH"]);
        assert_eq!(item.carriers[0].name, "UA");
        assert_eq!(item.stops, 2);
    }

    #[test]
    fn test_carrier_names_from_dictionary() {
        let names = HashMap::from([("AC".to_string(), "AIR CANADA".to_string())]);
        let item = OfferNormalizer::new()
            .with_carrier_names(names)
            .normalize(&two_leg_offer("PT3H"))
            .unwrap();

        assert_eq!(
            item.carriers,
            vec![
                Carrier { code: "AC".into(), name: "AIR CANADA".into() },
                Carrier { code: "NH".into(), name: "NH".into() },
            ]
        );
    }

    #[test]
    fn test_missing_price_defaults() {
        let mut offer = two_leg_offer("PT3H");
        offer.price = None;
        let item = OfferNormalizer::new().normalize(&offer).unwrap();
        assert_eq!(item.price, "0");
        assert_eq!(item.currency, "USD");
    }

    #[test]
    fn test_normalize_payload_drops_unusable() {
        let payload: FlightOffersPayload = serde_json::from_value(serde_json::json!({
            "data": [
                {"itineraries": [{"duration": "PT1H10M", "segments": [{
                    "carrierCode": "AC",
                    "departure": {"iataCode": "YOW", "at": "2024-11-01T06:05:00"},
                    "arrival": {"iataCode": "YYZ", "at": "2024-11-01T07:15:00"}
                }]}], "price": {"total": "199.00", "currency": "CAD"}},
                {"itineraries": []}
            ],
            "dictionaries": {"carriers": {"AC": "AIR CANADA"}}
        }))
        .unwrap();

        let items = OfferNormalizer::normalize_payload(&payload);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].stops, 0);
        assert_eq!(items[0].carriers[0].name, "AIR CANADA");
    }

    #[test]
    fn test_mock_is_deterministic() {
        let generator = MockGenerator;
        let first = generator.generate("YOW", "NRT", Some(date()));
        let second = generator.generate("YOW", "NRT", Some(date()));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_mock_shape() {
        let items = MockGenerator.generate("YOW", "NRT", Some(date()));
        assert_eq!(items.len(), 3);

        let stops: Vec<u32> = items.iter().map(|i| i.stops).collect();
        assert_eq!(stops, vec![1, 2, 1]);

        let totals: Vec<u32> = items.iter().map(|i| i.total_minutes).collect();
        assert_eq!(totals, vec![155 + 900, 70 + 90 + 870, 65 + 780]);

        for item in &items {
            assert_eq!(item.from_code, "YOW");
            assert_eq!(item.to_code, "NRT");
            assert_eq!(item.currency, "CAD");
            assert_eq!(item.stops as usize, item.segments.len() - 1);
            for pair in item.segments.windows(2) {
                assert_eq!(pair[0].to_code, pair[1].from_code);
            }
        }

        let expected_start = date().and_hms_opt(6, 5, 0).unwrap();
        assert_eq!(items[0].departure, expected_start);
        assert_eq!(items[1].segments[1].from_code, "YYZ");
        assert_eq!(items[2].segments[0].to_code, "YUL");
    }

    #[test]
    fn test_mock_carriers_and_fares() {
        let items = MockGenerator.generate("YOW", "NRT", Some(date()));

        let names: Vec<Vec<&str>> = items
            .iter()
            .map(|i| i.carriers.iter().map(|c| c.name.as_str()).collect())
            .collect();
        assert_eq!(
            names,
            vec![
                vec!["United", "ANA"],
                vec!["Air Canada", "United", "ANA"],
                vec!["Air Canada"],
            ]
        );

        let fares: Vec<(&str, u32)> = items
            .iter()
            .map(|i| (i.price.as_str(), i.emissions_kg))
            .collect();
        assert_eq!(fares, vec![("1211", 767), ("1211", 1099), ("1235", 823)]);
    }

    #[test]
    fn test_mock_total_excludes_layovers() {
        let item = &MockGenerator.generate("YOW", "NRT", Some(date()))[0];
        let wall_clock = (item.arrival - item.departure).num_minutes() as u32;
        assert_eq!(wall_clock, 1213);
        assert!(item.total_minutes < wall_clock);
    }
}
