//! Query translation for live-offer providers.
//!
//! Converts a resolved `OfferQuery` into provider-specific request parameters:
//! - Amadeus flight-offers search (`/v2/shopping/flight-offers`)

use skyscout_model::{clamp_adults, OfferQuery};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Missing origin code")]
    MissingOrigin,
    #[error("Missing destination code")]
    MissingDestination,
    #[error("Missing departure date")]
    MissingDepartureDate,
}

/// Trait for translating queries to provider-specific syntax.
pub trait QueryDialect {
    /// The output type (query parameters, a request body, ...)
    type Output;

    /// Translate an OfferQuery to this dialect
    fn translate(&self, query: &OfferQuery) -> Result<Self::Output, QueryError>;
}

/// Amadeus flight-offers query parameters.
#[derive(Debug, Clone)]
pub struct AmadeusDialect {
    /// Upper bound on offers returned by the provider
    pub max_results: u32,
}

impl Default for AmadeusDialect {
    fn default() -> Self {
        Self { max_results: 10 }
    }
}

impl QueryDialect for AmadeusDialect {
    type Output = Vec<(&'static str, String)>;

    fn translate(&self, query: &OfferQuery) -> Result<Self::Output, QueryError> {
        let origin = query.origin.trim().to_uppercase();
        if origin.is_empty() {
            return Err(QueryError::MissingOrigin);
        }

        let destination = query.destination.trim().to_uppercase();
        if destination.is_empty() {
            return Err(QueryError::MissingDestination);
        }

        let departure = query
            .departure_date
            .ok_or(QueryError::MissingDepartureDate)?;

        let mut params = vec![
            ("originLocationCode", origin),
            ("destinationLocationCode", destination),
            ("departureDate", departure.format("%Y-%m-%d").to_string()),
            ("adults", clamp_adults(query.adults).to_string()),
            ("nonStop", "false".to_string()),
            ("max", self.max_results.to_string()),
        ];

        if let Some(cabin) = query.cabin {
            params.push(("travelClass", cabin.as_provider_str().to_string()));
        }

        if let Some(return_date) = query.return_date {
            params.push(("returnDate", return_date.format("%Y-%m-%d").to_string()));
        }

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use skyscout_model::CabinClass;

    fn query() -> OfferQuery {
        OfferQuery {
            origin: "yow".into(),
            destination: "NRT".into(),
            departure_date: NaiveDate::from_ymd_opt(2024, 11, 1),
            return_date: None,
            adults: 2,
            cabin: None,
        }
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_amadeus_basic() {
        let params = AmadeusDialect::default().translate(&query()).unwrap();
        assert_eq!(
            params,
            vec![
                ("originLocationCode", "YOW".to_string()),
                ("destinationLocationCode", "NRT".to_string()),
                ("departureDate", "2024-11-01".to_string()),
                ("adults", "2".to_string()),
                ("nonStop", "false".to_string()),
                ("max", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_amadeus_optional_params() {
        let mut q = query();
        q.cabin = Some(CabinClass::PremiumEconomy);
        q.return_date = NaiveDate::from_ymd_opt(2024, 11, 15);
        q.adults = 30;

        let params = AmadeusDialect { max_results: 5 }.translate(&q).unwrap();
        assert_eq!(param(&params, "travelClass"), Some("PREMIUM_ECONOMY"));
        assert_eq!(param(&params, "returnDate"), Some("2024-11-15"));
        assert_eq!(param(&params, "adults"), Some("9"));
        assert_eq!(param(&params, "max"), Some("5"));
    }

    #[test]
    fn test_missing_fields() {
        let dialect = AmadeusDialect::default();

        let mut q = query();
        q.origin = "  ".into();
        assert_eq!(dialect.translate(&q), Err(QueryError::MissingOrigin));

        let mut q = query();
        q.destination = String::new();
        assert_eq!(dialect.translate(&q), Err(QueryError::MissingDestination));

        let mut q = query();
        q.departure_date = None;
        assert_eq!(dialect.translate(&q), Err(QueryError::MissingDepartureDate));
    }
}
