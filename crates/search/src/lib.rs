//! Search orchestration: resolve airports, fetch live offers, fall back to demo data.
//!
//! `execute` never fails. Any transport error is logged and replaced by
//! generated demo itineraries for the same codes and dates; the
//! `SourceTag` on the outcome is the only sign of degraded mode.

use serde::Serialize;
use skyscout_backend_amadeus::OfferTransport;
use skyscout_model::{clamp_adults, FlightItem, OfferQuery, SearchRequest, SourceTag};
use skyscout_offers::{MockGenerator, OfferNormalizer};
use skyscout_resolve::Resolver;

/// Result of one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub source: SourceTag,
    pub from_code: String,
    pub to_code: String,
    pub items: Vec<FlightItem>,
}

/// Coordinates resolution, the live transport and the demo fallback.
pub struct SearchOrchestrator<T> {
    resolver: Resolver,
    transport: T,
    mock: MockGenerator,
}

impl<T: OfferTransport> SearchOrchestrator<T> {
    pub fn new(resolver: Resolver, transport: T) -> Self {
        Self {
            resolver,
            transport,
            mock: MockGenerator,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the request's free text into a provider query.
    pub fn offer_query(&self, request: &SearchRequest) -> OfferQuery {
        OfferQuery {
            origin: self
                .resolver
                .resolve_code(&request.from_raw, request.from_hint.as_deref()),
            destination: self
                .resolver
                .resolve_code(&request.to_raw, request.to_hint.as_deref()),
            departure_date: request.start_date,
            return_date: request.end_date,
            adults: clamp_adults(request.adults),
            cabin: request.cabin,
        }
    }

    /// Run one search. Live results when the transport succeeds, demo otherwise.
    pub async fn execute(&self, request: &SearchRequest) -> SearchOutcome {
        let query = self.offer_query(request);

        match self.transport.search_offers(&query).await {
            Ok(payload) => {
                let items = OfferNormalizer::normalize_payload(&payload);
                tracing::info!(
                    transport = self.transport.name(),
                    origin = %query.origin,
                    destination = %query.destination,
                    offers = payload.data.len(),
                    items = items.len(),
                    "Live search succeeded"
                );
                SearchOutcome {
                    source: SourceTag::Live,
                    from_code: query.origin,
                    to_code: query.destination,
                    items,
                }
            }
            Err(e) => {
                tracing::warn!(
                    transport = self.transport.name(),
                    origin = %query.origin,
                    destination = %query.destination,
                    error = %e,
                    "Live search failed, using demo data"
                );
                let items = self
                    .mock
                    .generate(&query.origin, &query.destination, query.departure_date);
                SearchOutcome {
                    source: SourceTag::Demo,
                    from_code: query.origin,
                    to_code: query.destination,
                    items,
                }
            }
        }
    }
}
