//! Amadeus live-offer transport.
//!
//! Provides the `OfferTransport` trait and its Amadeus implementation.
//! The search core only sees the trait, so tests and demo setups can swap
//! in their own transport.

use serde::Deserialize;
use skyscout_model::{FlightOffersPayload, OfferQuery};
use skyscout_query::{AmadeusDialect, QueryDialect, QueryError};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before the provider says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Errors from live-offer transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Missing AMADEUS_CLIENT_ID/AMADEUS_CLIENT_SECRET")]
    MissingCredentials,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
}

/// Trait for live-offer transports.
pub trait OfferTransport {
    /// Fetch raw flight offers for a resolved query.
    fn search_offers(
        &self,
        query: &OfferQuery,
    ) -> impl Future<Output = Result<FlightOffersPayload, TransportError>> + Send;

    /// Check that the provider is reachable and accepts our credentials.
    fn health_check(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Get the transport name for logging.
    fn name(&self) -> &'static str;
}

/// Amadeus API configuration.
#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    /// Base URL, test or production environment
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Offers requested per search
    pub max_results: u32,
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://test.api.amadeus.com".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_secs: 30,
            max_results: 10,
        }
    }
}

impl AmadeusConfig {
    fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
}

/// Amadeus flight-offers transport.
pub struct AmadeusTransport {
    config: AmadeusConfig,
    client: reqwest::Client,
    dialect: AmadeusDialect,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusTransport {
    /// Create a new Amadeus transport.
    pub fn new(config: AmadeusConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let dialect = AmadeusDialect {
            max_results: config.max_results,
        };

        Ok(Self {
            config,
            client,
            dialect,
            token: Mutex::new(None),
        })
    }

    /// A valid bearer token, fetching a new one when the cached one is stale.
    async fn access_token(&self) -> Result<String, TransportError> {
        if !self.config.has_credentials() {
            return Err(TransportError::MissingCredentials);
        }

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!("Requesting Amadeus access token");

        let response = self
            .client
            .post(format!("{}/v1/security/oauth2/token", self.config.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(TransportError::Status {
                status,
                message: format!("Token HTTP {}", status),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TransportError::ParseError(e.to_string()))?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(access_token)
    }

    /// Pull the provider's first error detail out of a failed response body.
    fn error_message(status: u16, body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.errors.into_iter().find_map(|e| e.detail))
            .unwrap_or_else(|| format!("Amadeus HTTP {}", status))
    }
}

impl OfferTransport for AmadeusTransport {
    async fn search_offers(
        &self,
        query: &OfferQuery,
    ) -> Result<FlightOffersPayload, TransportError> {
        let params = self.dialect.translate(query)?;
        let token = self.access_token().await?;

        tracing::debug!(
            origin = %query.origin,
            destination = %query.destination,
            "Executing Amadeus flight-offers search"
        );

        let response = self
            .client
            .get(format!("{}/v2/shopping/flight-offers", self.config.base_url))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status,
                message: Self::error_message(status, &body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::ParseError(e.to_string()))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        self.access_token().await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "amadeus"
    }
}
