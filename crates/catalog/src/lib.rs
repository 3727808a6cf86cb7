//! Airport catalog: the searchable dataset behind autocomplete.
//!
//! The catalog holds an immutable snapshot of normalized airports. A reload
//! builds a complete new snapshot and swaps it in, so readers see either the
//! old list or the new one, never a mix. Reload failures are logged and the
//! previous snapshot is kept.

use arc_swap::ArcSwap;
use skyscout_features::fold_text;
use skyscout_model::{Airport, MatchKeys, RawAirport};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from fetching an airport dataset.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Where airport records come from.
pub trait CatalogSource {
    /// Fetch the full list of raw airport records.
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawAirport>, CatalogError>> + Send;

    /// Source description for logging.
    fn describe(&self) -> String;
}

/// Airport dataset served as a JSON array over HTTP.
pub struct HttpCatalogSource {
    url: String,
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Vec<RawAirport>, CatalogError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let records: Vec<Option<RawAirport>> = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        Ok(records.into_iter().flatten().collect())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Airport dataset stored as a JSON array on disk.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<Vec<RawAirport>, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let records: Vec<Option<RawAirport>> =
            serde_json::from_slice(&bytes).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        Ok(records.into_iter().flatten().collect())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Built-in airports used until (and unless) a dataset loads.
pub fn fallback_airports() -> Vec<RawAirport> {
    [
        ("London", "United Kingdom", "Heathrow", "LHR"),
        ("London", "United Kingdom", "Gatwick", "LGW"),
        ("London", "United Kingdom", "City", "LCY"),
        ("Paris", "France", "Charles de Gaulle", "CDG"),
        ("Paris", "France", "Orly", "ORY"),
        ("New York", "United States", "John F. Kennedy", "JFK"),
        ("New York", "United States", "LaGuardia", "LGA"),
        ("Newark", "United States", "Newark Liberty", "EWR"),
        (
            "Ottawa",
            "Canada",
            "Ottawa Macdonald-Cartier International Airport",
            "YOW",
        ),
        ("Gatineau", "Canada", "Ottawa / Gatineau Airport", "YND"),
    ]
    .into_iter()
    .map(|(city, country, name, code)| RawAirport {
        city: city.to_string(),
        country: country.to_string(),
        name: name.to_string(),
        code: code.to_string(),
    })
    .collect()
}

/// Normalize one record; records without a code are unusable.
pub fn normalize_airport(raw: RawAirport) -> Option<Airport> {
    let code = raw.code.trim();
    if code.is_empty() {
        return None;
    }

    let keys = MatchKeys {
        city: fold_text(&raw.city),
        country: fold_text(&raw.country),
        name: fold_text(&raw.name),
        code: code.to_lowercase(),
    };

    Some(Airport {
        code: code.to_uppercase(),
        city: raw.city,
        country: raw.country,
        name: raw.name,
        keys,
    })
}

pub fn normalize_airports(raw: Vec<RawAirport>) -> Vec<Airport> {
    raw.into_iter().filter_map(normalize_airport).collect()
}

/// Owner of the current airport snapshot.
pub struct AirportCatalog {
    airports: ArcSwap<Vec<Airport>>,
}

impl Default for AirportCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AirportCatalog {
    /// Create a catalog seeded with the built-in fallback list.
    pub fn new() -> Self {
        Self::with_airports(normalize_airports(fallback_airports()))
    }

    /// Create a catalog over an already-normalized list.
    pub fn with_airports(airports: Vec<Airport>) -> Self {
        Self {
            airports: ArcSwap::from_pointee(airports),
        }
    }

    /// The current snapshot. Holding it pins that version across reloads.
    pub fn snapshot(&self) -> Arc<Vec<Airport>> {
        self.airports.load_full()
    }

    /// Reload from `source`, swapping in the new list only if it is usable.
    ///
    /// Never fails: errors and empty datasets keep the previous snapshot.
    /// Returns whichever snapshot is current afterwards.
    pub async fn load<S: CatalogSource>(&self, source: &S) -> Arc<Vec<Airport>> {
        match source.fetch().await {
            Ok(raw) => {
                let airports = normalize_airports(raw);
                if airports.is_empty() {
                    tracing::warn!(
                        source = %source.describe(),
                        "Airport dataset was empty, keeping current catalog"
                    );
                } else {
                    tracing::info!(
                        source = %source.describe(),
                        count = airports.len(),
                        "Loaded airport catalog"
                    );
                    self.airports.store(Arc::new(airports));
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = %source.describe(),
                    error = %e,
                    "Using current airport catalog, load failed"
                );
            }
        }

        self.snapshot()
    }
}
