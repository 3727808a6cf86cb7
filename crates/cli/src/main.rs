//! Command-line front end for SkyScout flight search.
//!
//! Usage:
//!     skyscout airports "new york"
//!     skyscout resolve "London, United Kingdom - Heathrow (LHR)"
//!     skyscout search --from Ottawa --to Tokyo --depart 2024-11-01 --adults 2
//!     skyscout health

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use skyscout_backend_amadeus::{AmadeusConfig, AmadeusTransport, OfferTransport};
use skyscout_catalog::{AirportCatalog, FileCatalogSource, HttpCatalogSource};
use skyscout_display::{FlightCard, NO_RESULTS};
use skyscout_model::{CabinClass, SearchRequest};
use skyscout_resolve::Resolver;
use skyscout_search::{SearchOrchestrator, SearchOutcome};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "skyscout")]
#[command(about = "Search flights by airport name or code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Amadeus API base URL
    #[arg(long, env = "AMADEUS_BASE", default_value = "https://test.api.amadeus.com")]
    amadeus_url: String,

    /// Amadeus client id
    #[arg(long, env = "AMADEUS_CLIENT_ID", default_value = "", hide_env_values = true)]
    client_id: String,

    /// Amadeus client secret
    #[arg(long, env = "AMADEUS_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    client_secret: String,

    /// Airport dataset (JSON array), as a file path or http(s) URL
    #[arg(long, env = "SKYSCOUT_AIRPORTS")]
    airports: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List airport suggestions for some text
    Airports {
        /// Text to match (city, country, airport name or code)
        query: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Resolve text to an IATA code
    Resolve {
        /// Free text or a suggestion label
        text: String,

        /// Code of a previously picked suggestion
        #[arg(long)]
        hint: Option<String>,
    },

    /// Search flights (falls back to demo data when the provider is unavailable)
    Search {
        /// Origin text or code
        #[arg(long)]
        from: String,

        /// Destination text or code
        #[arg(long)]
        to: String,

        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        depart: Option<NaiveDate>,

        /// Return date (YYYY-MM-DD) for round trips
        #[arg(long = "return")]
        return_date: Option<NaiveDate>,

        /// Adult passengers (1-9)
        #[arg(short, long, default_value = "1")]
        adults: u8,

        /// Cabin (economy, premium-economy, business, first)
        #[arg(short, long, value_parser = parse_cabin)]
        cabin: Option<CabinClass>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check provider credentials
    Health,
}

fn parse_cabin(s: &str) -> Result<CabinClass, String> {
    CabinClass::parse(s).ok_or_else(|| format!("unknown cabin '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skyscout=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AmadeusConfig {
        base_url: cli.amadeus_url,
        client_id: cli.client_id,
        client_secret: cli.client_secret,
        ..Default::default()
    };
    let transport = AmadeusTransport::new(config)?;
    let catalog = load_catalog(cli.airports.as_deref()).await?;
    let resolver = Resolver::new(catalog);

    match cli.command {
        Commands::Airports { query, format } => {
            run_airports(&resolver, &query, &format)?;
        }
        Commands::Resolve { text, hint } => {
            println!("{}", resolver.resolve_code(&text, hint.as_deref()));
        }
        Commands::Search {
            from,
            to,
            depart,
            return_date,
            adults,
            cabin,
            format,
        } => {
            let request = SearchRequest::new(from, to)
                .with_dates(depart, return_date)
                .with_adults(adults)
                .with_cabin(cabin);
            let orchestrator = SearchOrchestrator::new(resolver, transport);
            let outcome = orchestrator.execute(&request).await;
            print_outcome(&outcome, &format)?;
        }
        Commands::Health => {
            run_health(&transport).await;
        }
    }

    Ok(())
}

async fn load_catalog(location: Option<&str>) -> Result<Arc<AirportCatalog>> {
    let catalog = Arc::new(AirportCatalog::new());

    match location {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            catalog.load(&HttpCatalogSource::new(url)?).await;
        }
        Some(path) => {
            catalog.load(&FileCatalogSource::new(path)).await;
        }
        None => {
            tracing::debug!("No airport dataset configured, using built-in list");
        }
    }

    Ok(catalog)
}

fn run_airports(resolver: &Resolver, query: &str, format: &str) -> Result<()> {
    let ranked = resolver.rank(query);

    if format == "json" {
        let airports: Vec<_> = ranked.iter().map(|s| &s.airport).collect();
        println!("{}", serde_json::to_string_pretty(&airports)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No airports match '{}'", query);
    }
    for scored in &ranked {
        println!("{:>4}  {}", scored.score, scored.airport.label());
    }

    Ok(())
}

fn print_outcome(outcome: &SearchOutcome, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!(
        "[{}] {} → {}",
        outcome.source, outcome.from_code, outcome.to_code
    );
    println!("---");

    if outcome.items.is_empty() {
        println!("{}", NO_RESULTS);
        return Ok(());
    }

    for (i, item) in outcome.items.iter().enumerate() {
        let card = FlightCard::from_item(item);
        println!("\n{}. [{}] {}  {}", i + 1, card.badge, card.times, card.price);
        println!("   {}", card.carriers);

        let mut meta = vec![card.duration.clone(), card.stops.clone()];
        if !card.stop_codes.is_empty() {
            meta.push(card.stop_codes.clone());
        }
        meta.push(card.emissions.clone());
        println!("   {}", meta.join(" · "));

        for (j, segment) in card.segments.iter().enumerate() {
            println!(
                "     {} {} → {} {}",
                segment.from, segment.departs, segment.to, segment.arrives
            );
            if let Some(layover) = card.layovers.get(j) {
                println!(
                    "       Layover {} · {}",
                    layover.airport,
                    skyscout_display::format_duration(layover.minutes)
                );
            }
        }
    }

    println!("\n---");
    println!("Total: {} results", outcome.items.len());

    Ok(())
}

async fn run_health(transport: &AmadeusTransport) {
    print!("Checking {} credentials... ", transport.name());

    match transport.health_check().await {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
