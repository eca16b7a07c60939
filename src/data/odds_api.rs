//! The Odds API (v4) event feed.
//!
//! Fetches head-to-head odds per sport and flattens them into `Event`s
//! with a single averaged price for display.
//!
//! API: `GET {base}/sports/{sport}/odds?regions=us&markets=h2h&oddsFormat=decimal&apiKey=...`
//! Auth: `apiKey` query parameter. Each call costs quota, so nothing here
//! retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::EventSource;
use crate::config::OddsApiConfig;
use crate::types::Event;

const SOURCE_NAME: &str = "the-odds-api";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

/// One element of the `/odds` response array. Bookmakers stay untyped so
/// a malformed odds tree only costs the price, not the event.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    home_team: Option<String>,
    #[serde(default)]
    away_team: Option<String>,
    #[serde(default)]
    commence_time: Option<String>,
    #[serde(default)]
    bookmakers: Value,
}

impl RawEvent {
    /// Away team goes first, matching what clients display.
    fn into_event(self, sport: &str) -> Event {
        let odds = average_price(&self.bookmakers);
        Event {
            id: self.id,
            team_a: self.away_team,
            team_b: self.home_team,
            sport: sport.to_string(),
            odds,
            start_time: self.commence_time,
        }
    }
}

/// Mean of the numeric outcome prices in the first bookmaker's first
/// market, rounded to 2 dp. `None` if any step of the path is missing or
/// no price is numeric.
fn average_price(bookmakers: &Value) -> Option<f64> {
    let outcomes = bookmakers
        .get(0)?
        .get("markets")?
        .get(0)?
        .get("outcomes")?
        .as_array()?;

    let prices: Vec<f64> = outcomes
        .iter()
        .filter_map(|o| o.get("price")?.as_f64())
        .collect();

    if prices.is_empty() {
        return None;
    }

    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    // Formatting rounds the exact binary value, so 1.045 (stored just
    // below) becomes 1.04.
    format!("{mean:.2}").parse().ok()
}

/// Decode a response body into events, skipping elements that are not
/// event objects.
fn parse_events(body: &str, sport: &str) -> Result<Vec<Event>> {
    let raw: Vec<Value> =
        serde_json::from_str(body).context("Odds API response is not a JSON array")?;

    let mut events = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<RawEvent>(value) {
            Ok(ev) => events.push(ev.into_event(sport)),
            Err(e) => debug!(sport, error = %e, "Skipping malformed event"),
        }
    }
    Ok(events)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Odds API client.
pub struct OddsGateway {
    http: Client,
    base_url: String,
    api_key: SecretString,
    regions: String,
    markets: String,
    odds_format: String,
}

impl OddsGateway {
    pub fn new(config: &OddsApiConfig, api_key: SecretString) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent("BETDESK/0.1.0")
            .build()
            .context("Failed to build HTTP client for the Odds API")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            regions: config.regions.clone(),
            markets: config.markets.clone(),
            odds_format: config.odds_format.clone(),
        })
    }

    /// Fetch and normalise the events for one sport.
    async fn fetch_sport(&self, sport: &str) -> Result<Vec<Event>> {
        let url = format!(
            "{}/sports/{}/odds",
            self.base_url,
            urlencoding::encode(sport)
        );

        debug!(url = %url, "Fetching odds");

        // `without_url` keeps the api key in the query string out of logs.
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("regions", self.regions.as_str()),
                ("markets", self.markets.as_str()),
                ("oddsFormat", self.odds_format.as_str()),
                ("apiKey", self.api_key.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Odds API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Odds API error {status}");
        }

        let body = resp
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read Odds API response")?;

        parse_events(&body, sport)
    }
}

#[async_trait]
impl EventSource for OddsGateway {
    async fn fetch_events(&self, sports: &[String]) -> Vec<Event> {
        let mut all_events = Vec::new();

        for sport in sports {
            match self.fetch_sport(sport).await {
                Ok(events) => {
                    debug!(sport = %sport, count = events.len(), "Sport fetched");
                    all_events.extend(events);
                }
                Err(e) => {
                    warn!(sport = %sport, error = %format!("{e:#}"), "Skipping sport");
                }
            }
        }

        info!(
            sports = sports.len(),
            events = all_events.len(),
            "Events aggregated"
        );
        all_events
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
