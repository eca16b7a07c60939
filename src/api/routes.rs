//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ApiState>`.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::ApiError;
use crate::data::{parse_sports, EventSource};
use crate::fees::{FeeCalculator, MONEY_DP};
use crate::storage::BetStore;
use crate::types::{Bet, BetdeskError, Event, NewBet};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers. Read-only after startup.
pub struct ApiState {
    pub store: BetStore,
    pub events: Arc<dyn EventSource>,
    pub fees: FeeCalculator,
    /// Sports queried when `/events` has no `sports` parameter.
    pub default_sports: Vec<String>,
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A stake as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StakeInput {
    Number(serde_json::Number),
    Text(String),
}

impl StakeInput {
    pub fn to_decimal(&self) -> Result<Decimal, BetdeskError> {
        let raw = match self {
            StakeInput::Number(n) => n.to_string(),
            StakeInput::Text(s) => s.trim().to_string(),
        };
        let parsed = Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw));
        if let Ok(value) = parsed {
            return Ok(value);
        }
        // Numeric but beyond what Decimal holds (about 7.9e28).
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 1.0 => Err(BetdeskError::AmountOutOfRange {
                field: "stake",
                value: raw,
            }),
            _ => Err(BetdeskError::InvalidAmount {
                field: "stake",
                value: raw,
            }),
        }
    }
}

/// Body of `POST /bets`. Required fields are optional here so that a
/// missing one is reported as such rather than as malformed JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub event_id: Option<String>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub sport: Option<String>,
    pub odds: Option<f64>,
    pub stake: Option<StakeInput>,
    pub vip_xp: Option<i64>,
    pub vip_multiplier: Option<f64>,
}

/// A place-bet request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBet {
    pub event_id: String,
    pub team_a: String,
    pub team_b: String,
    pub sport: String,
    pub odds: Option<f64>,
    pub stake: Decimal,
    pub vip_xp: i64,
    pub vip_multiplier: f64,
}

impl PlaceBetRequest {
    pub fn validate(self) -> Result<ValidatedBet, ApiError> {
        let mut missing = Vec::new();
        let mut required = |name: &'static str, value: Option<String>| {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let event_id = required("eventId", self.event_id);
        let team_a = required("teamA", self.team_a);
        let team_b = required("teamB", self.team_b);
        let sport = required("sport", self.sport);

        if !missing.is_empty() {
            return Err(ApiError::MissingFields(missing.join(", ")));
        }

        let stake = self
            .stake
            .ok_or_else(|| ApiError::InvalidStake("Invalid stake".to_string()))?
            .to_decimal()
            .map_err(|e| match e {
                BetdeskError::AmountOutOfRange { .. } => {
                    ApiError::InvalidStake("Stake too large".to_string())
                }
                _ => ApiError::InvalidStake("Invalid stake".to_string()),
            })?;
        if stake <= Decimal::ZERO {
            return Err(ApiError::InvalidStake("Stake must be > 0".to_string()));
        }
        // Fees are charged in cents; a finer stake would not survive rounding.
        if stake.normalize().scale() > MONEY_DP {
            return Err(ApiError::InvalidStake(
                "Stake must be a whole number of cents".to_string(),
            ));
        }

        Ok(ValidatedBet {
            event_id,
            team_a,
            team_b,
            sport,
            odds: self.odds,
            stake,
            vip_xp: self.vip_xp.unwrap_or(1),
            vip_multiplier: self.vip_multiplier.unwrap_or(1.0),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsQuery {
    pub sports: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetResponse {
    pub success: bool,
    pub id: String,
    pub stake: Decimal,
    pub placement_fee: Decimal,
    pub total_charged: Decimal,
    pub win_fee_rate: Decimal,
    pub vip_xp: i64,
    pub vip_multiplier: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Bet> for PlaceBetResponse {
    fn from(bet: Bet) -> Self {
        Self {
            success: true,
            id: bet.id,
            stake: bet.stake,
            placement_fee: bet.placement_fee,
            total_charged: bet.total_charged,
            win_fee_rate: bet.win_fee_rate,
            vip_xp: bet.vip_xp,
            vip_multiplier: bet.vip_multiplier,
            created_at: bet.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /ping
pub async fn ping() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /bets
pub async fn list_bets(State(state): State<AppState>) -> Result<Json<Vec<Bet>>, ApiError> {
    let bets = state.store.list().await?;
    debug!(count = bets.len(), "Listing bets");
    Ok(Json(bets))
}

/// POST /bets
pub async fn place_bet(
    State(state): State<AppState>,
    payload: Result<Json<PlaceBetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PlaceBetResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    let bet = request.validate()?;

    let fees = state.fees.compute(bet.stake);

    let stored = state
        .store
        .create(NewBet {
            event_id: bet.event_id,
            team_a: bet.team_a,
            team_b: bet.team_b,
            sport: bet.sport,
            odds: bet.odds,
            stake: bet.stake,
            placement_fee: fees.placement_fee,
            total_charged: fees.total_charged,
            vip_xp: bet.vip_xp,
            vip_multiplier: bet.vip_multiplier,
            win_fee_rate: fees.win_fee_rate,
        })
        .await?;

    info!(
        id = %stored.id,
        event_id = %stored.event_id,
        stake = %stored.stake,
        placement_fee = %stored.placement_fee,
        total_charged = %stored.total_charged,
        "Bet placed"
    );

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// GET /events?sports=a,b,c
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<Event>> {
    let sports = query
        .sports
        .as_deref()
        .and_then(parse_sports)
        .unwrap_or_else(|| state.default_sports.clone());

    debug!(source = state.events.name(), sports = ?sports, "Listing events");
    Json(state.events.fetch_events(&sports).await)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
