//! Shared types for the BETDESK service.
//!
//! These types form the data model used across all modules, so that the
//! storage, data and api modules can depend on them without circular
//! references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency label used when rendering stakes.
pub const STAKE_CURRENCY: &str = "LE";

// ---------------------------------------------------------------------------
// Bet status
// ---------------------------------------------------------------------------

/// Lifecycle status of a bet. Only `Pending` is ever assigned here;
/// `Won` and `Lost` are reserved for settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = BetdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BetStatus::Pending),
            "won" => Ok(BetStatus::Won),
            "lost" => Ok(BetStatus::Lost),
            other => Err(BetdeskError::InvalidStatus(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet
// ---------------------------------------------------------------------------

/// A persisted wager on a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: String,
    /// Provider event id the bet was placed against.
    pub event_id: String,
    pub team_a: String,
    pub team_b: String,
    pub sport: String,
    /// Decimal odds shown to the user when the bet was placed.
    pub odds: Option<f64>,
    pub stake: Decimal,
    pub placement_fee: Decimal,
    /// Always `stake + placement_fee`.
    pub total_charged: Decimal,
    pub win_fee_rate: Decimal,
    pub vip_xp: i64,
    pub vip_multiplier: f64,
    pub status: BetStatus,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} vs {} • {} {STAKE_CURRENCY}",
            self.sport, self.team_a, self.team_b, self.stake
        )
    }
}

/// Everything needed to persist a bet; id, status and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBet {
    pub event_id: String,
    pub team_a: String,
    pub team_b: String,
    pub sport: String,
    pub odds: Option<f64>,
    pub stake: Decimal,
    pub placement_fee: Decimal,
    pub total_charged: Decimal,
    pub vip_xp: i64,
    pub vip_multiplier: f64,
    pub win_fee_rate: Decimal,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A sporting event as served by `/events`. Built fresh per request,
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<String>,
    /// The provider's away team.
    #[serde(rename = "teamA")]
    pub team_a: Option<String>,
    /// The provider's home team.
    #[serde(rename = "teamB")]
    pub team_b: Option<String>,
    pub sport: String,
    /// Mean of the first bookmaker's h2h prices, 2 dp.
    pub odds: Option<f64>,
    pub start_time: Option<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for BETDESK.
#[derive(Debug, thiserror::Error)]
pub enum BetdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid bet status: {0}")]
    InvalidStatus(String),

    #[error("Invalid amount in {field}: {value}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("Amount in {field} is out of range: {value}")]
    AmountOutOfRange { field: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
