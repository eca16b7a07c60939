//! Persistence layer.
//!
//! Stores bets in a single SQLite table via `sqlx`. Money columns are
//! kept as TEXT so `Decimal` values round-trip exactly.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{Bet, BetStatus, BetdeskError, NewBet};

/// SQLite-backed store for bets. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct BetStore {
    pool: Pool<Sqlite>,
}

impl BetStore {
    /// Open (creating if needed) the database at `database_url` and
    /// initialise the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");

        if !in_memory {
            if let Some(path) = database_url.strip_prefix("sqlite:") {
                let path = path.trim_start_matches("//");
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)
                            .context("Failed to create database directory")?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true);

        // Each in-memory connection is its own database, so keep exactly one alive.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!(in_memory, "Bet store initialized");
        Ok(store)
    }

    /// Fresh in-memory store, used by tests.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bets (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL,
                team_a TEXT NOT NULL,
                team_b TEXT NOT NULL,
                sport TEXT NOT NULL,
                odds REAL,
                stake TEXT NOT NULL,
                placement_fee TEXT NOT NULL,
                total_charged TEXT NOT NULL,
                vip_xp INTEGER NOT NULL DEFAULT 1,
                vip_multiplier REAL NOT NULL DEFAULT 1.0,
                win_fee_rate TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create bets table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_bets_created_at
            ON bets (created_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create bets index")?;

        Ok(())
    }

    /// Persist a new pending bet and return the stored record.
    pub async fn create(&self, new_bet: NewBet) -> Result<Bet> {
        let bet = Bet {
            id: Uuid::new_v4().to_string(),
            event_id: new_bet.event_id,
            team_a: new_bet.team_a,
            team_b: new_bet.team_b,
            sport: new_bet.sport,
            odds: new_bet.odds,
            stake: new_bet.stake,
            placement_fee: new_bet.placement_fee,
            total_charged: new_bet.total_charged,
            win_fee_rate: new_bet.win_fee_rate,
            vip_xp: new_bet.vip_xp,
            vip_multiplier: new_bet.vip_multiplier,
            status: BetStatus::Pending,
            // Truncated to the stored precision so the returned record matches a later read.
            created_at: Utc::now().trunc_subsecs(6),
        };

        sqlx::query(
            r#"
            INSERT INTO bets (
                id, event_id, team_a, team_b, sport, odds,
                stake, placement_fee, total_charged,
                vip_xp, vip_multiplier, win_fee_rate,
                status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&bet.id)
        .bind(&bet.event_id)
        .bind(&bet.team_a)
        .bind(&bet.team_b)
        .bind(&bet.sport)
        .bind(bet.odds)
        .bind(bet.stake.to_string())
        .bind(bet.placement_fee.to_string())
        .bind(bet.total_charged.to_string())
        .bind(bet.vip_xp)
        .bind(bet.vip_multiplier)
        .bind(bet.win_fee_rate.to_string())
        .bind(bet.status.as_str())
        .bind(timestamp_to_db(&bet.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to insert bet")?;

        debug!(id = %bet.id, bet = %bet, "Bet stored");
        Ok(bet)
    }

    /// All bets, most recently created first.
    pub async fn list(&self) -> Result<Vec<Bet>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_id, team_a, team_b, sport, odds,
                   stake, placement_fee, total_charged,
                   vip_xp, vip_multiplier, win_fee_rate,
                   status, created_at
            FROM bets
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch bets")?;

        rows.iter().map(row_to_bet).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bets")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count bets")?;
        Ok(count as u64)
    }

    /// Close the pool. Subsequent operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Fixed-width UTC timestamps sort lexically in creation order.
fn timestamp_to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| {
        BetdeskError::InvalidAmount {
            field,
            value: value.to_string(),
        }
        .into()
    })
}

fn row_to_bet(row: &SqliteRow) -> Result<Bet> {
    let stake: String = row.try_get("stake")?;
    let placement_fee: String = row.try_get("placement_fee")?;
    let total_charged: String = row.try_get("total_charged")?;
    let win_fee_rate: String = row.try_get("win_fee_rate")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;

    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .with_context(|| format!("Invalid created_at in bets table: {created_at}"))?
        .with_timezone(&Utc);

    Ok(Bet {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        team_a: row.try_get("team_a")?,
        team_b: row.try_get("team_b")?,
        sport: row.try_get("sport")?,
        odds: row.try_get("odds")?,
        stake: parse_decimal("stake", &stake)?,
        placement_fee: parse_decimal("placement_fee", &placement_fee)?,
        total_charged: parse_decimal("total_charged", &total_charged)?,
        win_fee_rate: parse_decimal("win_fee_rate", &win_fee_rate)?,
        vip_xp: row.try_get("vip_xp")?,
        vip_multiplier: row.try_get("vip_multiplier")?,
        status: status.parse()?,
        created_at,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
