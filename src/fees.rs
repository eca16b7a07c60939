//! Fee calculation.
//!
//! Computes the placement fee and total charge for a stake using the
//! configured rates. The win fee rate is carried through untouched so it
//! can be snapshotted onto the bet for settlement.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::FeeConfig;

/// Monetary amounts are kept to cents.
pub const MONEY_DP: u32 = 2;

// ---------------------------------------------------------------------------
// Fee breakdown
// ---------------------------------------------------------------------------

/// Fees computed for a single stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub placement_fee: Decimal,
    /// `stake + placement_fee`, rounded to cents.
    pub total_charged: Decimal,
    pub win_fee_rate: Decimal,
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FeeCalculator {
    config: FeeConfig,
}

impl FeeCalculator {
    pub fn new(config: FeeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Compute fees for a stake. The caller has already checked `stake > 0`
    /// and that it is a whole number of cents.
    pub fn compute(&self, stake: Decimal) -> FeeBreakdown {
        let placement_fee = round_money(stake.saturating_mul(self.config.placement_rate));
        let total_charged = round_money(stake.saturating_add(placement_fee));

        FeeBreakdown {
            placement_fee,
            total_charged,
            win_fee_rate: self.config.win_fee_rate,
        }
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self::new(FeeConfig::default())
    }
}

/// Round half away from zero to cents.
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
