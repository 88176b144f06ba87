// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Type Definitions

use serde::{Serialize, Deserialize};

use crate::parse;

/// Nominal quote price substituted when the feed sends a zero or garbage
/// quote figure. Base price and liquidity have no such rescue; they gate
/// availability instead.
pub const QUOTE_PRICE_FALLBACK_USD: f64 = 3000.0;

// ─── Listing Source ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListingSource {
    #[serde(rename = "strategy")]
    Strategy,
    #[serde(rename = "opensea")]
    OpenSea,
    #[serde(rename = "Cryptopunks")]
    Punks,
    #[serde(other)]
    Other,
}

impl Default for ListingSource {
    fn default() -> Self { ListingSource::Other }
}

impl ListingSource {
    /// Strategy-owned inventory. Every other tag, recognized marketplace or
    /// not, counts as marketplace so an unknown origin is never mistaken for
    /// inventory the strategy controls.
    pub fn is_strategy(&self) -> bool {
        matches!(self, Self::Strategy)
    }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    #[serde(default, alias = "tokenId", deserialize_with = "parse::de_string_like")]
    pub id: String,
    #[serde(default, deserialize_with = "parse::de_loose_f64")]
    pub price: f64,
    #[serde(default)]
    pub source: ListingSource,
}

impl Listing {
    pub fn new(id: impl Into<String>, price: f64, source: ListingSource) -> Self {
        Self { id: id.into(), price, source }
    }
}

// ─── Pool Snapshot ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PoolSnapshot {
    pub base_price_usd: f64,
    pub quote_price_usd: f64,
    pub liquidity_usd: f64,
    pub fdv_usd: f64,
}

impl PoolSnapshot {
    /// Build from the aggregator's raw string payload.
    pub fn from_raw(
        base_price_usd: &str,
        quote_price_usd: &str,
        liquidity_usd: &str,
        fdv_usd: &str,
    ) -> Self {
        Self {
            base_price_usd: parse::loose_f64(base_price_usd),
            quote_price_usd: parse::loose_f64_or(quote_price_usd, QUOTE_PRICE_FALLBACK_USD),
            liquidity_usd: parse::loose_f64(liquidity_usd),
            fdv_usd: parse::loose_f64(fdv_usd),
        }
    }

    /// Usable when every figure that seeds a reserve is finite and strictly
    /// positive. Anything else voids the simulation rather than letting
    /// NaN/Infinity leak into results.
    pub fn is_available(&self) -> bool {
        parse::finite_positive(self.base_price_usd)
            && parse::finite_positive(self.quote_price_usd)
            && parse::finite_positive(self.liquidity_usd)
    }
}

// ─── Budget Mode ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BudgetMode {
    /// ETH budget taken as-is.
    Volume = 0,
    /// Listing count; budget is the summed price of the first N listings.
    Count = 1,
    /// Target price; budget is the summed price of listings at or below it.
    Ceiling = 2,
}

// ─── Fee Schedule ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeeSchedule {
    pub primary_rate: f64,
    pub secondary_rate: f64,
    pub tertiary_rate: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { primary_rate: 0.08, secondary_rate: 0.01, tertiary_rate: 0.01 }
    }
}

impl FeeSchedule {
    /// Share of every chunk that never reaches the pool.
    pub fn total_rate(&self) -> f64 {
        self.primary_rate + self.secondary_rate + self.tertiary_rate
    }
}

// ─── Sweep Result ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct SweepResult {
    pub marketplace_count: u32,
    pub marketplace_volume: f64,
    pub strategy_count: u32,
    pub strategy_volume: f64,
    pub leftover_budget: f64,
}

impl SweepResult {
    pub fn total_count(&self) -> u32 {
        self.marketplace_count + self.strategy_count
    }

    pub fn total_volume(&self) -> f64 {
        self.marketplace_volume + self.strategy_volume
    }
}

// ─── Swap Step ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SwapStep {
    /// 1-based chunk index.
    pub step: u32,
    pub raw_in: f64,
    pub primary_fee: f64,
    pub secondary_fee: f64,
    pub tertiary_fee: f64,
    pub tokens_bought: f64,
    /// Spot price after this chunk, in quote units (ETH per token).
    pub price_quote: f64,
    pub price_usd: f64,
    pub market_cap_usd: f64,
    /// Price move of this chunk relative to the previous spot, in percent.
    #[serde(default)]
    pub impact_percent: f64,
}

// ─── Swap Outcome ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SwapOutcome {
    pub steps: Vec<SwapStep>,
    pub tokens_burned: f64,
    pub primary_fee_total: f64,
    pub secondary_fee_total: f64,
    pub tertiary_fee_total: f64,
    pub fee_total: f64,
    pub final_price_quote: f64,
    pub final_price_usd: f64,
    pub final_market_cap_usd: f64,
    /// Cumulative move from the starting price, in percent.
    pub price_impact_percent: f64,
    /// True when the loop halted early (drained reserve or chunk ceiling).
    #[serde(default)]
    pub truncated: bool,
}

// ─── Rebuy Outcome ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct RebuyOutcome {
    pub count: u32,
    pub spend: f64,
    pub leftover: f64,
}

// ─── Simulation Outcome ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SimulationOutcome {
    /// False is the sentinel for a snapshot whose pool figures cannot seed
    /// finite reserves; every aggregate below is zero in that case.
    pub available: bool,
    /// Resolved ETH budget the sweep ran with.
    pub budget_eth: f64,
    pub sweep: SweepResult,
    pub swap: SwapOutcome,
    #[serde(default)]
    pub rebuy: Option<RebuyOutcome>,
}

impl SimulationOutcome {
    pub fn unavailable() -> Self {
        Self { available: false, ..Self::default() }
    }
}

// ─── Ladder Row ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LadderRow {
    /// Floor increase this row targets, in percent.
    pub percent: u32,
    pub target_floor: f64,
    /// Combined marketplace + strategy spend.
    pub total_cost_eth: f64,
    pub total_nft_count: u32,
    /// True when this rung consumed the strategy's whole inventory; the
    /// ladder stops after emitting it.
    pub inventory_exhausted: bool,
    pub outcome: SimulationOutcome,
}

// ─── Depth Bucket ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DepthBucket {
    pub start: f64,
    /// Exclusive upper bound; equals the next generated bucket's start.
    pub end: f64,
    pub strategy_count: u32,
    pub marketplace_count: u32,
    pub volume: f64,
    /// Listing volume in this and every prior band.
    #[serde(default)]
    pub cumulative_volume: f64,
}

// ─── Depth KPIs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct DepthKpis {
    /// Lowest strategy-owned price.
    pub local_floor: Option<f64>,
    /// External marketplace floor, or the book's own when none is supplied.
    pub reference_floor: Option<f64>,
    pub spread_percent: Option<f64>,
    /// True when the strategy floor undercuts the marketplace (dominance);
    /// false means marketplace listings wall it off.
    pub is_leading: bool,
    pub dominance_count: u32,
    pub dominance_volume: f64,
    pub wall_count: u32,
    pub wall_volume: f64,
    /// Burn pressure: tokens burned if the undercutting inventory were swept.
    pub tokens_burned: f64,
    pub price_impact_percent: f64,
}

// ─── Depth View ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DepthView {
    pub buckets: Vec<DepthBucket>,
    pub kpis: DepthKpis,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum SimError {
    #[error("pool snapshot unavailable -- cannot derive finite reserves")]
    Unavailable,
    #[error("liquidity exhausted -- token reserve depleted")]
    LiquidityExhausted,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_wire_shapes() {
        // Aggregator payload: tokenId as number, price as string
        let l: Listing =
            serde_json::from_str(r#"{"tokenId": 8721, "price": "1.25", "source": "opensea"}"#)
                .unwrap();
        assert_eq!(l.id, "8721");
        assert_eq!(l.price, 1.25);
        assert_eq!(l.source, ListingSource::OpenSea);

        // Unknown marketplaces deserialize as Other, never fail
        let l: Listing =
            serde_json::from_str(r#"{"id": "9", "price": 2.0, "source": "blur"}"#).unwrap();
        assert_eq!(l.source, ListingSource::Other);
        assert!(!l.source.is_strategy());

        // Missing source defaults to Other (marketplace-class)
        let l: Listing = serde_json::from_str(r#"{"id": "10", "price": 0.5}"#).unwrap();
        assert_eq!(l.source, ListingSource::Other);

        // Malformed price coerces to zero
        let l: Listing =
            serde_json::from_str(r#"{"id": "11", "price": "??", "source": "strategy"}"#).unwrap();
        assert_eq!(l.price, 0.0);
        assert!(l.source.is_strategy());
    }

    #[test]
    fn test_listing_source_roundtrip() {
        let json = serde_json::to_string(&ListingSource::Punks).unwrap();
        assert_eq!(json, "\"Cryptopunks\"");
        let back: ListingSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ListingSource::Punks);
    }

    #[test]
    fn test_snapshot_from_raw() {
        let snap = PoolSnapshot::from_raw("0.001", "3000", "1000000", "4000000");
        assert_eq!(snap.base_price_usd, 0.001);
        assert_eq!(snap.quote_price_usd, 3000.0);
        assert_eq!(snap.liquidity_usd, 1_000_000.0);
        assert_eq!(snap.fdv_usd, 4_000_000.0);
        assert!(snap.is_available());
    }

    #[test]
    fn test_snapshot_quote_fallback() {
        let snap = PoolSnapshot::from_raw("0.001", "not a number", "500000", "0");
        assert_eq!(snap.quote_price_usd, QUOTE_PRICE_FALLBACK_USD);
        assert!(snap.is_available());
    }

    #[test]
    fn test_snapshot_unavailable_states() {
        // Zero base price
        assert!(!PoolSnapshot::from_raw("0", "3000", "1000000", "0").is_available());
        // Empty liquidity coerces to zero
        assert!(!PoolSnapshot::from_raw("0.001", "3000", "", "0").is_available());
        // Negative liquidity
        assert!(!PoolSnapshot::from_raw("0.001", "3000", "-5", "0").is_available());
    }

    #[test]
    fn test_fee_schedule_defaults() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.primary_rate, 0.08);
        assert_eq!(fees.secondary_rate, 0.01);
        assert_eq!(fees.tertiary_rate, 0.01);
        assert!((fees.total_rate() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_unavailable_outcome_is_zeroed() {
        let outcome = SimulationOutcome::unavailable();
        assert!(!outcome.available);
        assert_eq!(outcome.sweep.total_count(), 0);
        assert!(outcome.swap.steps.is_empty());
        assert!(outcome.rebuy.is_none());
    }
}
