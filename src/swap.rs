// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Chunked AMM Swap

use serde::{Serialize, Deserialize};

use crate::parse;
use crate::types::{FeeSchedule, PoolSnapshot, SimError, SwapOutcome, SwapStep};

/// One swap chunk in base-asset (ETH) units.
pub const CHUNK_SIZE: f64 = 1.0;
/// Remaining volume at or below this is dust and ends the loop.
pub const DUST_THRESHOLD: f64 = 1e-6;
/// Hard ceiling on chunk count. The dust threshold alone cannot rule out a
/// remainder that stops shrinking once float granularity exceeds the chunk.
pub const MAX_STEPS: usize = 500;

// ---------------------------------------------------------------------------
// SyntheticPool - reserves reconstructed from aggregate USD figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SyntheticPool {
    pub eth_reserve: f64,
    pub token_reserve: f64,
    pub quote_price_usd: f64,
    pub initial_price_usd: f64,
    pub initial_fdv_usd: f64,
}

impl SyntheticPool {
    /// Attribute half the pool's USD liquidity to each side and convert at
    /// the respective asset's USD price.
    pub fn from_snapshot(snapshot: &PoolSnapshot) -> Result<Self, SimError> {
        if !snapshot.is_available() {
            return Err(SimError::Unavailable);
        }
        let eth_reserve = (snapshot.liquidity_usd / 2.0) / snapshot.quote_price_usd;
        let token_reserve = (snapshot.liquidity_usd / 2.0) / snapshot.base_price_usd;
        if !parse::finite_positive(eth_reserve) || !parse::finite_positive(token_reserve) {
            return Err(SimError::Unavailable);
        }
        Ok(Self {
            eth_reserve,
            token_reserve,
            quote_price_usd: snapshot.quote_price_usd,
            initial_price_usd: snapshot.base_price_usd,
            initial_fdv_usd: snapshot.fdv_usd,
        })
    }

    /// Spot price in quote units (ETH per token).
    pub fn price_quote(&self) -> f64 {
        self.eth_reserve / self.token_reserve
    }

    /// Spot price in USD.
    pub fn price_usd(&self) -> f64 {
        self.price_quote() * self.quote_price_usd
    }

    /// Market cap scaled from the initial FDV by price movement.
    pub fn market_cap_usd(&self) -> f64 {
        self.initial_fdv_usd * (self.price_usd() / self.initial_price_usd)
    }

    /// Constant-product output for `net_in`, applied to the reserves. Fails
    /// when the output would drain the token side.
    fn swap_chunk(&mut self, net_in: f64) -> Result<f64, SimError> {
        let amount_out = (net_in * self.token_reserve) / (self.eth_reserve + net_in);
        if !amount_out.is_finite() || amount_out >= self.token_reserve {
            return Err(SimError::LiquidityExhausted);
        }
        self.eth_reserve += net_in;
        self.token_reserve -= amount_out;
        Ok(amount_out)
    }
}

// ---------------------------------------------------------------------------
// Chunked execution
// ---------------------------------------------------------------------------

/// Route `volume_eth` through the pool in bounded chunks. Each chunk sheds
/// its fee split before the swap; only the net portion enters the reserve,
/// so fees permanently leave the system. `truncated` reports an early halt.
pub fn execute(pool: &mut SyntheticPool, volume_eth: f64, fees: &FeeSchedule) -> SwapOutcome {
    let initial_price_usd = pool.initial_price_usd;
    let mut outcome = SwapOutcome {
        final_price_quote: pool.price_quote(),
        final_price_usd: pool.price_usd(),
        final_market_cap_usd: pool.market_cap_usd(),
        ..SwapOutcome::default()
    };

    let mut remaining = if volume_eth.is_finite() { volume_eth } else { 0.0 };

    while remaining > DUST_THRESHOLD {
        if outcome.steps.len() >= MAX_STEPS {
            outcome.truncated = true;
            break;
        }

        let raw_in = remaining.min(CHUNK_SIZE);
        let primary_fee = raw_in * fees.primary_rate;
        let secondary_fee = raw_in * fees.secondary_rate;
        let tertiary_fee = raw_in * fees.tertiary_rate;
        let net_in = raw_in * (1.0 - fees.total_rate());

        let prev_price_quote = pool.price_quote();
        let tokens_bought = match pool.swap_chunk(net_in) {
            Ok(out) => out,
            Err(_) => {
                outcome.truncated = true;
                break;
            }
        };

        outcome.primary_fee_total += primary_fee;
        outcome.secondary_fee_total += secondary_fee;
        outcome.tertiary_fee_total += tertiary_fee;
        outcome.tokens_burned += tokens_bought;
        remaining -= raw_in;

        let price_quote = pool.price_quote();
        outcome.steps.push(SwapStep {
            step: outcome.steps.len() as u32 + 1,
            raw_in,
            primary_fee,
            secondary_fee,
            tertiary_fee,
            tokens_bought,
            price_quote,
            price_usd: pool.price_usd(),
            market_cap_usd: pool.market_cap_usd(),
            impact_percent: (price_quote - prev_price_quote) / prev_price_quote * 100.0,
        });
    }

    outcome.fee_total =
        outcome.primary_fee_total + outcome.secondary_fee_total + outcome.tertiary_fee_total;
    if let Some(last) = outcome.steps.last() {
        outcome.final_price_quote = last.price_quote;
        outcome.final_price_usd = last.price_usd;
        outcome.final_market_cap_usd = last.market_cap_usd;
        outcome.price_impact_percent = (last.price_usd / initial_price_usd - 1.0) * 100.0;
    }
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
