// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Floor Ladder Driver

use crate::book::ListingBook;
use crate::rebuy;
use crate::sweep;
use crate::swap::{self, SyntheticPool};
use crate::types::{BudgetMode, FeeSchedule, LadderRow, PoolSnapshot, SimulationOutcome};

/// Ladder rung spacing, in percent.
pub const LADDER_STEP_PERCENT: u32 = 10;
/// Top rung, in percent.
pub const LADDER_MAX_PERCENT: u32 = 200;

/// Floor-increase targets: 10% through 200% in 10-point rungs.
pub fn percentages() -> impl Iterator<Item = u32> {
    (1..=LADDER_MAX_PERCENT / LADDER_STEP_PERCENT).map(|i| i * LADDER_STEP_PERCENT)
}

/// Run the sweep, swap, and rebuy pipeline once per rung against a fresh
/// pool. Each rung targets `bookFloor * (1 + p/100)` with a ceiling-mode
/// sweep. The ladder stops after the first rung that consumes the whole
/// strategy inventory; higher targets cannot add strategy volume beyond it.
pub fn run(
    book: &ListingBook,
    snapshot: &PoolSnapshot,
    fees: &FeeSchedule,
    strategy_inventory: u32,
) -> Vec<LadderRow> {
    let base_pool = match SyntheticPool::from_snapshot(snapshot) {
        Ok(pool) => pool,
        Err(_) => return Vec::new(),
    };
    let floor = match book.floor() {
        Some(floor) => floor,
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    for percent in percentages() {
        let target = floor * (1.0 + percent as f64 / 100.0);
        let budget = sweep::resolve_budget(book, BudgetMode::Ceiling, target);
        let (result, resume) = sweep::consume_budget(book, budget);

        let mut pool = base_pool;
        let swap_outcome = swap::execute(&mut pool, result.strategy_volume, fees);
        let rebuy_outcome = rebuy::execute(book, resume, swap_outcome.primary_fee_total);

        let exhausted = result.strategy_count >= strategy_inventory;
        rows.push(LadderRow {
            percent,
            target_floor: target,
            total_cost_eth: result.total_volume(),
            total_nft_count: result.total_count(),
            inventory_exhausted: exhausted,
            outcome: SimulationOutcome {
                available: true,
                budget_eth: budget,
                sweep: result,
                swap: swap_outcome,
                rebuy: Some(rebuy_outcome),
            },
        });
        if exhausted {
            break;
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
