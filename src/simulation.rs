// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Simulation Core

use wasm_bindgen::prelude::*;

use crate::book::ListingBook;
use crate::depth;
use crate::ladder;
use crate::rebuy;
use crate::swap::{self, SyntheticPool};
use crate::sweep;
use crate::types::*;

// ─── MarketSimulation struct ─────────────────────────────────────────────────

#[wasm_bindgen]
pub struct MarketSimulation {
    pub(crate) snapshot: PoolSnapshot,
    pub(crate) book: ListingBook,
    pub(crate) fees: FeeSchedule,
    pub(crate) reference_floor: Option<f64>,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl MarketSimulation {
    pub fn from_parts(snapshot: PoolSnapshot, listings: &[Listing], fees: FeeSchedule) -> Self {
        Self { snapshot, book: ListingBook::new(listings), fees, reference_floor: None }
    }

    /// Swap in a fresh listing snapshot; the pool and fee schedule stay.
    pub fn set_listings(&mut self, listings: &[Listing]) {
        self.book = ListingBook::new(listings);
    }

    pub fn set_reference_floor(&mut self, floor: Option<f64>) {
        self.reference_floor = floor;
    }

    /// One full pipeline run: resolve the budget, sweep the book, route the
    /// strategy share through the pool, then spend the primary fees on what
    /// the sweep left behind.
    pub fn simulate_core(&self, mode: BudgetMode, value: f64) -> SimulationOutcome {
        let mut pool = match SyntheticPool::from_snapshot(&self.snapshot) {
            Ok(pool) => pool,
            Err(_) => return SimulationOutcome::unavailable(),
        };
        let budget = sweep::resolve_budget(&self.book, mode, value);
        let (result, resume) = sweep::consume_budget(&self.book, budget);
        let swap_outcome = swap::execute(&mut pool, result.strategy_volume, &self.fees);
        let rebuy_outcome = rebuy::execute(&self.book, resume, swap_outcome.primary_fee_total);
        SimulationOutcome {
            available: true,
            budget_eth: budget,
            sweep: result,
            swap: swap_outcome,
            rebuy: Some(rebuy_outcome),
        }
    }

    /// Floor ladder over the book. `inventory_override` substitutes for the
    /// book's own strategy count when the caller tracks inventory elsewhere.
    pub fn ladder_core(&self, inventory_override: Option<u32>) -> Vec<LadderRow> {
        let inventory = inventory_override.unwrap_or_else(|| self.book.strategy_inventory());
        ladder::run(&self.book, &self.snapshot, &self.fees, inventory)
    }

    pub fn depth_core(&self, step_percent: f64) -> DepthView {
        depth::view(&self.book, &self.snapshot, self.reference_floor, step_percent, &self.fees)
    }

    pub fn is_available(&self) -> bool {
        self.snapshot.is_available()
    }

    pub fn listing_count(&self) -> usize {
        self.book.len()
    }
}
