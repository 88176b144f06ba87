// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Listing Book

use serde::{Serialize, Deserialize};

use crate::types::Listing;

// ---------------------------------------------------------------------------
// Ordering (free function - the book and the tests share it)
// ---------------------------------------------------------------------------

/// Stable ascending price order, total even when a price is NaN. Ties keep
/// their input order so a repeated walk over the same snapshot is
/// deterministic.
pub fn order(listings: &[Listing]) -> Vec<Listing> {
    let mut ordered = listings.to_vec();
    ordered.sort_by(|a, b| a.price.total_cmp(&b.price));
    ordered
}

// ---------------------------------------------------------------------------
// ListingBook - ordered monetary view plus raw inventory totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingBook {
    ordered: Vec<Listing>,
    strategy_inventory: u32,
}

impl ListingBook {
    /// Normalize a raw listing snapshot. Zero and negative prices stay out
    /// of the monetary book but still count toward strategy inventory, which
    /// tracks what the strategy holds rather than what it can sell for.
    pub fn new(raw: &[Listing]) -> Self {
        let strategy_inventory =
            raw.iter().filter(|l| l.source.is_strategy()).count() as u32;
        let mut ordered = order(raw);
        ordered.retain(|l| l.price.is_finite() && l.price > 0.0);
        Self { ordered, strategy_inventory }
    }

    /// Priced listings in ascending order.
    pub fn listings(&self) -> &[Listing] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Strategy-class count over the raw input, malformed prices included.
    pub fn strategy_inventory(&self) -> u32 {
        self.strategy_inventory
    }

    /// Lowest priced listing regardless of class (the collection floor).
    pub fn floor(&self) -> Option<f64> {
        self.ordered.first().map(|l| l.price)
    }

    /// Lowest strategy-owned price.
    pub fn strategy_floor(&self) -> Option<f64> {
        self.ordered.iter().find(|l| l.source.is_strategy()).map(|l| l.price)
    }

    /// Lowest marketplace-class price.
    pub fn marketplace_floor(&self) -> Option<f64> {
        self.ordered.iter().find(|l| !l.source.is_strategy()).map(|l| l.price)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.ordered.last().map(|l| l.price)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
