// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Fee-Funded Rebuy

use crate::book::ListingBook;
use crate::types::RebuyOutcome;

/// Spend the primary fee pot on marketplace listings left standing after the
/// sweep. The walk resumes just past the last swept index, skips
/// strategy-owned listings, and stops at the first marketplace listing the
/// remaining pot cannot cover. The book is price-ordered, so everything past
/// that point is unaffordable too.
pub fn execute(book: &ListingBook, resume_after: Option<usize>, fee_budget: f64) -> RebuyOutcome {
    let mut outcome = RebuyOutcome::default();
    if !fee_budget.is_finite() || fee_budget <= 0.0 {
        return outcome;
    }

    let start = match resume_after {
        Some(idx) => idx + 1,
        None => 0,
    };
    let mut remaining = fee_budget;

    for listing in book.listings().iter().skip(start) {
        if listing.source.is_strategy() {
            continue;
        }
        if listing.price > remaining {
            break;
        }
        remaining -= listing.price;
        outcome.count += 1;
        outcome.spend += listing.price;
    }

    outcome.leftover = remaining;
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
