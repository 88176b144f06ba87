// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Sweep Selector

use crate::book::ListingBook;
use crate::types::{BudgetMode, SweepResult};

/// Padding applied to derived (count/ceiling) budgets. The consumption walk
/// re-spends the summed prices one by one; the pad absorbs float summation
/// error so the listings that defined the budget stay affordable.
pub const EPSILON: f64 = 1e-8;

// ---------------------------------------------------------------------------
// Budget resolution - all three modes reduce to an ETH volume
// ---------------------------------------------------------------------------

/// Resolve the caller's budget input to an ETH figure. Count inputs are
/// floored to whole listings; ceiling inputs sum every listing at or below
/// the target price. Non-positive or non-finite input resolves to zero.
pub fn resolve_budget(book: &ListingBook, mode: BudgetMode, value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    match mode {
        BudgetMode::Volume => value,
        BudgetMode::Count => {
            let wanted = value.floor() as usize;
            let sum: f64 = book.listings().iter().take(wanted).map(|l| l.price).sum();
            sum + EPSILON * 2.0
        }
        BudgetMode::Ceiling => {
            let mut sum = 0.0;
            for listing in book.listings() {
                if listing.price <= value {
                    sum += listing.price;
                } else {
                    break;
                }
            }
            sum + EPSILON * 2.0
        }
    }
}

// ---------------------------------------------------------------------------
// Consumption walk - atomic, in ascending order, no skipping
// ---------------------------------------------------------------------------

/// Walk the ordered book spending `budget`. Listings are atomic: the first
/// one the remaining budget cannot cover ends the walk. Returns the
/// partitioned result and the index of the last consumed listing, which is
/// where the rebuy stage resumes.
pub fn consume_budget(book: &ListingBook, budget: f64) -> (SweepResult, Option<usize>) {
    let mut result = SweepResult::default();
    if !budget.is_finite() || budget <= 0.0 {
        return (result, None);
    }

    let mut remaining = budget;
    let mut last_consumed = None;

    for (i, listing) in book.listings().iter().enumerate() {
        if listing.price > remaining {
            break;
        }
        remaining -= listing.price;
        if listing.source.is_strategy() {
            result.strategy_count += 1;
            result.strategy_volume += listing.price;
        } else {
            result.marketplace_count += 1;
            result.marketplace_volume += listing.price;
        }
        last_consumed = Some(i);
    }

    result.leftover_budget = remaining;
    (result, last_consumed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Listing, ListingSource};

    fn book(prices: &[(f64, ListingSource)]) -> ListingBook {
        let raw: Vec<Listing> = prices
            .iter()
            .enumerate()
            .map(|(i, (p, s))| Listing::new(i.to_string(), *p, *s))
            .collect();
        ListingBook::new(&raw)
    }

    #[test]
    fn test_volume_budget_partitioning() {
        // [1 strategy, 2 marketplace, 3 strategy], budget 3:
        // consumes 1 (strategy) then 2 (marketplace), stops before 3
        let book = book(&[
            (1.0, ListingSource::Strategy),
            (2.0, ListingSource::OpenSea),
            (3.0, ListingSource::Strategy),
        ]);
        let (result, last) = consume_budget(&book, resolve_budget(&book, BudgetMode::Volume, 3.0));
        assert_eq!(result.strategy_count, 1);
        assert_eq!(result.strategy_volume, 1.0);
        assert_eq!(result.marketplace_count, 1);
        assert_eq!(result.marketplace_volume, 2.0);
        assert_eq!(last, Some(1));
        assert!(result.leftover_budget.abs() < 1e-12);
    }

    #[test]
    fn test_never_consumes_above_remaining_budget() {
        let book = book(&[
            (0.5, ListingSource::OpenSea),
            (0.6, ListingSource::OpenSea),
            (0.7, ListingSource::OpenSea),
        ]);
        let (result, _) = consume_budget(&book, 1.0);
        // 0.5 consumed, 0.6 > 0.5 remaining
        assert_eq!(result.marketplace_count, 1);
        assert_eq!(result.total_volume(), 0.5);
        assert!((result.leftover_budget - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_volume_is_monotonic_in_budget() {
        let book = book(&[
            (0.3, ListingSource::Strategy),
            (0.4, ListingSource::OpenSea),
            (0.9, ListingSource::Strategy),
            (1.5, ListingSource::OpenSea),
        ]);
        let mut previous = 0.0;
        for budget in [0.1, 0.3, 0.7, 1.6, 3.1, 10.0] {
            let (result, _) = consume_budget(&book, budget);
            assert!(result.total_volume() >= previous, "volume shrank at budget {}", budget);
            assert!(result.total_volume() <= budget);
            previous = result.total_volume();
        }
    }

    #[test]
    fn test_count_mode_floors_and_pads() {
        let book = book(&[
            (0.1, ListingSource::Strategy),
            (0.2, ListingSource::OpenSea),
            (0.3, ListingSource::Strategy),
        ]);
        // 2.9 NFTs floors to 2 listings
        let budget = resolve_budget(&book, BudgetMode::Count, 2.9);
        let (result, _) = consume_budget(&book, budget);
        assert_eq!(result.total_count(), 2);

        // The pad keeps the summed listings affordable despite 0.1 + 0.2
        // not being exactly representable
        let budget = resolve_budget(&book, BudgetMode::Count, 3.0);
        let (result, _) = consume_budget(&book, budget);
        assert_eq!(result.total_count(), 3);
    }

    #[test]
    fn test_count_mode_clamps_to_book_size() {
        let book = book(&[(1.0, ListingSource::Strategy)]);
        let budget = resolve_budget(&book, BudgetMode::Count, 50.0);
        let (result, _) = consume_budget(&book, budget);
        assert_eq!(result.total_count(), 1);
    }

    #[test]
    fn test_ceiling_mode_consumes_at_or_below_target() {
        let book = book(&[
            (1.0, ListingSource::Strategy),
            (1.1, ListingSource::OpenSea),
            (1.3, ListingSource::Strategy),
            (2.0, ListingSource::OpenSea),
        ]);
        let budget = resolve_budget(&book, BudgetMode::Ceiling, 1.3);
        let (result, last) = consume_budget(&book, budget);
        assert_eq!(result.total_count(), 3);
        assert_eq!(last, Some(2));
        assert!((result.total_volume() - 3.4).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_budgets_yield_empty_result() {
        let book = book(&[(1.0, ListingSource::Strategy)]);
        for value in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let (result, last) = consume_budget(&book, value);
            assert_eq!(result, SweepResult::default());
            assert_eq!(last, None);
            assert_eq!(resolve_budget(&book, BudgetMode::Volume, value), 0.0);
        }
    }

    #[test]
    fn test_resolve_on_empty_book() {
        let book = ListingBook::new(&[]);
        assert_eq!(resolve_budget(&book, BudgetMode::Volume, 2.0), 2.0);
        // Derived modes resolve to just the pad, which then consumes nothing
        let budget = resolve_budget(&book, BudgetMode::Ceiling, 2.0);
        assert!(budget < 1e-7);
        let (result, last) = consume_budget(&book, budget);
        assert_eq!(result.total_count(), 0);
        assert_eq!(last, None);
    }
}
