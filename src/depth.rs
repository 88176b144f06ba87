// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Market Depth Bucketizer

use crate::book::ListingBook;
use crate::parse;
use crate::swap::{self, SyntheticPool};
use crate::types::{DepthBucket, DepthKpis, DepthView, FeeSchedule, PoolSnapshot};

/// Iteration ceiling for band generation.
pub const MAX_BUCKETS: usize = 1000;
/// Display ceiling relative to the reference floor.
pub const CEILING_FLOOR_MULTIPLE: f64 = 6.0;
/// Linear fallback slices the display range this finely when multiplicative
/// growth stalls.
pub const LINEAR_STEP_DIVISOR: f64 = 1000.0;
/// Last-resort increment when even the linear fallback underflows.
pub const MIN_INCREMENT: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Band generation
// ---------------------------------------------------------------------------

fn effective_reference_floor(book: &ListingBook, external: Option<f64>) -> Option<f64> {
    external
        .filter(|v| parse::finite_positive(*v))
        .or_else(|| book.marketplace_floor())
}

/// Geometric price histogram over the book. Bands grow by `step_percent`
/// from the display floor; a band with no listings is folded into the next
/// occupied one, so the output stays contiguous with no zero-count entries.
pub fn bucketize(
    book: &ListingBook,
    reference_floor: Option<f64>,
    step_percent: f64,
) -> Vec<DepthBucket> {
    let (min_price, max_price) = match (book.floor(), book.max_price()) {
        (Some(min), Some(max)) => (min, max),
        _ => return Vec::new(),
    };
    let reference = effective_reference_floor(book, reference_floor);

    let mut display_min = match reference {
        Some(floor) => min_price.min(floor),
        None => min_price,
    };
    let price_limit = CEILING_FLOOR_MULTIPLE * reference.unwrap_or(display_min);
    let anchor = book.strategy_floor().unwrap_or(max_price);
    let mut display_max = anchor.max(price_limit.min(max_price));
    if display_min == display_max {
        // A one-price book still deserves a visible band
        display_min *= 0.99;
        display_max *= 1.01;
    }

    let growth = 1.0 + step_percent / 100.0;
    let mut buckets = Vec::new();
    let mut cumulative = 0.0;
    let mut start = display_min;
    let mut cursor = display_min;
    let mut iterations = 0;

    while cursor < display_max && iterations < MAX_BUCKETS {
        iterations += 1;
        let mut next = cursor * growth;
        if !next.is_finite() || next <= cursor {
            let increment = (display_max - display_min) / LINEAR_STEP_DIVISOR;
            next = if increment > 0.0 { cursor + increment } else { cursor + MIN_INCREMENT };
        }
        // The last band runs to its full geometric width rather than being
        // cut at the ceiling, so a listing sitting exactly on the ceiling
        // still lands in a band
        let end = next;

        let mut strategy_count = 0;
        let mut marketplace_count = 0;
        let mut volume = 0.0;
        for listing in book.listings() {
            if listing.price < start {
                continue;
            }
            if listing.price >= end {
                break;
            }
            if listing.source.is_strategy() {
                strategy_count += 1;
            } else {
                marketplace_count += 1;
            }
            volume += listing.price;
        }

        if strategy_count + marketplace_count > 0 {
            cumulative += volume;
            buckets.push(DepthBucket {
                start,
                end,
                strategy_count,
                marketplace_count,
                volume,
                cumulative_volume: cumulative,
            });
            start = end;
        }
        cursor = next;
    }

    buckets
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Floor comparison over the unbucketed book. Exactly one of the dominance
/// and wall pairs is populated: whichever side's floor sits lower. Dominant
/// strategy volume is additionally priced through the pool as burn pressure.
pub fn kpis(
    book: &ListingBook,
    snapshot: &PoolSnapshot,
    reference_floor: Option<f64>,
    fees: &FeeSchedule,
) -> DepthKpis {
    let mut kpis = DepthKpis {
        local_floor: book.strategy_floor(),
        reference_floor: effective_reference_floor(book, reference_floor),
        ..DepthKpis::default()
    };

    let (local, reference) = match (kpis.local_floor, kpis.reference_floor) {
        (Some(local), Some(reference)) => (local, reference),
        _ => return kpis,
    };
    kpis.spread_percent = Some((local - reference) / reference * 100.0);
    kpis.is_leading = local <= reference;

    if kpis.is_leading {
        for listing in book.listings() {
            if listing.price >= reference {
                break;
            }
            if listing.source.is_strategy() {
                kpis.dominance_count += 1;
                kpis.dominance_volume += listing.price;
            }
        }
    } else {
        for listing in book.listings() {
            if listing.price >= local {
                break;
            }
            if !listing.source.is_strategy() {
                kpis.wall_count += 1;
                kpis.wall_volume += listing.price;
            }
        }
    }

    if kpis.dominance_volume > 0.0 {
        if let Ok(mut pool) = SyntheticPool::from_snapshot(snapshot) {
            let outcome = swap::execute(&mut pool, kpis.dominance_volume, fees);
            kpis.tokens_burned = outcome.tokens_burned;
            kpis.price_impact_percent = outcome.price_impact_percent;
        }
    }
    kpis
}

/// Buckets plus KPIs in one shot for the depth display.
pub fn view(
    book: &ListingBook,
    snapshot: &PoolSnapshot,
    reference_floor: Option<f64>,
    step_percent: f64,
    fees: &FeeSchedule,
) -> DepthView {
    DepthView {
        buckets: bucketize(book, reference_floor, step_percent),
        kpis: kpis(book, snapshot, reference_floor, fees),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Listing, ListingSource};

    fn listing(id: &str, price: f64, source: ListingSource) -> Listing {
        Listing::new(id, price, source)
    }

    fn snapshot() -> PoolSnapshot {
        PoolSnapshot::from_raw("0.001", "3000", "1000000", "4000000")
    }

    #[test]
    fn test_buckets_are_contiguous_and_complete() {
        let book = ListingBook::new(&[
            listing("a", 1.0, ListingSource::Strategy),
            listing("b", 1.02, ListingSource::OpenSea),
            listing("c", 1.5, ListingSource::OpenSea),
            listing("d", 2.4, ListingSource::Strategy),
            listing("e", 3.1, ListingSource::OpenSea),
        ]);
        let buckets = bucketize(&book, None, 5.0);
        assert!(!buckets.is_empty());

        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "bands must touch");
            assert!(pair[0].start < pair[0].end);
        }
        // Every listing inside the realized band range is counted exactly
        // once; the final band overshoots 3.1 so the top listing is in range
        let total: u32 = buckets.iter().map(|b| b.strategy_count + b.marketplace_count).sum();
        let display_min = buckets[0].start;
        let display_max = buckets.last().unwrap().end;
        let in_range = book
            .listings()
            .iter()
            .filter(|l| l.price >= display_min && l.price < display_max)
            .count() as u32;
        assert_eq!(total, in_range);
        assert_eq!(total, 5);
        // No zero-count bands survive
        assert!(buckets.iter().all(|b| b.strategy_count + b.marketplace_count > 0));
    }

    #[test]
    fn test_cumulative_volume_runs_forward() {
        let book = ListingBook::new(&[
            listing("a", 1.0, ListingSource::OpenSea),
            listing("b", 2.0, ListingSource::OpenSea),
            listing("c", 4.0, ListingSource::OpenSea),
        ]);
        let buckets = bucketize(&book, None, 20.0);
        let mut running = 0.0;
        for bucket in &buckets {
            running += bucket.volume;
            assert!((bucket.cumulative_volume - running).abs() < 1e-12);
        }
        // All three listings land in bands, so the total runs to 7.0
        let last = buckets.last().unwrap();
        assert!((last.cumulative_volume - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_book_folds_empty_bands() {
        // 1.0 and 5.9 with a 5% step leaves dozens of empty bands between
        let book = ListingBook::new(&[
            listing("a", 1.0, ListingSource::OpenSea),
            listing("b", 5.9, ListingSource::OpenSea),
            listing("c", 6.5, ListingSource::OpenSea),
        ]);
        let buckets = bucketize(&book, None, 5.0);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].end, buckets[1].start);
        assert_eq!(buckets[1].end, buckets[2].start);
        for bucket in &buckets {
            assert_eq!(bucket.marketplace_count, 1);
        }
    }

    #[test]
    fn test_single_price_book_widens() {
        let book = ListingBook::new(&[
            listing("a", 2.0, ListingSource::OpenSea),
            listing("b", 2.0, ListingSource::OpenSea),
        ]);
        let buckets = bucketize(&book, None, 5.0);
        assert_eq!(buckets.len(), 1);
        assert!(buckets[0].start < 2.0 && 2.0 < buckets[0].end);
        assert_eq!(buckets[0].marketplace_count, 2);
        assert_eq!(buckets[0].volume, 4.0);
    }

    #[test]
    fn test_reference_floor_extends_display_floor() {
        let book = ListingBook::new(&[listing("a", 1.0, ListingSource::Strategy)]);
        let buckets = bucketize(&book, Some(0.5), 10.0);
        // Band generation starts at the external floor below the book; the
        // empty run-up folds into the single occupied band
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].start, 0.5);
        assert_eq!(buckets[0].strategy_count, 1);
    }

    #[test]
    fn test_ceiling_caps_deep_tail() {
        // Reference floor 1.0 puts the display ceiling at 6.0; the 50.0
        // outlier falls outside and never produces a band
        let book = ListingBook::new(&[
            listing("z", 50.0, ListingSource::OpenSea),
            listing("a", 1.0, ListingSource::Strategy),
            listing("b", 2.0, ListingSource::OpenSea),
        ]);
        let buckets = bucketize(&book, Some(1.0), 10.0);
        let total: u32 =
            buckets.iter().map(|b| b.strategy_count + b.marketplace_count).sum();
        assert_eq!(total, 2);
        // Last band may overshoot the 6.0 ceiling by at most one step
        assert!(buckets.last().unwrap().end <= 6.0 * 1.1 + 1e-9);
    }

    #[test]
    fn test_empty_book_yields_no_buckets() {
        let book = ListingBook::new(&[]);
        assert!(bucketize(&book, Some(1.0), 5.0).is_empty());
    }

    #[test]
    fn test_kpis_dominance_side() {
        let book = ListingBook::new(&[
            listing("a", 1.0, ListingSource::Strategy),
            listing("b", 1.1, ListingSource::Strategy),
            listing("c", 1.5, ListingSource::OpenSea),
            listing("d", 2.0, ListingSource::OpenSea),
        ]);
        let kpis = kpis(&book, &snapshot(), None, &FeeSchedule::default());
        assert_eq!(kpis.local_floor, Some(1.0));
        assert_eq!(kpis.reference_floor, Some(1.5));
        assert!(kpis.is_leading);
        // Two strategy listings undercut the 1.5 marketplace floor
        assert_eq!(kpis.dominance_count, 2);
        assert!((kpis.dominance_volume - 2.1).abs() < 1e-12);
        assert_eq!(kpis.wall_count, 0);
        // spread = (1.0 - 1.5) / 1.5 * 100 = -33.3%
        assert!((kpis.spread_percent.unwrap() + 100.0 / 3.0).abs() < 1e-9);
        // Burn pressure prices the 2.1 ETH of dominant inventory
        assert!(kpis.tokens_burned > 0.0);
        assert!(kpis.price_impact_percent > 0.0);
    }

    #[test]
    fn test_kpis_wall_side() {
        let book = ListingBook::new(&[
            listing("a", 0.8, ListingSource::OpenSea),
            listing("b", 0.9, ListingSource::OpenSea),
            listing("c", 1.0, ListingSource::Strategy),
        ]);
        let kpis = kpis(&book, &snapshot(), None, &FeeSchedule::default());
        assert!(!kpis.is_leading);
        assert_eq!(kpis.wall_count, 2);
        assert!((kpis.wall_volume - 1.7).abs() < 1e-12);
        assert_eq!(kpis.dominance_count, 0);
        assert_eq!(kpis.tokens_burned, 0.0);
    }

    #[test]
    fn test_kpis_external_reference_wins() {
        let book = ListingBook::new(&[
            listing("a", 1.0, ListingSource::Strategy),
            listing("b", 3.0, ListingSource::OpenSea),
        ]);
        let kpis = kpis(&book, &snapshot(), Some(2.0), &FeeSchedule::default());
        assert_eq!(kpis.reference_floor, Some(2.0));
        assert!((kpis.spread_percent.unwrap() + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_kpis_missing_floor_goes_quiet() {
        // Marketplace-only book has no local floor to compare
        let book = ListingBook::new(&[listing("a", 1.0, ListingSource::OpenSea)]);
        let kpis = kpis(&book, &snapshot(), None, &FeeSchedule::default());
        assert_eq!(kpis.local_floor, None);
        assert_eq!(kpis.spread_percent, None);
        assert!(!kpis.is_leading);
        assert_eq!(kpis.dominance_count, 0);
        assert_eq!(kpis.wall_count, 0);
    }

    #[test]
    fn test_view_bundles_both_halves() {
        let book = ListingBook::new(&[
            listing("a", 1.0, ListingSource::Strategy),
            listing("b", 1.5, ListingSource::OpenSea),
        ]);
        let view = view(&book, &snapshot(), None, 5.0, &FeeSchedule::default());
        assert!(!view.buckets.is_empty());
        assert_eq!(view.kpis.local_floor, Some(1.0));
    }
}
