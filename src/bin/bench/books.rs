// Synthetic Book Generator - seedable listing snapshots and pool figures
// Every scenario run draws its inputs from here so results replay per seed

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use sweep_engine::{Listing, ListingSource, PoolSnapshot};

/// Share of marketplace listings tagged with the named marketplace rather
/// than the aggregator default.
const PUNKS_SHARE: f64 = 0.1;

// ─── Book Profile ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct BookProfile {
    pub listings: usize,
    /// Fraction of listings owned by the strategy.
    pub strategy_share: f64,
    /// Cheapest possible listing, in ETH.
    pub floor_eth: f64,
    /// Multiplicative tail above the floor.
    pub price_spread: f64,
    /// Fraction of listings whose price field arrives unusable.
    pub unpriced_share: f64,
}

pub const STANDARD_BOOK: BookProfile = BookProfile {
    listings: 400,
    strategy_share: 0.35,
    floor_eth: 0.8,
    price_spread: 8.0,
    unpriced_share: 0.02,
};

pub const SPARSE_BOOK: BookProfile = BookProfile {
    listings: 60,
    strategy_share: 0.25,
    floor_eth: 0.4,
    price_spread: 40.0,
    unpriced_share: 0.05,
};

pub const DENSE_BOOK: BookProfile = BookProfile {
    listings: 2000,
    strategy_share: 0.4,
    floor_eth: 1.2,
    price_spread: 3.0,
    unpriced_share: 0.01,
};

pub const LARGE_BOOK: BookProfile = BookProfile {
    listings: 5000,
    strategy_share: 0.3,
    floor_eth: 0.05,
    price_spread: 15.0,
    unpriced_share: 0.02,
};

/// Strategy-heavy book whose whole tail sits under the top ladder target,
/// so inventory exhaustion is reachable.
pub const TIGHT_BOOK: BookProfile = BookProfile {
    listings: 200,
    strategy_share: 0.6,
    floor_eth: 1.0,
    price_spread: 1.5,
    unpriced_share: 0.0,
};

// ─── Generators ─────────────────────────────────────────────────────────────

/// Listing prices cluster near the floor with a thinning tail, matching how
/// real collections stack their order books.
pub fn generate_listings(rng: &mut ChaCha8Rng, profile: &BookProfile) -> Vec<Listing> {
    let mut listings = Vec::with_capacity(profile.listings);
    for i in 0..profile.listings {
        let source = if rng.gen::<f64>() < profile.strategy_share {
            ListingSource::Strategy
        } else if rng.gen::<f64>() < PUNKS_SHARE {
            ListingSource::Punks
        } else {
            ListingSource::OpenSea
        };
        let price = if rng.gen::<f64>() < profile.unpriced_share {
            0.0
        } else {
            profile.floor_eth * (1.0 + profile.price_spread * rng.gen::<f64>().powi(3))
        };
        listings.push(Listing::new((1000 + i).to_string(), price, source));
    }
    listings
}

pub fn generate_snapshot(rng: &mut ChaCha8Rng) -> PoolSnapshot {
    PoolSnapshot {
        base_price_usd: rng.gen_range(1e-4..1e-2),
        quote_price_usd: rng.gen_range(2000.0..4000.0),
        liquidity_usd: rng.gen_range(2e5..5e6),
        fdv_usd: rng.gen_range(1e6..5e7),
    }
}

/// The fixed pool used by closed-form checks: $1M liquidity, $0.001 token,
/// $3000 quote.
pub fn reference_snapshot() -> PoolSnapshot {
    PoolSnapshot {
        base_price_usd: 0.001,
        quote_price_usd: 3000.0,
        liquidity_usd: 1_000_000.0,
        fdv_usd: 4_000_000.0,
    }
}
