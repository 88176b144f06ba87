// Scenario Definitions - invariant probes over seeded synthetic books
// Each scenario pairs a book profile with one check; the runner re-rolls
// both per seed

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use sweep_engine::swap::SyntheticPool;
use sweep_engine::{depth, ladder, rebuy, swap, sweep};
use sweep_engine::{FeeSchedule, ListingBook, PoolSnapshot};

use crate::books::{self, BookProfile};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct ScenarioInput {
    pub book: ListingBook,
    pub snapshot: PoolSnapshot,
    pub fees: FeeSchedule,
}

pub struct CheckOutcome {
    /// Failed probe count.
    pub violations: u32,
    /// Probes evaluated, for the report.
    pub probes: u32,
    /// Worst relative error across numeric identities.
    pub rel_error: f64,
    /// Headline ETH volume the run pushed through the engine.
    pub volume_eth: f64,
}

pub struct PassCriteria {
    pub max_violations: u32,
    pub max_rel_error: f64,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self { max_violations: 0, max_rel_error: 1e-9 }
    }
}

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub profile: BookProfile,
    /// Use the fixed closed-form pool instead of a seeded one.
    pub fixed_pool: bool,
    pub check: fn(&ScenarioInput, &mut ChaCha8Rng) -> CheckOutcome,
    pub criteria: PassCriteria,
}

// ─── Check Functions ────────────────────────────────────────────────────────

/// Consumed volume never exceeds the budget and never shrinks as the budget
/// grows; consumed + leftover reproduces the budget.
fn check_sweep_budget_monotonic(input: &ScenarioInput, rng: &mut ChaCha8Rng) -> CheckOutcome {
    let mut violations = 0;
    let mut probes = 0;
    let scale = input.book.floor().unwrap_or(1.0);
    let mut budget = 0.0;
    let mut prev_volume = 0.0;

    for _ in 0..40 {
        budget += rng.gen_range(0.2..3.0) * scale;
        let (result, _) = sweep::consume_budget(&input.book, budget);
        probes += 3;
        if result.total_volume() > budget + 1e-9 {
            violations += 1;
        }
        if result.total_volume() + 1e-9 < prev_volume {
            violations += 1;
        }
        if (result.total_volume() + result.leftover_budget - budget).abs() > 1e-9 {
            violations += 1;
        }
        prev_volume = result.total_volume();
    }
    CheckOutcome { violations, probes, rel_error: 0.0, volume_eth: prev_volume }
}

/// The pool's token side is never drained, the ETH side only grows, and the
/// per-step price path is finite and strictly rising.
fn check_swap_reserve_safety(input: &ScenarioInput, rng: &mut ChaCha8Rng) -> CheckOutcome {
    let mut violations = 0;
    let mut probes = 0;
    let mut pool = match SyntheticPool::from_snapshot(&input.snapshot) {
        Ok(pool) => pool,
        Err(_) => {
            return CheckOutcome { violations: 1, probes: 1, rel_error: 0.0, volume_eth: 0.0 }
        }
    };
    let initial_eth = pool.eth_reserve;
    let initial_tokens = pool.token_reserve;
    let mut prev_price = pool.price_quote();

    let volume = rng.gen_range(0.5..400.0);
    let outcome = swap::execute(&mut pool, volume, &input.fees);

    for step in &outcome.steps {
        probes += 1;
        if !step.price_quote.is_finite() || step.price_quote <= prev_price {
            violations += 1;
        }
        prev_price = step.price_quote;
    }
    probes += 3;
    if outcome.tokens_burned >= initial_tokens {
        violations += 1;
    }
    if pool.token_reserve <= 0.0 {
        violations += 1;
    }
    if !outcome.steps.is_empty() && pool.eth_reserve <= initial_eth {
        violations += 1;
    }

    let routed: f64 = outcome.steps.iter().map(|s| s.raw_in).sum();
    CheckOutcome { violations, probes, rel_error: 0.0, volume_eth: routed }
}

/// Summed fee totals reproduce routed volume times the configured rates,
/// per tier and overall.
fn check_fee_split_identity(input: &ScenarioInput, rng: &mut ChaCha8Rng) -> CheckOutcome {
    let mut pool = match SyntheticPool::from_snapshot(&input.snapshot) {
        Ok(pool) => pool,
        Err(_) => {
            return CheckOutcome { violations: 1, probes: 1, rel_error: 0.0, volume_eth: 0.0 }
        }
    };
    let volume = rng.gen_range(1.0..250.0);
    let outcome = swap::execute(&mut pool, volume, &input.fees);
    let routed: f64 = outcome.steps.iter().map(|s| s.raw_in).sum();

    let rel = |actual: f64, expected: f64| -> f64 {
        if expected.abs() < 1e-12 {
            actual.abs()
        } else {
            (actual - expected).abs() / expected.abs()
        }
    };
    let rel_error = rel(outcome.primary_fee_total, routed * input.fees.primary_rate)
        .max(rel(outcome.secondary_fee_total, routed * input.fees.secondary_rate))
        .max(rel(outcome.tertiary_fee_total, routed * input.fees.tertiary_rate))
        .max(rel(outcome.fee_total, routed * input.fees.total_rate()));

    CheckOutcome { violations: 0, probes: 4, rel_error, volume_eth: routed }
}

/// The rebuy cascade spends at most the primary fee pot, conserves it, and
/// buys exactly the in-order affordable marketplace prefix past the sweep.
fn check_rebuy_budget_respect(input: &ScenarioInput, rng: &mut ChaCha8Rng) -> CheckOutcome {
    let mut violations = 0;
    let mut probes = 0;
    let budget = rng.gen_range(1.0..100.0) * input.book.floor().unwrap_or(1.0);
    let (result, resume) = sweep::consume_budget(&input.book, budget);

    let mut pool = match SyntheticPool::from_snapshot(&input.snapshot) {
        Ok(pool) => pool,
        Err(_) => {
            return CheckOutcome { violations: 1, probes: 1, rel_error: 0.0, volume_eth: 0.0 }
        }
    };
    let outcome = swap::execute(&mut pool, result.strategy_volume, &input.fees);
    let pot = outcome.primary_fee_total;
    let bought = rebuy::execute(&input.book, resume, pot);

    probes += 2;
    if bought.spend > pot + 1e-9 {
        violations += 1;
    }
    if pot > 0.0 && (bought.spend + bought.leftover - pot).abs() > 1e-9 {
        violations += 1;
    }

    // Independent replay of the in-order walk
    let start = resume.map_or(0, |idx| idx + 1);
    let mut replay_count = 0u32;
    let mut replay_spend = 0.0;
    if pot.is_finite() && pot > 0.0 {
        let mut remaining = pot;
        for listing in input.book.listings().iter().skip(start) {
            if listing.source.is_strategy() {
                continue;
            }
            if listing.price > remaining {
                break;
            }
            remaining -= listing.price;
            replay_count += 1;
            replay_spend += listing.price;
        }
    }
    probes += 2;
    if replay_count != bought.count {
        violations += 1;
    }
    if (replay_spend - bought.spend).abs() > 1e-9 {
        violations += 1;
    }

    CheckOutcome { violations, probes, rel_error: 0.0, volume_eth: bought.spend }
}

/// Depth bands touch end-to-start, carry no empty entries, count every
/// listing in the realized range once, and keep the cumulative overlay
/// consistent.
fn check_depth_bucket_contiguity(input: &ScenarioInput, rng: &mut ChaCha8Rng) -> CheckOutcome {
    let mut violations = 0;
    let mut probes = 0;
    let steps = [2.0, 5.0, 10.0, 20.0];
    let step = steps[rng.gen_range(0..steps.len())];
    let reference = if rng.gen::<f64>() < 0.5 {
        input.book.floor().map(|f| f * rng.gen_range(0.5..1.5))
    } else {
        None
    };

    let buckets = depth::bucketize(&input.book, reference, step);
    if buckets.is_empty() {
        probes += 1;
        if !input.book.is_empty() {
            violations += 1;
        }
        return CheckOutcome { violations, probes, rel_error: 0.0, volume_eth: 0.0 };
    }

    let mut running = 0.0;
    for bucket in &buckets {
        probes += 3;
        if bucket.start >= bucket.end {
            violations += 1;
        }
        if bucket.strategy_count + bucket.marketplace_count == 0 {
            violations += 1;
        }
        running += bucket.volume;
        if (bucket.cumulative_volume - running).abs() > 1e-6 {
            violations += 1;
        }
    }
    for pair in buckets.windows(2) {
        probes += 1;
        if pair[0].end != pair[1].start {
            violations += 1;
        }
    }

    let display_min = buckets[0].start;
    let display_max = buckets[buckets.len() - 1].end;
    let in_range = input
        .book
        .listings()
        .iter()
        .filter(|l| l.price >= display_min && l.price < display_max)
        .count() as u32;
    let counted: u32 = buckets.iter().map(|b| b.strategy_count + b.marketplace_count).sum();
    probes += 1;
    if counted != in_range {
        violations += 1;
    }

    let volume_eth = buckets.last().map_or(0.0, |b| b.cumulative_volume);
    CheckOutcome { violations, probes, rel_error: 0.0, volume_eth }
}

/// Ladder rungs ascend in fixed steps, spend grows with the target, and the
/// run ends at the first inventory-exhausting rung.
fn check_ladder_early_exit(input: &ScenarioInput, _rng: &mut ChaCha8Rng) -> CheckOutcome {
    let mut violations = 0;
    let mut probes = 0;
    let inventory = input.book.strategy_inventory();
    let rows = ladder::run(&input.book, &input.snapshot, &input.fees, inventory);

    if rows.is_empty() {
        probes += 1;
        if !input.book.is_empty() && input.snapshot.is_available() {
            violations += 1;
        }
        return CheckOutcome { violations, probes, rel_error: 0.0, volume_eth: 0.0 };
    }

    for pair in rows.windows(2) {
        probes += 3;
        if pair[1].percent <= pair[0].percent {
            violations += 1;
        }
        if pair[1].total_cost_eth + 1e-9 < pair[0].total_cost_eth {
            violations += 1;
        }
        // Only the final row may exhaust
        if pair[0].inventory_exhausted {
            violations += 1;
        }
    }
    probes += 1;
    let last = &rows[rows.len() - 1];
    if rows.len() < ladder::percentages().count() && !last.inventory_exhausted {
        violations += 1;
    }
    if last.inventory_exhausted {
        probes += 1;
        if last.outcome.sweep.strategy_count < inventory {
            violations += 1;
        }
    }

    CheckOutcome { violations, probes, rel_error: 0.0, volume_eth: last.total_cost_eth }
}

/// One 1 ETH chunk against the fixed pool reproduces the constant-product
/// closed form.
fn check_reference_chunk(input: &ScenarioInput, _rng: &mut ChaCha8Rng) -> CheckOutcome {
    let mut violations = 0;
    let mut pool = match SyntheticPool::from_snapshot(&input.snapshot) {
        Ok(pool) => pool,
        Err(_) => {
            return CheckOutcome { violations: 1, probes: 1, rel_error: 0.0, volume_eth: 0.0 }
        }
    };
    let eth0 = (input.snapshot.liquidity_usd / 2.0) / input.snapshot.quote_price_usd;
    let tok0 = (input.snapshot.liquidity_usd / 2.0) / input.snapshot.base_price_usd;
    let net = 1.0 - input.fees.total_rate();
    let expected = (net * tok0) / (eth0 + net);

    let outcome = swap::execute(&mut pool, 1.0, &input.fees);
    if outcome.steps.len() != 1 {
        violations += 1;
    }
    let got = outcome.steps.first().map_or(0.0, |s| s.tokens_bought);
    if (outcome.tokens_burned - got).abs() > 1e-9 {
        violations += 1;
    }
    let rel_error = (got - expected).abs() / expected;

    CheckOutcome { violations, probes: 3, rel_error, volume_eth: 1.0 }
}

// ─── Scenario Definitions ───────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "SWEEP_BUDGET_MONOTONIC",
            label: "Sweep: Budget Monotonicity",
            category: "selector",
            profile: books::STANDARD_BOOK,
            fixed_pool: false,
            check: check_sweep_budget_monotonic,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "SWEEP_LARGE_BOOK",
            label: "Sweep: 5K Listing Book",
            category: "selector",
            profile: books::LARGE_BOOK,
            fixed_pool: false,
            check: check_sweep_budget_monotonic,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "SWAP_RESERVE_SAFETY",
            label: "Swap: Reserve Safety",
            category: "amm",
            profile: books::STANDARD_BOOK,
            fixed_pool: false,
            check: check_swap_reserve_safety,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "FEE_SPLIT_IDENTITY",
            label: "Swap: Fee Split Identity",
            category: "amm",
            profile: books::STANDARD_BOOK,
            fixed_pool: false,
            check: check_fee_split_identity,
            criteria: PassCriteria { max_rel_error: 1e-9, ..Default::default() },
        },
        Scenario {
            name: "REBUY_BUDGET_RESPECT",
            label: "Rebuy: Budget Respect",
            category: "cascade",
            profile: books::STANDARD_BOOK,
            fixed_pool: false,
            check: check_rebuy_budget_respect,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "DEPTH_BUCKET_CONTIGUITY",
            label: "Depth: Band Contiguity",
            category: "depth",
            profile: books::SPARSE_BOOK,
            fixed_pool: false,
            check: check_depth_bucket_contiguity,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "DEPTH_DENSE_BANDS",
            label: "Depth: 2K Dense Book",
            category: "depth",
            profile: books::DENSE_BOOK,
            fixed_pool: false,
            check: check_depth_bucket_contiguity,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "LADDER_EARLY_EXIT",
            label: "Ladder: Early Exit",
            category: "ladder",
            profile: books::TIGHT_BOOK,
            fixed_pool: false,
            check: check_ladder_early_exit,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "LADDER_DEEP_TAIL",
            label: "Ladder: Deep Tail Book",
            category: "ladder",
            profile: books::STANDARD_BOOK,
            fixed_pool: false,
            check: check_ladder_early_exit,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "REFERENCE_POOL",
            label: "Pool: Closed-Form Chunk",
            category: "closed-form",
            profile: books::SPARSE_BOOK,
            fixed_pool: true,
            check: check_reference_chunk,
            criteria: PassCriteria { max_rel_error: 1e-12, ..Default::default() },
        },
    ]
}
