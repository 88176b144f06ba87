// Sweep Engine Benchmark Runner - seeded invariant probes
// Monte Carlo (N=30) over synthetic listing books, seedable PRNG, JSON report
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- DEPTH            # Filter by name
//   cargo run --release --bin bench -- --seed 42        # Custom base seed

mod books;
mod report;
mod scenarios;

use report::*;
use scenarios::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sweep_engine::{FeeSchedule, ListingBook};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Monte Carlo Loop ───────────────────────────────────────────────────────

fn run_monte_carlo(scenario: &Scenario, runs: usize, base_seed: u64) -> MonteCarloReport {
    let mut results = Vec::with_capacity(runs);

    for run in 0..runs {
        let seed = base_seed + run as u64;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let listings = books::generate_listings(&mut rng, &scenario.profile);
        let snapshot = if scenario.fixed_pool {
            books::reference_snapshot()
        } else {
            books::generate_snapshot(&mut rng)
        };
        let input = ScenarioInput {
            book: ListingBook::new(&listings),
            snapshot,
            fees: FeeSchedule::default(),
        };

        let start = Instant::now();
        let outcome = (scenario.check)(&input, &mut rng);
        let elapsed_ms = start.elapsed().as_millis();

        let pass = outcome.violations <= scenario.criteria.max_violations
            && outcome.rel_error <= scenario.criteria.max_rel_error;

        results.push(BenchResult {
            scenario: scenario.name.to_string(),
            name: scenario.label.to_string(),
            category: scenario.category.to_string(),
            seed,
            pass,
            violations: outcome.violations,
            probes: outcome.probes,
            rel_error: outcome.rel_error,
            volume_eth: outcome.volume_eth,
            listing_count: listings.len(),
            elapsed_ms,
        });
    }

    let passed = results.iter().filter(|r| r.pass).count();
    let violations =
        Stats::from_samples(&results.iter().map(|r| r.violations as f64).collect::<Vec<_>>());
    let rel_error = Stats::from_samples(&results.iter().map(|r| r.rel_error).collect::<Vec<_>>());
    let volume_eth =
        Stats::from_samples(&results.iter().map(|r| r.volume_eth).collect::<Vec<_>>());
    let elapsed_ms =
        Stats::from_samples(&results.iter().map(|r| r.elapsed_ms as f64).collect::<Vec<_>>());

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: runs,
        pass_rate: if runs > 0 { passed as f64 / runs as f64 } else { 0.0 },
        violations,
        rel_error,
        volume_eth,
        elapsed_ms,
        individual_runs: results,
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  Sweep Engine Benchmark Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<30} {:>5} {:>6} {:>10} {:>12} {:>7}",
        "Scenario", "Pass%", "Viol", "RelErr", "Vol(ETH)", "Time");
    println!("  {}", "-".repeat(78));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = run_monte_carlo(scenario, cli.runs, cli.seed);

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate == 1.0 { "PASS" } else { "FAIL" };

        println!("  {:<30} {:>4}% {:>6.1} {:>10.2e} {:>12.2} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.violations.mean,
            report.rel_error.max,
            report.volume_eth.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate == 1.0).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(78));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis();
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    let dir = std::path::Path::new("benchmark-results");
    if !dir.exists() {
        std::fs::create_dir_all(dir).expect("Failed to create benchmark-results/");
    }
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize");
    std::fs::write(&path, &json).expect("Failed to write benchmark file");
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
}
