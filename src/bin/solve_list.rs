//! `solve-list <filename> <memory-GiB>` (spec.md §6): solve every tier
//! named in a file (one tier string per line), plus their transitive
//! dependencies.

use clap::Parser;
use xiangqi_tablebase::combin::Triangle;
use xiangqi_tablebase::config::SolverConfig;
use xiangqi_tablebase::db::Database;
use xiangqi_tablebase::scheduler::Scheduler;
use xiangqi_tablebase::solver::Engine;
use xiangqi_tablebase::tier::Tier;

#[derive(Parser)]
#[command(name = "solve-list", about = "Solve every tier named in a file")]
struct Args {
    filename: String,
    memory_gib: f64,
}

fn main() {
    xiangqi_tablebase::init_logging(log::LevelFilter::Info);
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let contents = match std::fs::read_to_string(&args.filename) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("cannot read {}: {err}", args.filename);
            std::process::exit(1);
        }
    };

    let mut targets = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // A malformed tier string is rejected with a diagnostic, but
        // does not abort the batch (spec.md §7).
        match Tier::parse(line) {
            Ok(tier) => targets.push(tier),
            Err(err) => eprintln!("{}:{}: {err}", args.filename, lineno + 1),
        }
    }

    let config = SolverConfig::new(args.memory_gib, num_cpus::get());
    if let Err(err) = config.install_thread_pool() {
        log::warn!("thread pool already installed: {err}");
    }

    let triangle = Triangle::new();
    let db = Database::new(&config.data_root);
    let engine = Engine::new(&triangle, &db);
    let mut scheduler = Scheduler::from_targets(&targets);

    let progress = xiangqi_tablebase::progress(scheduler.pending_count());
    while let Some(tier) = scheduler.pop_ready() {
        match engine.solve_tier(&tier, config.memory_budget_bytes, false) {
            Ok(_) => scheduler.on_tier_solved(&tier),
            Err(err) => {
                log::error!("tier {tier} failed: {err}");
                scheduler.mark_failed(&tier);
            }
        }
        progress.inc(1);
    }
    progress.finish();

    std::process::exit(0);
}
