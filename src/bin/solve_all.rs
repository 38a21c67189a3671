//! `solve-all <N> <threads> <memory-GiB>` (spec.md §6): solve every
//! legal canonical tier with piece count `<= N`.

use clap::Parser;
use xiangqi_tablebase::combin::Triangle;
use xiangqi_tablebase::config::SolverConfig;
use xiangqi_tablebase::db::Database;
use xiangqi_tablebase::scheduler::Scheduler;
use xiangqi_tablebase::solver::Engine;

#[derive(Parser)]
#[command(name = "solve-all", about = "Solve every tier with piece count <= N")]
struct Args {
    max_pieces: u32,
    threads: usize,
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

    let config = SolverConfig::new(args.memory_gib, args.threads);
    if let Err(err) = config.install_thread_pool() {
        log::warn!("thread pool already installed: {err}");
    }

    let triangle = Triangle::new();
    let db = Database::new(&config.data_root);
    let engine = Engine::new(&triangle, &db);
    let mut scheduler = Scheduler::for_max_pieces(args.max_pieces);

    let total = scheduler.pending_count();
    let progress = xiangqi_tablebase::progress(total);
    log::info!("scheduling {total} canonical tiers up to {} pieces", args.max_pieces);

    let mut failures = 0usize;
    while let Some(tier) = scheduler.pop_ready() {
        match engine.solve_tier(&tier, config.memory_budget_bytes, false) {
            Ok(_) => scheduler.on_tier_solved(&tier),
            Err(err) => {
                log::error!("tier {tier} failed: {err}");
                scheduler.mark_failed(&tier);
                failures += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish();

    log::info!("done: {failures} tier(s) failed individually");
    // Exit 0 regardless of individual tier failures (spec.md §6); only
    // argument misuse exits 1.
    std::process::exit(0);
}
