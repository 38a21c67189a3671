//! `solve-tier <tier-name> <memory-GiB>` (spec.md §6): resolve a single
//! tier's transitive dependencies first, then solve it.

use clap::Parser;
use xiangqi_tablebase::combin::Triangle;
use xiangqi_tablebase::config::SolverConfig;
use xiangqi_tablebase::db::Database;
use xiangqi_tablebase::scheduler::Scheduler;
use xiangqi_tablebase::solver::Engine;
use xiangqi_tablebase::tier::Tier;

#[derive(Parser)]
#[command(name = "solve-tier", about = "Solve one tier and its transitive dependencies")]
struct Args {
    tier_name: String,
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

    let target = match Tier::parse(&args.tier_name) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("malformed tier: {err}");
            std::process::exit(1);
        }
    };

    let config = SolverConfig::new(args.memory_gib, num_cpus::get());
    if let Err(err) = config.install_thread_pool() {
        log::warn!("thread pool already installed: {err}");
    }

    let triangle = Triangle::new();
    let db = Database::new(&config.data_root);
    let engine = Engine::new(&triangle, &db);
    let mut scheduler = Scheduler::from_targets(std::slice::from_ref(&target));

    let progress = xiangqi_tablebase::progress(scheduler.pending_count());
    while let Some(tier) = scheduler.pop_ready() {
        match engine.solve_tier(&tier, config.memory_budget_bytes, false) {
            Ok(stats) => {
                log::info!("solved {tier} ({} legal, {} win, {} lose, {} draw)", stats.legal_count, stats.win_count, stats.lose_count, stats.draw_count);
                scheduler.on_tier_solved(&tier);
            }
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
