//! `query <tier-name> <hash>` — a one-shot lookup against a solved
//! database: the position's value/remoteness and its best move.
//!
//! The interactive query REPL is out of core scope (spec.md §1); this
//! binary exposes the same two read queries the core answers
//! (spec.md §1) without a REPL loop around them.

use clap::Parser;
use colored::Colorize;
use xiangqi_tablebase::combin::Triangle;
use xiangqi_tablebase::config::SolverConfig;
use xiangqi_tablebase::db::Database;
use xiangqi_tablebase::query::{self, Outcome};
use xiangqi_tablebase::tier::Tier;

#[derive(Parser)]
#[command(name = "query", about = "Look up a position's value and best move")]
struct Args {
    tier_name: String,
    hash: u64,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let tier = match Tier::parse(&args.tier_name) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("malformed tier: {err}");
            std::process::exit(1);
        }
    };

    let config = SolverConfig::new(0.0, 1);
    let triangle = Triangle::new();
    let db = Database::new(&config.data_root);

    match query::query_value(&db, &tier, args.hash) {
        Ok(outcome) => println!("{}", describe(outcome)),
        Err(err) => {
            eprintln!("{}", format!("lookup failed: {err}").red());
            std::process::exit(1);
        }
    }

    match query::best_move(&db, &triangle, &tier, args.hash) {
        Ok(Some(candidate)) => {
            println!(
                "best move -> {} @ {} ({})",
                candidate.tier.to_string().cyan(),
                candidate.hash,
                describe(candidate.outcome),
            );
        }
        Ok(None) => println!("{}", "no solved successor (terminal position, or successors not yet solved)".yellow()),
        Err(err) => eprintln!("{}", format!("best-move lookup failed: {err}").red()),
    }
}

fn describe(outcome: Outcome) -> String {
    match outcome {
        Outcome::Unreachable => "unreachable / not yet solved".to_string(),
        Outcome::Draw => "draw".to_string(),
        Outcome::Lose(r) => format!("lose in {r}"),
        Outcome::Win(r) => format!("win in {r}"),
    }
}
