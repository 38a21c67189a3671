pub mod combin;
pub mod config;
pub mod db;
pub mod error;
pub mod frontier;
pub mod moves;
pub mod position;
pub mod query;
pub mod scheduler;
pub mod solver;
pub mod tier;

pub use error::{Result, SolverError};

/// Value encoding shared by the frontier, solver, and database:
/// `0` = unreachable, `1..=32767` = LOSE-in-`(v-1)`, `32768` = DRAW,
/// `32769..=65535` = WIN-in-`(65535-v)`.
pub type Value = u16;

pub const VALUE_UNREACHABLE: Value = 0;
pub const VALUE_DRAW: Value = 32768;

/// One remoteness bucket per 16-bit integer: `r` ranges over
/// `[0, MAX_REMOTENESS)` (spec.md §4.E).
pub const MAX_REMOTENESS: usize = 32767;

/// `65535 - v` / `v - 1` never need to exceed this many plies from
/// terminal, since `Value` only has this many WIN/LOSE buckets either
/// side of `VALUE_DRAW`.
pub fn win_value(remoteness: usize) -> Value {
    (65535 - remoteness) as Value
}

pub fn lose_value(remoteness: usize) -> Value {
    (remoteness + 1) as Value
}

/// A fresh progress bar styled like the rest of the CLI's output.
#[cfg(feature = "cli")]
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_millis(250);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan} {pos}/{len}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// Initialize combined terminal + file logging under `logs/`.
#[cfg(feature = "cli")]
pub fn init_logging(verbosity: log::LevelFilter) {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        verbosity,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
