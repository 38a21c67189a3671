//! Ambient configuration: where the database lives on disk, how much
//! memory a single tier solve may use, and how many worker threads
//! drive the engine's fork-join stages (spec.md §6).
//!
//! The teacher has no single config module of its own — `Disk::path`
//! computes its Postgres-binary paths inline from `current_dir()`.
//! This crate's CLI surface (four binaries, each taking explicit
//! positional memory/thread arguments per spec.md §6) needs a small
//! shared place for that math instead of repeating it per binary.

use std::path::PathBuf;

/// Database root relative to the current working directory, per
/// spec.md §6 ("database rooted at `../data/` (relative to CWD)").
pub const DEFAULT_DATA_ROOT: &str = "../data";

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub data_root: PathBuf,
    pub memory_budget_bytes: u64,
    pub threads: usize,
}

impl SolverConfig {
    pub fn new(memory_budget_gib: f64, threads: usize) -> Self {
        SolverConfig {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            memory_budget_bytes: (memory_budget_gib * (1u64 << 30) as f64) as u64,
            threads,
        }
    }

    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    /// Install a process-wide `rayon` thread pool sized to
    /// `self.threads`. The engine's parallel stages (S3-S5) and the
    /// blocked-gzip compressor (S6) all ride the global pool, so this
    /// only needs calling once, before the first solve.
    pub fn install_thread_pool(&self) -> Result<(), rayon::ThreadPoolBuildError> {
        rayon::ThreadPoolBuilder::new().num_threads(self.threads).build_global()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_budget_converts_gib_to_bytes() {
        let config = SolverConfig::new(2.0, 4);
        assert_eq!(config.memory_budget_bytes, 2 * (1u64 << 30));
    }
}
