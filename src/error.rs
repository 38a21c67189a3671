use thiserror::Error;

/// Unified error type surfaced across the tier model, hashing, move
/// generation, solver, scheduler, and database layers.
///
/// The propagation policy mirrors the taxonomy the engine's design
/// demands: some variants are logged-and-continue (malformed tier,
/// tier too large), others are fatal to a single tier (out of memory,
/// filesystem errors during persistence), and `Integrity` is fatal to
/// the whole process because it signals a solver regression.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("malformed tier string: {0}")]
    MalformedTier(String),

    #[error("tier too large to solve: {tier} (size or required memory overflowed u64)")]
    TierTooLarge { tier: String },

    #[error("tier {tier} requires {required} bytes but budget is {budget} bytes")]
    OutOfMemory {
        tier: String,
        required: u64,
        budget: u64,
    },

    #[error("allocation failed while solving tier {tier}")]
    Oom { tier: String },

    #[error(
        "integrity check failed for tier {tier}: re-solved values diverge from stored values at hash {hash}"
    )]
    Integrity { tier: String, hash: u64 },

    #[error("database entry missing for tier {0}")]
    Missing(String),

    #[error("stats sidecar for tier {tier} has wrong size: expected {expected}, found {found}")]
    StatCorrupted {
        tier: String,
        expected: usize,
        found: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
