//! Operational queries against a solved database: the value and
//! remoteness of a position, and its optimal move (spec.md §1 "the
//! output ... answers two queries").
//!
//! This is the read-side counterpart to `solver`: it never writes.
//! The interactive REPL built on top of these functions is out of
//! core scope (spec.md §1); this module is what such a REPL, or the
//! `query` binary, would call.

use crate::combin::Triangle;
use crate::db::Database;
use crate::error::Result;
use crate::moves;
use crate::tier::Tier;
use crate::{Value, VALUE_DRAW, VALUE_UNREACHABLE};

/// The outcome of classifying a single `(tier, hash)` cell, decoded
/// from its raw [`Value`] (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The cell was never reached by any solve — either the tier
    /// hasn't been solved, or the position is unreachable.
    Unreachable,
    Draw,
    /// LOSE for the side to move, in this many plies.
    Lose(u16),
    /// WIN for the side to move, in this many plies.
    Win(u16),
}

impl Outcome {
    pub fn decode(value: Value) -> Outcome {
        if value == VALUE_UNREACHABLE {
            Outcome::Unreachable
        } else if value == VALUE_DRAW {
            Outcome::Draw
        } else if value < VALUE_DRAW {
            Outcome::Lose(value - 1)
        } else {
            Outcome::Win(65535 - value)
        }
    }
}

/// The value/remoteness of one position, read with a single seeked
/// block decompression rather than loading the whole tier.
pub fn query_value(db: &Database, tier: &Tier, hash: u64) -> Result<Outcome> {
    let raw = db.read_value_at(tier, hash)?;
    Ok(Outcome::decode(raw))
}

/// One successor and the outcome it leads to, for ranking candidate
/// moves from a position.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub tier: Tier,
    pub hash: u64,
    pub outcome: Outcome,
}

/// Every legal successor of `(tier, hash)`, each annotated with its
/// value by reading the (already-solved) child tier's database entry.
/// A successor tier that hasn't been solved yet surfaces as
/// `Outcome::Unreachable` rather than failing the whole query, since a
/// database query should degrade gracefully on a partially solved
/// tree.
pub fn candidates(db: &Database, triangle: &Triangle, tier: &Tier, hash: u64) -> Result<Vec<Candidate>> {
    let Some(successors) = moves::children(tier, hash, triangle) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(successors.len());
    for (succ_tier, succ_hash) in successors {
        let canonical = succ_tier.canonical();
        let canonical_hash = if canonical == succ_tier {
            succ_hash
        } else {
            rotate_into_canonical(&succ_tier, succ_hash, &canonical, triangle)
        };
        let outcome = db
            .read_value_at(&canonical, canonical_hash)
            .map(Outcome::decode)
            .unwrap_or(Outcome::Unreachable);
        out.push(Candidate { tier: succ_tier, hash: succ_hash, outcome });
    }
    Ok(out)
}

/// Map a non-canonical successor's hash into its canonical twin's
/// frame, the inverse direction of `noncanonical_hash` (unhash in the
/// non-canonical tier, rotate, rehash in canonical).
fn rotate_into_canonical(noncanonical_tier: &Tier, noncanonical_hash_value: u64, canonical_tier: &Tier, triangle: &Triangle) -> u64 {
    let position = crate::position::hash::unhash(noncanonical_tier, noncanonical_hash_value, triangle);
    let swapped = crate::position::canonical::swap_colors(&position);
    crate::position::hash::hash(canonical_tier, &swapped, triangle)
}

/// The best move from `(tier, hash)`: the successor whose outcome is
/// most favorable for the side to move — the lowest-remoteness WIN if
/// any exists, else the highest-remoteness DRAW-or-LOSE-for-opponent
/// (i.e. the successor the mover would most want the opponent placed
/// into), preferring a DRAW over a LOSE. Returns `None` if there are
/// no legal successors (a terminal position) or none are solved yet.
pub fn best_move(db: &Database, triangle: &Triangle, tier: &Tier, hash: u64) -> Result<Option<Candidate>> {
    let options = candidates(db, triangle, tier, hash)?;
    Ok(options
        .into_iter()
        .filter(|c| c.outcome != Outcome::Unreachable)
        .max_by_key(|c| match c.outcome {
            // A successor that is WIN-for-its-mover is the worst outcome for
            // us; among those, prefer the largest remoteness (delay the
            // loss as long as possible).
            Outcome::Win(r) => (0i32, r as i32),
            Outcome::Draw => (1, 0),
            // Best outcome: the opponent loses. Prefer the smallest
            // remoteness (force the win as fast as possible).
            Outcome::Lose(r) => (2, -(r as i32)),
            Outcome::Unreachable => unreachable!("filtered above"),
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Engine;

    #[test]
    fn query_value_reads_back_a_solved_draw() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Triangle::new();
        let db = Database::new(dir.path());
        let engine = Engine::new(&triangle, &db);
        let tier = Tier::parse("000000000000__").unwrap();
        engine.solve_tier(&tier, u64::MAX, false).unwrap();

        let outcome = query_value(&db, &tier, 0).unwrap();
        assert_eq!(outcome, Outcome::Draw);
    }

    #[test]
    fn best_move_is_none_without_any_solved_successors() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Triangle::new();
        let db = Database::new(dir.path());
        let tier = Tier::parse("000000000000__").unwrap();
        let mv = best_move(&db, &triangle, &tier, 0).unwrap();
        assert!(mv.is_none());
    }
}
