//! The retrograde fixed-point engine: solves one canonical tier given
//! that all of its canonical children are already in the database
//! (spec.md §4.F).
//!
//! Grounded on `original_source/solve.c`'s six-stage pass (gate, load,
//! allocate, scan, propagate, finalize, persist) and on the teacher's
//! `crates/workers/src/pool.rs` fork-join shape for the per-bucket
//! parallel stages — generalized from poker's async worker `step()`
//! to `rayon`'s synchronous `par_iter`, since this solver has no
//! cross-thread suspension points (spec.md §5): every thread here is
//! either computing or blocked on a lock, never awaiting I/O from
//! another task.

use crate::combin::Triangle;
use crate::db::stat::Stats;
use crate::db::{Database, Integrity};
use crate::error::{Result, SolverError};
use crate::frontier::{child_tier_at, Frontier};
use crate::moves::{self, ILLEGAL_POS};
use crate::position::canonical::noncanonical_hash;
use crate::position::hash::unhash;
use crate::position::Side;
use crate::tier::{Change, Tier};
use crate::{lose_value, win_value, Value, MAX_REMOTENESS, VALUE_DRAW, VALUE_UNREACHABLE};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};

/// Frontier "source" sentinel meaning the entry is a position in the
/// tier being solved, rather than an imported child-tier position —
/// distinguished from a valid index into `child_edges` (spec.md §4.E
/// "dividers ... record ... which tier it came from").
const OWN_TIER: usize = usize::MAX;

pub struct Engine<'a> {
    triangle: &'a Triangle,
    db: &'a Database,
}

impl<'a> Engine<'a> {
    pub fn new(triangle: &'a Triangle, db: &'a Database) -> Self {
        Engine { triangle, db }
    }

    /// `solve_tier(tier_name, mem_budget, force) -> Stats` (spec.md
    /// §6's in-process API). `tier` must be canonical — the scheduler
    /// is responsible for never invoking this on a non-canonical tier
    /// (spec.md §4.H step 2).
    pub fn solve_tier(&self, tier: &Tier, mem_budget: u64, force: bool) -> Result<Stats> {
        if !force {
            if let Integrity::Ok = self.db.check_tier(tier)? {
                return self.db.read_stats(tier);
            }
        }

        // S0 — gate.
        let required = tier
            .required_mem(self.triangle)
            .ok_or_else(|| SolverError::TierTooLarge { tier: tier.to_string() })?;
        if required > mem_budget {
            return Err(SolverError::OutOfMemory {
                tier: tier.to_string(),
                required,
                budget: mem_budget,
            });
        }
        let tier_size = tier
            .size(self.triangle)
            .ok_or_else(|| SolverError::TierTooLarge { tier: tier.to_string() })? as usize;

        let win_fr = Frontier::new(MAX_REMOTENESS);
        let lose_fr = Frontier::new(MAX_REMOTENESS);

        // S1 — load child frontiers, children processed in the fixed
        // order `Tier::children` enumerates them.
        let child_edges = tier.children();
        for (child_index, (child_tier, _change)) in child_edges.iter().enumerate() {
            let canonical_child = child_tier.canonical();
            let child_values = self.db.read_values(&canonical_child)?;
            for (h, &v) in child_values.iter().enumerate() {
                if v == VALUE_UNREACHABLE || v == VALUE_DRAW {
                    continue;
                }
                let nc_hash = if canonical_child == *child_tier {
                    h as u64
                } else {
                    noncanonical_hash(&canonical_child, h as u64, child_tier, self.triangle)
                };
                if v < VALUE_DRAW {
                    lose_fr.add((v - 1) as usize, child_index, nc_hash);
                } else {
                    win_fr.add((65535 - v) as usize, child_index, nc_hash);
                }
            }
        }

        // S2 — allocate working arrays. Distinct indices are written
        // by distinct threads (spec.md §5); atomics carry that without
        // a blanket lock.
        let values: Vec<AtomicU16> = (0..tier_size).map(|_| AtomicU16::new(0)).collect();
        let n_und_child: Vec<AtomicU32> = (0..tier_size).map(|_| AtomicU32::new(0)).collect();

        // S3 — scan the current tier.
        (0..tier_size).into_par_iter().for_each(|h| {
            let nc = moves::num_children(tier, h as u64, self.triangle);
            if nc == ILLEGAL_POS {
                n_und_child[h].store(ILLEGAL_POS, Ordering::Relaxed);
            } else if nc == 0 {
                values[h].store(1, Ordering::Relaxed);
                lose_fr.add(0, OWN_TIER, h as u64);
            } else {
                n_und_child[h].store(nc, Ordering::Relaxed);
            }
        });

        // S4 — propagate in strictly increasing remoteness order.
        let mut r = 0usize;
        while r < MAX_REMOTENESS {
            let nothing_left = lose_fr.is_empty(r)
                && win_fr.is_empty(r)
                && r > lose_fr.high()
                && r > win_fr.high();
            if nothing_left {
                break;
            }

            let (lose_hashes, lose_dividers) = lose_fr.release(r);
            lose_hashes.par_iter().enumerate().for_each(|(i, &h)| {
                let src = child_tier_at(&lose_dividers, i);
                for (_, p) in self.predecessors(tier, src, &child_edges, h) {
                    let idx = p as usize;
                    let new_value = win_value(r + 1);
                    if values[idx]
                        .compare_exchange(0, new_value, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                        && r + 1 < MAX_REMOTENESS
                    {
                        win_fr.add(r + 1, OWN_TIER, p);
                    }
                }
            });

            let (win_hashes, win_dividers) = win_fr.release(r);
            win_hashes.par_iter().enumerate().for_each(|(i, &h)| {
                let src = child_tier_at(&win_dividers, i);
                for (_, p) in self.predecessors(tier, src, &child_edges, h) {
                    let idx = p as usize;
                    // A predecessor already decided WIN (by a losing
                    // child popped in an earlier, lower-remoteness
                    // round) has left its undecided state; the spec's
                    // state machine (§4.F) has no transition out of
                    // WIN, so further winning children must not touch
                    // it.
                    if values[idx].load(Ordering::Acquire) != 0 {
                        continue;
                    }
                    loop {
                        let cur = n_und_child[idx].load(Ordering::Acquire);
                        if cur == 0 || cur == ILLEGAL_POS {
                            break;
                        }
                        if n_und_child[idx]
                            .compare_exchange(cur, cur - 1, Ordering::AcqRel, Ordering::Acquire)
                            .is_ok()
                        {
                            if cur - 1 == 0
                                && values[idx]
                                    .compare_exchange(0, lose_value(r + 1), Ordering::AcqRel, Ordering::Acquire)
                                    .is_ok()
                                && r + 1 < MAX_REMOTENESS
                            {
                                lose_fr.add(r + 1, OWN_TIER, p);
                            }
                            break;
                        }
                    }
                }
            });

            r += 1;
        }

        // S5 — finalize: whatever is still undecided is a draw.
        (0..tier_size).into_par_iter().for_each(|h| {
            let nc = n_und_child[h].load(Ordering::Relaxed);
            if nc != ILLEGAL_POS && nc > 0 {
                values[h].store(VALUE_DRAW, Ordering::Relaxed);
            }
        });

        let final_values: Vec<Value> = values.iter().map(|v| v.load(Ordering::Relaxed)).collect();

        // Write-through on duplicate solve: a prior, integrity-checked
        // solve for this tier must match byte-for-byte, or the process
        // has regressed (spec.md §4.G, §7).
        if let Integrity::Ok = self.db.check_tier(tier)? {
            let previous = self.db.read_values(tier)?;
            if previous != final_values {
                let mismatch_hash = previous
                    .iter()
                    .zip(final_values.iter())
                    .position(|(a, b)| a != b)
                    .unwrap_or(0) as u64;
                return Err(SolverError::Integrity {
                    tier: tier.to_string(),
                    hash: mismatch_hash,
                });
            }
        }

        let stats = self.compute_stats(tier, &final_values);

        // S6 — persist. The `.stat` write is the commit marker: if the
        // process dies between these two writes, `check_tier` reports
        // `Missing` and a restart re-solves from scratch.
        self.db.write_values(tier, &final_values)?;
        self.db.write_stats(tier, &stats)?;

        Ok(stats)
    }

    /// Predecessors (in `tier`'s frame) of a frontier entry that came
    /// from source `src`: `OWN_TIER` means an in-tier reverse move;
    /// any other value indexes `child_edges` for the capture/pawn-step
    /// reverse generator (spec.md §4.D `parents`).
    fn predecessors(&self, tier: &Tier, src: usize, child_edges: &[(Tier, Change)], hash: u64) -> Vec<(Tier, u64)> {
        if src == OWN_TIER {
            moves::parents_in_tier(tier, hash, self.triangle)
        } else {
            let (child_tier, change) = &child_edges[src];
            moves::parents(child_tier, hash, tier, *change, self.triangle)
        }
    }

    /// Category counts plus, per side, the deepest WIN actually found
    /// for a position belonging to this tier (spec.md §4.F S4 "Update
    /// longest-win statistics when `p` belongs to `t` itself").
    fn compute_stats(&self, tier: &Tier, values: &[Value]) -> Stats {
        let mut legal_count = 0u64;
        let mut win_count = 0u64;
        let mut lose_count = 0u64;
        let mut draw_count = 0u64;
        let mut longest_red = (0u64, 0u64);
        let mut longest_black = (0u64, 0u64);

        for (h, &v) in values.iter().enumerate() {
            if v == VALUE_UNREACHABLE {
                continue;
            }
            legal_count += 1;
            match v.cmp(&VALUE_DRAW) {
                std::cmp::Ordering::Equal => draw_count += 1,
                std::cmp::Ordering::Less => lose_count += 1,
                std::cmp::Ordering::Greater => {
                    win_count += 1;
                    let remoteness = (65535 - v) as u64;
                    let side = unhash(tier, h as u64, self.triangle).side_to_move;
                    match side {
                        Side::Red if remoteness > longest_red.0 => longest_red = (remoteness, h as u64),
                        Side::Black if remoteness > longest_black.0 => longest_black = (remoteness, h as u64),
                        _ => {}
                    }
                }
            }
        }

        Stats {
            legal_count,
            win_count,
            lose_count,
            draw_count,
            longest_win_remoteness_red: longest_red.0,
            longest_win_position_red: longest_red.1,
            longest_win_remoteness_black: longest_black.0,
            longest_win_position_black: longest_black.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VALUE_DRAW as DRAW;

    /// Scenario A (spec.md §8): two bare kings. Every position is a
    /// draw (neither side can mate), and every position has at least
    /// one legal move (a king step within the palace).
    #[test]
    fn bare_kings_tier_solves_to_all_draws() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Triangle::new();
        let db = Database::new(dir.path());
        let engine = Engine::new(&triangle, &db);
        let tier = Tier::parse("000000000000__").unwrap();

        let stats = engine.solve_tier(&tier, u64::MAX, false).unwrap();

        assert_eq!(stats.legal_count, 162);
        assert_eq!(stats.win_count, 0);
        assert_eq!(stats.lose_count, 0);
        assert_eq!(stats.draw_count, 162);

        let values = db.read_values(&tier).unwrap();
        assert!(values.iter().all(|&v| v == DRAW));
    }

    #[test]
    fn resolving_without_force_reuses_stored_stats() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Triangle::new();
        let db = Database::new(dir.path());
        let engine = Engine::new(&triangle, &db);
        let tier = Tier::parse("000000000000__").unwrap();

        let first = engine.solve_tier(&tier, u64::MAX, false).unwrap();
        let second = engine.solve_tier(&tier, u64::MAX, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn forced_resolve_matches_prior_values_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Triangle::new();
        let db = Database::new(dir.path());
        let engine = Engine::new(&triangle, &db);
        let tier = Tier::parse("000000000000__").unwrap();

        engine.solve_tier(&tier, u64::MAX, false).unwrap();
        let refreshed = engine.solve_tier(&tier, u64::MAX, true).unwrap();
        assert_eq!(refreshed.draw_count, 162);
    }

    #[test]
    fn insufficient_memory_budget_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Triangle::new();
        let db = Database::new(dir.path());
        let engine = Engine::new(&triangle, &db);
        let tier = Tier::parse("000000000000__").unwrap();

        let err = engine.solve_tier(&tier, 1, false).unwrap_err();
        assert!(matches!(err, SolverError::OutOfMemory { .. }));
    }

    /// Scenario B (spec.md §8) plus invariants 4/5/6: a single black
    /// rook against two bare kings. Every WIN must have a LOSE child one ply
    /// shallower, every LOSE must have every child WIN at a shallower
    /// or equal ply, and a position can only reach its final value
    /// once — this exercises the multi-child fan-in path in S4 where a
    /// position already decided WIN by one losing child must not be
    /// flipped to LOSE by a later winning child's decrement.
    #[test]
    fn single_rook_tier_respects_win_lose_child_invariants() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Triangle::new();
        let db = Database::new(dir.path());
        let engine = Engine::new(&triangle, &db);

        let bare_kings = Tier::parse("000000000000__").unwrap();
        engine.solve_tier(&bare_kings, u64::MAX, false).unwrap();

        let rook_tier = Tier::parse("000000000001__").unwrap();
        let stats = engine.solve_tier(&rook_tier, u64::MAX, false).unwrap();
        assert_eq!(stats.legal_count, stats.win_count + stats.lose_count + stats.draw_count);

        let values = db.read_values(&rook_tier).unwrap();
        for (h, &v) in values.iter().enumerate() {
            if v == crate::VALUE_UNREACHABLE {
                continue;
            }
            let Some(children) = moves::children(&rook_tier, h as u64, &triangle) else {
                continue;
            };
            let child_values: Vec<Value> = children
                .iter()
                .map(|(child_tier, child_hash)| {
                    let canonical = child_tier.canonical();
                    let canonical_hash = if canonical == *child_tier {
                        *child_hash
                    } else {
                        noncanonical_hash(child_tier, *child_hash, &canonical, &triangle)
                    };
                    db.read_value_at(&canonical, canonical_hash).unwrap()
                })
                .collect();

            match v.cmp(&DRAW) {
                std::cmp::Ordering::Greater => {
                    let remoteness = 65535 - v;
                    assert!(
                        child_values.iter().any(|&cv| cv != 0 && cv < DRAW && (cv - 1) as u16 == remoteness - 1),
                        "WIN-in-{remoteness} position {h} has no LOSE-in-{} child",
                        remoteness - 1
                    );
                }
                std::cmp::Ordering::Less => {
                    let remoteness = v - 1;
                    assert!(
                        child_values.iter().all(|&cv| cv > DRAW && (65535 - cv) <= remoteness.saturating_sub(1)),
                        "LOSE-in-{remoteness} position {h} has a non-WIN or too-deep child"
                    );
                }
                std::cmp::Ordering::Equal => {
                    assert!(
                        child_values.iter().all(|&cv| cv == 0 || cv >= DRAW),
                        "DRAW position {h} has a LOSE child"
                    );
                }
            }
        }
    }
}
