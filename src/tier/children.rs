//! Child/parent tier enumeration: the two kinds of cross-tier
//! transitions a move can make (spec.md §4.B, grounded on
//! `original_source/tier.c`'s `tier_get_child_tier_list`).
//!
//! A "child" of tier `t` is any tier reachable by one capture or one
//! pawn forward-step from a position in `t`. Each child is paired with
//! the `Change` that produced it, since the solver and scheduler both
//! need to know which kind of move bridges two tiers, not just that
//! one does.

use super::grammar::{Kind, Tier};

/// What distinguishes one parent-to-child edge from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A piece of this kind was captured.
    Capture(Kind),
    /// A pawn of this kind advanced one row, from `from_row`.
    PawnStep { kind: Kind, from_row: u8 },
}

const CAPTURABLE: [Kind; 10] = [
    Kind::RedAdvisor,
    Kind::BlackAdvisor,
    Kind::RedBishop,
    Kind::BlackBishop,
    Kind::RedKnight,
    Kind::BlackKnight,
    Kind::RedCannon,
    Kind::BlackCannon,
    Kind::RedRook,
    Kind::BlackRook,
];

impl Tier {
    /// Every tier reachable from `self` by one capture or one pawn
    /// forward-step, each paired with the `Change` that reaches it.
    pub fn children(&self) -> Vec<(Tier, Change)> {
        let mut out = Vec::new();

        for kind in CAPTURABLE {
            if self.count(kind) > 0 {
                let mut counts = *self.counts();
                counts[kind as usize] -= 1;
                out.push((
                    Tier::from_raw(counts, self.red_pawn_rows().to_vec(), self.black_pawn_rows().to_vec()),
                    Change::Capture(kind),
                ));
            }
        }

        for (kind, pawn_kind) in [(Kind::RedPawn, Kind::RedPawn), (Kind::BlackPawn, Kind::BlackPawn)] {
            let rows = if kind == Kind::RedPawn {
                self.red_pawn_rows()
            } else {
                self.black_pawn_rows()
            };
            for &row in distinct(rows) {
                let mut counts = *self.counts();
                counts[kind as usize] -= 1;
                let mut remaining: Vec<u8> = rows.to_vec();
                let pos = remaining.iter().position(|&r| r == row).expect("row present");
                remaining.remove(pos);
                let (red, black) = if kind == Kind::RedPawn {
                    (remaining, self.black_pawn_rows().to_vec())
                } else {
                    (self.red_pawn_rows().to_vec(), remaining)
                };
                out.push((
                    Tier::from_raw(counts, red, black),
                    Change::Capture(pawn_kind),
                ));
            }
            // Forward step: any distinct row above the minimum can advance by one,
            // collapsing into the existing multiset at row - 1.
            for &row in distinct(rows) {
                if row == 0 {
                    continue;
                }
                let rows_vec = if kind == Kind::RedPawn {
                    self.red_pawn_rows().to_vec()
                } else {
                    self.black_pawn_rows().to_vec()
                };
                let mut stepped = rows_vec.clone();
                let pos = stepped.iter().position(|&r| r == row).expect("row present");
                stepped[pos] = row - 1;
                stepped.sort_unstable_by(|a, b| b.cmp(a));
                let (red, black) = if kind == Kind::RedPawn {
                    (stepped, self.black_pawn_rows().to_vec())
                } else {
                    (self.red_pawn_rows().to_vec(), stepped)
                };
                out.push((
                    Tier::from_raw(*self.counts(), red, black),
                    Change::PawnStep { kind, from_row: row },
                ));
            }
        }

        out
    }

    /// All tiers that list `self` among their children. Used by the
    /// scheduler to build the dependency DAG bottom-up instead of
    /// enumerating every tier and filtering, which would be
    /// quadratic over the full tier space.
    pub fn is_child_of(&self, candidate_parent: &Tier) -> bool {
        candidate_parent.children().iter().any(|(child, _)| child == self)
    }

    /// Direct parent tiers of `self`: the inverse of `children`, built
    /// by adding back one capturable piece or reversing one pawn step,
    /// rather than searching the whole tier space for tiers whose
    /// `children()` include `self`.
    pub fn parents(&self) -> Vec<(Tier, Change)> {
        let mut out = Vec::new();

        for kind in CAPTURABLE {
            if self.count(kind) < kind.cap() {
                let mut counts = *self.counts();
                counts[kind as usize] += 1;
                out.push((
                    Tier::from_raw(counts, self.red_pawn_rows().to_vec(), self.black_pawn_rows().to_vec()),
                    Change::Capture(kind),
                ));
            }
        }

        for kind in [Kind::RedPawn, Kind::BlackPawn] {
            if self.count(kind) < kind.cap() {
                let mut counts = *self.counts();
                counts[kind as usize] += 1;
                // An uncaptured pawn could have arrived from any row up to the max.
                for insert_row in 0..=super::grammar::MAX_PAWN_ROW {
                    let mut rows = if kind == Kind::RedPawn {
                        self.red_pawn_rows().to_vec()
                    } else {
                        self.black_pawn_rows().to_vec()
                    };
                    rows.push(insert_row);
                    rows.sort_unstable_by(|a, b| b.cmp(a));
                    let (red, black) = if kind == Kind::RedPawn {
                        (rows, self.black_pawn_rows().to_vec())
                    } else {
                        (self.red_pawn_rows().to_vec(), rows)
                    };
                    out.push((Tier::from_raw(counts, red, black), Change::Capture(kind)));
                }
            }

            let rows = if kind == Kind::RedPawn {
                self.red_pawn_rows()
            } else {
                self.black_pawn_rows()
            };
            for &row in distinct(rows) {
                if row >= super::grammar::MAX_PAWN_ROW {
                    continue;
                }
                let mut stepped = rows.to_vec();
                let pos = stepped.iter().position(|&r| r == row).expect("row present");
                stepped[pos] = row + 1;
                stepped.sort_unstable_by(|a, b| b.cmp(a));
                let (red, black) = if kind == Kind::RedPawn {
                    (stepped, self.black_pawn_rows().to_vec())
                } else {
                    (self.red_pawn_rows().to_vec(), stepped)
                };
                out.push((
                    Tier::from_raw(*self.counts(), red, black),
                    Change::PawnStep { kind, from_row: row + 1 },
                ));
            }
        }

        out
    }
}

fn distinct(rows: &[u8]) -> Vec<&u8> {
    let mut seen = Vec::new();
    for r in rows {
        if !seen.contains(&r) {
            seen.push(r);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capturing_only_piece_reaches_bare_kings() {
        let t = Tier::parse("000000000001__").unwrap();
        let children = t.children();
        assert!(children
            .iter()
            .any(|(c, change)| c.piece_count() == 0 && matches!(change, Change::Capture(Kind::BlackRook))));
    }

    #[test]
    fn duplicate_row_pawns_yield_one_step_child_per_distinct_row() {
        let t = Tier::parse("000300000000_422_").unwrap();
        let steps: Vec<_> = t
            .children()
            .into_iter()
            .filter(|(_, change)| matches!(change, Change::PawnStep { .. }))
            .collect();
        // distinct rows are {4, 2}; row 0 would be excluded if present
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn pawn_capture_reduces_pawn_count() {
        let t = Tier::parse("000300000000_422_").unwrap();
        let captures: Vec<_> = t
            .children()
            .into_iter()
            .filter(|(_, change)| matches!(change, Change::Capture(Kind::RedPawn)))
            .collect();
        assert_eq!(captures.len(), 2); // rows {4, 2} distinct
        for (child, _) in &captures {
            assert_eq!(child.count(Kind::RedPawn), 2);
        }
    }
}
