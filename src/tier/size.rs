//! Tier sizing: the product of the 15 independent hash sub-choices
//! (spec.md §4.C), doubled for side-to-move, plus `required_mem`.
//!
//! Grounded step-for-step on `original_source/tier.c`'s
//! `tier_size_step` (20 C steps collapse into our 15 hash steps
//! because advisor/bishop/pawn-row arithmetic is identical; we keep
//! the same case-by-case structure the original uses, generalized
//! into an enum-driven Rust match over `Kind`/row-band rather than
//! magic string-index steps).

use super::grammar::{Kind, Tier};
use crate::combin::Triangle;

impl Tier {
    /// `size(t)`: the number of positions in this tier, including the
    /// side-to-move bit. `None` on arithmetic overflow (the tier must
    /// be rejected upstream per spec.md §4.B).
    pub fn size(&self, triangle: &Triangle) -> Option<u64> {
        let mut size: u64 = 2; // side to move
        for step in 0..15 {
            let step_size = self.step_size(triangle, step);
            size = size.checked_mul(step_size)?;
        }
        Some(size)
    }

    /// Per-step domain size, matching the 15-step decomposition of
    /// spec.md §4.C (steps 1-2 king+advisors, 3-4 bishops, 5-14 pawn
    /// rows, 15 knights/cannons/rooks — here 0-indexed).
    fn step_size(&self, triangle: &Triangle, step: usize) -> u64 {
        match step {
            0 => king_and_advisors(self.count(Kind::RedAdvisor)),
            1 => king_and_advisors(self.count(Kind::BlackAdvisor)),
            2 => triangle.choose(7, self.count(Kind::RedBishop) as usize),
            3 => triangle.choose(7, self.count(Kind::BlackBishop) as usize),
            4..=6 => {
                // rows 0,1,2: bottom three rows of black's half, red pawns only
                let row = step - 4;
                let red_on_row = count_at_row(self.red_pawn_rows(), row as u8);
                triangle.choose(9, red_on_row)
            }
            7..=10 => {
                // rows 3..6 split into more-restricted (5-col) / less-restricted (9-col) bands
                let row = step - 4;
                let red_on_row = count_at_row(self.red_pawn_rows(), row as u8);
                let black_on_row = count_at_row(self.black_pawn_rows(), (9 - row) as u8);
                if step < 9 {
                    triangle.choose(5, black_on_row) * triangle.choose(9 - black_on_row, red_on_row)
                } else {
                    triangle.choose(5, red_on_row) * triangle.choose(9 - red_on_row, black_on_row)
                }
            }
            11..=13 => {
                let row = step - 4;
                let black_on_row = count_at_row(self.black_pawn_rows(), (9 - row) as u8);
                triangle.choose(9, black_on_row)
            }
            14 => {
                // knights + cannons + rooks: multinomial over remaining empty squares
                let mut existing: usize = 2; // two kings
                let prior_kinds = [
                    Kind::RedAdvisor,
                    Kind::BlackAdvisor,
                    Kind::RedBishop,
                    Kind::BlackBishop,
                    Kind::RedPawn,
                    Kind::BlackPawn,
                ];
                for k in prior_kinds {
                    existing += self.count(k) as usize;
                }
                let mut product: u64 = 1;
                for k in [
                    Kind::RedKnight,
                    Kind::BlackKnight,
                    Kind::RedCannon,
                    Kind::BlackCannon,
                    Kind::RedRook,
                    Kind::BlackRook,
                ] {
                    let target = self.count(k) as usize;
                    product *= triangle.choose(90 - existing, target);
                    existing += target;
                }
                product
            }
            _ => unreachable!("15 steps only"),
        }
    }

    /// `required_mem(t) = 19 * size(t) + 16 * sum(size(child))`.
    /// `None` on overflow anywhere in the computation.
    pub fn required_mem(&self, triangle: &Triangle) -> Option<u64> {
        let own = self.size(triangle)?;
        let mut child_total: u64 = 0;
        for (child, _change) in self.children() {
            let child_size = child.size(triangle)?;
            child_total = child_total.checked_add(child_size)?;
        }
        own.checked_mul(19)?.checked_add(child_total.checked_mul(16)?)
    }

    /// Number of remaining pieces on each of the 20 board rows (0-9 on
    /// each side), decoded from the pawn-row suffixes. Used by the
    /// position hash to determine, per row, how many red/black pawns
    /// occupy it.
    pub fn pawns_per_row(&self) -> [u8; 10] {
        let mut rows = [0u8; 10];
        for &r in self.red_pawn_rows() {
            rows[r as usize] += 1;
        }
        rows
    }

    pub fn black_pawns_per_row(&self) -> [u8; 10] {
        let mut rows = [0u8; 10];
        for &r in self.black_pawn_rows() {
            rows[r as usize] += 1;
        }
        rows
    }
}

fn count_at_row(rows: &[u8], row: u8) -> usize {
    rows.iter().filter(|&&r| r == row).count()
}

/// King+advisor domain: 9 slots if no advisors, 40 if one, 70 if two.
fn king_and_advisors(advisor_count: u8) -> u64 {
    match advisor_count {
        0 => 9,
        1 => 40,
        2 => 70,
        _ => unreachable!("advisor cap is 2"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_kings_size_is_162() {
        let t = Tier::parse("000000000000__").unwrap();
        let triangle = Triangle::new();
        assert_eq!(t.size(&triangle), Some(2 * 9 * 9));
    }

    #[test]
    fn one_advisor_each_side_scales_up() {
        let t = Tier::parse("100100000000__").unwrap();
        let triangle = Triangle::new();
        assert_eq!(t.size(&triangle), Some(2 * 40 * 40));
    }

    #[test]
    fn required_mem_is_positive_and_finite() {
        let t = Tier::parse("000000000000__").unwrap();
        let triangle = Triangle::new();
        assert!(t.required_mem(&triangle).unwrap() > 0);
    }
}
