//! Recovering a non-canonical tier's hash from its canonical twin
//! (spec.md §4.C `noncanonical_hash`).
//!
//! Only the canonical member of `{t, mirror(t)}` is ever persisted
//! (§9(b)). When a parent tier needs the hashes of a child stored
//! under its mirror, it unhashes in the canonical tier, rotates the
//! board 180 degrees and swaps colors, then rehashes in its own
//! (non-canonical) tier.

use super::hash::{hash, unhash};
use super::{Position, Side, Square};
use crate::combin::Triangle;
use crate::tier::Tier;

fn rotate(sq: Square) -> Square {
    Square::new(9 - sq.row, 8 - sq.col)
}

fn rotate_all(squares: &[Square]) -> Vec<Square> {
    squares.iter().map(|&sq| rotate(sq)).collect()
}

/// Rotate the board 180 degrees and swap red/black, producing the
/// position's color-swapped twin under the other tier's frame.
pub fn swap_colors(position: &Position) -> Position {
    Position {
        side_to_move: position.side_to_move.other(),
        red_king: rotate(position.black_king),
        black_king: rotate(position.red_king),
        red_advisors: rotate_all(&position.black_advisors),
        black_advisors: rotate_all(&position.red_advisors),
        red_bishops: rotate_all(&position.black_bishops),
        black_bishops: rotate_all(&position.red_bishops),
        red_pawns: rotate_all(&position.black_pawns),
        black_pawns: rotate_all(&position.red_pawns),
        red_knights: rotate_all(&position.black_knights),
        black_knights: rotate_all(&position.red_knights),
        red_cannons: rotate_all(&position.black_cannons),
        black_cannons: rotate_all(&position.red_cannons),
        red_rooks: rotate_all(&position.black_rooks),
        black_rooks: rotate_all(&position.red_rooks),
        invalid: position.invalid,
    }
}

/// `noncanonical_hash(c_tier, c_hash, nc_tier)`: unhash in the
/// canonical tier, rotate and swap colors, rehash in `nc_tier`.
pub fn noncanonical_hash(canonical_tier: &Tier, canonical_hash: u64, noncanonical_tier: &Tier, triangle: &Triangle) -> u64 {
    let position = unhash(canonical_tier, canonical_hash, triangle);
    let swapped = swap_colors(&position);
    hash(noncanonical_tier, &swapped, triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{BLACK_PALACE, RED_PALACE};

    #[test]
    fn swap_colors_is_involution() {
        let position = Position {
            side_to_move: Side::Red,
            red_king: RED_PALACE[1],
            black_king: BLACK_PALACE[2],
            red_advisors: vec![],
            black_advisors: vec![],
            red_bishops: vec![],
            black_bishops: vec![],
            red_pawns: vec![],
            black_pawns: vec![],
            red_knights: vec![],
            black_knights: vec![],
            red_cannons: vec![],
            black_cannons: vec![],
            red_rooks: vec![],
            black_rooks: vec![],
            invalid: false,
        };
        let twice = swap_colors(&swap_colors(&position));
        assert_eq!(twice.red_king, position.red_king);
        assert_eq!(twice.black_king, position.black_king);
        assert_eq!(twice.side_to_move, position.side_to_move);
    }

    #[test]
    fn noncanonical_hash_roundtrips_through_self_mirror_tier() {
        let triangle = Triangle::new();
        let tier = Tier::parse("000000000000__").unwrap();
        let position = Position {
            side_to_move: Side::Red,
            red_king: RED_PALACE[0],
            black_king: BLACK_PALACE[0],
            red_advisors: vec![],
            black_advisors: vec![],
            red_bishops: vec![],
            black_bishops: vec![],
            red_pawns: vec![],
            black_pawns: vec![],
            red_knights: vec![],
            black_knights: vec![],
            red_cannons: vec![],
            black_cannons: vec![],
            red_rooks: vec![],
            black_rooks: vec![],
            invalid: false,
        };
        let h = hash(&tier, &position, &triangle);
        let nc = noncanonical_hash(&tier, h, &tier, &triangle);
        assert!(nc < tier.size(&triangle).unwrap());
    }
}
