//! Position <-> dense-integer bijection (spec.md §4.C).
//!
//! The hash is a mixed-radix encoding of the fifteen independent
//! sub-choices plus the side-to-move bit, most significant first:
//! `side_to_move`, then steps `0..15` in the same order
//! `Tier::size`'s step product uses, so a tier's `size()` is exactly
//! the base this hash is computed in.

use super::cruncher::{rank_combination, rank_multiset, unrank_combination, unrank_multiset};
use super::{
    pawn_row_to_absolute, Position, Side, Square, BLACK_ADVISOR_POINTS, BLACK_BISHOP_POINTS, BLACK_PALACE,
    PAWN_FILES, RED_ADVISOR_POINTS, RED_BISHOP_POINTS, RED_PALACE,
};
use crate::combin::Triangle;
use crate::tier::{Kind, Tier};

/// Hash `position` into `[0, tier.size(triangle))`. Panics if
/// `position` does not actually belong to `tier` (a programming error
/// upstream, not a data condition — callers always hash positions they
/// themselves generated against a known tier).
pub fn hash(tier: &Tier, position: &Position, triangle: &Triangle) -> u64 {
    let domains = step_domains(tier, triangle);
    let ranks = step_ranks(tier, position, triangle);

    let mut acc = match position.side_to_move {
        Side::Red => 0u64,
        Side::Black => 1u64,
    };
    for step in 0..15 {
        acc = acc * domains[step] + ranks[step];
    }
    acc
}

/// Invert [`hash`]. `position.invalid` is set when `value` falls
/// outside the image of legal placements for some step (for instance,
/// a multiset step residual that does not correspond to any
/// arrangement); such positions must be treated as unreachable rather
/// than acted upon.
pub fn unhash(tier: &Tier, mut value: u64, triangle: &Triangle) -> Position {
    let domains = step_domains(tier, triangle);
    let mut ranks = [0u64; 15];
    for step in (0..15).rev() {
        let d = domains[step].max(1);
        ranks[step] = value % d;
        value /= d;
    }
    let side_to_move = if value % 2 == 0 { Side::Red } else { Side::Black };

    decode(tier, &ranks, side_to_move, triangle)
}

fn step_domains(tier: &Tier, triangle: &Triangle) -> [u64; 15] {
    let mut d = [0u64; 15];
    d[0] = king_advisor_domain_size(tier.count(Kind::RedAdvisor));
    d[1] = king_advisor_domain_size(tier.count(Kind::BlackAdvisor));
    d[2] = triangle.choose(7, tier.count(Kind::RedBishop) as usize);
    d[3] = triangle.choose(7, tier.count(Kind::BlackBishop) as usize);
    for (i, row) in (0..3).enumerate() {
        let k = count_at(tier.red_pawn_rows(), row);
        d[4 + i] = triangle.choose(9, k);
    }
    for (i, row) in (3..=6).enumerate() {
        let red = count_at(tier.red_pawn_rows(), row);
        let black = count_at(tier.black_pawn_rows(), 9 - row);
        d[7 + i] = if row <= 4 {
            triangle.choose(5, black) * triangle.choose(9 - black, red)
        } else {
            triangle.choose(5, red) * triangle.choose(9 - red, black)
        };
    }
    for (i, row) in (0..3).enumerate() {
        let k = count_at(tier.black_pawn_rows(), row);
        d[11 + i] = triangle.choose(9, k);
    }
    d[14] = knight_cannon_rook_domain(tier, triangle);
    d
}

fn count_at(rows: &[u8], row: u8) -> usize {
    rows.iter().filter(|&&r| r == row).count()
}

fn king_advisor_domain_size(advisor_count: u8) -> u64 {
    match advisor_count {
        0 => 9,
        1 => 40,
        2 => 70,
        _ => unreachable!("advisor cap is 2"),
    }
}

fn knight_cannon_rook_domain(tier: &Tier, triangle: &Triangle) -> u64 {
    let existing = 2
        + tier.count(Kind::RedAdvisor) as u64
        + tier.count(Kind::BlackAdvisor) as u64
        + tier.count(Kind::RedBishop) as u64
        + tier.count(Kind::BlackBishop) as u64
        + tier.count(Kind::RedPawn) as u64
        + tier.count(Kind::BlackPawn) as u64;
    let counts = [
        tier.count(Kind::RedKnight) as u64,
        tier.count(Kind::BlackKnight) as u64,
        tier.count(Kind::RedCannon) as u64,
        tier.count(Kind::BlackCannon) as u64,
        tier.count(Kind::RedRook) as u64,
        tier.count(Kind::BlackRook) as u64,
    ];
    let remaining_slots = 90 - existing;
    let empty = remaining_slots - counts.iter().sum::<u64>();
    let mut product = 1u64;
    let mut n = remaining_slots as usize;
    for &c in counts.iter().chain(std::iter::once(&empty)) {
        product *= triangle.choose(n, c as usize);
        n -= c as usize;
    }
    product
}

/// All valid `(king, advisors)` placements for a given advisor count,
/// in a fixed deterministic order shared by `encode`/`decode`.
fn king_advisor_domain(palace: &[Square; 9], advisor_points: &[Square; 5], advisor_count: u8) -> Vec<(Square, Vec<Square>)> {
    let mut out = Vec::new();
    for &king in palace.iter() {
        let available: Vec<Square> = advisor_points.iter().copied().filter(|&a| a != king).collect();
        for combo in combinations(&available, advisor_count as usize) {
            out.push((king, combo));
        }
    }
    out
}

fn combinations(items: &[Square], k: usize) -> Vec<Vec<Square>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        if items.len() - i < k {
            break;
        }
        for mut rest in combinations(&items[i + 1..], k - 1) {
            let mut combo = vec![items[i]];
            combo.append(&mut rest);
            out.push(combo);
        }
    }
    out
}

fn step_ranks(tier: &Tier, position: &Position, triangle: &Triangle) -> [u64; 15] {
    let mut r = [0u64; 15];

    let red_advisor_domain = king_advisor_domain(&RED_PALACE, &RED_ADVISOR_POINTS, tier.count(Kind::RedAdvisor));
    let mut red_advisors = position.red_advisors.clone();
    red_advisors.sort();
    r[0] = red_advisor_domain
        .iter()
        .position(|(k, a)| *k == position.red_king && *a == red_advisors)
        .expect("red king+advisor placement must be in its own domain") as u64;

    let black_advisor_domain = king_advisor_domain(&BLACK_PALACE, &BLACK_ADVISOR_POINTS, tier.count(Kind::BlackAdvisor));
    let mut black_advisors = position.black_advisors.clone();
    black_advisors.sort();
    r[1] = black_advisor_domain
        .iter()
        .position(|(k, a)| *k == position.black_king && *a == black_advisors)
        .expect("black king+advisor placement must be in its own domain") as u64;

    r[2] = rank_combination(&point_indices(&RED_BISHOP_POINTS, &position.red_bishops), triangle);
    r[3] = rank_combination(&point_indices(&BLACK_BISHOP_POINTS, &position.black_bishops), triangle);

    for (i, row) in (0..3).enumerate() {
        let cols = pawn_cols_at(&position.red_pawns, Side::Red, row);
        r[4 + i] = rank_combination(&cols.iter().map(|&c| c as usize).collect::<Vec<_>>(), triangle);
    }

    for (i, row) in (3..=6).enumerate() {
        let red_cols = pawn_cols_at(&position.red_pawns, Side::Red, row);
        let black_cols = pawn_cols_at(&position.black_pawns, Side::Black, 9 - row);
        r[7 + i] = if row <= 4 {
            encode_mixed_row(&black_cols, &red_cols, triangle)
        } else {
            encode_mixed_row(&red_cols, &black_cols, triangle)
        };
    }

    for (i, row) in (0..3).enumerate() {
        let cols = pawn_cols_at(&position.black_pawns, Side::Black, row);
        r[11 + i] = rank_combination(&cols.iter().map(|&c| c as usize).collect::<Vec<_>>(), triangle);
    }

    r[14] = encode_knight_cannon_rook(tier, position, triangle);

    r
}

fn point_indices(domain: &[Square; 7], occupied: &[Square]) -> Vec<usize> {
    let mut indices: Vec<usize> = occupied
        .iter()
        .map(|sq| domain.iter().position(|d| d == sq).expect("bishop square must be a bishop point"))
        .collect();
    indices.sort_unstable();
    indices
}

fn pawn_cols_at(pawns: &[Square], side: Side, relative_row: u8) -> Vec<u8> {
    let absolute = pawn_row_to_absolute(side, relative_row);
    let mut cols: Vec<u8> = pawns.iter().filter(|sq| sq.row == absolute).map(|sq| sq.col).collect();
    cols.sort_unstable();
    cols
}

/// Encode one mixed pawn row: `restricted` (the color confined to the
/// five pre-river files) chosen first, `free` chosen from whatever
/// columns `restricted` left behind.
fn encode_mixed_row(restricted: &[u8], free: &[u8], triangle: &Triangle) -> u64 {
    let restricted_indices: Vec<usize> = restricted
        .iter()
        .map(|c| PAWN_FILES.iter().position(|p| p == c).expect("restricted pawn column must be a starting file"))
        .collect();
    let restricted_rank = rank_combination(&restricted_indices, triangle);

    let remaining: Vec<u8> = (0..9u8).filter(|c| !restricted.contains(c)).collect();
    let free_indices: Vec<usize> = free
        .iter()
        .map(|c| remaining.iter().position(|p| p == c).expect("free pawn column must avoid restricted columns"))
        .collect();
    let free_rank = rank_combination(&free_indices, triangle);
    let free_domain = triangle.choose(remaining.len(), free.len());

    restricted_rank * free_domain + free_rank
}

fn decode_mixed_row(
    restricted_count: usize,
    free_count: usize,
    encoded: u64,
    triangle: &Triangle,
) -> (Vec<u8>, Vec<u8>) {
    let free_domain_for_all_restricted = triangle.choose(9 - restricted_count, free_count);
    let restricted_rank = encoded / free_domain_for_all_restricted.max(1);
    let free_rank = encoded % free_domain_for_all_restricted.max(1);

    let restricted_indices = unrank_combination(5, restricted_count, restricted_rank, triangle);
    let restricted: Vec<u8> = restricted_indices.iter().map(|&i| PAWN_FILES[i]).collect();

    let remaining: Vec<u8> = (0..9u8).filter(|c| !restricted.contains(c)).collect();
    let free_indices = unrank_combination(remaining.len(), free_count, free_rank, triangle);
    let free: Vec<u8> = free_indices.iter().map(|&i| remaining[i]).collect();

    (restricted, free)
}

const KNIGHT_CANNON_ROOK_KINDS: [Kind; 6] = [
    Kind::RedKnight,
    Kind::BlackKnight,
    Kind::RedCannon,
    Kind::BlackCannon,
    Kind::RedRook,
    Kind::BlackRook,
];

fn encode_knight_cannon_rook(tier: &Tier, position: &Position, triangle: &Triangle) -> u64 {
    let occupied_before: Vec<Square> = {
        let mut squares = vec![position.red_king, position.black_king];
        squares.extend_from_slice(&position.red_advisors);
        squares.extend_from_slice(&position.black_advisors);
        squares.extend_from_slice(&position.red_bishops);
        squares.extend_from_slice(&position.black_bishops);
        squares.extend_from_slice(&position.red_pawns);
        squares.extend_from_slice(&position.black_pawns);
        squares
    };
    let mut remaining: Vec<Square> = Vec::with_capacity(90 - occupied_before.len());
    for row in 0..10u8 {
        for col in 0..9u8 {
            let sq = Square::new(row, col);
            if !occupied_before.contains(&sq) {
                remaining.push(sq);
            }
        }
    }

    let piece_lists: [&[Square]; 6] = [
        &position.red_knights,
        &position.black_knights,
        &position.red_cannons,
        &position.black_cannons,
        &position.red_rooks,
        &position.black_rooks,
    ];
    let mut labels = vec![6usize; remaining.len()]; // 6 = empty
    for (kind_idx, list) in piece_lists.iter().enumerate() {
        for sq in list.iter() {
            let pos = remaining.iter().position(|s| s == sq).expect("piece square must be among remaining squares");
            labels[pos] = kind_idx;
        }
    }

    let mut counts: Vec<u64> = KNIGHT_CANNON_ROOK_KINDS.iter().map(|&k| tier.count(k) as u64).collect();
    let empty_count = remaining.len() as u64 - counts.iter().sum::<u64>();
    counts.push(empty_count);

    rank_multiset(&labels, &counts, triangle)
}

fn decode(tier: &Tier, ranks: &[u64; 15], side_to_move: Side, triangle: &Triangle) -> Position {
    let mut invalid = false;

    let red_advisor_domain = king_advisor_domain(&RED_PALACE, &RED_ADVISOR_POINTS, tier.count(Kind::RedAdvisor));
    let (red_king, red_advisors) = red_advisor_domain
        .get(ranks[0] as usize)
        .cloned()
        .unwrap_or_else(|| {
            invalid = true;
            (RED_PALACE[0], Vec::new())
        });

    let black_advisor_domain = king_advisor_domain(&BLACK_PALACE, &BLACK_ADVISOR_POINTS, tier.count(Kind::BlackAdvisor));
    let (black_king, black_advisors) = black_advisor_domain
        .get(ranks[1] as usize)
        .cloned()
        .unwrap_or_else(|| {
            invalid = true;
            (BLACK_PALACE[0], Vec::new())
        });

    let red_bishops = unrank_combination(7, tier.count(Kind::RedBishop) as usize, ranks[2], triangle)
        .into_iter()
        .map(|i| RED_BISHOP_POINTS[i])
        .collect();
    let black_bishops = unrank_combination(7, tier.count(Kind::BlackBishop) as usize, ranks[3], triangle)
        .into_iter()
        .map(|i| BLACK_BISHOP_POINTS[i])
        .collect();

    let mut red_pawns = Vec::new();
    let mut black_pawns = Vec::new();

    for (i, row) in (0..3).enumerate() {
        let k = count_at(tier.red_pawn_rows(), row);
        let cols = unrank_combination(9, k, ranks[4 + i], triangle);
        let absolute = pawn_row_to_absolute(Side::Red, row);
        red_pawns.extend(cols.into_iter().map(|c| Square::new(absolute, c as u8)));
    }
    for (i, row) in (0..3).enumerate() {
        let k = count_at(tier.black_pawn_rows(), row);
        let cols = unrank_combination(9, k, ranks[11 + i], triangle);
        let absolute = pawn_row_to_absolute(Side::Black, row);
        black_pawns.extend(cols.into_iter().map(|c| Square::new(absolute, c as u8)));
    }
    for (i, row) in (3..=6).enumerate() {
        let black_row_rel = 9 - row;
        let red_k = count_at(tier.red_pawn_rows(), row);
        let black_k = count_at(tier.black_pawn_rows(), black_row_rel);
        let (restricted, free) = if row <= 4 {
            decode_mixed_row(black_k, red_k, ranks[7 + i], triangle)
        } else {
            decode_mixed_row(red_k, black_k, ranks[7 + i], triangle)
        };
        let (black_cols, red_cols) = if row <= 4 { (restricted, free) } else { (free, restricted) };
        let red_abs = pawn_row_to_absolute(Side::Red, row);
        let black_abs = pawn_row_to_absolute(Side::Black, black_row_rel);
        red_pawns.extend(red_cols.into_iter().map(|c| Square::new(red_abs, c)));
        black_pawns.extend(black_cols.into_iter().map(|c| Square::new(black_abs, c)));
    }

    let occupied_before: Vec<Square> = {
        let mut squares = vec![red_king, black_king];
        squares.extend_from_slice(&red_advisors);
        squares.extend_from_slice(&black_advisors);
        squares.extend_from_slice(&red_bishops);
        squares.extend_from_slice(&black_bishops);
        squares.extend_from_slice(&red_pawns);
        squares.extend_from_slice(&black_pawns);
        squares
    };
    let mut remaining: Vec<Square> = Vec::with_capacity(90usize.saturating_sub(occupied_before.len()));
    for row in 0..10u8 {
        for col in 0..9u8 {
            let sq = Square::new(row, col);
            if !occupied_before.contains(&sq) {
                remaining.push(sq);
            }
        }
    }
    let mut counts: Vec<u64> = KNIGHT_CANNON_ROOK_KINDS.iter().map(|&k| tier.count(k) as u64).collect();
    let empty_count = remaining.len() as u64 - counts.iter().sum::<u64>();
    counts.push(empty_count);

    let mut red_knights = Vec::new();
    let mut black_knights = Vec::new();
    let mut red_cannons = Vec::new();
    let mut black_cannons = Vec::new();
    let mut red_rooks = Vec::new();
    let mut black_rooks = Vec::new();

    match unrank_multiset(remaining.len(), &counts, ranks[14], triangle) {
        Some(labels) => {
            for (sq, label) in remaining.iter().zip(labels.iter()) {
                match label {
                    0 => red_knights.push(*sq),
                    1 => black_knights.push(*sq),
                    2 => red_cannons.push(*sq),
                    3 => black_cannons.push(*sq),
                    4 => red_rooks.push(*sq),
                    5 => black_rooks.push(*sq),
                    _ => {}
                }
            }
        }
        None => invalid = true,
    }

    Position {
        side_to_move,
        red_king,
        black_king,
        red_advisors,
        black_advisors,
        red_bishops,
        black_bishops,
        red_pawns,
        black_pawns,
        red_knights,
        black_knights,
        red_cannons,
        black_cannons,
        red_rooks,
        black_rooks,
        invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_kings_position() -> (Tier, Position) {
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
        (tier, position)
    }

    #[test]
    fn bare_kings_roundtrips() {
        let triangle = Triangle::new();
        let (tier, position) = bare_kings_position();
        let h = hash(&tier, &position, &triangle);
        let back = unhash(&tier, h, &triangle);
        assert!(!back.invalid);
        assert_eq!(back.red_king, position.red_king);
        assert_eq!(back.black_king, position.black_king);
    }

    #[test]
    fn hash_stays_within_tier_size() {
        let triangle = Triangle::new();
        let (tier, position) = bare_kings_position();
        let h = hash(&tier, &position, &triangle);
        assert!(h < tier.size(&triangle).unwrap());
    }

    #[test]
    fn single_rook_roundtrips_through_knight_cannon_rook_step() {
        let triangle = Triangle::new();
        let tier = Tier::parse("000000000010__").unwrap();
        let mut position = bare_kings_position().1;
        position.red_rooks.push(Square::new(5, 0));
        let h = hash(&tier, &position, &triangle);
        let back = unhash(&tier, h, &triangle);
        assert!(!back.invalid);
        assert_eq!(back.red_rooks, vec![Square::new(5, 0)]);
    }
}
