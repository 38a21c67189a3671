//! Move generation: Xiangqi movement rules plus the forward and
//! reverse generators the solver drives off of (spec.md §4.D).

pub mod board;
mod piece;

use crate::combin::Triangle;
use crate::position::hash::{hash, unhash};
use crate::position::{pawn_row_from_absolute, Position, Side, Square};
use crate::tier::{Change, Kind, Tier};
use board::{Board, Piece};

/// Sentinel returned by `num_children` for an illegal parent position
/// — the unsolved-children counter treats this as "skip, never
/// reached."
pub const ILLEGAL_POS: u32 = u32::MAX;

/// A position is legal iff the side that just moved did not leave its
/// own king en prise, and the two kings do not face each other on an
/// open file.
pub fn is_legal(position: &Position) -> bool {
    let board = Board::from_position(position);
    if board.kings_fly() {
        return false;
    }
    let just_moved = position.side_to_move.other();
    let king_sq = board.king_square(just_moved);
    !board.attacks(position.side_to_move, king_sq)
}

struct AppliedMove {
    position: Position,
    change: Option<Change>,
}

fn remove_from(list: &mut Vec<Square>, sq: Square) {
    if let Some(idx) = list.iter().position(|s| *s == sq) {
        list.remove(idx);
    }
}

fn list_mut<'a>(position: &'a mut Position, side: Side, piece: Piece) -> Option<&'a mut Vec<Square>> {
    use Piece::*;
    use Side::*;
    Some(match (side, piece) {
        (Red, Advisor) => &mut position.red_advisors,
        (Black, Advisor) => &mut position.black_advisors,
        (Red, Bishop) => &mut position.red_bishops,
        (Black, Bishop) => &mut position.black_bishops,
        (Red, Pawn) => &mut position.red_pawns,
        (Black, Pawn) => &mut position.black_pawns,
        (Red, Knight) => &mut position.red_knights,
        (Black, Knight) => &mut position.black_knights,
        (Red, Cannon) => &mut position.red_cannons,
        (Black, Cannon) => &mut position.black_cannons,
        (Red, Rook) => &mut position.red_rooks,
        (Black, Rook) => &mut position.black_rooks,
        (_, King) => return None,
    })
}

fn apply_move(position: &Position, from: Square, to: Square, piece: Piece) -> AppliedMove {
    let side = position.side_to_move;
    let board = Board::from_position(position);
    let captured = board.at(to).map(|(s, p)| (s, p));

    let mut next = position.clone();
    next.side_to_move = side.other();

    if piece == Piece::King {
        match side {
            Side::Red => next.red_king = to,
            Side::Black => next.black_king = to,
        }
    } else if let Some(list) = list_mut(&mut next, side, piece) {
        remove_from(list, from);
        list.push(to);
    }

    let mut change = None;
    if let Some((captured_side, captured_piece)) = captured {
        if let Some(kind) = captured_piece.kind(captured_side) {
            if let Some(list) = list_mut(&mut next, captured_side, captured_piece) {
                remove_from(list, to);
            }
            change = Some(Change::Capture(kind));
        }
    } else if piece == Piece::Pawn && to.row != from.row {
        let from_row = pawn_row_from_absolute(side, from.row);
        if let Some(kind) = Piece::Pawn.kind(side) {
            change = Some(Change::PawnStep { kind, from_row });
        }
    }

    AppliedMove { position: next, change }
}

fn occupants(position: &Position) -> Vec<(Square, Side, Piece)> {
    let mut out = Vec::new();
    out.push((position.red_king, Side::Red, Piece::King));
    out.push((position.black_king, Side::Black, Piece::King));
    let mut push_all = |squares: &[Square], side: Side, piece: Piece| {
        for &sq in squares {
            out.push((sq, side, piece));
        }
    };
    push_all(&position.red_advisors, Side::Red, Piece::Advisor);
    push_all(&position.black_advisors, Side::Black, Piece::Advisor);
    push_all(&position.red_bishops, Side::Red, Piece::Bishop);
    push_all(&position.black_bishops, Side::Black, Piece::Bishop);
    push_all(&position.red_pawns, Side::Red, Piece::Pawn);
    push_all(&position.black_pawns, Side::Black, Piece::Pawn);
    push_all(&position.red_knights, Side::Red, Piece::Knight);
    push_all(&position.black_knights, Side::Black, Piece::Knight);
    push_all(&position.red_cannons, Side::Red, Piece::Cannon);
    push_all(&position.black_cannons, Side::Black, Piece::Cannon);
    push_all(&position.red_rooks, Side::Red, Piece::Rook);
    push_all(&position.black_rooks, Side::Black, Piece::Rook);
    out
}

fn child_tier_for(tier: &Tier, change: &Option<Change>) -> Option<Tier> {
    match change {
        None => Some(tier.clone()),
        Some(c) => tier.children().into_iter().find(|(_, ch)| ch == c).map(|(t, _)| t),
    }
}

/// Every successor `(tier, hash)` reachable from `(tier, value)` by
/// one legal move. `None` if the parent position itself is illegal.
pub fn children(tier: &Tier, value: u64, triangle: &Triangle) -> Option<Vec<(Tier, u64)>> {
    let position = unhash(tier, value, triangle);
    if position.invalid || !is_legal(&position) {
        return None;
    }

    let board = Board::from_position(&position);
    let side = position.side_to_move;
    let mut out = Vec::new();

    for (from, owner, piece) in occupants(&position) {
        if owner != side {
            continue;
        }
        for to in piece::pseudo_destinations(&board, from, side, piece) {
            let applied = apply_move(&position, from, to, piece);
            if !is_legal(&applied.position) {
                continue;
            }
            let Some(child_tier) = child_tier_for(tier, &applied.change) else {
                continue;
            };
            let child_hash = hash(&child_tier, &applied.position, triangle);
            out.push((child_tier, child_hash));
        }
    }

    Some(out)
}

/// The count-only form of [`children`]. Returns [`ILLEGAL_POS`] for an
/// illegal parent.
pub fn num_children(tier: &Tier, value: u64, triangle: &Triangle) -> u32 {
    match children(tier, value, triangle) {
        Some(list) => list.len() as u32,
        None => ILLEGAL_POS,
    }
}

/// Predecessors of `(tier, value)` restricted to the given tier-change
/// record, re-testing legality on every candidate (spec.md §4.D).
pub fn parents(tier: &Tier, value: u64, parent_tier: &Tier, change: Change, triangle: &Triangle) -> Vec<(Tier, u64)> {
    let position = unhash(tier, value, triangle);
    if position.invalid {
        return Vec::new();
    }

    let mut out = Vec::new();
    let prior_side = position.side_to_move.other();
    let board = Board::from_position(&position);

    match change {
        Change::Capture(captured_kind) => {
            // Any piece currently belonging to the side that just moved
            // could be the one that captured: try each as the mover, try
            // every empty origin square, and keep the ones whose reverse
            // geometry and resulting legality both check out. A real
            // engine would special-case each piece's reverse move shape
            // instead of this brute-force origin scan.
            for (cur, owner, piece) in occupants(&position) {
                if owner != prior_side {
                    continue;
                }
                for orig in all_squares() {
                    if orig == cur || !board.is_empty(orig) {
                        continue;
                    }
                    let mut candidate = position.clone();
                    match piece {
                        Piece::King => match owner {
                            Side::Red => candidate.red_king = orig,
                            Side::Black => candidate.black_king = orig,
                        },
                        _ => {
                            if let Some(list) = list_mut(&mut candidate, owner, piece) {
                                remove_from(list, cur);
                                list.push(orig);
                            }
                        }
                    }
                    if !place_captured(&mut candidate, captured_kind, cur) {
                        continue;
                    }
                    let candidate_board = Board::from_position(&candidate);
                    if !piece::pseudo_destinations(&candidate_board, orig, owner, piece).contains(&cur) {
                        continue;
                    }
                    candidate.side_to_move = prior_side;
                    if is_legal(&candidate) {
                        let h = hash(parent_tier, &candidate, triangle);
                        out.push((parent_tier.clone(), h));
                    }
                }
            }
        }
        Change::PawnStep { kind, from_row } => {
            let side = if matches!(kind, Kind::RedPawn) { Side::Red } else { Side::Black };
            let pawns = if side == Side::Red { &position.red_pawns } else { &position.black_pawns };
            let to_row = pawn_row_from_absolute(side, from_row);
            for &sq in pawns {
                let current_row = pawn_row_from_absolute(side, sq.row);
                if current_row + 1 != from_row {
                    continue;
                }
                let mut candidate = position.clone();
                let list = if side == Side::Red { &mut candidate.red_pawns } else { &mut candidate.black_pawns };
                remove_from(list, sq);
                let prior_square = Square::new(prior_row_absolute(side, to_row), sq.col);
                list.push(prior_square);
                candidate.side_to_move = prior_side;
                if is_legal(&candidate) {
                    let h = hash(parent_tier, &candidate, triangle);
                    out.push((parent_tier.clone(), h));
                }
            }
        }
    }

    out
}

/// Predecessors of `(tier, value)` that stay within `tier` — the
/// "identical tier" reverse-move case of spec.md §4.D
/// (`capture_kind = INVALID, pawn_kind = INVALID`): every legal
/// non-capturing, non-row-changing reverse move (including a pawn's
/// reverse sideways step, which never changes its tier row digit).
pub fn parents_in_tier(tier: &Tier, value: u64, triangle: &Triangle) -> Vec<(Tier, u64)> {
    let position = unhash(tier, value, triangle);
    if position.invalid {
        return Vec::new();
    }

    let mut out = Vec::new();
    let prior_side = position.side_to_move.other();
    let board = Board::from_position(&position);

    for (cur, owner, piece) in occupants(&position) {
        if owner != prior_side {
            continue;
        }
        for orig in all_squares() {
            if orig == cur || !board.is_empty(orig) {
                continue;
            }
            // A pawn's row-changing step is a cross-tier move (handled by
            // the PawnStep branch of `parents`); only its sideways step
            // stays in this tier.
            if piece == Piece::Pawn && orig.row != cur.row {
                continue;
            }
            let mut candidate = position.clone();
            match piece {
                Piece::King => match owner {
                    Side::Red => candidate.red_king = orig,
                    Side::Black => candidate.black_king = orig,
                },
                _ => {
                    if let Some(list) = list_mut(&mut candidate, owner, piece) {
                        remove_from(list, cur);
                        list.push(orig);
                    }
                }
            }
            let candidate_board = Board::from_position(&candidate);
            if !piece::pseudo_destinations(&candidate_board, orig, owner, piece).contains(&cur) {
                continue;
            }
            candidate.side_to_move = prior_side;
            if is_legal(&candidate) {
                let h = hash(tier, &candidate, triangle);
                out.push((tier.clone(), h));
            }
        }
    }

    out
}

fn prior_row_absolute(side: Side, relative_row: u8) -> u8 {
    crate::position::pawn_row_to_absolute(side, relative_row)
}

fn all_squares() -> impl Iterator<Item = Square> {
    (0..10u8).flat_map(|row| (0..9u8).map(move |col| Square::new(row, col)))
}

fn place_captured(position: &mut Position, kind: Kind, square: Square) -> bool {
    let occupied = occupants(position).iter().any(|(sq, ..)| *sq == square);
    if occupied {
        return false;
    }
    let side = if kind.is_red() { Side::Red } else { Side::Black };
    let piece = match kind {
        Kind::RedAdvisor | Kind::BlackAdvisor => Piece::Advisor,
        Kind::RedBishop | Kind::BlackBishop => Piece::Bishop,
        Kind::RedPawn | Kind::BlackPawn => Piece::Pawn,
        Kind::RedKnight | Kind::BlackKnight => Piece::Knight,
        Kind::RedCannon | Kind::BlackCannon => Piece::Cannon,
        Kind::RedRook | Kind::BlackRook => Piece::Rook,
    };
    if let Some(list) = list_mut(position, side, piece) {
        list.push(square);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{BLACK_PALACE, RED_PALACE};

    fn bare_kings() -> (Tier, Position) {
        let tier = Tier::parse("000000000000__").unwrap();
        let position = Position {
            side_to_move: Side::Red,
            red_king: RED_PALACE[1],
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
    fn bare_kings_facing_off_file_is_legal() {
        let (_, position) = bare_kings();
        assert!(is_legal(&position));
    }

    #[test]
    fn same_file_adjacent_kings_are_illegal_flying_general() {
        let (_, mut position) = bare_kings();
        position.red_king = Square::new(2, 4);
        position.black_king = Square::new(7, 4);
        assert!(!is_legal(&position));
    }

    #[test]
    fn king_has_moves_within_palace() {
        let (tier, position) = bare_kings();
        let triangle = Triangle::new();
        let h = hash(&tier, &position, &triangle);
        let kids = children(&tier, h, &triangle).expect("legal parent");
        assert!(!kids.is_empty());
        assert!(kids.len() <= 128);
    }

    #[test]
    fn in_tier_parents_are_reverse_of_in_tier_children() {
        let (tier, position) = bare_kings();
        let triangle = Triangle::new();
        let h = hash(&tier, &position, &triangle);
        // Every in-tier child of h must list h among its own in-tier parents.
        for (child_tier, child_hash) in children(&tier, h, &triangle).expect("legal parent") {
            if child_tier != tier {
                continue;
            }
            let back = parents_in_tier(&child_tier, child_hash, &triangle);
            assert!(back.iter().any(|(t, hh)| *t == tier && *hh == h));
        }
    }
}
