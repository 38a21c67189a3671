//! Per-piece pseudo-legal destination generation. "Pseudo-legal" here
//! means board-geometry-legal (scope, blocking, screens) but not yet
//! checked against leaving one's own king en prise or the flying
//! general rule — [`super::is_legal`] applies those afterward.

use super::board::{Board, Piece};
use crate::position::{Side, Square};

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const KNIGHT_STEPS: [((i8, i8), (i8, i8)); 8] = [
    ((2, 1), (1, 0)),
    ((2, -1), (1, 0)),
    ((-2, 1), (-1, 0)),
    ((-2, -1), (-1, 0)),
    ((1, 2), (0, 1)),
    ((-1, 2), (0, 1)),
    ((1, -2), (0, -1)),
    ((-1, -2), (0, -1)),
];
const BISHOP_STEPS: [(i8, i8); 4] = [(2, 2), (2, -2), (-2, 2), (-2, -2)];
const ADVISOR_STEPS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub fn pseudo_destinations(board: &Board, from: Square, side: Side, piece: Piece) -> Vec<Square> {
    match piece {
        Piece::King => palace_step(board, from, side, &ROOK_DIRS),
        Piece::Advisor => palace_step(board, from, side, &ADVISOR_STEPS),
        Piece::Bishop => bishop_moves(board, from, side),
        Piece::Knight => knight_moves(board, from, side),
        Piece::Rook => sliding_moves(board, from, side, &ROOK_DIRS),
        Piece::Cannon => cannon_moves(board, from, side),
        Piece::Pawn => pawn_moves(board, from, side),
    }
}

fn own_palace(side: Side) -> (std::ops::RangeInclusive<u8>, std::ops::RangeInclusive<u8>) {
    match side {
        Side::Red => (0..=2, 3..=5),
        Side::Black => (7..=9, 3..=5),
    }
}

fn own_half(side: Side) -> std::ops::RangeInclusive<u8> {
    match side {
        Side::Red => 0..=4,
        Side::Black => 5..=9,
    }
}

fn not_own(board: &Board, side: Side, sq: Square) -> bool {
    !matches!(board.at(sq), Some((s, _)) if s == side)
}

fn palace_step(board: &Board, from: Square, side: Side, steps: &[(i8, i8)]) -> Vec<Square> {
    let (rows, cols) = own_palace(side);
    let mut out = Vec::new();
    for &(dr, dc) in steps {
        let row = from.row as i8 + dr;
        let col = from.col as i8 + dc;
        if !Board::in_bounds(row, col) {
            continue;
        }
        if !rows.contains(&(row as u8)) || !cols.contains(&(col as u8)) {
            continue;
        }
        let sq = Square::new(row as u8, col as u8);
        if not_own(board, side, sq) {
            out.push(sq);
        }
    }
    out
}

fn bishop_moves(board: &Board, from: Square, side: Side) -> Vec<Square> {
    let half = own_half(side);
    let mut out = Vec::new();
    for &(dr, dc) in &BISHOP_STEPS {
        let mid_row = from.row as i8 + dr / 2;
        let mid_col = from.col as i8 + dc / 2;
        let row = from.row as i8 + dr;
        let col = from.col as i8 + dc;
        if !Board::in_bounds(row, col) || !half.contains(&(row as u8)) {
            continue;
        }
        if !board.is_empty(Square::new(mid_row as u8, mid_col as u8)) {
            continue;
        }
        let sq = Square::new(row as u8, col as u8);
        if not_own(board, side, sq) {
            out.push(sq);
        }
    }
    out
}

fn knight_moves(board: &Board, from: Square, side: Side) -> Vec<Square> {
    let mut out = Vec::new();
    for &((dr, dc), (leg_dr, leg_dc)) in &KNIGHT_STEPS {
        let leg_row = from.row as i8 + leg_dr;
        let leg_col = from.col as i8 + leg_dc;
        if !Board::in_bounds(leg_row, leg_col) || !board.is_empty(Square::new(leg_row as u8, leg_col as u8)) {
            continue;
        }
        let row = from.row as i8 + dr;
        let col = from.col as i8 + dc;
        if !Board::in_bounds(row, col) {
            continue;
        }
        let sq = Square::new(row as u8, col as u8);
        if not_own(board, side, sq) {
            out.push(sq);
        }
    }
    out
}

fn sliding_moves(board: &Board, from: Square, side: Side, dirs: &[(i8, i8)]) -> Vec<Square> {
    let mut out = Vec::new();
    for &(dr, dc) in dirs {
        let mut row = from.row as i8 + dr;
        let mut col = from.col as i8 + dc;
        while Board::in_bounds(row, col) {
            let sq = Square::new(row as u8, col as u8);
            match board.at(sq) {
                None => out.push(sq),
                Some((s, _)) => {
                    if s != side {
                        out.push(sq);
                    }
                    break;
                }
            }
            row += dr;
            col += dc;
        }
    }
    out
}

fn cannon_moves(board: &Board, from: Square, side: Side) -> Vec<Square> {
    let mut out = Vec::new();
    for &(dr, dc) in &ROOK_DIRS {
        let mut row = from.row as i8 + dr;
        let mut col = from.col as i8 + dc;
        let mut screened = false;
        while Board::in_bounds(row, col) {
            let sq = Square::new(row as u8, col as u8);
            match (board.at(sq), screened) {
                (None, false) => out.push(sq),
                (None, true) => {}
                (Some(_), false) => screened = true,
                (Some((s, _)), true) => {
                    if s != side {
                        out.push(sq);
                    }
                    break;
                }
            }
            row += dr;
            col += dc;
        }
    }
    out
}

fn pawn_moves(board: &Board, from: Square, side: Side) -> Vec<Square> {
    let forward: i8 = match side {
        Side::Red => 1,
        Side::Black => -1,
    };
    let crossed = match side {
        Side::Red => from.row >= 5,
        Side::Black => from.row <= 4,
    };
    let mut out = Vec::new();
    let fwd_row = from.row as i8 + forward;
    if Board::in_bounds(fwd_row, from.col as i8) {
        let sq = Square::new(fwd_row as u8, from.col);
        if not_own(board, side, sq) {
            out.push(sq);
        }
    }
    if crossed {
        for dc in [-1i8, 1] {
            let col = from.col as i8 + dc;
            if Board::in_bounds(from.row as i8, col) {
                let sq = Square::new(from.row, col as u8);
                if not_own(board, side, sq) {
                    out.push(sq);
                }
            }
        }
    }
    out
}
