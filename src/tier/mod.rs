//! The tier model: symbolic naming, canonicalization, sizing, and
//! child/parent derivation for piece-count equivalence classes of
//! positions (spec.md §4.B).

mod canonical;
mod children;
mod grammar;
mod size;

pub use children::Change;
pub use grammar::{Kind, Tier, KIND_COUNT, MAX_PAWN_ROW, MAX_TIER_STRING_LEN};
