//! Canonicalization under the color-swap symmetry: `t <= mirror(t)`.
//!
//! Per the Open Question in spec.md §9(a), we resolve the tier-level
//! mirror as swapping each kind's count with its color partner and
//! swapping the two pawn-row suffixes wholesale, without transforming
//! the row digits themselves. Tier-string rows are already stored in
//! each color's own frame (row 0 = the far edge of the opponent's
//! half), so the two frames are symmetric by construction; no `d ->
//! 9-d` remap is needed at the tier-string level. That remap belongs
//! to the *board-coordinate* rotation used to recover a non-canonical
//! tier's hash from its canonical twin (§4.C `noncanonical_hash`,
//! implemented in `crate::position::canonical`), which operates on
//! absolute board rows `0..=9`, not on this tier string's
//! per-color-relative `0..=6` pawn-row digits.

use super::grammar::{Kind, Tier};

impl Tier {
    /// The color-swapped twin of this tier: every kind count swaps
    /// with its mirror kind, and the two pawn-row suffixes swap.
    pub fn mirrored(&self) -> Tier {
        let mut counts = [0u8; super::grammar::KIND_COUNT];
        for kind in Kind::ALL {
            counts[kind.mirror() as usize] = self.count(kind);
        }
        Tier::from_raw(counts, self.black_pawn_rows().to_vec(), self.red_pawn_rows().to_vec())
    }

    /// `true` if this tier is lexicographically `<=` its mirror twin.
    pub fn is_canonical(&self) -> bool {
        self.to_string() <= self.mirrored().to_string()
    }

    /// The canonical representative of `{t, mirror(t)}`.
    pub fn canonical(&self) -> Tier {
        let mirror = self.mirrored();
        if self.to_string() <= mirror.to_string() {
            self.clone()
        } else {
            mirror
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_is_involution() {
        let t = Tier::parse("000100000000__").unwrap();
        let back = t.mirrored().mirrored();
        assert_eq!(t, back);
    }

    #[test]
    fn two_kings_is_self_canonical() {
        let t = Tier::parse("000000000000__").unwrap();
        assert!(t.is_canonical());
        assert_eq!(t.canonical(), t);
    }

    #[test]
    fn asymmetric_tier_has_distinct_mirror() {
        let t = Tier::parse("010000000000__").unwrap();
        let m = t.mirrored();
        assert_ne!(t, m);
        assert_eq!(t.canonical(), m.canonical());
    }
}
