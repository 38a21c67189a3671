//! The "combi-cruncher": lexicographic combinatorial ranking used by
//! every hash step that places some pieces among a larger set of
//! slots.
//!
//! Two shapes recur across the fifteen hash steps: a plain *subset*
//! choice (bishops, pawns-on-a-row — "pick k of n slots", exactly the
//! triangle's `choose(n, k)` domain), and a *multiset* choice (the
//! knight/cannon/rook step — several distinct kinds sharing one pool
//! of remaining squares). Both are ranked the same way: walk the
//! slots, and at each one sum how many completions would follow had a
//! smaller-ordinal occupant been placed there instead.

use crate::combin::Triangle;

/// Rank an ascending subset `{c_1 < c_2 < ... < c_k}` of `{0, .., n-1}`
/// in the standard combinatorial number system: `rank = sum(C(c_i, i))`
/// for `i` in `1..=k`.
pub fn rank_combination(chosen_ascending: &[usize], triangle: &Triangle) -> u64 {
    chosen_ascending
        .iter()
        .enumerate()
        .map(|(i, &c)| triangle.choose(c, i + 1))
        .sum()
}

/// Invert [`rank_combination`]: recover the ascending k-subset of
/// `{0, .., n-1}` with the given rank.
pub fn unrank_combination(n: usize, k: usize, mut rank: u64, triangle: &Triangle) -> Vec<usize> {
    let mut result = Vec::with_capacity(k);
    let mut upper = n;
    for i in (1..=k).rev() {
        let mut v = upper.saturating_sub(1);
        while v >= i && triangle.choose(v, i) > rank {
            v -= 1;
        }
        rank -= triangle.choose(v, i);
        result.push(v);
        upper = v;
    }
    result.reverse();
    result
}

/// Number of distinct arrangements of the multiset `remaining` across
/// `slots_left` positions: the iterated-binomial form of the
/// multinomial coefficient.
fn completions(remaining: &[u64], slots_left: u64, triangle: &Triangle) -> u64 {
    let mut n = slots_left;
    let mut product = 1u64;
    for &c in remaining {
        product *= triangle.choose(n as usize, c as usize);
        n -= c;
    }
    product
}

/// Rank a sequence of slot labels (ordinal kind occupying each slot,
/// left to right) against initial per-kind counts, walking right to
/// left as the spec's combi-cruncher does.
pub fn rank_multiset(labels: &[usize], counts: &[u64], triangle: &Triangle) -> u64 {
    let mut remaining = counts.to_vec();
    let mut slots_left = labels.len() as u64;
    let mut rank = 0u64;
    for &label in labels.iter().rev() {
        for smaller in 0..label {
            if remaining[smaller] > 0 {
                let mut trial = remaining.clone();
                trial[smaller] -= 1;
                rank += completions(&trial, slots_left - 1, triangle);
            }
        }
        remaining[label] -= 1;
        slots_left -= 1;
    }
    rank
}

/// Invert [`rank_multiset`]. Returns `None` if `rank` falls outside
/// the image of legal arrangements (the hash does not correspond to
/// any valid placement of this multiset).
pub fn unrank_multiset(total_slots: usize, counts: &[u64], mut rank: u64, triangle: &Triangle) -> Option<Vec<usize>> {
    let mut remaining = counts.to_vec();
    let mut slots_left = total_slots as u64;
    let mut labels_rev = Vec::with_capacity(total_slots);
    for _ in 0..total_slots {
        let mut chosen = None;
        for k in 0..remaining.len() {
            if remaining[k] == 0 {
                continue;
            }
            let mut trial = remaining.clone();
            trial[k] -= 1;
            let c = completions(&trial, slots_left - 1, triangle);
            if rank < c {
                chosen = Some(k);
                remaining[k] -= 1;
                break;
            }
            rank -= c;
        }
        labels_rev.push(chosen?);
        slots_left -= 1;
    }
    labels_rev.reverse();
    Some(labels_rev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_rank_roundtrips() {
        let triangle = Triangle::new();
        for k in 0..=3 {
            let n = 7;
            let count = triangle.choose(n, k) as u64;
            for rank in 0..count {
                let subset = unrank_combination(n, k, rank, &triangle);
                assert_eq!(subset.len(), k);
                assert_eq!(rank_combination(&subset, &triangle), rank);
            }
        }
    }

    #[test]
    fn combination_subsets_are_ascending_and_distinct() {
        let triangle = Triangle::new();
        let subset = unrank_combination(9, 3, 10, &triangle);
        assert!(subset.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn multiset_rank_roundtrips() {
        let triangle = Triangle::new();
        let counts = vec![2u64, 1, 3]; // 3 kinds, 6 slots total
        let total: u64 = counts.iter().sum();
        let domain = completions(&counts, total, &triangle);
        for rank in 0..domain {
            let labels = unrank_multiset(total as usize, &counts, rank, &triangle).unwrap();
            assert_eq!(rank_multiset(&labels, &counts, &triangle), rank);
        }
    }

    #[test]
    fn multiset_unrank_rejects_out_of_range() {
        let triangle = Triangle::new();
        let counts = vec![1u64, 1];
        assert!(unrank_multiset(2, &counts, 99, &triangle).is_none());
    }
}
