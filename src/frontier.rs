//! Remoteness-bucketed position queues (spec.md §4.E), grounded on
//! `original_source/frontier.c`'s `fr_t`: one growable, lockable bucket
//! per remoteness value, safe for concurrent producers.
//!
//! The original's buckets are raw `uint64_t*` arrays behind an
//! `omp_lock_t`; here each bucket is a `Mutex<FrontierBucket>`, which
//! gives the same "lock one bucket, append, unlock" shape without
//! manual capacity doubling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A prefix-sum boundary within a bucket: entries at index `>= start`
/// belong to `child_tier_index`, until the next divider (or the end of
/// the bucket). Lets the engine recover which child tier a position
/// came from during propagation, so it can look up the right `Change`
/// when reverse-moving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divider {
    pub child_tier_index: usize,
    pub start: usize,
}

#[derive(Default)]
struct Bucket {
    hashes: Vec<u64>,
    dividers: Vec<Divider>,
}

/// One frontier: `win_fr` and `lose_fr` are each an instance of this,
/// indexed by remoteness `0..max_remoteness`.
pub struct Frontier {
    buckets: Vec<Mutex<Bucket>>,
    /// Highest remoteness any `add` has targeted so far, so the
    /// engine's propagation loop (spec.md §4.F S4) knows when no
    /// further buckets can possibly hold entries and can stop walking
    /// `r` upward.
    high: AtomicUsize,
}

impl Frontier {
    pub fn new(max_remoteness: usize) -> Self {
        let mut buckets = Vec::with_capacity(max_remoteness);
        buckets.resize_with(max_remoteness, || Mutex::new(Bucket::default()));
        Frontier { buckets, high: AtomicUsize::new(0) }
    }

    /// Append `hash` to bucket `remoteness`, recording a new divider
    /// if this is the first entry from `child_tier_index` since the
    /// last divider. Safe to call from multiple threads concurrently
    /// across any remoteness.
    pub fn add(&self, remoteness: usize, child_tier_index: usize, hash: u64) {
        self.high.fetch_max(remoteness, Ordering::Relaxed);
        let mut bucket = self.buckets[remoteness].lock().expect("frontier bucket lock poisoned");
        let needs_divider = bucket.dividers.last().map(|d| d.child_tier_index) != Some(child_tier_index);
        if needs_divider {
            bucket.dividers.push(Divider {
                child_tier_index,
                start: bucket.hashes.len(),
            });
        }
        bucket.hashes.push(hash);
    }

    /// Take ownership of bucket `remoteness`'s contents, leaving it
    /// empty. Called once the engine has finished propagating that
    /// remoteness, per spec.md §4.E's `release`.
    pub fn release(&self, remoteness: usize) -> (Vec<u64>, Vec<Divider>) {
        let mut bucket = self.buckets[remoteness].lock().expect("frontier bucket lock poisoned");
        (std::mem::take(&mut bucket.hashes), std::mem::take(&mut bucket.dividers))
    }

    pub fn len(&self, remoteness: usize) -> usize {
        self.buckets[remoteness].lock().expect("frontier bucket lock poisoned").hashes.len()
    }

    pub fn is_empty(&self, remoteness: usize) -> bool {
        self.len(remoteness) == 0
    }

    /// Highest remoteness ever passed to [`Frontier::add`]. Buckets
    /// beyond this are guaranteed empty.
    pub fn high(&self) -> usize {
        self.high.load(Ordering::Relaxed)
    }
}

/// Which child tier produced the entry at `index`, given the bucket's
/// dividers. Panics if `dividers` is empty or `index` precedes the
/// first divider — both would mean the bucket was read before any
/// entry was added.
pub fn child_tier_at(dividers: &[Divider], index: usize) -> usize {
    match dividers.binary_search_by(|d| d.start.cmp(&index)) {
        Ok(i) => dividers[i].child_tier_index,
        Err(0) => panic!("index precedes the first divider"),
        Err(i) => dividers[i - 1].child_tier_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_release_round_trips() {
        let fr = Frontier::new(4);
        fr.add(2, 0, 111);
        fr.add(2, 0, 222);
        fr.add(2, 1, 333);
        assert_eq!(fr.len(2), 3);
        let (hashes, dividers) = fr.release(2);
        assert_eq!(hashes, vec![111, 222, 333]);
        assert_eq!(dividers, vec![Divider { child_tier_index: 0, start: 0 }, Divider { child_tier_index: 1, start: 2 }]);
        assert!(fr.is_empty(2));
    }

    #[test]
    fn child_tier_at_resolves_boundaries() {
        let dividers = vec![Divider { child_tier_index: 0, start: 0 }, Divider { child_tier_index: 5, start: 3 }];
        assert_eq!(child_tier_at(&dividers, 0), 0);
        assert_eq!(child_tier_at(&dividers, 2), 0);
        assert_eq!(child_tier_at(&dividers, 3), 5);
        assert_eq!(child_tier_at(&dividers, 10), 5);
    }

    #[test]
    fn concurrent_producers_all_land() {
        use std::sync::Arc;
        use std::thread;

        let fr = Arc::new(Frontier::new(1));
        let mut handles = Vec::new();
        for t in 0..8u64 {
            let fr = Arc::clone(&fr);
            handles.push(thread::spawn(move || {
                for i in 0..100u64 {
                    fr.add(0, 0, t * 100 + i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(fr.len(0), 800);
    }
}
