//! The active side's unconsumed movement pips for the current turn.
//!
//! A ledger is seeded from the turn roll (two pips, or four on doubles),
//! pays distances as they are moved, and is discarded at turn end. A
//! distance is payable when it equals one held pip or the sum of any 2,
//! 3, or 4 held pips. Payability is re-evaluated against the *current*
//! multiset on every call: after partial consumption the remaining pips
//! differ from the original roll.
//!
//! The multiset is at most four small integers, so the subset search is
//! brute-forced directly and stays pure: no board knowledge lives here.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::dice::DiceRoll;

/// Multiset of unconsumed pips for one side's current turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLedger {
    pips: SmallVec<[u8; 4]>,
}

impl MoveLedger {
    /// An empty ledger (no turn in progress).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger seeded from a turn roll.
    ///
    /// ```
    /// use gammon::{DiceRoll, MoveLedger};
    ///
    /// let ledger = MoveLedger::for_roll(DiceRoll::new(6, 6));
    /// assert_eq!(ledger.remaining(), 4);
    /// ```
    #[must_use]
    pub fn for_roll(roll: DiceRoll) -> Self {
        Self { pips: roll.pips() }
    }

    /// Rebuild a ledger from raw pips (persistence restore). Panics on a
    /// pip outside 1..=6 or more than four pips.
    #[must_use]
    pub fn from_pips(pips: &[u8]) -> Self {
        assert!(pips.len() <= 4, "at most four pips per turn");
        for &pip in pips {
            assert!((1..=6).contains(&pip), "pip out of range: {}", pip);
        }
        Self {
            pips: SmallVec::from_slice(pips),
        }
    }

    /// Number of unconsumed pips. The turn ends when this reaches zero.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pips.len()
    }

    /// True iff no pips remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pips.is_empty()
    }

    /// The unconsumed pips, in consumption-index order.
    #[must_use]
    pub fn pips(&self) -> &[u8] {
        &self.pips
    }

    /// True iff a single held pip equals `pip`.
    #[must_use]
    pub fn holds(&self, pip: u8) -> bool {
        self.pips.contains(&pip)
    }

    /// The distinct held pip values, ascending.
    #[must_use]
    pub fn distinct_pips(&self) -> SmallVec<[u8; 4]> {
        let mut distinct = self.pips.clone();
        distinct.sort_unstable();
        distinct.dedup();
        distinct
    }

    /// Every distance payable from the current multiset (all nonempty
    /// subset sums), deduplicated and ascending. Used by move
    /// enumeration to find reachable destinations.
    #[must_use]
    pub fn payable_distances(&self) -> SmallVec<[u8; 16]> {
        let n = self.pips.len();
        let mut sums: SmallVec<[u8; 16]> = SmallVec::new();
        for mask in 1u8..(1 << n) {
            let sum = (0..n)
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| self.pips[i])
                .sum();
            sums.push(sum);
        }
        sums.sort_unstable();
        sums.dedup();
        sums
    }

    /// True iff `distance` equals one held pip or the sum of any 2, 3,
    /// or 4 held pips.
    #[must_use]
    pub fn can_pay(&self, distance: u8) -> bool {
        self.witness(distance).is_some()
    }

    /// Pay `distance` by removing a witnessing subset of pips. Returns
    /// false and leaves the ledger unchanged when no subset sums to it.
    ///
    /// Among equally valid subsets the tie-break is deterministic:
    /// fewest pips, then the lexicographically lowest index combination.
    pub fn pay(&mut self, distance: u8) -> bool {
        match self.witness(distance) {
            Some(indices) => {
                // Highest index first so earlier removals don't shift
                // the later ones.
                for &i in indices.iter().rev() {
                    self.pips.remove(i);
                }
                true
            }
            None => false,
        }
    }

    /// Consume one pip of exactly `pip`. Returns false and leaves the
    /// ledger unchanged when that face is not held. Bar entry and
    /// bear-off substitution pay with a single die.
    pub fn pay_pip(&mut self, pip: u8) -> bool {
        match self.pips.iter().position(|&p| p == pip) {
            Some(i) => {
                self.pips.remove(i);
                true
            }
            None => false,
        }
    }

    /// Drop all remaining pips (turn end).
    pub fn clear(&mut self) {
        self.pips.clear();
    }

    /// The witnessing subset for `distance` under the tie-break rule:
    /// subsets are tried smallest first, and within a size in
    /// lexicographic index order.
    fn witness(&self, distance: u8) -> Option<SmallVec<[usize; 4]>> {
        let p = &self.pips;
        let n = p.len();

        for i in 0..n {
            if p[i] == distance {
                return Some(smallvec![i]);
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if p[i] + p[j] == distance {
                    return Some(smallvec![i, j]);
                }
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    if p[i] + p[j] + p[k] == distance {
                        return Some(smallvec![i, j, k]);
                    }
                }
            }
        }
        if n == 4 && p.iter().map(|&x| x as u32).sum::<u32>() == distance as u32 {
            return Some(smallvec![0, 1, 2, 3]);
        }
        None
    }
}
