//! Dice: per-turn rolls, doubles expansion, and the opening roll.
//!
//! A turn roll is two independent dice. Doubles grant four movement pips
//! instead of two. The opening roll is one die per side; the higher face
//! starts, and ties are re-rolled by the engine.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::rng::{GameRng, GameRngState};
use super::side::Side;

/// A completed two-die roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceRoll {
    /// The two faces, in the order rolled. Each is 1..=6.
    pub faces: [u8; 2],
}

impl DiceRoll {
    /// Construct from two faces. Panics on a face outside 1..=6.
    #[must_use]
    pub fn new(first: u8, second: u8) -> Self {
        assert!((1..=6).contains(&first), "die face out of range: {}", first);
        assert!(
            (1..=6).contains(&second),
            "die face out of range: {}",
            second
        );
        Self {
            faces: [first, second],
        }
    }

    /// True iff both faces match.
    #[must_use]
    pub fn is_doubles(self) -> bool {
        self.faces[0] == self.faces[1]
    }

    /// The movement pips this roll grants: the two faces, or four copies
    /// of the face on doubles.
    ///
    /// ```
    /// use gammon::DiceRoll;
    ///
    /// assert_eq!(DiceRoll::new(2, 5).pips().as_slice(), &[2, 5]);
    /// assert_eq!(DiceRoll::new(4, 4).pips().as_slice(), &[4, 4, 4, 4]);
    /// ```
    #[must_use]
    pub fn pips(self) -> SmallVec<[u8; 4]> {
        if self.is_doubles() {
            smallvec![self.faces[0]; 4]
        } else {
            smallvec![self.faces[0], self.faces[1]]
        }
    }
}

/// The game's dice: a deterministic RNG plus the current and opening
/// rolls.
///
/// Reading the current roll before the first [`DiceCup::roll`] is a
/// programmer error and panics; input layers never reach the dice before
/// the engine has rolled them.
#[derive(Clone, Debug)]
pub struct DiceCup {
    rng: GameRng,
    current: Option<DiceRoll>,
    opening: Option<(u8, u8)>,
}

impl DiceCup {
    /// Create a dice cup seeded for a deterministic sequence.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            current: None,
            opening: None,
        }
    }

    /// Roll both dice and retain the result as the current roll.
    pub fn roll(&mut self) -> DiceRoll {
        let roll = DiceRoll::new(self.rng.roll_die(), self.rng.roll_die());
        self.current = Some(roll);
        roll
    }

    /// The current roll. Panics if the dice have not been rolled.
    #[must_use]
    pub fn current(&self) -> DiceRoll {
        self.current.expect("dice have not been rolled")
    }

    /// The current roll, if any (query surface; never panics).
    #[must_use]
    pub fn last_roll(&self) -> Option<DiceRoll> {
        self.current
    }

    /// True iff the current roll is doubles. Panics before the first roll.
    #[must_use]
    pub fn is_doubles(&self) -> bool {
        self.current().is_doubles()
    }

    /// Movement pips of the current roll. Panics before the first roll.
    #[must_use]
    pub fn pips(&self) -> SmallVec<[u8; 4]> {
        self.current().pips()
    }

    /// Roll one die per side to decide who starts: (White, Black).
    /// Retained for the query surface.
    pub fn opening_roll(&mut self) -> (u8, u8) {
        let rolls = (self.rng.roll_die(), self.rng.roll_die());
        self.opening = Some(rolls);
        rolls
    }

    /// The most recent opening roll, if any.
    #[must_use]
    pub fn opening_rolls(&self) -> Option<(u8, u8)> {
        self.opening
    }

    /// Who starts for a given opening roll; `None` on a tie (the caller
    /// re-rolls until decided).
    #[must_use]
    pub fn opening_winner(white: u8, black: u8) -> Option<Side> {
        match white.cmp(&black) {
            std::cmp::Ordering::Greater => Some(Side::White),
            std::cmp::Ordering::Less => Some(Side::Black),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Get the full state for serialization.
    #[must_use]
    pub fn state(&self) -> DiceCupState {
        DiceCupState {
            rng: self.rng.state(),
            current: self.current,
            opening: self.opening,
        }
    }

    /// Restore from a saved state. Future rolls continue the saved
    /// sequence exactly.
    #[must_use]
    pub fn from_state(state: &DiceCupState) -> Self {
        Self {
            rng: GameRng::from_state(&state.rng),
            current: state.current,
            opening: state.opening,
        }
    }
}

/// Serializable dice state for checkpointing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceCupState {
    /// RNG seed and position.
    pub rng: GameRngState,
    /// Current roll, if any.
    pub current: Option<DiceRoll>,
    /// Most recent opening roll (White, Black), if any.
    pub opening: Option<(u8, u8)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_faces_in_range() {
        let mut cup = DiceCup::new(42);
        for _ in 0..200 {
            let roll = cup.roll();
            assert!((1..=6).contains(&roll.faces[0]));
            assert!((1..=6).contains(&roll.faces[1]));
        }
    }

    #[test]
    fn test_doubles_detection() {
        assert!(DiceRoll::new(3, 3).is_doubles());
        assert!(!DiceRoll::new(3, 4).is_doubles());
    }

    #[test]
    fn test_pips_expansion() {
        assert_eq!(DiceRoll::new(1, 6).pips().as_slice(), &[1, 6]);
        assert_eq!(DiceRoll::new(5, 5).pips().as_slice(), &[5, 5, 5, 5]);
    }

    #[test]
    #[should_panic(expected = "dice have not been rolled")]
    fn test_current_before_roll_panics() {
        let cup = DiceCup::new(0);
        let _ = cup.current();
    }

    #[test]
    fn test_last_roll_is_queryable() {
        let mut cup = DiceCup::new(9);
        assert_eq!(cup.last_roll(), None);

        let roll = cup.roll();
        assert_eq!(cup.last_roll(), Some(roll));
        assert_eq!(cup.current(), roll);
    }

    #[test]
    fn test_opening_roll_retained() {
        let mut cup = DiceCup::new(5);
        assert_eq!(cup.opening_rolls(), None);

        let rolls = cup.opening_roll();
        assert_eq!(cup.opening_rolls(), Some(rolls));
        assert!((1..=6).contains(&rolls.0));
        assert!((1..=6).contains(&rolls.1));
    }

    #[test]
    fn test_opening_winner() {
        assert_eq!(DiceCup::opening_winner(6, 1), Some(Side::White));
        assert_eq!(DiceCup::opening_winner(2, 5), Some(Side::Black));
        assert_eq!(DiceCup::opening_winner(4, 4), None);
    }

    #[test]
    fn test_cup_doubles_and_pips_follow_current() {
        let mut cup = DiceCup::new(15);
        let roll = cup.roll();
        assert_eq!(cup.is_doubles(), roll.faces[0] == roll.faces[1]);
        assert_eq!(cup.pips(), roll.pips());
    }

    #[test]
    fn test_determinism_across_cups() {
        let mut a = DiceCup::new(123);
        let mut b = DiceCup::new(123);
        for _ in 0..50 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_state_round_trip_preserves_sequence() {
        let mut cup = DiceCup::new(77);
        cup.opening_roll();
        for _ in 0..13 {
            cup.roll();
        }

        let state = cup.state();
        let mut restored = DiceCup::from_state(&state);

        assert_eq!(restored.last_roll(), cup.last_roll());
        assert_eq!(restored.opening_rolls(), cup.opening_rolls());
        for _ in 0..20 {
            assert_eq!(restored.roll(), cup.roll());
        }
    }

    #[test]
    fn test_state_serde() {
        let mut cup = DiceCup::new(3);
        cup.roll();

        let state = cup.state();
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: DiceCupState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }
}
