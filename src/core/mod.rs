//! Core engine types: sides, RNG, dice, and the pip ledger.
//!
//! These are the board-independent building blocks. The board and the
//! turn engine compose them; nothing here knows about point occupancy.

pub mod dice;
pub mod ledger;
pub mod rng;
pub mod side;

pub use dice::{DiceCup, DiceCupState, DiceRoll};
pub use ledger::MoveLedger;
pub use rng::{GameRng, GameRngState};
pub use side::{Side, SideMap, CHECKERS_PER_SIDE, POINT_COUNT};
