//! Flat persistence record for a game in progress.
//!
//! A [`GameSnapshot`] carries everything a storage collaborator needs to
//! reconstruct the game exactly: every point's occupancy, both bar and
//! borne-off counts, the phase and active side, both ledgers' pips, and
//! the dice state including the RNG position — so a restored game also
//! rolls the same future dice.
//!
//! The record is plain serde data; `GameEngine::snapshot` produces it and
//! `GameEngine::restore` validates and consumes it. Storage engines and
//! wire formats stay outside the crate.

use serde::{Deserialize, Serialize};

use crate::board::PointState;
use crate::core::dice::DiceCupState;
use crate::core::side::{Side, SideMap, POINT_COUNT};
use crate::engine::Phase;

/// Complete serializable game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Occupancy of all 24 points.
    pub points: [PointState; POINT_COUNT],
    /// Per-side bar counts.
    pub bar: SideMap<u8>,
    /// Per-side borne-off counts.
    pub borne_off: SideMap<u8>,
    /// Resting phase of the turn machine.
    pub phase: Phase,
    /// The side to act, if the opening roll has been decided.
    pub active: Option<Side>,
    /// Per-side unconsumed pips (only the active side's turn ledger is
    /// ever non-empty).
    pub ledgers: SideMap<Vec<u8>>,
    /// Dice state: RNG seed and position, current roll, opening roll.
    pub dice: DiceCupState,
}
