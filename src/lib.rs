//! # gammon
//!
//! A backgammon rules engine and turn state machine.
//!
//! ## Design Principles
//!
//! 1. **One owner of positional truth**: [`BoardState`] holds every
//!    point, bar, and borne-off count. Renderers rebuild any per-checker
//!    view from its queries; nothing mirrors position independently.
//!
//! 2. **Validate first, mutate second**: every mutating operation checks
//!    legality up front; a rejected command reports a structured reason
//!    and changes nothing, so callers simply re-prompt.
//!
//! 3. **Deterministic by seed**: dice draw from a seeded ChaCha8 stream
//!    whose position serializes, so a restored game replays identically —
//!    same future rolls, same legal moves.
//!
//! ## Architecture
//!
//! - [`GameEngine`] sequences the game: opening roll → turn roll →
//!   validated moves consuming the active side's pip ledger → automatic
//!   turn end → side switch, until a side bears off all 15 checkers.
//!   Rule rejections are ordinary results; phase misuse panics.
//!
//! - [`MoveLedger`] owns the turn's movement pips and answers whether a
//!   distance is payable by one pip or an additive combination, with a
//!   deterministic consumption order.
//!
//! - [`GameSnapshot`] is the flat persistence record: board, phase,
//!   active side, ledgers, and dice state round-trip through serde with
//!   behavior-identical restores.
//!
//! ## Modules
//!
//! - `core`: sides, RNG, dice, pip ledger
//! - `board`: points, capture bar, bear-off accounting
//! - `engine`: the turn state machine and command surface
//! - `snapshot`: the serializable game record

pub mod board;
pub mod core;
pub mod engine;
pub mod snapshot;

// Re-export commonly used types
pub use crate::core::{
    DiceCup, DiceCupState, DiceRoll, GameRng, GameRngState, MoveLedger, Side, SideMap,
    CHECKERS_PER_SIDE, POINT_COUNT,
};

pub use crate::board::{BoardState, MoveEvent, PointState};

pub use crate::engine::{
    GameEngine, MoveFrom, MoveOutcome, MoveTarget, OpeningOutcome, Phase, RejectReason,
    RollOutcome,
};

pub use crate::snapshot::GameSnapshot;
