//! The turn engine: a state machine sequencing the whole game.
//!
//! ## Phases
//!
//! `NotStarted → AwaitingOpeningRoll → AwaitingRoll → AwaitingMove →
//! (AwaitingRoll | GameOver)`
//!
//! Turn end is not a resting phase: when the active side's ledger runs
//! dry, or no legal move remains, the engine evaluates the winner and
//! either passes the turn or finishes the game before returning. A side
//! that cannot move at all has its turn auto-skipped directly from the
//! roll, so the machine never stalls awaiting an impossible move.
//!
//! ## Failure semantics
//!
//! Rule rejections (wrong direction, blocked point, dice mismatch,
//! pending bar entry) come back as non-mutating [`MoveOutcome`]s with a
//! [`RejectReason`]; callers re-prompt. Phase misuse — commanding before
//! setup, before the roll, or after the game is over — is a programmer
//! error and panics.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::board::{BoardState, MoveEvent};
use crate::core::dice::{DiceCup, DiceRoll};
use crate::core::ledger::MoveLedger;
use crate::core::side::{Side, SideMap, POINT_COUNT};
use crate::snapshot::GameSnapshot;

/// Opening-roll ties are re-rolled; exceeding this many rounds means the
/// RNG is broken and panics as an internal error.
const OPENING_ROLL_CAP: u32 = 1000;

/// Resting phases of the turn machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Constructed; the board is not laid out yet.
    NotStarted,
    /// Layout applied; the opening roll decides who starts.
    AwaitingOpeningRoll,
    /// The active side must roll for the turn.
    AwaitingRoll,
    /// The active side has pips to spend.
    AwaitingMove,
    /// Terminal: a side has borne off all 15 checkers.
    GameOver,
}

/// Origin of an attempted move: a point, or the bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveFrom {
    /// The capture area; the only legal origin while it holds checkers.
    Bar,
    /// A point index in 0..24.
    Point(usize),
}

/// Destination of a legal move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveTarget {
    /// Land on a point.
    Point(usize),
    /// Bear the checker off the board.
    Off,
}

/// Why a command was rejected. Rejections never mutate state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// The side has bar checkers; only re-entry is allowed.
    MustEnterFromBar,
    /// Bar entry attempted with an empty bar.
    NothingOnBar,
    /// A point index past 23.
    OutOfBoard,
    /// Bar entry onto a point outside the side's entry range.
    OutsideEntryRange,
    /// The origin point holds no checker of the active side.
    NoCheckerAt,
    /// Travel against the side's fixed direction.
    WrongDirection,
    /// The ledger cannot pay the distance (or bear off the point).
    DiceMismatch,
    /// The destination holds two or more opposing checkers.
    Blocked,
    /// Bear-off attempted with checkers outside the home range.
    NotAllHome,
}

/// Structured result of a move, entry, or bear-off command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Whether the command mutated the game.
    pub applied: bool,
    /// Why it was rejected, when it was.
    pub reason: Option<RejectReason>,
    /// The side whose checker was captured, if any.
    pub hit_side: Option<Side>,
    /// Whether a checker was borne off.
    pub borne_off: bool,
    /// Whether this command ended the turn.
    pub turn_ended: bool,
    /// Whether this command ended the game.
    pub game_over: bool,
}

impl MoveOutcome {
    fn rejected(reason: RejectReason) -> Self {
        Self {
            applied: false,
            reason: Some(reason),
            hit_side: None,
            borne_off: false,
            turn_ended: false,
            game_over: false,
        }
    }
}

/// Result of rolling for a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// The roll.
    pub roll: DiceRoll,
    /// The pips it granted (four on doubles).
    pub pips: SmallVec<[u8; 4]>,
    /// True when the side had no legal move and the turn passed
    /// immediately, consuming nothing.
    pub auto_skipped: bool,
}

/// Result of the opening roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningOutcome {
    /// White's die.
    pub white: u8,
    /// Black's die.
    pub black: u8,
    /// Tied rounds re-rolled before the decision.
    pub rerolls: u32,
    /// The side that starts.
    pub starter: Side,
}

/// How a bear-off is paid: the exact distance (possibly a combination),
/// or one substituted larger pip.
enum BearOffPayment {
    Exact(u8),
    Substitute(u8),
}

/// The game: board, dice, ledgers, and the turn machine over them.
///
/// Callers own exactly one engine per game and issue commands one at a
/// time; every collaborator (renderer, input, storage) works through this
/// surface.
///
/// ```
/// use gammon::{GameEngine, Phase};
///
/// let mut game = GameEngine::new(42);
/// game.initialize();
/// let opening = game.roll_opening();
/// assert_eq!(game.active_side(), Some(opening.starter));
/// assert_eq!(game.phase(), Phase::AwaitingRoll);
/// ```
#[derive(Clone, Debug)]
pub struct GameEngine {
    board: BoardState,
    dice: DiceCup,
    ledgers: SideMap<MoveLedger>,
    active: Option<Side>,
    phase: Phase,
}

impl GameEngine {
    /// A fresh engine. Call [`GameEngine::initialize`] to lay out the
    /// board before anything else.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            board: BoardState::empty(),
            dice: DiceCup::new(seed),
            ledgers: SideMap::new(|_| MoveLedger::new()),
            active: None,
            phase: Phase::NotStarted,
        }
    }

    /// An engine over a prepared board (test positions, injected
    /// fixtures), ready for the opening roll. Panics if the board fails
    /// checker conservation.
    #[must_use]
    pub fn with_board(board: BoardState, seed: u64) -> Self {
        let board = BoardState::from_parts(
            *board.points(),
            SideMap::new(|s| board.bar(s)),
            SideMap::new(|s| board.borne_off(s)),
        );
        Self {
            board,
            dice: DiceCup::new(seed),
            ledgers: SideMap::new(|_| MoveLedger::new()),
            active: None,
            phase: Phase::AwaitingOpeningRoll,
        }
    }

    // === Commands ===

    /// Lay out the standard starting position. Panics outside
    /// `NotStarted`.
    pub fn initialize(&mut self) {
        assert_eq!(
            self.phase,
            Phase::NotStarted,
            "initialize invoked twice or out of order"
        );
        self.board = BoardState::new();
        self.ledgers = SideMap::new(|_| MoveLedger::new());
        self.phase = Phase::AwaitingOpeningRoll;
        debug!("board laid out, awaiting opening roll");
    }

    /// Roll one die per side until the tie breaks; the higher face
    /// starts. Panics outside `AwaitingOpeningRoll`, or if the tie
    /// somehow survives the defensive re-roll cap.
    pub fn roll_opening(&mut self) -> OpeningOutcome {
        assert_eq!(
            self.phase,
            Phase::AwaitingOpeningRoll,
            "opening roll invoked out of order"
        );
        let mut rerolls = 0;
        loop {
            let (white, black) = self.dice.opening_roll();
            if let Some(starter) = DiceCup::opening_winner(white, black) {
                self.active = Some(starter);
                self.phase = Phase::AwaitingRoll;
                debug!(%starter, white, black, rerolls, "opening roll decided");
                return OpeningOutcome {
                    white,
                    black,
                    rerolls,
                    starter,
                };
            }
            rerolls += 1;
            assert!(
                rerolls < OPENING_ROLL_CAP,
                "opening roll tied {} times in a row",
                OPENING_ROLL_CAP
            );
        }
    }

    /// Roll for the active side's turn and seed its ledger. If the side
    /// has no legal move at all, the turn auto-skips: nothing is
    /// consumed and the opponent is up. Panics outside `AwaitingRoll`.
    pub fn roll_turn(&mut self) -> RollOutcome {
        assert_eq!(
            self.phase,
            Phase::AwaitingRoll,
            "turn roll invoked out of order"
        );
        let side = self.current_side();
        let roll = self.dice.roll();
        self.ledgers[side] = MoveLedger::for_roll(roll);
        self.phase = Phase::AwaitingMove;
        debug!(%side, faces = ?roll.faces, "rolled for turn");

        let auto_skipped = !self.any_legal_move(side);
        if auto_skipped {
            debug!(%side, "no legal move with this roll, turn auto-skipped");
            self.end_turn(side);
        }
        RollOutcome {
            roll,
            pips: roll.pips(),
            auto_skipped,
        }
    }

    /// Attempt to move a checker from a point — or from the bar, via the
    /// [`MoveFrom::Bar`] sentinel — onto point `to`.
    ///
    /// Bar entry pays one exact held pip. A regular move may pay any
    /// payable distance, combinations included; a combined move is a
    /// single atomic hop whose legality is judged at the destination
    /// only. Panics outside `AwaitingMove`.
    pub fn attempt_move(&mut self, from: MoveFrom, to: usize) -> MoveOutcome {
        self.assert_move_phase("attempt_move");
        let side = self.current_side();
        match from {
            MoveFrom::Bar => self.attempt_entry(side, to),
            MoveFrom::Point(from) => self.attempt_regular(side, from, to),
        }
    }

    /// Attempt to bear a checker off from `from`.
    ///
    /// The exact off-edge distance is paid if the ledger can pay it
    /// (singly or by combination). Otherwise the smallest held pip
    /// strictly larger than the distance substitutes, but only from the
    /// side's most-advanced occupied point. Panics outside
    /// `AwaitingMove`.
    pub fn attempt_bear_off(&mut self, from: usize) -> MoveOutcome {
        self.assert_move_phase("attempt_bear_off");
        let side = self.current_side();
        if from >= POINT_COUNT {
            return self.reject(side, RejectReason::OutOfBoard);
        }
        if self.board.bar(side) > 0 {
            return self.reject(side, RejectReason::MustEnterFromBar);
        }
        if !self.board.all_in_home(side) {
            return self.reject(side, RejectReason::NotAllHome);
        }
        if self.board.point(from).owner != Some(side) {
            return self.reject(side, RejectReason::NoCheckerAt);
        }
        let exact = side.bear_off_distance(from);
        let payment = if self.ledgers[side].can_pay(exact) {
            BearOffPayment::Exact(exact)
        } else {
            match self.substitute_pip(side, from, exact) {
                Some(pip) => BearOffPayment::Substitute(pip),
                None => return self.reject(side, RejectReason::DiceMismatch),
            }
        };
        let removed = self.board.bear_off(side, from);
        assert!(removed, "validated bear-off rejected by the board");
        let paid = match payment {
            BearOffPayment::Exact(distance) => self.ledgers[side].pay(distance),
            BearOffPayment::Substitute(pip) => self.ledgers[side].pay_pip(pip),
        };
        assert!(paid, "validated bear-off failed to consume its pips");
        trace!(%side, from, "borne off");

        let event = MoveEvent {
            borne_off: true,
            ..MoveEvent::applied()
        };
        self.finish_command(side, event)
    }

    // === Queries ===

    /// Current resting phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The side to act, once the opening roll has decided it.
    #[must_use]
    pub fn active_side(&self) -> Option<Side> {
        self.active
    }

    /// The authoritative board.
    #[must_use]
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// The most recent turn roll, if any.
    #[must_use]
    pub fn last_roll(&self) -> Option<DiceRoll> {
        self.dice.last_roll()
    }

    /// The most recent opening roll (White, Black), if any.
    #[must_use]
    pub fn opening_rolls(&self) -> Option<(u8, u8)> {
        self.dice.opening_rolls()
    }

    /// A side's unconsumed pips (empty outside its move phase).
    #[must_use]
    pub fn pips(&self, side: Side) -> &[u8] {
        self.ledgers[side].pips()
    }

    /// The winner, once a side has borne off all 15 checkers.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.board.winner()
    }

    /// True in the terminal phase.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Legal destinations from one origin, for input hinting. Empty
    /// outside the move phase; bar checkers restrict every other origin
    /// to nothing.
    #[must_use]
    pub fn valid_targets(&self, from: MoveFrom) -> Vec<MoveTarget> {
        if self.phase != Phase::AwaitingMove {
            return Vec::new();
        }
        let side = self.current_side();
        match from {
            MoveFrom::Bar if self.board.bar(side) > 0 => self
                .entry_points(side)
                .into_iter()
                .map(MoveTarget::Point)
                .collect(),
            MoveFrom::Bar => Vec::new(),
            MoveFrom::Point(from) if from < POINT_COUNT => {
                let mut targets: Vec<MoveTarget> = self
                    .regular_destinations(side, from)
                    .into_iter()
                    .map(MoveTarget::Point)
                    .collect();
                if self.can_bear_off_from(side, from) {
                    targets.push(MoveTarget::Off);
                }
                targets
            }
            MoveFrom::Point(_) => Vec::new(),
        }
    }

    /// Every legal (origin, target) pair for the active side. Empty
    /// outside the move phase.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<(MoveFrom, MoveTarget)> {
        if self.phase != Phase::AwaitingMove {
            return Vec::new();
        }
        let side = self.current_side();
        let mut moves = Vec::new();
        if self.board.bar(side) > 0 {
            for point in self.entry_points(side) {
                moves.push((MoveFrom::Bar, MoveTarget::Point(point)));
            }
            return moves;
        }
        for (from, _) in self.board.owned_points(side) {
            for to in self.regular_destinations(side, from) {
                moves.push((MoveFrom::Point(from), MoveTarget::Point(to)));
            }
            if self.can_bear_off_from(side, from) {
                moves.push((MoveFrom::Point(from), MoveTarget::Off));
            }
        }
        moves
    }

    /// Capture the full game state as a flat record. Panics before
    /// setup; there is nothing to save.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        assert_ne!(self.phase, Phase::NotStarted, "nothing to save before setup");
        GameSnapshot {
            points: *self.board.points(),
            bar: SideMap::new(|s| self.board.bar(s)),
            borne_off: SideMap::new(|s| self.board.borne_off(s)),
            phase: self.phase,
            active: self.active,
            ledgers: SideMap::new(|s| self.ledgers[s].pips().to_vec()),
            dice: self.dice.state(),
        }
    }

    /// Rebuild an engine from a snapshot. Query results, legal-move
    /// enumeration, and future rolls are identical to the engine that
    /// produced the record. Corrupt records fail loudly.
    #[must_use]
    pub fn restore(snapshot: &GameSnapshot) -> Self {
        assert_ne!(
            snapshot.phase,
            Phase::NotStarted,
            "snapshot phase predates setup"
        );
        let board = BoardState::from_parts(snapshot.points, snapshot.bar, snapshot.borne_off);
        let expects_active = snapshot.phase != Phase::AwaitingOpeningRoll;
        assert_eq!(
            snapshot.active.is_some(),
            expects_active,
            "active side inconsistent with phase {:?}",
            snapshot.phase
        );
        assert_eq!(
            board.winner().is_some(),
            snapshot.phase == Phase::GameOver,
            "winner inconsistent with phase {:?}",
            snapshot.phase
        );
        for side in Side::BOTH {
            let pips = &snapshot.ledgers[side];
            let may_hold = snapshot.phase == Phase::AwaitingMove && snapshot.active == Some(side);
            assert!(
                may_hold || pips.is_empty(),
                "{} holds pips outside its move phase",
                side
            );
        }
        Self {
            board,
            dice: DiceCup::from_state(&snapshot.dice),
            ledgers: SideMap::new(|s| MoveLedger::from_pips(&snapshot.ledgers[s])),
            active: snapshot.active,
            phase: snapshot.phase,
        }
    }

    // === Internals ===

    fn current_side(&self) -> Side {
        self.active.expect("active side unset")
    }

    fn assert_move_phase(&self, command: &str) {
        assert_eq!(
            self.phase,
            Phase::AwaitingMove,
            "{} invoked outside the move phase",
            command
        );
    }

    fn reject(&self, side: Side, reason: RejectReason) -> MoveOutcome {
        trace!(%side, ?reason, "command rejected");
        MoveOutcome::rejected(reason)
    }

    fn attempt_entry(&mut self, side: Side, to: usize) -> MoveOutcome {
        if self.board.bar(side) == 0 {
            return self.reject(side, RejectReason::NothingOnBar);
        }
        if to >= POINT_COUNT {
            return self.reject(side, RejectReason::OutOfBoard);
        }
        let Some(distance) = side.entry_distance(to) else {
            return self.reject(side, RejectReason::OutsideEntryRange);
        };
        if !self.ledgers[side].holds(distance) {
            return self.reject(side, RejectReason::DiceMismatch);
        }
        if self.board.point(to).is_blocked_against(side) {
            return self.reject(side, RejectReason::Blocked);
        }
        let event = self.board.enter_from_bar(side, to);
        assert!(event.moved, "validated entry rejected by the board");
        let paid = self.ledgers[side].pay_pip(distance);
        assert!(paid, "validated entry failed to consume its pip");
        trace!(%side, to, distance, hit = event.hit, "entered from bar");
        self.finish_command(side, event)
    }

    fn attempt_regular(&mut self, side: Side, from: usize, to: usize) -> MoveOutcome {
        if from >= POINT_COUNT || to >= POINT_COUNT {
            return self.reject(side, RejectReason::OutOfBoard);
        }
        if self.board.bar(side) > 0 {
            return self.reject(side, RejectReason::MustEnterFromBar);
        }
        if self.board.point(from).owner != Some(side) {
            return self.reject(side, RejectReason::NoCheckerAt);
        }
        let Some(distance) = side.distance(from, to) else {
            return self.reject(side, RejectReason::WrongDirection);
        };
        if !self.ledgers[side].can_pay(distance) {
            return self.reject(side, RejectReason::DiceMismatch);
        }
        if self.board.point(to).is_blocked_against(side) {
            return self.reject(side, RejectReason::Blocked);
        }
        let event = self.board.move_checker(side, from, to);
        assert!(event.moved, "validated move rejected by the board");
        let paid = self.ledgers[side].pay(distance);
        assert!(paid, "validated move failed to consume its pips");
        trace!(%side, from, to, distance, hit = event.hit, "moved");
        self.finish_command(side, event)
    }

    /// After an accepted command: end the turn if the ledger ran dry or
    /// nothing legal remains, then report what happened.
    fn finish_command(&mut self, side: Side, event: MoveEvent) -> MoveOutcome {
        let turn_ended = self.ledgers[side].is_empty() || !self.any_legal_move(side);
        if turn_ended {
            self.end_turn(side);
        }
        MoveOutcome {
            applied: true,
            reason: None,
            hit_side: event.hit_side,
            borne_off: event.borne_off,
            turn_ended,
            game_over: self.phase == Phase::GameOver,
        }
    }

    /// Turn end: drop the ledger, then either finish the game or pass
    /// the turn.
    fn end_turn(&mut self, side: Side) {
        self.ledgers[side].clear();
        match self.board.winner() {
            Some(winner) => {
                self.phase = Phase::GameOver;
                debug!(%winner, "game over");
            }
            None => {
                let next = side.opponent();
                self.active = Some(next);
                self.phase = Phase::AwaitingRoll;
                debug!(%next, "turn passed");
            }
        }
    }

    /// Whether the side has any legal move with its remaining pips:
    /// re-entries only while the bar is occupied, otherwise regular
    /// moves and bear-offs from every occupied point.
    fn any_legal_move(&self, side: Side) -> bool {
        if self.ledgers[side].is_empty() {
            return false;
        }
        if self.board.bar(side) > 0 {
            return !self.entry_points(side).is_empty();
        }
        self.board.owned_points(side).any(|(from, _)| {
            !self.regular_destinations(side, from).is_empty()
                || self.can_bear_off_from(side, from)
        })
    }

    /// Open entry points for each distinct held pip.
    fn entry_points(&self, side: Side) -> SmallVec<[usize; 4]> {
        let mut points = SmallVec::new();
        for pip in self.ledgers[side].distinct_pips() {
            let point = side.entry_point(pip);
            if !self.board.point(point).is_blocked_against(side) {
                points.push(point);
            }
        }
        points
    }

    /// Unblocked destinations from `from` for every payable distance,
    /// combinations included.
    fn regular_destinations(&self, side: Side, from: usize) -> SmallVec<[usize; 16]> {
        let mut destinations = SmallVec::new();
        if self.board.bar(side) > 0 || self.board.point(from).owner != Some(side) {
            return destinations;
        }
        for distance in self.ledgers[side].payable_distances() {
            if let Some(to) = side.destination(from, distance) {
                if !self.board.point(to).is_blocked_against(side) {
                    destinations.push(to);
                }
            }
        }
        destinations
    }

    /// Whether `from` can bear off right now: empty bar, everything
    /// home, and a payable exact distance or a substitutable larger pip.
    fn can_bear_off_from(&self, side: Side, from: usize) -> bool {
        if self.board.bar(side) > 0 || !self.board.all_in_home(side) {
            return false;
        }
        if self.board.point(from).owner != Some(side) {
            return false;
        }
        let exact = side.bear_off_distance(from);
        self.ledgers[side].can_pay(exact) || self.substitute_pip(side, from, exact).is_some()
    }

    /// The smallest held pip strictly larger than `exact`, allowed only
    /// when no checker sits between `from` and the off-edge.
    fn substitute_pip(&self, side: Side, from: usize, exact: u8) -> Option<u8> {
        if !self.board.is_most_advanced(side, from) {
            return None;
        }
        self.ledgers[side]
            .distinct_pips()
            .into_iter()
            .find(|&pip| pip > exact)
    }
}
