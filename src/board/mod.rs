//! Board state: the sole owner of positional truth.
//!
//! ## BoardState
//!
//! - 24 points, each holding an owning side and a checker count
//! - per-side bar counts (captured checkers awaiting re-entry)
//! - per-side borne-off counts (checkers permanently removed)
//!
//! All mutating operations validate first; a rejected call leaves state
//! unchanged and reports `moved == false`. Checker conservation (on-board
//! + bar + borne-off == 15 per side) is asserted after every mutation.
//!
//! Renderers and input layers read the query surface; any per-checker
//! view they need is a disposable projection of [`BoardState::owned_points`],
//! never independently mutated state.

use serde::{Deserialize, Serialize};

use crate::core::side::{Side, SideMap, CHECKERS_PER_SIDE, POINT_COUNT};

/// Occupancy of a single point.
///
/// Invariant: `count == 0` iff `owner == None`. The representation cannot
/// express both sides on one point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointState {
    /// The side holding this point, if any.
    pub owner: Option<Side>,
    /// Number of checkers on the point.
    pub count: u8,
}

impl PointState {
    /// An unoccupied point.
    pub const EMPTY: PointState = PointState {
        owner: None,
        count: 0,
    };

    /// A point held by `side` with `count` checkers. Panics on zero.
    #[must_use]
    pub fn owned(side: Side, count: u8) -> Self {
        assert!(count > 0, "an owned point holds at least one checker");
        Self {
            owner: Some(side),
            count,
        }
    }

    /// True iff no checkers sit here.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }

    /// True iff `side` may not land here (two or more opposing checkers).
    #[must_use]
    pub fn is_blocked_against(self, side: Side) -> bool {
        self.owner == Some(side.opponent()) && self.count >= 2
    }

    /// True iff this is a lone checker of `side` (capturable).
    #[must_use]
    pub fn is_blot_of(self, side: Side) -> bool {
        self.owner == Some(side) && self.count == 1
    }
}

/// Structured result of a board mutation.
///
/// A rejected call reports `moved == false` and mutates nothing; callers
/// re-prompt rather than unwind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Whether the mutation was applied.
    pub moved: bool,
    /// Whether a lone opposing checker was captured.
    pub hit: bool,
    /// The side whose checker was sent to the bar, if any.
    pub hit_side: Option<Side>,
    /// Whether a checker left the board permanently.
    pub borne_off: bool,
}

impl MoveEvent {
    /// The mutation was rejected; nothing changed.
    #[must_use]
    pub fn rejected() -> Self {
        Self::default()
    }

    /// The mutation was applied without a capture.
    #[must_use]
    pub fn applied() -> Self {
        Self {
            moved: true,
            ..Self::default()
        }
    }

    /// The mutation was applied and captured a checker of `hit_side`.
    #[must_use]
    pub fn applied_with_hit(hit_side: Side) -> Self {
        Self {
            moved: true,
            hit: true,
            hit_side: Some(hit_side),
            borne_off: false,
        }
    }
}

/// Authoritative board position.
///
/// Created once per game in the standard starting layout and mutated only
/// through its own validated operations. Callers serialize access; there
/// is no interior locking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    points: [PointState; POINT_COUNT],
    bar: SideMap<u8>,
    borne_off: SideMap<u8>,
}

impl BoardState {
    /// The standard starting layout: each side's 15 checkers split
    /// 2/5/3/5 across four points, mirrored between the sides.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        for side in Side::BOTH {
            for (point, count) in side.starting_layout() {
                board.points[point] = PointState::owned(side, count);
            }
        }
        board
    }

    /// A board with no checkers anywhere. Test setups place checkers and
    /// counts explicitly via [`BoardState::from_parts`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            points: [PointState::EMPTY; POINT_COUNT],
            bar: SideMap::with_value(0),
            borne_off: SideMap::with_value(0),
        }
    }

    /// Reconstruct a board from its flat parts (persistence restore).
    ///
    /// Panics when the record is corrupt: a point owning zero checkers or
    /// counting without an owner, or either side failing checker
    /// conservation. Correct snapshots never trip this.
    #[must_use]
    pub fn from_parts(
        points: [PointState; POINT_COUNT],
        bar: SideMap<u8>,
        borne_off: SideMap<u8>,
    ) -> Self {
        for (idx, point) in points.iter().enumerate() {
            assert!(
                (point.count == 0) == point.owner.is_none(),
                "point {} owner/count mismatch",
                idx
            );
        }
        let board = Self {
            points,
            bar,
            borne_off,
        };
        for side in Side::BOTH {
            assert_eq!(
                board.checkers_on_board(side) + board.bar[side] + board.borne_off[side],
                CHECKERS_PER_SIDE,
                "{} fails checker conservation",
                side
            );
        }
        board
    }

    // === Queries ===

    /// Occupancy of one point. Panics on an index past 23; the command
    /// surface range-checks raw input before reading points.
    #[must_use]
    pub fn point(&self, idx: usize) -> PointState {
        self.points[idx]
    }

    /// All 24 points, for renderers and snapshots.
    #[must_use]
    pub fn points(&self) -> &[PointState; POINT_COUNT] {
        &self.points
    }

    /// Checkers of `side` on the bar.
    #[must_use]
    pub fn bar(&self, side: Side) -> u8 {
        self.bar[side]
    }

    /// Checkers of `side` borne off. Monotonically non-decreasing.
    #[must_use]
    pub fn borne_off(&self, side: Side) -> u8 {
        self.borne_off[side]
    }

    /// The points `side` occupies, as (index, count) pairs in ascending
    /// index order. This is the derived projection a renderer rebuilds
    /// per frame.
    pub fn owned_points(&self, side: Side) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.owner == Some(side))
            .map(|(idx, p)| (idx, p.count))
    }

    /// Total checkers `side` has on the board (excluding bar and
    /// borne-off).
    #[must_use]
    pub fn checkers_on_board(&self, side: Side) -> u8 {
        self.owned_points(side).map(|(_, count)| count).sum()
    }

    /// Whether a regular move is legal: indices on the board, no bar
    /// checkers pending (re-entry takes precedence), `from` held by
    /// `side`, travel in `side`'s direction, destination not blocked.
    #[must_use]
    pub fn is_legal_move(&self, side: Side, from: usize, to: usize) -> bool {
        if from >= POINT_COUNT || to >= POINT_COUNT {
            return false;
        }
        if self.bar[side] > 0 {
            return false;
        }
        if self.points[from].owner != Some(side) {
            return false;
        }
        if side.distance(from, to).is_none() {
            return false;
        }
        !self.points[to].is_blocked_against(side)
    }

    /// Whether every on-board checker of `side` lies within its home
    /// range. Bar checkers are not on the board and do not count here;
    /// the engine separately forbids bearing off while the bar is
    /// occupied.
    #[must_use]
    pub fn all_in_home(&self, side: Side) -> bool {
        self.owned_points(side)
            .all(|(idx, _)| side.home_range().contains(&idx))
    }

    /// Whether no checker of `side` sits strictly between `point` and the
    /// side's off-edge. Gates the higher-die bear-off substitution.
    #[must_use]
    pub fn is_most_advanced(&self, side: Side, point: usize) -> bool {
        debug_assert!(point < POINT_COUNT, "point out of range: {}", point);
        match side {
            Side::White => ((point + 1)..POINT_COUNT).all(|i| self.points[i].owner != Some(side)),
            Side::Black => (0..point).all(|i| self.points[i].owner != Some(side)),
        }
    }

    /// The side that has borne off all 15 checkers, if any.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|&side| self.borne_off[side] == CHECKERS_PER_SIDE)
    }

    // === Mutations ===

    /// Move one checker of `side` from `from` to `to`.
    ///
    /// A lone opposing checker on `to` is captured: it goes to the
    /// opponent's bar and ownership of the point flips. An illegal call
    /// returns `moved == false` with no mutation.
    pub fn move_checker(&mut self, side: Side, from: usize, to: usize) -> MoveEvent {
        if !self.is_legal_move(side, from, to) {
            return MoveEvent::rejected();
        }
        self.remove_one(from);
        let event = self.land_on(side, to);
        self.debug_check_conservation();
        event
    }

    /// Enter a checker of `side` from the bar onto `point`.
    ///
    /// Requires a nonzero bar count and `point` within the side's entry
    /// range; a lone opposing checker is hit exactly as in
    /// [`BoardState::move_checker`]. An illegal call returns
    /// `moved == false` with no mutation.
    pub fn enter_from_bar(&mut self, side: Side, point: usize) -> MoveEvent {
        if self.bar[side] == 0 {
            return MoveEvent::rejected();
        }
        if side.entry_distance(point).is_none() {
            return MoveEvent::rejected();
        }
        if self.points[point].is_blocked_against(side) {
            return MoveEvent::rejected();
        }
        let event = self.land_on(side, point);
        self.bar[side] -= 1;
        self.debug_check_conservation();
        event
    }

    /// Bear one checker of `side` off from `point`.
    ///
    /// Requires [`BoardState::all_in_home`] and a side-owned checker on
    /// `point`. Die matching (exact pip, or a larger pip from the
    /// most-advanced point) is the engine's responsibility. Returns false
    /// with no mutation when rejected.
    pub fn bear_off(&mut self, side: Side, point: usize) -> bool {
        if point >= POINT_COUNT {
            return false;
        }
        if !self.all_in_home(side) {
            return false;
        }
        if self.points[point].owner != Some(side) {
            return false;
        }
        self.remove_one(point);
        self.borne_off[side] += 1;
        self.debug_check_conservation();
        true
    }

    /// Take one checker off `idx`, clearing ownership at zero.
    fn remove_one(&mut self, idx: usize) {
        let point = self.points[idx];
        debug_assert!(point.count > 0, "removing from empty point {}", idx);
        self.points[idx] = if point.count == 1 {
            PointState::EMPTY
        } else {
            PointState {
                owner: point.owner,
                count: point.count - 1,
            }
        };
    }

    /// Land one checker of `side` on `to`: stack on own or empty points,
    /// capture a lone opposing checker. Callers have already excluded
    /// blocked destinations.
    fn land_on(&mut self, side: Side, to: usize) -> MoveEvent {
        let target = self.points[to];
        debug_assert!(!target.is_blocked_against(side), "landing on a block");
        if target.is_blot_of(side.opponent()) {
            self.bar[side.opponent()] += 1;
            self.points[to] = PointState::owned(side, 1);
            MoveEvent::applied_with_hit(side.opponent())
        } else {
            self.points[to] = PointState::owned(side, target.count + 1);
            MoveEvent::applied()
        }
    }

    fn debug_check_conservation(&self) {
        for side in Side::BOTH {
            debug_assert_eq!(
                self.checkers_on_board(side) + self.bar[side] + self.borne_off[side],
                CHECKERS_PER_SIDE,
                "{} violates checker conservation",
                side
            );
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}
