//! Side identification and per-side data storage.
//!
//! ## Side
//!
//! One of the two competing sides. Each side has a fixed travel direction
//! across the 24 points, a fixed 6-point home range, and a fixed 6-point
//! bar re-entry range inside the opponent's home.
//!
//! ## SideMap
//!
//! Per-side data storage backed by a two-slot array for O(1) access.
//! Supports iteration and indexing by `Side`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut, RangeInclusive};

/// One of the two competing sides.
///
/// White travels low→high (bearing off past point 23), Black travels
/// high→low (bearing off below point 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

/// Number of checkers each side starts (and always accounts for).
pub const CHECKERS_PER_SIDE: u8 = 15;

/// Number of points on the board.
pub const POINT_COUNT: usize = 24;

impl Side {
    /// Both sides, White first.
    pub const BOTH: [Side; 2] = [Side::White, Side::Black];

    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Raw index for array-backed storage (White = 0, Black = 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    /// The 6-point home range nearest this side's bear-off edge.
    #[must_use]
    pub const fn home_range(self) -> RangeInclusive<usize> {
        match self {
            Side::White => 18..=23,
            Side::Black => 0..=5,
        }
    }

    /// The 6-point bar re-entry range, inside the opponent's home.
    #[must_use]
    pub const fn entry_range(self) -> RangeInclusive<usize> {
        match self {
            Side::White => 0..=5,
            Side::Black => 18..=23,
        }
    }

    /// Signed travel distance from `from` to `to`, if the direction is
    /// this side's. Returns `None` for backwards or zero-length travel.
    ///
    /// ```
    /// use gammon::Side;
    ///
    /// assert_eq!(Side::White.distance(3, 8), Some(5));
    /// assert_eq!(Side::White.distance(8, 3), None);
    /// assert_eq!(Side::Black.distance(8, 3), Some(5));
    /// ```
    #[must_use]
    pub fn distance(self, from: usize, to: usize) -> Option<u8> {
        match self {
            Side::White if to > from => Some((to - from) as u8),
            Side::Black if from > to => Some((from - to) as u8),
            _ => None,
        }
    }

    /// The point reached by travelling `distance` pips from `from`, or
    /// `None` when the travel leaves the board.
    #[must_use]
    pub fn destination(self, from: usize, distance: u8) -> Option<usize> {
        match self {
            Side::White => {
                let to = from + distance as usize;
                (to < POINT_COUNT).then_some(to)
            }
            Side::Black => from.checked_sub(distance as usize),
        }
    }

    /// The entry point reached from the bar with a die showing `pip`.
    ///
    /// ```
    /// use gammon::Side;
    ///
    /// assert_eq!(Side::White.entry_point(1), 0);
    /// assert_eq!(Side::Black.entry_point(1), 23);
    /// ```
    #[must_use]
    pub fn entry_point(self, pip: u8) -> usize {
        debug_assert!((1..=6).contains(&pip), "pip out of range: {}", pip);
        match self {
            Side::White => (pip - 1) as usize,
            Side::Black => POINT_COUNT - pip as usize,
        }
    }

    /// The pip cost of entering from the bar onto `point`, or `None` when
    /// `point` lies outside this side's entry range.
    #[must_use]
    pub fn entry_distance(self, point: usize) -> Option<u8> {
        if !self.entry_range().contains(&point) {
            return None;
        }
        Some(match self {
            Side::White => (point + 1) as u8,
            Side::Black => (POINT_COUNT - point) as u8,
        })
    }

    /// The exact pip cost of bearing off from `point` (the distance from
    /// `point` to this side's off-edge).
    #[must_use]
    pub fn bear_off_distance(self, point: usize) -> u8 {
        debug_assert!(point < POINT_COUNT, "point out of range: {}", point);
        match self {
            Side::White => (POINT_COUNT - point) as u8,
            Side::Black => (point + 1) as u8,
        }
    }

    /// Standard starting layout: (point, checker count) for this side's
    /// 15 checkers, split 2/5/3/5 and mirrored between the sides.
    #[must_use]
    pub const fn starting_layout(self) -> [(usize, u8); 4] {
        match self {
            Side::White => [(0, 2), (11, 5), (16, 3), (18, 5)],
            Side::Black => [(23, 2), (12, 5), (7, 3), (5, 5)],
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// Per-side data storage with O(1) access.
///
/// Backed by a two-slot array, one entry per side. Index with a `Side`:
///
/// ```
/// use gammon::{Side, SideMap};
///
/// let mut bar: SideMap<u8> = SideMap::default();
/// bar[Side::Black] = 2;
/// assert_eq!(bar[Side::White], 0);
/// assert_eq!(bar[Side::Black], 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a new SideMap with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            data: [factory(Side::White), factory(Side::Black)],
        }
    }

    /// Create a new SideMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            data: [value.clone(), value],
        }
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        &self.data[side.index()]
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Iterate over (Side, &T) pairs, White first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::BOTH.iter().map(move |&s| (s, &self.data[s.index()]))
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}
