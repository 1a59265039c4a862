//! Work Cursors
//!
//! A job is an ordered, lazily-advancing sequence of work unit ids.
//!
//! - [`VecCursor`]: explicit list of ids
//! - [`RangeCursor`]: frame indexes walked outward from a playhead

use std::collections::VecDeque;

/// Restartable sequence of work units making up one job
pub trait WorkCursor: Send {
    /// Work unit identifier
    type Id;

    /// Check if every unit has been handed out
    fn is_empty(&self) -> bool;

    /// Advance and return the next unit, or `None` when exhausted
    fn next_unit(&mut self) -> Option<Self::Id>;

    /// Drop every remaining unit
    fn clear(&mut self);
}

// =============================================================================
// VecCursor
// =============================================================================

/// Cursor over an explicit list of ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecCursor<T> {
    units: VecDeque<T>,
}

impl<T> Default for VecCursor<T> {
    fn default() -> Self {
        Self {
            units: VecDeque::new(),
        }
    }
}

impl<T> VecCursor<T> {
    /// Create a cursor over `units`, in order
    pub fn new(units: impl IntoIterator<Item = T>) -> Self {
        Self {
            units: units.into_iter().collect(),
        }
    }

    /// Number of units not yet handed out
    pub fn remaining(&self) -> usize {
        self.units.len()
    }

    /// Peek at the next unit
    pub fn peek(&self) -> Option<&T> {
        self.units.front()
    }
}

impl<T> From<Vec<T>> for VecCursor<T> {
    fn from(units: Vec<T>) -> Self {
        Self {
            units: units.into(),
        }
    }
}

impl<T> FromIterator<T> for VecCursor<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T: Send> WorkCursor for VecCursor<T> {
    type Id = T;

    fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn next_unit(&mut self) -> Option<T> {
        self.units.pop_front()
    }

    fn clear(&mut self) {
        self.units.clear();
    }
}

// =============================================================================
// RangeCursor
// =============================================================================

/// Order in which a [`RangeCursor`] walks away from its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// origin, origin+1, ... end-1
    #[default]
    Forward,
    /// origin, origin-1, ... start
    Reverse,
    /// origin, origin+1, origin-1, origin+2, origin-2, ...
    Balanced,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
            Direction::Balanced => write!(f, "balanced"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(Direction::Forward),
            "reverse" => Ok(Direction::Reverse),
            "balanced" => Ok(Direction::Balanced),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Lazily walks the frame indexes of `start..end` starting at an origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCursor {
    start: u64,
    end: u64,
    /// Next index going forward, valid while `< end`
    ahead: u64,
    /// One past the next index going backward, valid while `> start`
    behind: u64,
    direction: Direction,
    forward_turn: bool,
}

impl RangeCursor {
    /// Create a cursor over `start..end` beginning at `origin`.
    ///
    /// `origin` is clamped into the range. An empty range yields nothing.
    pub fn new(start: u64, end: u64, origin: u64, direction: Direction) -> Self {
        if start >= end {
            return Self {
                start,
                end,
                ahead: end,
                behind: start,
                direction,
                forward_turn: true,
            };
        }

        let origin = origin.clamp(start, end - 1);
        // Balanced hands out the origin from the backward side first
        let (ahead, behind, forward_turn) = match direction {
            Direction::Forward => (origin, start, true),
            Direction::Reverse => (end, origin + 1, false),
            Direction::Balanced => (origin + 1, origin + 1, false),
        };

        Self {
            start,
            end,
            ahead,
            behind,
            direction,
            forward_turn,
        }
    }

    /// Walk direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of units not yet handed out
    pub fn remaining(&self) -> u64 {
        (self.end - self.ahead.min(self.end)) + (self.behind.max(self.start) - self.start)
    }

    fn has_ahead(&self) -> bool {
        self.ahead < self.end
    }

    fn has_behind(&self) -> bool {
        self.behind > self.start
    }

    fn step_ahead(&mut self) -> u64 {
        self.ahead += 1;
        self.ahead - 1
    }

    fn step_behind(&mut self) -> u64 {
        self.behind -= 1;
        self.behind
    }
}

impl WorkCursor for RangeCursor {
    type Id = u64;

    fn is_empty(&self) -> bool {
        !self.has_ahead() && !self.has_behind()
    }

    fn next_unit(&mut self) -> Option<u64> {
        let go_ahead = match (self.has_ahead(), self.has_behind()) {
            (false, false) => return None,
            (true, false) => true,
            (false, true) => false,
            (true, true) => self.forward_turn,
        };

        let unit = if go_ahead {
            self.step_ahead()
        } else {
            self.step_behind()
        };
        if self.direction == Direction::Balanced {
            self.forward_turn = !go_ahead;
        }
        Some(unit)
    }

    fn clear(&mut self) {
        self.ahead = self.end;
        self.behind = self.start;
    }
}

impl Iterator for RangeCursor {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.next_unit()
    }
}

// =============================================================================
// Tests
// =============================================================================
