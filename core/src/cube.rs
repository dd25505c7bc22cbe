use serde::{Deserialize, Serialize};

use crate::Coord3;

/// Player-visible state of a cube.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CubeState {
    #[default]
    Covered,
    Uncovered,
    Flagged,
}

/// Outcome of uncovering a cube.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UncoverOutcome {
    /// Uncovered a mine, the game is lost.
    Mine,
    /// Uncovered a single safe cube.
    Clear,
    /// Uncovered a safe cube with no adjacent mines and the cascade opened more cubes.
    ClearMultiple,
    /// Cube is flagged, nothing happened.
    Flag,
    /// Cube was already uncovered, nothing happened.
    Uncovered,
}

impl UncoverOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use UncoverOutcome::*;
        match self {
            Mine => true,
            Clear => true,
            ClearMultiple => true,
            Flag => false,
            Uncovered => false,
        }
    }
}

/// Outcome of toggling a flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagOutcome {
    Flagged,
    Unflagged,
    /// Cube was already uncovered and cannot be flagged.
    Uncovered,
}

impl FlagOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Uncovered)
    }
}

/// Base unit of the game, the 3D equivalent of a minesweeper tile.
///
/// Mine presence, adjacency count and position are fixed when the grid is built, only the state
/// changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cube {
    state: CubeState,
    has_mine: bool,
    surrounding_mines: u8,
    position: Coord3,
}

impl Cube {
    pub(crate) const fn new(position: Coord3, has_mine: bool, surrounding_mines: u8) -> Self {
        Self {
            state: CubeState::Covered,
            has_mine,
            surrounding_mines,
            position,
        }
    }

    pub const fn state(&self) -> CubeState {
        self.state
    }

    pub const fn has_mine(&self) -> bool {
        self.has_mine
    }

    pub const fn surrounding_mines(&self) -> u8 {
        self.surrounding_mines
    }

    pub const fn position(&self) -> Coord3 {
        self.position
    }

    pub const fn is_covered(&self) -> bool {
        matches!(self.state, CubeState::Covered)
    }

    /// Uncovers a covered cube, flagged and uncovered cubes are left untouched.
    pub fn uncover(&mut self) -> UncoverOutcome {
        use UncoverOutcome::*;
        match self.state {
            CubeState::Flagged => Flag,
            CubeState::Uncovered => Uncovered,
            CubeState::Covered => {
                self.state = CubeState::Uncovered;
                if self.has_mine { Mine } else { Clear }
            }
        }
    }

    /// Toggles between covered and flagged.
    pub fn change_flag(&mut self) -> FlagOutcome {
        match self.state {
            CubeState::Covered => {
                self.state = CubeState::Flagged;
                FlagOutcome::Flagged
            }
            CubeState::Flagged => {
                self.state = CubeState::Covered;
                FlagOutcome::Unflagged
            }
            CubeState::Uncovered => FlagOutcome::Uncovered,
        }
    }

    /// Flags a covered cube, returns whether anything changed.
    pub fn flag(&mut self) -> bool {
        if self.is_covered() {
            self.state = CubeState::Flagged;
            true
        } else {
            false
        }
    }

    /// Removes the flag of a flagged cube, returns whether anything changed.
    pub fn unflag(&mut self) -> bool {
        if matches!(self.state, CubeState::Flagged) {
            self.state = CubeState::Covered;
            true
        } else {
            false
        }
    }
}
