use core::ops::Index;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

pub use cube::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use session::*;
pub use types::*;

mod cube;
mod error;
mod generator;
mod grid;
mod session;
mod types;

/// ndarray caps the element count of a single array at `isize::MAX`.
fn fits_in_array(size: Coord3) -> bool {
    usize::try_from(volume(size)).is_ok_and(|count| count <= isize::MAX as usize)
}

/// Size and mine count of a game.
///
/// The mine count is always the number of mines that will actually be placed, requests above the
/// grid capacity are clamped on construction. Deserialized configs go through the same validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    size: Coord3,
    mines: CellCount,
}

#[derive(Deserialize)]
struct RawGameConfig {
    size: (i64, i64, i64),
    mines: i64,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        let (width, height, depth) = raw.size;
        Self::new(width, height, depth, raw.mines)
    }
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord3, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(width: i64, height: i64, depth: i64, mines: i64) -> Result<Self> {
        let axis = |value: i64| match Coord::try_from(value) {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(GameError::InvalidDimensions),
        };
        let size = (axis(width)?, axis(height)?, axis(depth)?);

        if !fits_in_array(size) {
            return Err(GameError::InvalidDimensions);
        }

        if mines < 0 {
            return Err(GameError::InvalidMineCount);
        }

        let capacity = volume(size);
        let mines = match CellCount::try_from(mines) {
            Ok(mines) if mines <= capacity => mines,
            _ => {
                log::warn!(
                    "Requested {} mines but the grid only fits {}, clamping",
                    mines,
                    capacity
                );
                capacity
            }
        };

        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn size(&self) -> Coord3 {
        self.size
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cubes(&self) -> CellCount {
        volume(self.size)
    }

    pub const fn safe_cubes(&self) -> CellCount {
        self.total_cubes() - self.mines
    }
}

/// Where the mines are, before any game state is attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MineLayout {
    size: Coord3,
    mine_mask: Array3<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub(crate) fn from_parts(
        size: Coord3,
        mine_mask: Array3<bool>,
        mine_count: CellCount,
    ) -> Self {
        Self {
            size,
            mine_mask,
            mine_count,
        }
    }

    /// Builds a layout with mines at exactly the given coordinates, duplicates collapse into one
    /// mine.
    pub fn from_mine_coords(size: Coord3, mine_coords: &[Coord3]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 || size.2 == 0 || !fits_in_array(size) {
            return Err(GameError::InvalidDimensions);
        }

        let mut mine_mask: Array3<bool> = Array3::default(size.to_nd_index());
        let mut mine_count = 0;

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 || coords.2 >= size.2 {
                return Err(GameError::InvalidCoordinates);
            }
            let cell = &mut mine_mask[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                mine_count += 1;
            }
        }

        Ok(Self::from_parts(size, mine_mask, mine_count))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size, self.mine_count)
    }

    pub fn size(&self) -> Coord3 {
        self.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cubes(&self) -> CellCount {
        volume(self.size)
    }

    pub fn contains_mine(&self, coords: Coord3) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord3) -> u8 {
        // at most 26 neighbors
        self.neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn neighbors(&self, coords: Coord3) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }
}

impl Index<Coord3> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord3) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}
