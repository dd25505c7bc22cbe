use core::ops::{Index, IndexMut};
use ndarray::{Array3, ArrayView2, Axis};

use crate::*;

/// Dense 3D array of cubes with precomputed adjacency counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: Coord3,
    cubes: Array3<Cube>,
    mine_count: CellCount,
}

impl Grid {
    /// Builds a randomly mined grid, seeded from the wall clock.
    pub fn new(width: i64, height: i64, depth: i64, mines: i64) -> Result<Self> {
        let config = GameConfig::new(width, height, depth, mines)?;
        Ok(Self::generate(config, RandomLayoutGenerator::from_clock()))
    }

    pub fn generate(config: GameConfig, generator: impl LayoutGenerator) -> Self {
        Self::from_layout(generator.generate(config))
    }

    /// Creates every cube with its final mine flag and adjacency count, nothing is recomputed
    /// afterwards.
    pub fn from_layout(layout: MineLayout) -> Self {
        let size = layout.size();
        let cubes = Array3::from_shape_fn(size.to_nd_index(), |(x, y, z)| {
            // indices come from a shape built out of `Coord` values
            let coords = (x as Coord, y as Coord, z as Coord);
            Cube::new(
                coords,
                layout.contains_mine(coords),
                layout.adjacent_mine_count(coords),
            )
        });

        Self {
            size,
            cubes,
            mine_count: layout.mine_count(),
        }
    }

    pub fn size(&self) -> Coord3 {
        self.size
    }

    pub fn width(&self) -> Coord {
        self.size.0
    }

    pub fn height(&self) -> Coord {
        self.size.1
    }

    pub fn depth(&self) -> Coord {
        self.size.2
    }

    /// Number of mines actually placed.
    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cubes(&self) -> CellCount {
        volume(self.size)
    }

    pub fn safe_cubes(&self) -> CellCount {
        self.total_cubes() - self.mine_count
    }

    pub fn validate_coords(&self, coords: Coord3) -> Result<Coord3> {
        let size = self.size;
        if coords.0 < size.0 && coords.1 < size.1 && coords.2 < size.2 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoordinates)
        }
    }

    pub fn get_cube(&self, coords: Coord3) -> Result<&Cube> {
        let coords = self.validate_coords(coords)?;
        Ok(&self.cubes[coords.to_nd_index()])
    }

    pub(crate) fn get_cube_mut(&mut self, coords: Coord3) -> Result<&mut Cube> {
        let coords = self.validate_coords(coords)?;
        Ok(&mut self.cubes[coords.to_nd_index()])
    }

    /// Coordinates of the in-bounds neighbors, `coords` must already be valid.
    pub fn neighbors(&self, coords: Coord3) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }

    /// Cubes within Chebyshev distance one of `coords`, in no particular order.
    pub fn get_surrounding_cubes(&self, coords: Coord3) -> Result<impl Iterator<Item = &Cube>> {
        let coords = self.validate_coords(coords)?;
        Ok(self
            .neighbors(coords)
            .map(move |pos| &self.cubes[pos.to_nd_index()]))
    }

    pub fn surrounding_cubes_of(&self, cube: &Cube) -> Result<impl Iterator<Item = &Cube>> {
        let coords = self.position_of(cube)?;
        self.get_surrounding_cubes(coords)
    }

    /// Position of a cube owned by this grid, checked by identity rather than by value.
    pub fn position_of(&self, cube: &Cube) -> Result<Coord3> {
        let coords = cube.position();
        match self.get_cube(coords) {
            Ok(owned) if core::ptr::eq(owned, cube) => Ok(coords),
            _ => Err(GameError::CubeNotFound),
        }
    }

    /// Cross-section at depth `z`, indexed by `[x, y]`.
    pub fn get_layer(&self, z: Coord) -> Result<ArrayView2<'_, Cube>> {
        if z >= self.size.2 {
            return Err(GameError::InvalidCoordinates);
        }
        Ok(self.cubes.index_axis(Axis(2), z.into()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cube> {
        self.cubes.iter()
    }

    pub fn uncover(&mut self, coords: Coord3) -> Result<UncoverOutcome> {
        Ok(self.get_cube_mut(coords)?.uncover())
    }

    pub fn change_flag(&mut self, coords: Coord3) -> Result<FlagOutcome> {
        Ok(self.get_cube_mut(coords)?.change_flag())
    }

    pub fn flag(&mut self, coords: Coord3) -> Result<bool> {
        Ok(self.get_cube_mut(coords)?.flag())
    }

    pub fn unflag(&mut self, coords: Coord3) -> Result<bool> {
        Ok(self.get_cube_mut(coords)?.unflag())
    }
}

impl Index<Coord3> for Grid {
    type Output = Cube;

    fn index(&self, coords: Coord3) -> &Self::Output {
        &self.cubes[coords.to_nd_index()]
    }
}

impl IndexMut<Coord3> for Grid {
    fn index_mut(&mut self, coords: Coord3) -> &mut Self::Output {
        &mut self.cubes[coords.to_nd_index()]
    }
}
