use crate::{GameError, Result};

/// Single coordinate axis used for grid width, height, depth, and positions.
pub type Coord = u16;

/// Count type used for mine counts and total-cube counts.
pub type CellCount = u64;

/// Three-dimensional coordinates `(x, y, z)`.
pub type Coord3 = (Coord, Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord3 {
    type Output = [usize; 3];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into(), self.2.into()]
    }
}

/// Number of cubes in a grid of the given size, cannot overflow for `Coord = u16`.
pub const fn volume((x, y, z): Coord3) -> CellCount {
    (x as CellCount) * (y as CellCount) * (z as CellCount)
}

/// Converts raw signed input into coordinates.
///
/// This only checks that every component is representable, bounds against an actual grid are
/// checked by the grid.
pub fn coords_from_signed(x: i64, y: i64, z: i64) -> Result<Coord3> {
    let axis = |value: i64| Coord::try_from(value).map_err(|_| GameError::InvalidCoordinates);
    Ok((axis(x)?, axis(y)?, axis(z)?))
}

const NEIGHBOR_COUNT: usize = 26;

const DISPLACEMENTS: [(i8, i8, i8); NEIGHBOR_COUNT] = displacements();

/// Every offset in `{-1, 0, 1}^3` except the origin.
const fn displacements() -> [(i8, i8, i8); NEIGHBOR_COUNT] {
    let mut table = [(0, 0, 0); NEIGHBOR_COUNT];
    let mut i = 0;
    let mut dz = -1;
    while dz <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    table[i] = (dx, dy, dz);
                    i += 1;
                }
                dx += 1;
            }
            dy += 1;
        }
        dz += 1;
    }
    table
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord3, delta: (i8, i8, i8), bounds: Coord3) -> Option<Coord3> {
    let (x, y, z) = coords;
    let (dx, dy, dz) = delta;
    let (max_x, max_y, max_z) = bounds;

    let next_x = x.checked_add_signed(dx.into())?;
    if next_x >= max_x {
        return None;
    }

    let next_y = y.checked_add_signed(dy.into())?;
    if next_y >= max_y {
        return None;
    }

    let next_z = z.checked_add_signed(dz.into())?;
    if next_z >= max_z {
        return None;
    }

    Some((next_x, next_y, next_z))
}

/// Iterates the 3D Moore neighborhood of a cube, clipped to the grid bounds.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord3,
    bounds: Coord3,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord3, bounds: Coord3) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord3;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
