use chrono::Utc;

use super::*;

/// Purely random generation: samples uniform coordinates and rejects the ones that are already
/// taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomLayoutGenerator {
    seed: u64,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds from the wall clock, layouts are not reproducible.
    pub fn from_clock() -> Self {
        let now = Utc::now();
        let seed = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros());
        Self::new(seed as u64)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        let size = config.size();
        let total_cubes = config.total_cubes();
        let mines = config.mines().min(total_cubes);

        // optimize for full boards
        if mines == total_cubes {
            return MineLayout::from_parts(size, Array3::from_elem(size.to_nd_index(), true), mines);
        }

        // on dense boards sample the safe cubes instead, the distribution is the same
        let invert = mines > total_cubes / 2;
        let target = if invert { total_cubes - mines } else { mines };
        let mut mine_mask = Array3::from_elem(size.to_nd_index(), invert);

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed = 0;
        let mut collisions: u64 = 0;
        while placed < target {
            let coords = (
                rng.random_range(0..size.0),
                rng.random_range(0..size.1),
                rng.random_range(0..size.2),
            );
            let cell = &mut mine_mask[coords.to_nd_index()];
            if *cell != invert {
                collisions += 1;
                continue;
            }
            *cell = !invert;
            placed += 1;
        }

        log::trace!(
            "Placed {} mines in {:?} with seed {}, {} collisions",
            mines,
            size,
            self.seed,
            collisions
        );
        MineLayout::from_parts(size, mine_mask, mines)
    }
}
