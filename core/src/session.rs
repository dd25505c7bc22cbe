use core::num::Saturating;
use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> Ongoing
/// - Ongoing -> Won
/// - Ongoing -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Initial state
    #[default]
    NotStarted,
    /// Game started, moves are accepted
    Ongoing,
    /// Game ended and player won
    Won,
    /// Game ended and player lost
    Lost,
}

impl GameStatus {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// What a front end should draw for a cube.
///
/// Mines only show up once the game is over.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TileView {
    Covered,
    Flagged,
    Uncovered(u8),
    /// Mine that was not flagged, or flagged automatically after a win
    Mine,
    /// The mine that ended the game
    Exploded,
    /// Flag placed on a safe cube
    IncorrectFlag,
}

/// Snapshot of a session for reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub config: GameConfig,
    pub status: GameStatus,
    pub cleared: CellCount,
    pub flagged: CellCount,
    pub elapsed_ms: Option<i64>,
}

/// Represents a game from start to finish
#[derive(Clone, Debug)]
pub struct Session {
    grid: Grid,
    status: GameStatus,
    cleared: Saturating<CellCount>,
    flagged: Saturating<CellCount>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    triggered_mine: Option<Coord3>,
}

impl Session {
    /// New randomly mined session, seeded from the wall clock.
    pub fn new(width: i64, height: i64, depth: i64, mines: i64) -> Result<Self> {
        Ok(Self::from_grid(Grid::new(width, height, depth, mines)?))
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_grid(Grid::generate(config, RandomLayoutGenerator::new(seed)))
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            status: GameStatus::NotStarted,
            cleared: Saturating(0),
            flagged: Saturating(0),
            started_at: None,
            ended_at: None,
            triggered_mine: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Safe cubes uncovered so far.
    pub fn cleared(&self) -> CellCount {
        self.cleared.0
    }

    pub fn flagged(&self) -> CellCount {
        self.flagged.0
    }

    pub fn mine_count(&self) -> CellCount {
        self.grid.mine_count()
    }

    pub fn total_cubes(&self) -> CellCount {
        self.grid.total_cubes()
    }

    pub fn safe_cubes(&self) -> CellCount {
        self.grid.safe_cubes()
    }

    /// How many mines have not been flagged yet, negative when there are more flags than mines
    pub fn mines_left(&self) -> i64 {
        // both are bounded by the cube count, which fits comfortably in i64
        self.grid.mine_count() as i64 - self.flagged.0 as i64
    }

    pub fn triggered_mine(&self) -> Option<Coord3> {
        self.triggered_mine
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Time since the game started, frozen once it ends, `None` if it hasn't started
    pub fn elapsed_time(&self) -> Option<TimeDelta> {
        let started_at = self.started_at?;
        Some(self.ended_at.unwrap_or_else(Utc::now) - started_at)
    }

    /// How many seconds have passed since game started, 0 if it hasn't started
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_time()
            .map(|elapsed| u32::try_from(elapsed.num_seconds().max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            config: GameConfig::new_unchecked(self.grid.size(), self.grid.mine_count()),
            status: self.status,
            cleared: self.cleared.0,
            flagged: self.flagged.0,
            elapsed_ms: self.elapsed_time().map(|elapsed| elapsed.num_milliseconds()),
        }
    }

    /// Starts the clock, returns false if the game was already started
    pub fn start_game(&mut self) -> bool {
        if !self.status.is_initial() {
            return false;
        }

        let now = Utc::now();
        log::debug!("started at {}", now);
        self.started_at = Some(now);
        self.status = GameStatus::Ongoing;
        true
    }

    pub fn uncover(&mut self, coords: Coord3) -> Result<UncoverOutcome> {
        use UncoverOutcome::*;

        self.check_not_finished()?;
        self.start_game();
        let coords = self.grid.validate_coords(coords)?;

        Ok(match self.grid[coords].uncover() {
            Mine => {
                log::debug!("Mine uncovered at {:?}", coords);
                self.triggered_mine = Some(coords);
                self.end_game(false);
                Mine
            }
            Clear => {
                self.cleared += 1;
                let mut outcome = Clear;

                if self.grid[coords].surrounding_mines() == 0 {
                    let cascaded = self.cascade(coords);
                    if cascaded > 0 {
                        outcome = ClearMultiple;
                    }
                    self.cleared += cascaded;
                }

                if self.cleared == Saturating(self.grid.safe_cubes()) {
                    self.end_game(true);
                }
                outcome
            }
            other => other,
        })
    }

    pub fn change_flag(&mut self, coords: Coord3) -> Result<FlagOutcome> {
        self.check_not_finished()?;
        self.start_game();
        let coords = self.grid.validate_coords(coords)?;

        let outcome = self.grid[coords].change_flag();
        match outcome {
            FlagOutcome::Flagged => self.flagged += 1,
            FlagOutcome::Unflagged => self.flagged -= 1,
            FlagOutcome::Uncovered => {}
        }
        Ok(outcome)
    }

    pub fn tile_at(&self, coords: Coord3) -> Result<TileView> {
        Ok(self.tile_view(self.grid.get_cube(coords)?))
    }

    /// Presentation snapshot of the depth slice `z`, indexed by `[x, y]`.
    pub fn layer_view(&self, z: Coord) -> Result<Array2<TileView>> {
        Ok(self.grid.get_layer(z)?.map(|cube| self.tile_view(cube)))
    }

    fn tile_view(&self, cube: &Cube) -> TileView {
        let finished = self.status.is_finished();
        match (cube.state(), cube.has_mine()) {
            (CubeState::Uncovered, true) => TileView::Exploded,
            (CubeState::Uncovered, false) => TileView::Uncovered(cube.surrounding_mines()),
            (CubeState::Flagged, false) if finished => TileView::IncorrectFlag,
            (CubeState::Flagged, _) => TileView::Flagged,
            (CubeState::Covered, true) if matches!(self.status, GameStatus::Won) => {
                TileView::Flagged
            }
            (CubeState::Covered, true) if finished => TileView::Mine,
            (CubeState::Covered, _) => TileView::Covered,
        }
    }

    /// Breadth-first reveal around a zero cube that was just uncovered, returns how many more cubes
    /// were uncovered.
    ///
    /// Only covered cubes get queued and each at most once, so every cube is visited at most once.
    fn cascade(&mut self, origin: Coord3) -> CellCount {
        let mut queued: Array3<bool> = Array3::default(self.grid.size().to_nd_index());
        let mut to_visit = VecDeque::new();
        queued[origin.to_nd_index()] = true;
        enqueue_covered_neighbors(&self.grid, origin, &mut queued, &mut to_visit);
        log::trace!(
            "Starting cascade from {:?}, initial neighbors: {:?}",
            origin,
            to_visit
        );

        let mut uncovered = 0;
        while let Some(visit_coords) = to_visit.pop_front() {
            let cube = &mut self.grid[visit_coords];
            // neighbors of a zero cube never hold mines
            let outcome = cube.uncover();
            debug_assert_eq!(outcome, UncoverOutcome::Clear);
            uncovered += 1;

            if cube.surrounding_mines() == 0 {
                enqueue_covered_neighbors(&self.grid, visit_coords, &mut queued, &mut to_visit);
            }
        }

        log::trace!("Cascade from {:?} uncovered {} cubes", origin, uncovered);
        uncovered
    }

    fn end_game(&mut self, won: bool) {
        if self.status.is_finished() {
            return;
        }

        self.status = if won {
            GameStatus::Won
        } else {
            GameStatus::Lost
        };
        let now = Utc::now();
        self.ended_at = Some(now);
        log::debug!("{:?} at {}", self.status, now);
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.status.is_finished() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }
}

fn enqueue_covered_neighbors(
    grid: &Grid,
    coords: Coord3,
    queued: &mut Array3<bool>,
    to_visit: &mut VecDeque<Coord3>,
) {
    for pos in grid.neighbors(coords) {
        let seen = &mut queued[pos.to_nd_index()];
        if !*seen && grid[pos].is_covered() {
            *seen = true;
            to_visit.push_back(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord3, mines: &[Coord3]) -> Session {
        Session::from_grid(Grid::from_layout(
            MineLayout::from_mine_coords(size, mines).unwrap(),
        ))
    }

    fn uncovered_in_grid(session: &Session) -> CellCount {
        session
            .grid()
            .iter()
            .filter(|cube| cube.state() == CubeState::Uncovered)
            .count() as CellCount
    }

    #[test]
    fn new_validates_arguments() {
        assert!(matches!(
            Session::new(1, 0, 1, 0),
            Err(GameError::InvalidDimensions)
        ));
        assert!(matches!(
            Session::new(1, 1, 1, -1),
            Err(GameError::InvalidMineCount)
        ));
    }

    #[test]
    fn single_empty_cube_wins_immediately() {
        let mut session = Session::new(1, 1, 1, 0).unwrap();

        assert_eq!(session.uncover((0, 0, 0)), Ok(UncoverOutcome::Clear));
        assert_eq!(session.cleared(), 1);
        assert_eq!(session.status(), GameStatus::Won);
        assert!(session.ended_at().is_some());
    }

    #[test]
    fn cascade_from_opposite_corner_clears_whole_layer() {
        let mut session = session((3, 3, 1), &[(2, 2, 0)]);

        let outcome = session.uncover((0, 0, 0)).unwrap();

        assert_eq!(outcome, UncoverOutcome::ClearMultiple);
        assert_eq!(session.cleared(), 8);
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.grid()[(1, 1, 0)].state(), CubeState::Uncovered);
        assert_eq!(session.grid()[(2, 2, 0)].state(), CubeState::Covered);
    }

    #[test]
    fn cascade_stops_at_numbered_and_flagged_cubes() {
        let mut session = session((5, 1, 1), &[(4, 0, 0)]);
        session.change_flag((2, 0, 0)).unwrap();

        let outcome = session.uncover((0, 0, 0)).unwrap();

        assert_eq!(outcome, UncoverOutcome::ClearMultiple);
        assert_eq!(session.cleared(), 2);
        assert_eq!(session.status(), GameStatus::Ongoing);
        assert_eq!(session.grid()[(2, 0, 0)].state(), CubeState::Flagged);
        assert_eq!(session.grid()[(3, 0, 0)].state(), CubeState::Covered);
    }

    #[test]
    fn numbered_cube_does_not_cascade() {
        let mut session = session((3, 3, 3), &[(0, 0, 0)]);

        assert_eq!(session.uncover((1, 1, 1)), Ok(UncoverOutcome::Clear));
        assert_eq!(session.cleared(), 1);
        assert_eq!(uncovered_in_grid(&session), 1);
    }

    #[test]
    fn cascade_visits_every_cube_once_on_empty_grid() {
        let mut session = session((10, 10, 10), &[]);

        let outcome = session.uncover((0, 0, 0)).unwrap();

        assert_eq!(outcome, UncoverOutcome::ClearMultiple);
        assert_eq!(session.cleared(), 1000);
        assert_eq!(uncovered_in_grid(&session), 1000);
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[test]
    fn cascade_spreads_across_layers() {
        // mine in a far corner, the rest of the 3D region is connected through zero cubes
        let mut session = session((4, 4, 4), &[(3, 3, 3)]);

        let outcome = session.uncover((0, 0, 0)).unwrap();

        assert_eq!(outcome, UncoverOutcome::ClearMultiple);
        assert_eq!(session.cleared(), 63);
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[test]
    fn flagged_cube_is_not_uncovered() {
        let mut session = session((2, 2, 1), &[(1, 1, 0)]);

        assert_eq!(session.change_flag((0, 0, 0)), Ok(FlagOutcome::Flagged));
        assert_eq!(session.uncover((0, 0, 0)), Ok(UncoverOutcome::Flag));
        assert_eq!(session.grid()[(0, 0, 0)].state(), CubeState::Flagged);
        assert_eq!(session.cleared(), 0);
        assert_eq!(session.flagged(), 1);
    }

    #[test]
    fn uncovering_twice_does_not_double_count() {
        let mut session = session((2, 2, 1), &[(1, 1, 0)]);

        assert_eq!(session.uncover((0, 0, 0)), Ok(UncoverOutcome::Clear));
        assert_eq!(session.uncover((0, 0, 0)), Ok(UncoverOutcome::Uncovered));
        assert_eq!(session.cleared(), 1);
    }

    #[test]
    fn flag_counter_follows_toggles() {
        let mut session = session((2, 2, 1), &[(1, 1, 0)]);

        assert_eq!(session.change_flag((1, 1, 0)), Ok(FlagOutcome::Flagged));
        assert_eq!(session.change_flag((0, 1, 0)), Ok(FlagOutcome::Flagged));
        assert_eq!(session.flagged(), 2);
        assert_eq!(session.mines_left(), -1);
        assert_eq!(session.change_flag((0, 1, 0)), Ok(FlagOutcome::Unflagged));
        assert_eq!(session.flagged(), 1);

        session.uncover((0, 0, 0)).unwrap();
        assert_eq!(session.change_flag((0, 0, 0)), Ok(FlagOutcome::Uncovered));
        assert_eq!(session.flagged(), 1);
        assert_eq!(session.mines_left(), 0);
    }

    #[test]
    fn flagging_starts_the_game() {
        let mut session = session((2, 2, 1), &[(1, 1, 0)]);

        session.change_flag((0, 0, 0)).unwrap();

        assert_eq!(session.status(), GameStatus::Ongoing);
        assert!(session.started_at().is_some());
    }

    #[test]
    fn start_game_only_fires_once() {
        let mut session = session((2, 2, 1), &[(1, 1, 0)]);

        assert!(session.start_game());
        let started_at = session.started_at();
        assert!(!session.start_game());
        assert_eq!(session.started_at(), started_at);
        assert_eq!(session.status(), GameStatus::Ongoing);
    }

    #[test]
    fn mine_loses_and_blocks_further_moves() {
        let mut session = session((3, 1, 1), &[(0, 0, 0)]);
        session.change_flag((2, 0, 0)).unwrap();

        assert_eq!(session.uncover((0, 0, 0)), Ok(UncoverOutcome::Mine));
        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.triggered_mine(), Some((0, 0, 0)));

        let ended_at = session.ended_at();
        assert_eq!(session.uncover((1, 0, 0)), Err(GameError::GameOver));
        assert_eq!(session.change_flag((2, 0, 0)), Err(GameError::GameOver));
        assert_eq!(session.uncover((9, 0, 0)), Err(GameError::GameOver));
        assert_eq!(session.cleared(), 0);
        assert_eq!(session.flagged(), 1);
        assert_eq!(session.ended_at(), ended_at);
        assert!(!session.start_game());
    }

    #[test]
    fn won_game_rejects_moves() {
        let mut session = session((2, 1, 1), &[(0, 0, 0)]);

        assert_eq!(session.uncover((1, 0, 0)), Ok(UncoverOutcome::Clear));
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.uncover((0, 0, 0)), Err(GameError::GameOver));
        assert_eq!(session.change_flag((0, 0, 0)), Err(GameError::GameOver));
        assert_eq!(session.cleared(), 1);
    }

    #[test]
    fn invalid_coordinates_still_start_the_game() {
        let mut session = session((2, 2, 2), &[]);

        assert_eq!(session.uncover((5, 0, 0)), Err(GameError::InvalidCoordinates));
        assert_eq!(session.status(), GameStatus::Ongoing);
        assert!(session.started_at().is_some());
        assert_eq!(session.cleared(), 0);

        let mut flagging = self::session((2, 2, 2), &[]);

        assert_eq!(flagging.change_flag((0, 0, 5)), Err(GameError::InvalidCoordinates));
        assert_eq!(flagging.status(), GameStatus::Ongoing);
        assert_eq!(flagging.flagged(), 0);
    }

    #[test]
    fn long_thin_grid_is_playable() {
        let mut session = Session::new(300, 1, 1, 0).unwrap();

        assert_eq!(session.uncover((0, 0, 0)), Ok(UncoverOutcome::ClearMultiple));
        assert_eq!(session.cleared(), 300);
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[test]
    fn win_is_declared_exactly_when_all_safe_cubes_are_cleared() {
        for seed in 0..6 {
            let config = GameConfig::new(4, 3, 3, 7).unwrap();
            let mut session = Session::with_seed(config, seed);
            let safe: Vec<_> = session
                .grid()
                .iter()
                .filter(|cube| !cube.has_mine())
                .map(Cube::position)
                .collect();

            for coords in safe {
                assert!(!session.is_finished());
                session.uncover(coords).unwrap();
                assert_eq!(session.cleared(), uncovered_in_grid(&session));
                assert_eq!(
                    session.status() == GameStatus::Won,
                    session.cleared() == session.safe_cubes()
                );
                if session.is_finished() {
                    break;
                }
            }

            assert_eq!(session.status(), GameStatus::Won);
            assert_eq!(session.cleared(), 4 * 3 * 3 - 7);
        }
    }

    #[test]
    fn elapsed_time_is_frozen_after_the_end() {
        let mut session = session((2, 1, 1), &[(0, 0, 0)]);
        assert_eq!(session.elapsed_time(), None);
        assert_eq!(session.elapsed_secs(), 0);

        session.start_game();
        assert!(session.elapsed_time().unwrap() >= TimeDelta::zero());

        session.uncover((1, 0, 0)).unwrap();
        let first = session.elapsed_time();
        std::thread::sleep(std::time::Duration::from_millis(5));

        assert!(first.is_some());
        assert_eq!(session.elapsed_time(), first);
    }

    #[test]
    fn layer_view_hides_mines_until_the_end() {
        let mut session = session((3, 1, 2), &[(0, 0, 0), (2, 0, 1)]);
        session.change_flag((2, 0, 0)).unwrap();
        session.uncover((1, 0, 1)).unwrap();

        let layer = session.layer_view(0).unwrap();
        assert_eq!(layer[(0, 0)], TileView::Covered);
        assert_eq!(layer[(2, 0)], TileView::Flagged);
        assert_eq!(session.tile_at((1, 0, 1)), Ok(TileView::Uncovered(2)));

        session.uncover((0, 0, 0)).unwrap();

        let layer = session.layer_view(0).unwrap();
        assert_eq!(layer[(0, 0)], TileView::Exploded);
        assert_eq!(layer[(2, 0)], TileView::IncorrectFlag);
        assert_eq!(session.tile_at((2, 0, 1)), Ok(TileView::Mine));
        assert!(session.layer_view(2).is_err());
    }

    #[test]
    fn layer_view_flags_remaining_mines_after_win() {
        let mut session = session((2, 1, 1), &[(0, 0, 0)]);

        session.uncover((1, 0, 0)).unwrap();

        assert_eq!(session.tile_at((0, 0, 0)), Ok(TileView::Flagged));
    }

    #[test]
    fn summary_serializes_counters() {
        let mut session = session((3, 3, 1), &[(2, 2, 0)]);
        session.uncover((0, 0, 0)).unwrap();

        let json = serde_json::to_value(session.summary()).unwrap();

        assert_eq!(json["status"], "Won");
        assert_eq!(json["cleared"], 8);
        assert_eq!(json["flagged"], 0);
        assert_eq!(json["config"]["mines"], 1);
        assert!(json["elapsed_ms"].is_i64());
    }
}
