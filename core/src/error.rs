use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Width, height and depth must be at least 1")]
    InvalidDimensions,
    #[error("Mine count cannot be negative")]
    InvalidMineCount,
    #[error("Invalid coordinates")]
    InvalidCoordinates,
    #[error("Game already ended, no new moves are accepted")]
    GameOver,
    /// Only reachable when a cube is looked up in a grid it does not belong to.
    #[error("Cube does not belong to this grid")]
    CubeNotFound,
}

pub type Result<T> = core::result::Result<T, GameError>;
