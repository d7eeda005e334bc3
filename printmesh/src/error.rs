use terrain::{TerrainError, C};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("terrain mesh: grid is {0}x{1}, need at least 2x2")]
    DegenerateGrid(usize, usize),

    #[error("route ribbon: {0} samples, need at least 2")]
    InsufficientPoints(usize),

    #[error("route ribbon: {0} route samples but {1} elevations")]
    Length(usize, usize),

    #[error("'{0}' must be a positive length, got {1} m")]
    NonPositive(&'static str, C),

    #[error("mesh finishing: bounding box has zero extent")]
    DegenerateBounds,

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Terrain(#[from] TerrainError),
}
