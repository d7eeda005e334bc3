use rgbdem::{RasterTile, RgbDemError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("no terrain tiles in {0}")]
    Path(PathBuf),

    #[error("{0}")]
    RgbDem(#[from] RgbDemError),

    #[error("heightmap assembly: no tiles given")]
    EmptyInput,

    #[error("heightmap assembly: tiles span zoom levels {0:?}, expected exactly one")]
    MixedZoom(Vec<u8>),

    #[error("fetching tile {}/{}/{}: {source}", .tile.zoom, .tile.x, .tile.y)]
    TileFetch {
        tile: RasterTile,
        source: RgbDemError,
    },

    #[error("route: need at least 2 track points, got {0}")]
    MissingTrackData(usize),

    #[error("terrain grid: {0} samples do not fill a {1}x{2} grid")]
    Shape(usize, usize, usize),
}
