use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RgbDemError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("zoom {0} outside supported range 0..={max}", max = crate::MAX_ZOOM)]
    InvalidZoom(u8),

    #[error("invalid tile dimensions {0}x{1}, expected 256x256")]
    TileDims(u32, u32),

    #[error("invalid tile path {0}, expected <z>/<x>/<y>.png")]
    TilePath(PathBuf),
}
