//! Terrain grids in a route-local East-North-Up frame.
//!
//! The pipeline in this crate runs: route → bounding box → zoom →
//! tiles → [`Heightmap`] → [`TerrainGrid`] → [`TerrainSampler`].

mod bbox;
mod error;
mod grid;
mod heightmap;
mod math;
mod route;
mod sampler;
mod tile_source;
mod tiles;
mod zoom;

pub use crate::{
    bbox::BoundingBox,
    error::TerrainError,
    grid::TerrainGrid,
    heightmap::Heightmap,
    math::{EnuPoint, GeodeticPoint, LocalOrigin},
    route::{Route, RouteEnu},
    sampler::{PointIndex, TerrainSampler},
    tile_source::{fetch_tiles, TileDir, TileProvider},
    tiles::TileGrid,
    zoom::{manual_zoom, ModelResolution, ZoomSelector, DEFAULT_MAX_TILES, FALLBACK_ZOOM},
};
pub use rgbdem::{self, RasterTile, Tile, C};
