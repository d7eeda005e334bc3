use crate::{GeodeticPoint, TerrainError, TileGrid, C};
use geo::{
    algorithm::BoundingRect,
    geometry::{Coord, LineString, Rect},
};
use rgbdem::RasterTile;

/// Inward nudge applied to every edge before tiling (~0.1 mm).
const EDGE_EPS_DEG: C = 1e-9;

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox(Rect<C>);

impl BoundingBox {
    pub fn new(min_lon: C, min_lat: C, max_lon: C, max_lat: C) -> Self {
        Self(Rect::new(
            Coord {
                x: min_lon,
                y: min_lat,
            },
            Coord {
                x: max_lon,
                y: max_lat,
            },
        ))
    }

    /// Returns the smallest box containing every point, if any.
    pub fn from_points(points: &[GeodeticPoint]) -> Option<Self> {
        let line: LineString<C> = points.iter().map(|p| Coord::from(*p)).collect();
        line.bounding_rect().map(Self)
    }

    pub fn min_lon(&self) -> C {
        self.0.min().x
    }

    pub fn min_lat(&self) -> C {
        self.0.min().y
    }

    pub fn max_lon(&self) -> C {
        self.0.max().x
    }

    pub fn max_lat(&self) -> C {
        self.0.max().y
    }

    pub fn lon_span(&self) -> C {
        self.0.width()
    }

    pub fn lat_span(&self) -> C {
        self.0.height()
    }

    pub fn central_lat(&self) -> C {
        (self.min_lat() + self.max_lat()) / 2.0
    }

    /// Returns the tile rectangle covering this box at `zoom`.
    ///
    /// Every edge is nudged inward by [`EDGE_EPS_DEG`] first, so a box
    /// whose edges coincide with tile boundaries covers just the tiles
    /// inside it rather than also pulling in the neighboring
    /// rows/columns.
    ///
    /// Boxes crossing the antimeridian are not supported: the
    /// rectangle is taken between the min/max corner tiles, so such
    /// a box would span (almost) the whole world instead of wrapping.
    pub fn tile_grid(&self, zoom: u8) -> Result<TileGrid, TerrainError> {
        let west = (self.min_lon() + EDGE_EPS_DEG).min(self.max_lon());
        let north = (self.max_lat() - EDGE_EPS_DEG).max(self.min_lat());
        let nw = RasterTile::from_lon_lat(west, north, zoom)?;
        let east = (self.max_lon() - EDGE_EPS_DEG).max(self.min_lon());
        let south = (self.min_lat() + EDGE_EPS_DEG).min(self.max_lat());
        let se = RasterTile::from_lon_lat(east, south, zoom)?;
        TileGrid::between(nw, se)
    }

    /// Returns every tile needed to cover this box at `zoom`.
    pub fn tiles_to_cover(&self, zoom: u8) -> Result<Vec<RasterTile>, TerrainError> {
        Ok(self.tile_grid(zoom)?.tiles().collect())
    }
}
