//! Web-Mercator (EPSG:3857) slippy-map tile addressing.

use crate::{RgbDemError, C, MAX_ZOOM, TILE_SIZE};
use std::{
    f64::consts::PI,
    path::{Path, PathBuf},
};

/// A `zoom/x/y` raster tile index.
///
/// Tiles have value semantics: two tiles with equal fields are the
/// same tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RasterTile {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl RasterTile {
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, RgbDemError> {
        check_zoom(zoom)?;
        Ok(Self { zoom, x, y })
    }

    /// Returns the tile containing (`lon`, `lat`) at `zoom`.
    ///
    /// Latitudes are not clamped to the Mercator limit (±85.0511°);
    /// callers are expected to stay well inside it. Out of range
    /// indices saturate at the `u32` bounds.
    pub fn from_lon_lat(lon: C, lat: C, zoom: u8) -> Result<Self, RgbDemError> {
        check_zoom(zoom)?;
        let n = tiles_per_side(zoom);
        let x = ((lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - lat.to_radians().tan().asinh() / PI) / 2.0 * n).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self {
            zoom,
            x: x as u32,
            y: y as u32,
        })
    }

    /// Returns (west, south, east, north) in degrees.
    pub fn bounds(&self) -> (C, C, C, C) {
        let (west, north) = tile_to_lon_lat(C::from(self.x), C::from(self.y), self.zoom);
        let (east, south) =
            tile_to_lon_lat(C::from(self.x) + 1.0, C::from(self.y) + 1.0, self.zoom);
        (west, south, east, north)
    }

    /// Returns the tile's location under a `<z>/<x>/<y>.png` tree
    /// rooted at `dir`.
    pub fn path_in<P: AsRef<Path>>(&self, dir: P) -> PathBuf {
        dir.as_ref()
            .join(self.zoom.to_string())
            .join(self.x.to_string())
            .join(format!("{}.png", self.y))
    }

    /// Parses a tile index from the last three components of a
    /// `<z>/<x>/<y>.png` path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RgbDemError> {
        let path = path.as_ref();
        let mk_err = || RgbDemError::TilePath(path.to_owned());
        let y = path
            .file_stem()
            .and_then(std::ffi::OsStr::to_str)
            .ok_or_else(mk_err)?;
        let mut parents = path.ancestors().skip(1);
        let mut component = || {
            parents
                .next()
                .and_then(Path::file_name)
                .and_then(std::ffi::OsStr::to_str)
                .ok_or_else(mk_err)
        };
        let x = component()?;
        let zoom = component()?;
        let zoom = zoom.parse::<u8>().map_err(|_| mk_err())?;
        let x = x.parse::<u32>().map_err(|_| mk_err())?;
        let y = y.parse::<u32>().map_err(|_| mk_err())?;
        Self::new(zoom, x, y)
    }
}

/// Converts a fractional tile coordinate to (lon, lat) in degrees.
///
/// This is the inverse of [`RasterTile::from_lon_lat`] before
/// flooring, so `(x + col/256, y + row/256)` addresses a pixel's
/// top-left corner.
pub fn tile_to_lon_lat(fx: C, fy: C, zoom: u8) -> (C, C) {
    let n = tiles_per_side(zoom);
    let lon = fx / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * fy / n)).sinh().atan().to_degrees();
    (lon, lat)
}

/// Ground distance covered by one tile pixel at `lat` degrees.
pub fn meters_per_pixel(zoom: u8, lat: C) -> C {
    EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / (C::from(TILE_SIZE) * tiles_per_side(zoom))
}

/// Equatorial circumference used by the slippy-map resolution
/// formula.
pub const EARTH_CIRCUMFERENCE_M: C = 40_075_017.0;

fn tiles_per_side(zoom: u8) -> C {
    C::from(1_u32 << zoom)
}

fn check_zoom(zoom: u8) -> Result<(), RgbDemError> {
    if zoom > MAX_ZOOM {
        Err(RgbDemError::InvalidZoom(zoom))
    } else {
        Ok(())
    }
}
