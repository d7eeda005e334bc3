//! Heightmaps projected into local ENU space.

use crate::{GeodeticPoint, Heightmap, LocalOrigin, TerrainError, C};
use log::debug;
use rayon::prelude::*;
use rgbdem::{tile_to_lon_lat, TILE_SIZE};

/// Three co-indexed row-major arrays giving the ENU position of every
/// heightmap pixel.
///
/// Row 0 is the northern edge and column 0 the western edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    rows: usize,
    cols: usize,
    east: Vec<C>,
    north: Vec<C>,
    up: Vec<C>,
}

impl TerrainGrid {
    /// Returns a grid over existing arrays.
    pub fn new(
        rows: usize,
        cols: usize,
        east: Vec<C>,
        north: Vec<C>,
        up: Vec<C>,
    ) -> Result<Self, TerrainError> {
        let len = rows * cols;
        for arr in [&east, &north, &up] {
            if arr.len() != len {
                return Err(TerrainError::Shape(arr.len(), rows, cols));
            }
        }
        Ok(Self {
            rows,
            cols,
            east,
            north,
            up,
        })
    }

    /// Returns a grid whose cell (`row`, `col`) is `f(row, col)`.
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> [C; 3],
    {
        let len = rows * cols;
        let (mut east, mut north, mut up) = (
            Vec::with_capacity(len),
            Vec::with_capacity(len),
            Vec::with_capacity(len),
        );
        for row in 0..rows {
            for col in 0..cols {
                let [e, n, u] = f(row, col);
                east.push(e);
                north.push(n);
                up.push(u);
            }
        }
        Self {
            rows,
            cols,
            east,
            north,
            up,
        }
    }

    /// Projects every pixel of `heightmap` into `origin`'s ENU frame.
    ///
    /// Horizontal positions come from the pixel's Web-Mercator
    /// location; `up` is the raw heightmap elevation.
    pub fn project(heightmap: &Heightmap, origin: &LocalOrigin) -> Self {
        let (rows, cols) = heightmap.shape();
        let grid = heightmap.grid();
        let px = C::from(TILE_SIZE);
        let mut east = vec![0.0; rows * cols];
        let mut north = vec![0.0; rows * cols];

        east.par_chunks_mut(cols)
            .zip(north.par_chunks_mut(cols))
            .zip(heightmap.samples().par_chunks(cols))
            .enumerate()
            .for_each(|(row, ((east_row, north_row), elev_row))| {
                #[allow(clippy::cast_precision_loss)]
                let fy = C::from(grid.min_y) + row as C / px;
                for (col, elev) in elev_row.iter().enumerate() {
                    #[allow(clippy::cast_precision_loss)]
                    let fx = C::from(grid.min_x) + col as C / px;
                    let (lon, lat) = tile_to_lon_lat(fx, fy, grid.zoom);
                    let enu = origin.to_enu(&GeodeticPoint::new(lat, lon, C::from(*elev)));
                    east_row[col] = enu.east;
                    north_row[col] = enu.north;
                }
            });

        let up = heightmap.samples().iter().map(|&s| C::from(s)).collect();
        let projected = Self {
            rows,
            cols,
            east,
            north,
            up,
        };
        let [(e0, e1), (n0, n1), _] = projected.bounds();
        debug!("terrain grid: {rows}x{cols}; E [{e0:.1}, {e1:.1}], N [{n0:.1}, {n1:.1}]");
        projected
    }

    /// (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn east(&self) -> &[C] {
        &self.east
    }

    pub fn north(&self) -> &[C] {
        &self.north
    }

    pub fn up(&self) -> &[C] {
        &self.up
    }

    /// Returns the ENU position of cell (`row`, `col`).
    pub fn point(&self, row: usize, col: usize) -> [C; 3] {
        let idx = row * self.cols + col;
        [self.east[idx], self.north[idx], self.up[idx]]
    }

    /// Returns `[(min, max); 3]` for east, north and up.
    pub fn bounds(&self) -> [(C, C); 3] {
        [&self.east, &self.north, &self.up].map(|arr| {
            arr.iter()
                .fold((C::INFINITY, C::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        })
    }

    /// Returns every `step`-th row and column, where
    /// `step = max(1, max(rows, cols) / max_dim)`.
    pub fn downsample(&self, max_dim: usize) -> Self {
        let step = (self.rows.max(self.cols) / max_dim.max(1)).max(1);
        if step == 1 {
            return self.clone();
        }
        let rows = self.rows.div_ceil(step);
        let cols = self.cols.div_ceil(step);
        let pick = |arr: &[C]| -> Vec<C> {
            (0..self.rows)
                .step_by(step)
                .flat_map(|r| {
                    (0..self.cols)
                        .step_by(step)
                        .map(move |c| arr[r * self.cols + c])
                })
                .collect()
        };
        debug!(
            "terrain grid: downsampled {}x{} by {step} to {rows}x{cols}",
            self.rows, self.cols
        );
        Self {
            rows,
            cols,
            east: pick(&self.east),
            north: pick(&self.north),
            up: pick(&self.up),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TerrainError, TerrainGrid};
    use crate::{BoundingBox, GeodeticPoint, Heightmap, LocalOrigin};
    use approx::assert_abs_diff_eq;
    use rgbdem::{RasterTile, Tile};
    use std::sync::Arc;

    fn washington_heightmap() -> Heightmap {
        let tile = RasterTile::new(12, 1236, 1485).unwrap();
        Heightmap::assemble(&[(tile, Arc::new(Tile::constant(1000.0)))]).unwrap()
    }

    #[test]
    fn test_project() {
        let hm = washington_heightmap();
        let (west, _, _, north) = hm.grid().tiles().next().unwrap().bounds();
        let origin = LocalOrigin::new(GeodeticPoint::new(north, west, 1000.0));
        let grid = TerrainGrid::project(&hm, &origin);
        assert_eq!(grid.shape(), (256, 256));
        // The top-left pixel sits exactly on the origin.
        let [e, n, u] = grid.point(0, 0);
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(n, 0.0, epsilon = 1e-6);
        assert_eq!(u, 1000.0);
        // Columns run east, rows run south.
        assert!(grid.point(0, 255)[0] > grid.point(0, 0)[0]);
        assert!(grid.point(255, 0)[1] < grid.point(0, 0)[1]);
        // A z12 tile is ~9.78 km wide at the equator, ~7 km here.
        let width = grid.point(0, 255)[0] - grid.point(0, 0)[0];
        assert!(width > 6_500.0 && width < 7_500.0, "{width}");
        assert!(grid.up().iter().all(|&u| u == 1000.0));
    }

    #[test]
    fn test_project_matches_bbox_tiles() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let tiles: Vec<_> = bbox
            .tiles_to_cover(2)
            .unwrap()
            .into_iter()
            .map(|t| (t, Arc::new(Tile::constant(100.0))))
            .collect();
        let hm = Heightmap::assemble(&tiles).unwrap();
        let grid = TerrainGrid::project(&hm, &LocalOrigin::new(GeodeticPoint::new(0.0, 0.0, 0.0)));
        assert_eq!(grid.shape(), hm.shape());
        // Pixel (256, 256) is the tile corner at (0°, 0°).
        let [e, n, _] = grid.point(256, 256);
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(n, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bounds_and_downsample() {
        let grid = TerrainGrid::from_fn(1000, 600, |r, c| [c as f64, -(r as f64), (r + c) as f64]);
        let [(e0, e1), (n0, n1), (u0, u1)] = grid.bounds();
        assert_eq!((e0, e1), (0.0, 599.0));
        assert_eq!((n0, n1), (-999.0, 0.0));
        assert_eq!((u0, u1), (0.0, 1598.0));

        let small = grid.downsample(500);
        assert_eq!(small.shape(), (500, 300));
        assert_eq!(small.point(1, 1), [2.0, -2.0, 4.0]);
        assert_eq!(grid.downsample(1000), grid);
        assert_eq!(grid.downsample(333).shape(), (334, 200));
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(matches!(
            TerrainGrid::new(2, 2, vec![0.0; 4], vec![0.0; 4], vec![0.0; 3]),
            Err(TerrainError::Shape(3, 2, 2))
        ));
    }
}
