//! Stitching decoded tiles into one elevation raster.

use crate::{TerrainError, TileGrid};
use log::{debug, warn};
use rgbdem::{RasterTile, Tile, TILE_SIZE};
use std::sync::Arc;

/// A row-major `f32` elevation raster in meters.
///
/// Pixel (0, 0) is the top-left (northwest) pixel of the grid's
/// top-left tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    grid: TileGrid,
    samples: Vec<f32>,
}

impl Heightmap {
    /// Assembles same-zoom tiles into a single raster.
    ///
    /// Tiles are placed by index, so input order does not matter.
    /// Positions inside the covering rectangle with no tile stay at
    /// zero and are logged as a coverage gap.
    pub fn assemble(tiles: &[(RasterTile, Arc<Tile>)]) -> Result<Self, TerrainError> {
        let indices: Vec<RasterTile> = tiles.iter().map(|(t, _)| *t).collect();
        let grid = TileGrid::from_tiles(&indices)?;
        let (rows, cols) = grid.pixel_shape();
        let mut samples = vec![0.0_f32; rows * cols];
        let size = TILE_SIZE as usize;
        let mut filled = vec![false; grid.len()];

        for (tile, data) in tiles {
            // Every tile is inside the rectangle computed from them.
            let Some((block_row, block_col)) = grid.block_of(tile) else {
                continue;
            };
            filled[block_row * grid.cols as usize + block_col] = true;
            for (r, row) in data.samples().chunks_exact(size).enumerate() {
                let start = (block_row * size + r) * cols + block_col * size;
                samples[start..start + size].copy_from_slice(row);
            }
        }

        let gaps = filled.iter().filter(|f| !**f).count();
        if gaps > 0 {
            warn!(
                "heightmap: {gaps} of {} tiles missing, filled with 0 m",
                grid.len()
            );
        }
        debug!(
            "heightmap: {rows}x{cols} px from {} tiles at zoom {}",
            tiles.len(),
            grid.zoom
        );
        Ok(Self { grid, samples })
    }

    /// The tile rectangle this heightmap covers.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// (rows, cols) in pixels.
    pub fn shape(&self) -> (usize, usize) {
        self.grid.pixel_shape()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        let (rows, cols) = self.shape();
        if row < rows && col < cols {
            Some(self.samples[row * cols + col])
        } else {
            None
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns (min, max) elevation.
    pub fn elevation_range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Heightmap, TerrainError};
    use crate::BoundingBox;
    use rgbdem::{RasterTile, Tile, TILE_LEN, TILE_SIZE};
    use std::sync::Arc;

    #[test]
    fn test_constant_two_by_two() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let tiles: Vec<_> = bbox
            .tiles_to_cover(2)
            .unwrap()
            .into_iter()
            .map(|t| (t, Arc::new(Tile::constant(100.0))))
            .collect();
        let hm = Heightmap::assemble(&tiles).unwrap();
        assert_eq!(hm.shape(), (512, 512));
        assert!(hm.samples().iter().all(|&s| s == 100.0));
        assert_eq!(hm.elevation_range(), (100.0, 100.0));
    }

    #[test]
    fn test_block_placement() {
        let size = TILE_SIZE as usize;
        // Each tile's samples encode its own index so placement can be
        // checked pixel by pixel.
        let mk = |x: u32, y: u32| {
            let base = (x * 10 + y) as f32 * 1000.0;
            let samples = (0..TILE_LEN).map(|i| base + i as f32 * 0.001).collect();
            (
                RasterTile::new(5, x, y).unwrap(),
                Arc::new(Tile::from_samples(samples).unwrap()),
            )
        };
        // Deliberately out of order.
        let tiles = vec![mk(4, 8), mk(3, 7), mk(4, 7), mk(3, 8)];
        let hm = Heightmap::assemble(&tiles).unwrap();
        assert_eq!(hm.grid().min_x, 3);
        assert_eq!(hm.grid().min_y, 7);
        for (tile, data) in &tiles {
            let row0 = (tile.y - 7) as usize * size;
            let col0 = (tile.x - 3) as usize * size;
            for (r, c) in [(0, 0), (17, 200), (255, 255)] {
                assert_eq!(hm.get(row0 + r, col0 + c), data.get(r, c));
            }
        }
        assert_eq!(hm.get(512, 0), None);
    }

    #[test]
    fn test_gap_is_zero() {
        let tiles = vec![
            (RasterTile::new(4, 1, 1).unwrap(), Arc::new(Tile::constant(50.0))),
            (RasterTile::new(4, 2, 2).unwrap(), Arc::new(Tile::constant(50.0))),
        ];
        let hm = Heightmap::assemble(&tiles).unwrap();
        assert_eq!(hm.shape(), (512, 512));
        // Top-right block (x=2, y=1) was never supplied.
        assert_eq!(hm.get(10, 300), Some(0.0));
        assert_eq!(hm.get(300, 300), Some(50.0));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Heightmap::assemble(&[]),
            Err(TerrainError::EmptyInput)
        ));
        let tiles = vec![
            (RasterTile::new(4, 1, 1).unwrap(), Arc::new(Tile::constant(0.0))),
            (RasterTile::new(5, 1, 1).unwrap(), Arc::new(Tile::constant(0.0))),
        ];
        assert!(matches!(
            Heightmap::assemble(&tiles),
            Err(TerrainError::MixedZoom(_))
        ));
    }
}
