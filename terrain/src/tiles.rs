//! Rectangular sets of same-zoom raster tiles.

use crate::TerrainError;
use rgbdem::{RasterTile, TILE_SIZE};
use std::collections::BTreeSet;

/// The inclusive tile-index rectangle spanned by a set of tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub zoom: u8,
    /// West-most tile column.
    pub min_x: u32,
    /// North-most tile row.
    pub min_y: u32,
    /// Number of tile columns.
    pub cols: u32,
    /// Number of tile rows.
    pub rows: u32,
}

impl TileGrid {
    /// Returns the rectangle between two corner tiles, in any order.
    pub fn between(a: RasterTile, b: RasterTile) -> Result<Self, TerrainError> {
        Self::from_tiles(&[a, b])
    }

    /// Returns the bounding rectangle of `tiles`.
    ///
    /// Fails if `tiles` is empty or mixes zoom levels.
    pub fn from_tiles(tiles: &[RasterTile]) -> Result<Self, TerrainError> {
        let first = tiles.first().ok_or(TerrainError::EmptyInput)?;
        let zooms: BTreeSet<u8> = tiles.iter().map(|t| t.zoom).collect();
        if zooms.len() > 1 {
            return Err(TerrainError::MixedZoom(zooms.into_iter().collect()));
        }
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for tile in tiles {
            min_x = min_x.min(tile.x);
            max_x = max_x.max(tile.x);
            min_y = min_y.min(tile.y);
            max_y = max_y.max(tile.y);
        }
        Ok(Self {
            zoom: first.zoom,
            min_x,
            min_y,
            cols: max_x - min_x + 1,
            rows: max_y - min_y + 1,
        })
    }

    /// Number of tiles in the rectangle.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Pixel (rows, cols) of a heightmap covering this rectangle.
    pub fn pixel_shape(&self) -> (usize, usize) {
        let size = TILE_SIZE as usize;
        (self.rows as usize * size, self.cols as usize * size)
    }

    /// Returns the (row, col) block of `tile` within the rectangle, or
    /// `None` if it lies outside or at a different zoom.
    pub fn block_of(&self, tile: &RasterTile) -> Option<(usize, usize)> {
        if tile.zoom != self.zoom
            || tile.x < self.min_x
            || tile.y < self.min_y
            || tile.x - self.min_x >= self.cols
            || tile.y - self.min_y >= self.rows
        {
            None
        } else {
            Some(((tile.y - self.min_y) as usize, (tile.x - self.min_x) as usize))
        }
    }

    /// Iterates every tile in the rectangle, column-major (west to
    /// east, north to south within a column).
    pub fn tiles(&self) -> impl Iterator<Item = RasterTile> + '_ {
        (self.min_x..self.min_x + self.cols).flat_map(move |x| {
            (self.min_y..self.min_y + self.rows).map(move |y| RasterTile {
                zoom: self.zoom,
                x,
                y,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{RasterTile, TerrainError, TileGrid};

    fn tile(zoom: u8, x: u32, y: u32) -> RasterTile {
        RasterTile { zoom, x, y }
    }

    #[test]
    fn test_from_tiles() {
        let grid = TileGrid::from_tiles(&[tile(4, 3, 9), tile(4, 5, 7), tile(4, 4, 8)]).unwrap();
        assert_eq!(
            grid,
            TileGrid {
                zoom: 4,
                min_x: 3,
                min_y: 7,
                cols: 3,
                rows: 3,
            }
        );
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.pixel_shape(), (768, 768));
        assert_eq!(grid.block_of(&tile(4, 5, 7)), Some((0, 2)));
        assert_eq!(grid.block_of(&tile(4, 6, 7)), None);
        assert_eq!(grid.block_of(&tile(5, 5, 7)), None);
    }

    #[test]
    fn test_between_any_order() {
        let a = TileGrid::between(tile(2, 2, 1), tile(2, 1, 2)).unwrap();
        let b = TileGrid::between(tile(2, 1, 2), tile(2, 2, 1)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tiles().count(), 4);
        assert_eq!(
            a.tiles().collect::<Vec<_>>(),
            vec![tile(2, 1, 1), tile(2, 1, 2), tile(2, 2, 1), tile(2, 2, 2)]
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            TileGrid::from_tiles(&[]),
            Err(TerrainError::EmptyInput)
        ));
        assert!(matches!(
            TileGrid::from_tiles(&[tile(3, 0, 0), tile(4, 0, 0)]),
            Err(TerrainError::MixedZoom(zooms)) if zooms == vec![3, 4]
        ));
    }
}
