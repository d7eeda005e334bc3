//! Terrain-RGB elevation tiles.
//!
//! Terrain-RGB packs a fixed-point elevation into the three 8-bit
//! color channels of a 256×256 PNG:
//!
//! ```text
//! elevation = -10000 + (R * 65536 + G * 256 + B) * 0.1
//! ```
//!
//! # References
//!
//! 1. [Mapbox Terrain-RGB v1](https://docs.mapbox.com/data/tilesets/reference/mapbox-terrain-rgb-v1/)
//! 1. [Slippy map tilenames](https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames)

mod error;
pub mod mercator;

pub use crate::{
    error::RgbDemError,
    mercator::{meters_per_pixel, tile_to_lon_lat, RasterTile},
};
use std::path::Path;

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;

/// Finest supported zoom level.
pub const MAX_ZOOM: u8 = 15;

/// Width and height, in pixels, of every tile.
pub const TILE_SIZE: u32 = 256;

/// Number of samples in one tile.
pub const TILE_LEN: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Decodes one Terrain-RGB pixel to meters.
///
/// Evaluated in `f32` in the same order as the reference decoder so
/// results are bit-for-bit identical.
#[allow(clippy::cast_precision_loss)]
pub fn decode_terrain_rgb(r: u8, g: u8, b: u8) -> f32 {
    let packed = u32::from(r) * 65536 + u32::from(g) * 256 + u32::from(b);
    -10000.0_f32 + packed as f32 * 0.1_f32
}

/// A decoded 256×256 elevation raster.
///
/// Samples are row-major starting at the tile's top-left (northwest)
/// pixel.
#[derive(Clone, PartialEq)]
pub struct Tile {
    samples: Box<[f32]>,
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("min_elevation", &self.min_elevation())
            .field("max_elevation", &self.max_elevation())
            .finish()
    }
}

impl Tile {
    /// Returns a Tile decoded from the PNG (or any format `image`
    /// understands) at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RgbDemError> {
        let img = image::open(path)?.to_rgb8();
        Self::from_rgb(img.width(), img.height(), img.as_raw())
    }

    /// Returns a Tile decoded from in-memory encoded image bytes.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, RgbDemError> {
        let img = image::load_from_memory(bytes)?.to_rgb8();
        Self::from_rgb(img.width(), img.height(), img.as_raw())
    }

    /// Returns a Tile decoded from packed 8-bit RGB triplets.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self, RgbDemError> {
        if width != TILE_SIZE || height != TILE_SIZE || rgb.len() != TILE_LEN * 3 {
            return Err(RgbDemError::TileDims(width, height));
        }
        let samples = rgb
            .chunks_exact(3)
            .map(|px| decode_terrain_rgb(px[0], px[1], px[2]))
            .collect();
        Ok(Self { samples })
    }

    /// Returns a Tile taking ownership of already decoded samples.
    pub fn from_samples(samples: Vec<f32>) -> Result<Self, RgbDemError> {
        if samples.len() == TILE_LEN {
            Ok(Self {
                samples: samples.into_boxed_slice(),
            })
        } else {
            #[allow(clippy::cast_possible_truncation)]
            Err(RgbDemError::TileDims(samples.len() as u32, 1))
        }
    }

    /// Returns a Tile where every sample is `elevation`.
    pub fn constant(elevation: f32) -> Self {
        Self {
            samples: vec![elevation; TILE_LEN].into_boxed_slice(),
        }
    }

    /// Returns the sample at (`row`, `col`), if inside the tile.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        let size = TILE_SIZE as usize;
        if row < size && col < size {
            Some(self.samples[row * size + col])
        } else {
            None
        }
    }

    /// Returns one row of samples, west to east, if inside the tile.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        let size = TILE_SIZE as usize;
        self.samples.get(row * size..(row + 1) * size)
    }

    /// Returns all samples, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the lowest elevation sample in this tile.
    pub fn min_elevation(&self) -> f32 {
        self.samples.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Returns the highest elevation sample in this tile.
    pub fn max_elevation(&self) -> f32 {
        self.samples.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_terrain_rgb, RgbDemError, Tile, TILE_LEN, TILE_SIZE};

    #[test]
    fn test_decode_terrain_rgb() {
        assert_eq!(decode_terrain_rgb(0, 0, 0), -10000.0);
        // 0 m is packed as 100000 = 0x0186A0.
        assert_eq!(decode_terrain_rgb(0x01, 0x86, 0xA0), 0.0);
        // Bit exact with the f32 reference: 1000 m -> 110000 = 0x01ADB0.
        assert_eq!(
            decode_terrain_rgb(0x01, 0xAD, 0xB0).to_bits(),
            (-10000.0_f32 + 110_000.0_f32 * 0.1_f32).to_bits()
        );
        assert_eq!(
            decode_terrain_rgb(255, 255, 255).to_bits(),
            (-10000.0_f32 + 16_777_215.0_f32 * 0.1_f32).to_bits()
        );
    }

    #[test]
    fn test_from_rgb() {
        let mut rgb = vec![0_u8; TILE_LEN * 3];
        // Pixel (row 1, col 2) at 0 m.
        let idx = (TILE_SIZE as usize + 2) * 3;
        rgb[idx..idx + 3].copy_from_slice(&[0x01, 0x86, 0xA0]);
        let tile = Tile::from_rgb(TILE_SIZE, TILE_SIZE, &rgb).unwrap();
        assert_eq!(tile.get(1, 2), Some(0.0));
        assert_eq!(tile.get(0, 0), Some(-10000.0));
        assert_eq!(tile.get(256, 0), None);
        assert_eq!(tile.min_elevation(), -10000.0);
        assert_eq!(tile.max_elevation(), 0.0);
        assert_eq!(tile.row(1).map(|row| row[2]), Some(0.0));
        assert!(tile.row(256).is_none());
    }

    #[test]
    fn test_wrong_dims() {
        assert!(matches!(
            Tile::from_rgb(512, 512, &[0; 512 * 512 * 3]),
            Err(RgbDemError::TileDims(512, 512))
        ));
        assert!(Tile::from_samples(vec![0.0; 10]).is_err());
    }

    #[test]
    fn test_png_decode() {
        let img = image::RgbImage::from_pixel(TILE_SIZE, TILE_SIZE, image::Rgb([0x01, 0xAD, 0xB0]));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let tile = Tile::from_encoded(&png).unwrap();
        assert_eq!(tile.min_elevation(), tile.max_elevation());
        assert_eq!(tile.get(128, 128), Some(decode_terrain_rgb(0x01, 0xAD, 0xB0)));
    }
}
