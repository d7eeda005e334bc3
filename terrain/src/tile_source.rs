//! Terrain-RGB tile providers.

use crate::TerrainError;
use dashmap::DashMap;
use log::{debug, info};
use rayon::prelude::*;
use rgbdem::{RasterTile, RgbDemError, Tile};
use std::{path::PathBuf, sync::Arc};

/// Something that can hand out decoded elevation tiles.
///
/// Providers are shared across the rayon pool during
/// [`fetch_tiles`], so they must be `Sync`.
pub trait TileProvider: Sync {
    fn fetch(&self, tile: &RasterTile) -> Result<Arc<Tile>, RgbDemError>;
}

/// Reads Terrain-RGB PNGs from a `<dir>/<z>/<x>/<y>.png` tree.
pub struct TileDir {
    /// Root of the tile tree.
    tile_dir: PathBuf,

    /// Tiles which have been decoded on demand.
    tiles: DashMap<RasterTile, Arc<Tile>>,
}

impl TileDir {
    pub fn new(tile_dir: PathBuf) -> Result<Self, TerrainError> {
        let mut has_zoom_dirs = false;

        // Fail early unless tile_dir has at least one `<z>`
        // subdirectory.
        for entry in std::fs::read_dir(&tile_dir)? {
            let entry = entry?;
            let is_zoom = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.parse::<u8>().is_ok());
            if is_zoom && entry.file_type()?.is_dir() {
                has_zoom_dirs = true;
                break;
            }
        }

        if has_zoom_dirs {
            Ok(Self {
                tile_dir,
                tiles: DashMap::new(),
            })
        } else {
            Err(TerrainError::Path(tile_dir))
        }
    }

    /// Number of tiles decoded so far.
    pub fn cached(&self) -> usize {
        self.tiles.len()
    }
}

impl TileProvider for TileDir {
    fn fetch(&self, tile: &RasterTile) -> Result<Arc<Tile>, RgbDemError> {
        self.tiles
            .entry(*tile)
            .or_try_insert_with(|| {
                let path = tile.path_in(&self.tile_dir);
                debug!("loading {}", path.display());
                Tile::load(path).map(Arc::new)
            })
            .map(|r| r.clone())
    }
}

/// Fetches and decodes every tile in `tiles` in parallel.
///
/// Returns tiles in the same order they were requested, failing on
/// the first provider error. `on_fetch` is called once per tile as it
/// completes, from whichever thread fetched it.
pub fn fetch_tiles<P, F>(
    provider: &P,
    tiles: &[RasterTile],
    on_fetch: F,
) -> Result<Vec<(RasterTile, Arc<Tile>)>, TerrainError>
where
    P: TileProvider + ?Sized,
    F: Fn(&RasterTile) + Sync,
{
    let fetched = tiles
        .par_iter()
        .map(|tile| {
            let data = provider
                .fetch(tile)
                .map_err(|source| TerrainError::TileFetch {
                    tile: *tile,
                    source,
                })?;
            on_fetch(tile);
            Ok((*tile, data))
        })
        .collect::<Result<Vec<_>, TerrainError>>()?;

    let (lo, hi) = fetched
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (_, t)| {
            (lo.min(t.min_elevation()), hi.max(t.max_elevation()))
        });
    info!("fetched {} tiles; elevation {lo:.1} m to {hi:.1} m", fetched.len());
    Ok(fetched)
}
