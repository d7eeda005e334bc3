//! Raster detail level selection.

use crate::{BoundingBox, TerrainError, C};
use log::{debug, warn};
use rgbdem::{meters_per_pixel, RgbDemError, MAX_ZOOM};

/// Default upper bound on the number of tiles a run may fetch.
pub const DEFAULT_MAX_TILES: usize = 1000;

/// Zoom used when no level satisfies both the resolution and the
/// tile budget.
pub const FALLBACK_ZOOM: u8 = MAX_ZOOM;

/// Approximate meters per degree of latitude.
const M_PER_DEG_LAT: C = 111_320.0;

/// Ground distance represented by one print-resolution step of the
/// finished model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelResolution {
    pub meters: C,
}

impl ModelResolution {
    /// Scales `print_resolution_mm` by how much ground one millimeter
    /// of a `model_size_mm` print covers along the box's longest side.
    pub fn new(bbox: &BoundingBox, model_size_mm: C, print_resolution_mm: C) -> Self {
        let world_h = bbox.lat_span() * M_PER_DEG_LAT;
        let world_w = bbox.lon_span() * M_PER_DEG_LAT * bbox.central_lat().to_radians().cos();
        let world_to_model = world_h.max(world_w) / model_size_mm;
        Self {
            meters: print_resolution_mm * world_to_model,
        }
    }
}

/// Chooses the finest zoom whose pixels are at least as fine as a
/// required ground resolution without exceeding a tile budget.
#[derive(Debug, Clone, Copy)]
pub struct ZoomSelector {
    /// Maximum number of tiles to cover the bounding box.
    pub max_tiles: usize,
}

impl Default for ZoomSelector {
    fn default() -> Self {
        Self {
            max_tiles: DEFAULT_MAX_TILES,
        }
    }
}

impl ZoomSelector {
    pub fn new(max_tiles: usize) -> Self {
        Self { max_tiles }
    }

    /// Scans zoom 1 upward, stopping at the first level over budget,
    /// and returns the last level that met both constraints.
    ///
    /// Never fails; falls back to [`FALLBACK_ZOOM`] when no level
    /// qualified before the scan stopped.
    pub fn select(&self, bbox: &BoundingBox, resolution: ModelResolution) -> u8 {
        let mut best = None;
        for zoom in 1..=MAX_ZOOM {
            let mpp = meters_per_pixel(zoom, bbox.central_lat());
            let num_tiles = bbox.tile_grid(zoom).map_or(usize::MAX, |grid| grid.len());
            debug!("zoom {zoom}; m/px: {mpp:.3}, tiles: {num_tiles}");
            if num_tiles > self.max_tiles {
                break;
            }
            if mpp <= resolution.meters {
                best = Some(zoom);
            }
        }
        best.unwrap_or_else(|| {
            warn!(
                "no zoom reaches {:.3} m/px within {} tiles, falling back to zoom {FALLBACK_ZOOM}",
                resolution.meters, self.max_tiles
            );
            FALLBACK_ZOOM
        })
    }
}

/// Validates a user supplied zoom that bypasses [`ZoomSelector`].
pub fn manual_zoom(zoom: u8) -> Result<u8, TerrainError> {
    if zoom > MAX_ZOOM {
        Err(RgbDemError::InvalidZoom(zoom).into())
    } else {
        Ok(zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::{manual_zoom, BoundingBox, ModelResolution, ZoomSelector, FALLBACK_ZOOM};
    use approx::assert_relative_eq;
    use rgbdem::meters_per_pixel;

    fn washington() -> BoundingBox {
        BoundingBox::new(-71.33, 44.25, -71.29, 44.28)
    }

    #[test]
    fn test_model_resolution() {
        let bbox = washington();
        let res = ModelResolution::new(&bbox, 100.0, 0.2);
        let world_w = 0.04 * 111_320.0 * 44.265_f64.to_radians().cos();
        let world_h = 0.03 * 111_320.0;
        assert_relative_eq!(res.meters, 0.2 * world_w.max(world_h) / 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_select_finest_meeting_resolution() {
        let bbox = washington();
        let res = ModelResolution::new(&bbox, 100.0, 0.2);
        let zoom = ZoomSelector::default().select(&bbox, res);
        assert!(meters_per_pixel(zoom, bbox.central_lat()) <= res.meters);
        // One level coarser must not have satisfied the requirement,
        // since it is finer levels that are preferred.
        assert!(meters_per_pixel(zoom - 1, bbox.central_lat()) > res.meters || zoom == 1);
        assert!(bbox.tile_grid(zoom).unwrap().len() <= 1000);
    }

    #[test]
    fn test_budget_limits_zoom() {
        let bbox = washington();
        let res = ModelResolution { meters: 0.5 };
        let unconstrained = ZoomSelector::new(usize::MAX).select(&bbox, res);
        assert_eq!(unconstrained, 15);
        // With a budget of one tile the scan stops before reaching the
        // resolution, so it falls back.
        let tight = ZoomSelector::new(1).select(&bbox, res);
        assert_eq!(tight, FALLBACK_ZOOM);
    }

    #[test]
    fn test_coarse_requirement_returns_last_qualifying() {
        let bbox = washington();
        // Every zoom satisfies a 1 km requirement, so the finest in
        // budget wins.
        let zoom = ZoomSelector::new(4).select(&bbox, ModelResolution { meters: 1000.0 });
        assert!(bbox.tile_grid(zoom).unwrap().len() <= 4);
        assert!(zoom == 15 || bbox.tile_grid(zoom + 1).unwrap().len() > 4);
    }

    #[test]
    fn test_manual_zoom() {
        assert_eq!(manual_zoom(12).unwrap(), 12);
        assert!(manual_zoom(16).is_err());
    }
}
