//! Nearest-neighbour lookups in the horizontal ENU plane.

use crate::{TerrainGrid, C};
use log::debug;
use rayon::prelude::*;
use rstar::{primitives::GeomWithData, RTree};

type IndexedPoint = GeomWithData<[C; 2], usize>;

/// An immutable R-tree over horizontal (east, north) positions that
/// answers "which input point is closest".
#[derive(Clone)]
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl std::fmt::Debug for PointIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointIndex")
            .field("len", &self.len())
            .finish()
    }
}

impl PointIndex {
    /// Bulk loads `points`; each keeps its position in the input as
    /// its index.
    pub fn new<I>(points: I) -> Self
    where
        I: IntoIterator<Item = [C; 2]>,
    {
        let entries: Vec<IndexedPoint> = points
            .into_iter()
            .enumerate()
            .map(|(idx, p)| GeomWithData::new(p, idx))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns the index of and planar distance to the point nearest
    /// `query`, or `None` if the index is empty.
    pub fn nearest(&self, query: [C; 2]) -> Option<(usize, C)> {
        self.tree.nearest_neighbor(&query).map(|hit| {
            let [e, n] = *hit.geom();
            (hit.data, (e - query[0]).hypot(n - query[1]))
        })
    }
}

/// Nearest-neighbour terrain elevation lookups.
///
/// Built once per grid; `Sync`, so queries may run from any thread.
#[derive(Debug, Clone)]
pub struct TerrainSampler {
    index: PointIndex,
    up: Vec<C>,
}

impl TerrainSampler {
    pub fn new(grid: &TerrainGrid) -> Self {
        let index = PointIndex::new(grid.east().iter().zip(grid.north()).map(|(&e, &n)| [e, n]));
        debug!("terrain sampler: indexed {} points", index.len());
        Self {
            index,
            up: grid.up().to_vec(),
        }
    }

    /// Elevation of the grid point nearest (`east`, `north`).
    pub fn sample(&self, east: C, north: C) -> Option<C> {
        self.index
            .nearest([east, north])
            .map(|(idx, _)| self.up[idx])
    }

    /// Samples each (`east[i]`, `north[i]`) pair in parallel,
    /// returning elevations in query order.
    ///
    /// Extra elements of the longer slice are ignored. An empty grid
    /// samples as 0 m.
    pub fn sample_at(&self, east: &[C], north: &[C]) -> Vec<C> {
        east.par_iter()
            .zip(north.par_iter())
            .map(|(&e, &n)| self.sample(e, n).unwrap_or(0.0))
            .collect()
    }
}
