//! Solid terrain slabs.

use crate::{mesh::positive, Mesh, MeshError, C};
use log::{debug, info};
use rayon::prelude::*;
use terrain::{PointIndex, RouteEnu, TerrainGrid};

/// Default depth of the base below the lowest terrain point (meters).
pub const DEFAULT_BASE_HEIGHT_M: C = 50.0;

/// A route corridor pressed into (or raised out of) the terrain
/// surface.
#[derive(Debug, Clone)]
pub struct Carve {
    route: PointIndex,
    width_m: C,
    depth_m: C,
}

impl Carve {
    /// Corridor of full width `width_m` around every route sample.
    /// Negative `depth_m` raises a ridge instead of cutting a trench.
    pub fn new(route: &RouteEnu, width_m: C, depth_m: C) -> Self {
        Self {
            route: PointIndex::new(route.horizontal()),
            width_m,
            depth_m,
        }
    }

    /// Returns a copy of `grid`'s elevations with the corridor applied.
    ///
    /// A cell at planar distance `d` from its nearest route sample is
    /// lowered by `depth * (1 - d / half_width)` when
    /// `d < half_width`. Rows are processed in parallel; the result
    /// does not depend on scheduling.
    pub fn apply(&self, grid: &TerrainGrid) -> Vec<C> {
        let (_, cols) = grid.shape();
        let half = self.width_m / 2.0;
        let mut up = grid.up().to_vec();
        if cols == 0 {
            return up;
        }
        up.par_chunks_mut(cols)
            .zip(grid.east().par_chunks(cols))
            .zip(grid.north().par_chunks(cols))
            .for_each(|((up_row, east_row), north_row)| {
                for ((u, &e), &n) in up_row.iter_mut().zip(east_row).zip(north_row) {
                    if let Some((_, d)) = self.route.nearest([e, n]) {
                        if d < half {
                            *u -= self.depth_m * (1.0 - d / half);
                        }
                    }
                }
            });
        up
    }
}

/// Builds a closed terrain solid from a [`TerrainGrid`].
#[derive(Debug, Clone)]
pub struct TerrainMesh;

impl TerrainMesh {
    pub fn builder() -> TerrainMeshBuilder {
        TerrainMeshBuilder {
            base_height_m: DEFAULT_BASE_HEIGHT_M,
            carve: None,
        }
    }
}

pub struct TerrainMeshBuilder {
    /// Thickness below the lowest terrain sample (meters, defaults to
    /// 50).
    base_height_m: C,

    /// Route corridor to apply to the surface (defaults to none).
    carve: Option<Carve>,
}

impl TerrainMeshBuilder {
    /// Thickness below the lowest terrain sample (meters, defaults to
    /// 50).
    #[must_use]
    pub fn base_height(mut self, meters: C) -> Self {
        self.base_height_m = meters;
        self
    }

    /// Route corridor to apply to the surface (defaults to none).
    #[must_use]
    pub fn carve(mut self, carve: Carve) -> Self {
        self.carve = Some(carve);
        self
    }

    /// Returns a watertight, outward-wound solid: the grid surface on
    /// top, a flat bottom at `min(up) - base_height`, and four side
    /// walls.
    ///
    /// The base height must be positive, or the bottom would touch or
    /// cross the surface.
    pub fn build(&self, grid: &TerrainGrid) -> Result<Mesh, MeshError> {
        let base_height_m = positive("base_height", self.base_height_m)?;
        let (rows, cols) = grid.shape();
        if rows < 2 || cols < 2 {
            return Err(MeshError::DegenerateGrid(rows, cols));
        }

        let up = match &self.carve {
            Some(carve) => carve.apply(grid),
            None => grid.up().to_vec(),
        };
        let min_up = up.iter().copied().fold(C::INFINITY, C::min);
        let base_z = min_up - base_height_m;

        let top_len = rows * cols;
        let mut vertices = Vec::with_capacity(2 * top_len);
        vertices.extend(
            grid.east()
                .iter()
                .zip(grid.north())
                .zip(&up)
                .map(|((&e, &n), &u)| [e, n, u]),
        );
        vertices.extend(
            grid.east()
                .iter()
                .zip(grid.north())
                .map(|(&e, &n)| [e, n, base_z]),
        );

        #[allow(clippy::cast_possible_truncation)]
        let (w, bottom) = (cols as u32, top_len as u32);
        #[allow(clippy::cast_possible_truncation)]
        let at = |row: usize, col: usize| (row * cols + col) as u32;

        let cells = (rows - 1) * (cols - 1);
        let walls = 2 * (rows - 1) + 2 * (cols - 1);
        let mut faces = Vec::with_capacity(4 * cells + 2 * walls);

        // Rows run south and columns east, so this winding faces up.
        for row in 0..rows - 1 {
            for col in 0..cols - 1 {
                let idx = at(row, col);
                faces.push([idx, idx + w, idx + 1]);
                faces.push([idx + 1, idx + w, idx + w + 1]);
            }
        }
        let top_faces = faces.len();
        for i in 0..top_faces {
            let [a, b, c] = faces[i];
            faces.push([c + bottom, b + bottom, a + bottom]);
        }

        // Each wall quad runs along a boundary edge p -> q, the
        // reverse of how the top surface traverses it.
        let mut wall = |p: u32, q: u32| {
            faces.push([p, q, q + bottom]);
            faces.push([p, q + bottom, p + bottom]);
        };
        for col in 0..cols - 1 {
            wall(at(0, col), at(0, col + 1));
            wall(at(rows - 1, col + 1), at(rows - 1, col));
        }
        for row in 0..rows - 1 {
            wall(at(row, cols - 1), at(row + 1, cols - 1));
            wall(at(row + 1, 0), at(row, 0));
        }

        let mut mesh = Mesh::new(vertices, faces);
        mesh.merge_vertices();
        info!(
            "terrain mesh: {} vertices, {} faces from {rows}x{cols} grid",
            mesh.vertices.len(),
            mesh.faces.len()
        );
        debug!("terrain mesh: base at {base_z:.1} m");
        Ok(mesh)
    }
}
