use crate::{options::Cli, progress, route_file};
use anyhow::Result;
use log::info;
use printmesh::{save_stl, scale_factor, simplify, Carve, Mesh, RouteRibbon, TerrainMesh};
use serde::Serialize;
use std::{fs::File, io::BufWriter, path::PathBuf};
use terrain::{
    fetch_tiles, manual_zoom, Heightmap, ModelResolution, TerrainGrid, TerrainSampler, TileDir,
    TileProvider, ZoomSelector,
};

#[derive(Debug, Serialize)]
struct Summary {
    zoom: u8,
    tiles: usize,
    heightmap_shape: (usize, usize),
    mesh_grid_shape: (usize, usize),
    scale_factor: f64,
    terrain: MeshSummary,
    route: MeshSummary,
}

#[derive(Debug, Serialize)]
struct MeshSummary {
    path: PathBuf,
    vertices: usize,
    faces: usize,
    /// In scaled model units.
    volume: f64,
    watertight: bool,
}

impl MeshSummary {
    fn new(mesh: &Mesh, path: PathBuf) -> Self {
        Self {
            path,
            vertices: mesh.vertices.len(),
            faces: mesh.faces.len(),
            volume: mesh.volume(),
            watertight: mesh.is_watertight(),
        }
    }
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let provider = TileDir::new(self.tile_dir.clone())?;
        self.run_with(&provider)
    }

    fn run_with<P: TileProvider>(&self, provider: &P) -> Result<()> {
        let route = route_file::read(&self.route)?;
        let bbox = route.bounding_box();
        let zoom = match self.manual_zoom {
            Some(zoom) => manual_zoom(zoom)?,
            None => ZoomSelector::new(self.max_tiles).select(
                &bbox,
                ModelResolution::new(&bbox, self.model_size, self.resolution),
            ),
        };
        let tiles = bbox.tiles_to_cover(zoom)?;
        info!("{} route points, zoom {zoom}, {} tiles", route.len(), tiles.len());

        let pb = progress::bar(format!("Loading {} tiles", tiles.len()), tiles.len() as u64)?;
        let fetched = fetch_tiles(provider, &tiles, |_| pb.inc(1))?;
        pb.finish_and_clear();
        let heightmap = Heightmap::assemble(&fetched)?;

        let origin = route.origin();
        let route_enu = route.to_enu(&origin);
        let grid = TerrainGrid::project(&heightmap, &origin);
        let route_ground = TerrainSampler::new(&grid).sample_at(&route_enu.east, &route_enu.north);

        let mesh_grid = grid.downsample(self.mesh_max_dim);
        let mut terrain_builder = TerrainMesh::builder().base_height(self.base_height);
        if let (Some(width), Some(depth)) = (self.carve_width, self.carve_depth) {
            terrain_builder = terrain_builder.carve(Carve::new(&route_enu, width, depth));
        }
        let mut terrain_mesh = terrain_builder.build(&mesh_grid)?;
        let mut route_mesh = RouteRibbon::builder()
            .width(self.ribbon_width)
            .height_ratio(self.base_height, self.ribbon_height_ratio)
            .thickness(self.ribbon_thickness)
            .build(&route_enu, &route_ground)?;

        if let Some(target) = self.simplify {
            terrain_mesh = simplify(terrain_mesh, target);
            route_mesh = simplify(route_mesh, target);
        }

        // One factor for both so the ribbon stays registered on the
        // terrain.
        let factor = scale_factor(&terrain_mesh, self.model_size)?;
        terrain_mesh.scale(factor);
        route_mesh.scale(factor);

        save_stl(&terrain_mesh, &self.terrain_out)?;
        save_stl(&route_mesh, &self.route_out)?;

        if let Some(path) = &self.summary {
            let summary = Summary {
                zoom,
                tiles: tiles.len(),
                heightmap_shape: heightmap.shape(),
                mesh_grid_shape: mesh_grid.shape(),
                scale_factor: factor,
                terrain: MeshSummary::new(&terrain_mesh, self.terrain_out.clone()),
                route: MeshSummary::new(&route_mesh, self.route_out.clone()),
            };
            serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &summary)?;
            info!("wrote summary to {}", path.display());
        }
        Ok(())
    }
}
