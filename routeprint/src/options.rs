use clap::Parser;
use printmesh::{
    DEFAULT_BASE_HEIGHT_M, DEFAULT_HEIGHT_RATIO, DEFAULT_THICKNESS_M, DEFAULT_WIDTH_M,
};
use std::path::PathBuf;
use terrain::DEFAULT_MAX_TILES;

/// Turn a route and Terrain-RGB elevation tiles into two printable
/// STL meshes: a terrain slab and a ribbon tracing the route.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of Terrain-RGB tiles laid out as `<z>/<x>/<y>.png`.
    #[arg(short, long)]
    pub tile_dir: PathBuf,

    /// Longest side of the printed model, in millimeters.
    #[arg(short = 's', long, default_value_t = 100.0)]
    pub model_size: f64,

    /// Smallest printable feature, in millimeters.
    #[arg(short, long, default_value_t = 0.2)]
    pub resolution: f64,

    /// Tile zoom level; chosen from model size and resolution when
    /// absent.
    #[arg(short = 'z', long)]
    pub manual_zoom: Option<u8>,

    /// Most tiles the automatic zoom may request.
    #[arg(long, default_value_t = DEFAULT_MAX_TILES)]
    pub max_tiles: usize,

    /// Base thickness below the lowest terrain point, in meters.
    #[arg(long, default_value_t = DEFAULT_BASE_HEIGHT_M)]
    pub base_height: f64,

    /// Width of a corridor carved along the route, in meters.
    #[arg(long, requires = "carve_depth")]
    pub carve_width: Option<f64>,

    /// Depth of the carved corridor, in meters. Negative values raise
    /// a ridge.
    #[arg(long, requires = "carve_width", allow_negative_numbers = true)]
    pub carve_depth: Option<f64>,

    /// Route ribbon width, in meters.
    #[arg(long, default_value_t = DEFAULT_WIDTH_M)]
    pub ribbon_width: f64,

    /// Route ribbon height above terrain as a fraction of the base
    /// height.
    #[arg(long, default_value_t = DEFAULT_HEIGHT_RATIO)]
    pub ribbon_height_ratio: f64,

    /// Route ribbon thickness, in meters.
    #[arg(long, default_value_t = DEFAULT_THICKNESS_M)]
    pub ribbon_thickness: f64,

    /// Decimate meshes with more faces than this.
    #[arg(long)]
    pub simplify: Option<usize>,

    /// Largest terrain mesh grid dimension; the projected terrain is
    /// downsampled to fit.
    #[arg(long, default_value_t = 500)]
    pub mesh_max_dim: usize,

    /// Terrain mesh output.
    #[arg(long, default_value = "terrain_model.stl")]
    pub terrain_out: PathBuf,

    /// Route mesh output.
    #[arg(long, default_value = "route_model.stl")]
    pub route_out: PathBuf,

    /// Write a JSON summary of the run here.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Route as a JSON array of `[lat, lon, ele]` triples or
    /// `{"lat", "lon", "ele"}` objects.
    pub route: PathBuf,
}
