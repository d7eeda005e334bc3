//! # Printable meshes
//!
//! `printmesh` turns [`terrain::TerrainGrid`]s and routes into closed,
//! outward-wound triangle meshes ready for slicing: a terrain slab
//! ([`TerrainMesh`]), a ribbon tracing the route ([`RouteRibbon`]),
//! and the finishing steps shared by both ([`scale_factor`],
//! [`simplify`], [`write_stl`]).

mod error;
mod finish;
mod mesh;
mod relief;
mod ribbon;
#[cfg(feature = "simplify")]
mod simplify;
mod stl;

pub use {
    crate::{
        error::MeshError,
        finish::{scale_factor, simplify},
        mesh::Mesh,
        relief::{Carve, TerrainMesh, TerrainMeshBuilder, DEFAULT_BASE_HEIGHT_M},
        ribbon::{
            RouteRibbon, RouteRibbonBuilder, DEFAULT_HEIGHT_RATIO, DEFAULT_THICKNESS_M,
            DEFAULT_WIDTH_M, MAX_SAMPLES,
        },
        stl::{save_stl, write_stl},
    },
    terrain,
};

pub use terrain::C;
