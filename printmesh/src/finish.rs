use crate::{Mesh, MeshError, C};
use log::info;

/// Factor that scales `mesh` (meters) so its longest side becomes
/// `target_mm / 1000` model units.
///
/// Compute it once from the terrain mesh and apply the same factor to
/// every mesh of the model so they stay registered.
pub fn scale_factor(mesh: &Mesh, target_mm: C) -> Result<C, MeshError> {
    let max_dim = mesh.max_dimension();
    if max_dim <= 0.0 {
        return Err(MeshError::DegenerateBounds);
    }
    let factor = target_mm / (max_dim * 1000.0);
    info!("scale: {max_dim:.1} m -> {target_mm} mm, factor {factor:e}");
    Ok(factor)
}

/// Reduces `mesh` to at most about `target_faces` faces.
///
/// Meshes already at or under the target are returned as is.
pub fn simplify(mesh: Mesh, target_faces: usize) -> Mesh {
    if mesh.faces.len() <= target_faces {
        return mesh;
    }
    decimate(mesh, target_faces)
}

#[cfg(feature = "simplify")]
fn decimate(mesh: Mesh, target_faces: usize) -> Mesh {
    let out = crate::simplify::decimate(&mesh, target_faces);
    info!(
        "simplify: {} -> {} faces",
        mesh.faces.len(),
        out.faces.len()
    );
    out
}

#[cfg(not(feature = "simplify"))]
fn decimate(mesh: Mesh, target_faces: usize) -> Mesh {
    log::warn!(
        "simplify: built without the `simplify` feature, keeping {} faces (target {target_faces})",
        mesh.faces.len()
    );
    mesh
}
