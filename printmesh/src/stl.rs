//! Binary STL output.

use crate::{mesh::cross, Mesh, MeshError};
use byteorder::{LittleEndian as LE, WriteBytesExt};
use log::info;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

const HEADER: &[u8] = b"printmesh binary stl";

/// Writes `mesh` as binary STL: an 80-byte header, the triangle count,
/// then per triangle its unit normal, three vertices, and a zero
/// attribute word. Coordinates are narrowed to `f32`.
pub fn write_stl<W: Write>(mesh: &Mesh, mut out: W) -> Result<(), MeshError> {
    let mut header = [0_u8; 80];
    header[..HEADER.len()].copy_from_slice(HEADER);
    out.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    out.write_u32::<LE>(mesh.faces.len() as u32)?;
    for face in &mesh.faces {
        let [a, b, c] = (*face).map(|i| mesh.vertices[i as usize]);
        let normal = cross(
            [b[0] - a[0], b[1] - a[1], b[2] - a[2]],
            [c[0] - a[0], c[1] - a[1], c[2] - a[2]],
        );
        let len = normal.iter().map(|x| x * x).sum::<f64>().sqrt();
        let normal = if len > 0.0 {
            normal.map(|x| x / len)
        } else {
            [0.0; 3]
        };
        for v in [normal, a, b, c] {
            for x in v {
                #[allow(clippy::cast_possible_truncation)]
                out.write_f32::<LE>(x as f32)?;
            }
        }
        out.write_u16::<LE>(0)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `mesh` to a binary STL file at `path`.
pub fn save_stl(mesh: &Mesh, path: &Path) -> Result<(), MeshError> {
    let out = BufWriter::new(File::create(path)?);
    write_stl(mesh, out)?;
    info!(
        "wrote {} triangles to {}",
        mesh.faces.len(),
        path.display()
    );
    Ok(())
}
