//! Indexed triangle meshes.

use crate::{MeshError, C};
use log::debug;
use std::collections::HashMap;

/// An indexed triangle mesh.
///
/// Faces wind counter-clockwise when seen from outside, so normals
/// computed with the right-hand rule point outward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[C; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<[C; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Returns the (min, max) corners of the axis-aligned bounding box,
    /// or `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<([C; 3], [C; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (
                [lo[0].min(v[0]), lo[1].min(v[1]), lo[2].min(v[2])],
                [hi[0].max(v[0]), hi[1].max(v[1]), hi[2].max(v[2])],
            )
        }))
    }

    /// Size of the bounding box along its longest axis.
    pub fn max_dimension(&self) -> C {
        self.bounds().map_or(0.0, |(lo, hi)| {
            (hi[0] - lo[0]).max(hi[1] - lo[1]).max(hi[2] - lo[2])
        })
    }

    /// Multiplies every coordinate by `factor`.
    pub fn scale(&mut self, factor: C) {
        for v in &mut self.vertices {
            for c in v.iter_mut() {
                *c *= factor;
            }
        }
    }

    /// Collapses vertices with identical coordinates into one and
    /// drops faces left with a repeated corner.
    ///
    /// Surviving vertices keep their first-seen order.
    pub fn merge_vertices(&mut self) {
        // -0.0 and 0.0 must hash the same.
        let key = |v: &[C; 3]| (*v).map(|c| if c == 0.0 { 0_u64 } else { c.to_bits() });

        let mut seen: HashMap<[u64; 3], u32> = HashMap::with_capacity(self.vertices.len());
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut merged = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            #[allow(clippy::cast_possible_truncation)]
            let idx = *seen.entry(key(v)).or_insert_with(|| {
                merged.push(*v);
                (merged.len() - 1) as u32
            });
            remap.push(idx);
        }

        let before = (self.vertices.len(), self.faces.len());
        self.faces = self
            .faces
            .iter()
            .map(|f| (*f).map(|i| remap[i as usize]))
            .filter(|[a, b, c]| a != b && b != c && a != c)
            .collect();
        self.vertices = merged;
        debug!(
            "merge vertices: {} -> {} vertices, {} -> {} faces",
            before.0,
            self.vertices.len(),
            before.1,
            self.faces.len()
        );
    }

    /// Unnormalized normal of face `idx` (twice its area in length).
    pub fn face_normal(&self, idx: usize) -> [C; 3] {
        let [a, b, c] = self.faces[idx].map(|i| self.vertices[i as usize]);
        cross(sub(b, a), sub(c, a))
    }

    /// Signed enclosed volume; positive for a closed mesh with outward
    /// facing normals.
    pub fn volume(&self) -> C {
        self.faces
            .iter()
            .map(|f| {
                let [a, b, c] = (*f).map(|i| self.vertices[i as usize]);
                dot(a, cross(b, c))
            })
            .sum::<C>()
            / 6.0
    }

    /// Number of faces using each undirected edge.
    pub fn edge_use(&self) -> HashMap<(u32, u32), usize> {
        let mut uses = HashMap::with_capacity(self.faces.len() * 3 / 2);
        for [a, b, c] in &self.faces {
            for (p, q) in [(*a, *b), (*b, *c), (*c, *a)] {
                *uses.entry((p.min(q), p.max(q))).or_insert(0) += 1;
            }
        }
        uses
    }

    /// True when every edge is shared by exactly two faces.
    pub fn is_watertight(&self) -> bool {
        !self.faces.is_empty() && self.edge_use().values().all(|&n| n == 2)
    }

    /// True when no directed edge appears twice, meaning adjacent
    /// faces traverse their shared edge in opposite directions.
    pub fn is_winding_consistent(&self) -> bool {
        let mut directed = HashMap::with_capacity(self.faces.len() * 3);
        self.faces.iter().all(|[a, b, c]| {
            [(*a, *b), (*b, *c), (*c, *a)]
                .into_iter()
                .all(|edge| directed.insert(edge, ()).is_none())
        })
    }
}

/// Returns `meters` if it is a finite length greater than zero.
pub(crate) fn positive(name: &'static str, meters: C) -> Result<C, MeshError> {
    if meters.is_finite() && meters > 0.0 {
        Ok(meters)
    } else {
        Err(MeshError::NonPositive(name, meters))
    }
}

pub(crate) fn sub(a: [C; 3], b: [C; 3]) -> [C; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot(a: [C; 3], b: [C; 3]) -> C {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: [C; 3], b: [C; 3]) -> [C; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
