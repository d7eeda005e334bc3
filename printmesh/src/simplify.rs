//! Quadric error metric edge-collapse decimation.
//!
//! Each vertex accumulates the planes of its incident faces as a 4x4
//! quadric. Edges are collapsed cheapest first from a min-heap whose
//! entries are invalidated lazily through per-vertex version stamps.
//! A collapse is refused when it would break the 2-manifold link
//! condition, flip or flatten a neighboring face, or touch a border
//! edge, so closed meshes stay closed and consistently wound.
//!
//! # References
//!
//! 1. Garland & Heckbert, *Surface Simplification Using Quadric Error
//!    Metrics*, SIGGRAPH 1997.
//! 1. Dey et al., *Topology Preserving Edge Contraction*, 1999.

use crate::{
    mesh::{cross, dot, sub},
    Mesh, C,
};
use log::debug;
use std::{
    cmp::Ordering,
    collections::{BTreeSet, BinaryHeap, HashSet},
};

/// Symmetric 4x4 error quadric; upper triangle, row-major.
#[derive(Debug, Clone, Copy, Default)]
struct Quadric([C; 10]);

impl Quadric {
    /// Quadric of the plane `n·p + d = 0` for unit `n`.
    fn plane([a, b, c]: [C; 3], d: C) -> Self {
        Self([
            a * a,
            a * b,
            a * c,
            a * d,
            b * b,
            b * c,
            b * d,
            c * c,
            c * d,
            d * d,
        ])
    }

    fn add(&self, other: &Self) -> Self {
        let mut sum = self.0;
        for (s, o) in sum.iter_mut().zip(other.0) {
            *s += o;
        }
        Self(sum)
    }

    /// Sum of squared distances from `p` to the accumulated planes.
    fn error(&self, [x, y, z]: [C; 3]) -> C {
        let q = &self.0;
        q[0] * x * x
            + 2.0 * q[1] * x * y
            + 2.0 * q[2] * x * z
            + 2.0 * q[3] * x
            + q[4] * y * y
            + 2.0 * q[5] * y * z
            + 2.0 * q[6] * y
            + q[7] * z * z
            + 2.0 * q[8] * z
            + q[9]
    }

    /// Point minimizing [`Self::error`], if the system is not
    /// (nearly) singular.
    fn optimum(&self) -> Option<[C; 3]> {
        let q = &self.0;
        let m = [[q[0], q[1], q[2]], [q[1], q[4], q[5]], [q[2], q[5], q[7]]];
        let rhs = [-q[3], -q[6], -q[8]];
        let det = det3(m);
        if det.abs() < 1e-10 {
            return None;
        }
        // Cramer's rule.
        let mut p = [0.0; 3];
        for (col, out) in p.iter_mut().enumerate() {
            let mut mc = m;
            for row in 0..3 {
                mc[row][col] = rhs[row];
            }
            *out = det3(mc) / det;
        }
        Some(p)
    }
}

fn det3(m: [[C; 3]; 3]) -> C {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[derive(Debug, Clone)]
struct Candidate {
    cost: C,
    keep: u32,
    drop: u32,
    /// Vertex versions when this candidate was computed.
    stamp: (u32, u32),
    target: [C; 3],
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and cheapest goes first.
        other.cost.total_cmp(&self.cost)
    }
}

struct Decimator {
    positions: Vec<[C; 3]>,
    quadrics: Vec<Quadric>,
    faces: Vec<[u32; 3]>,
    face_live: Vec<bool>,
    vertex_faces: Vec<Vec<usize>>,
    vertex_live: Vec<bool>,
    version: Vec<u32>,
    heap: BinaryHeap<Candidate>,
    live_faces: usize,
}

impl Decimator {
    fn new(mesh: &Mesh) -> Self {
        let n = mesh.vertices.len();
        let mut quadrics = vec![Quadric::default(); n];
        let mut vertex_faces = vec![Vec::new(); n];
        for (fi, face) in mesh.faces.iter().enumerate() {
            let [a, b, c] = (*face).map(|i| mesh.vertices[i as usize]);
            let normal = cross(sub(b, a), sub(c, a));
            let len = dot(normal, normal).sqrt();
            if len > 0.0 {
                let unit = normal.map(|x| x / len);
                let q = Quadric::plane(unit, -dot(unit, a));
                for &v in face {
                    quadrics[v as usize] = quadrics[v as usize].add(&q);
                }
            }
            for &v in face {
                vertex_faces[v as usize].push(fi);
            }
        }
        Self {
            positions: mesh.vertices.clone(),
            quadrics,
            faces: mesh.faces.clone(),
            face_live: vec![true; mesh.faces.len()],
            vertex_faces,
            vertex_live: vec![true; n],
            version: vec![0; n],
            heap: BinaryHeap::new(),
            live_faces: mesh.faces.len(),
        }
    }

    fn live_faces_of(&self, v: u32) -> impl Iterator<Item = usize> + '_ {
        self.vertex_faces[v as usize]
            .iter()
            .copied()
            .filter(|&fi| self.face_live[fi])
    }

    fn neighbors(&self, v: u32) -> HashSet<u32> {
        self.live_faces_of(v)
            .flat_map(|fi| self.faces[fi])
            .filter(|&u| u != v)
            .collect()
    }

    fn candidate(&self, a: u32, b: u32) -> Candidate {
        let (pa, pb) = (self.positions[a as usize], self.positions[b as usize]);
        let q = self.quadrics[a as usize].add(&self.quadrics[b as usize]);
        let mid = [
            (pa[0] + pb[0]) / 2.0,
            (pa[1] + pb[1]) / 2.0,
            (pa[2] + pb[2]) / 2.0,
        ];
        let span = dot(sub(pb, pa), sub(pb, pa));
        // A nearly singular quadric can put the optimum far off the
        // surface; only trust it close to the edge.
        let optimum = q.optimum().filter(|p| {
            let off = sub(*p, mid);
            dot(off, off) <= 4.0 * span
        });
        let target = optimum.unwrap_or_else(|| {
            [pa, pb, mid]
                .into_iter()
                .min_by(|x, y| q.error(*x).total_cmp(&q.error(*y)))
                .unwrap_or(mid)
        });
        Candidate {
            cost: q.error(target).max(0.0),
            keep: a,
            drop: b,
            stamp: (self.version[a as usize], self.version[b as usize]),
            target,
        }
    }

    fn seed(&mut self) {
        // Ordered so ties collapse the same way on every run.
        let mut edges = BTreeSet::new();
        for [a, b, c] in &self.faces {
            for (p, q) in [(*a, *b), (*b, *c), (*c, *a)] {
                edges.insert((p.min(q), p.max(q)));
            }
        }
        for (a, b) in edges {
            let candidate = self.candidate(a, b);
            self.heap.push(candidate);
        }
    }

    fn is_stale(&self, c: &Candidate) -> bool {
        let (k, d) = (c.keep as usize, c.drop as usize);
        !self.vertex_live[k]
            || !self.vertex_live[d]
            || self.version[k] != c.stamp.0
            || self.version[d] != c.stamp.1
    }

    fn can_collapse(&self, c: &Candidate) -> bool {
        let (a, b) = (c.keep, c.drop);
        let shared: Vec<usize> = self
            .live_faces_of(a)
            .filter(|&fi| self.faces[fi].contains(&b))
            .collect();
        // Border and non-manifold edges stay.
        if shared.len() != 2 {
            return false;
        }

        // Link condition: the only common neighbors are the two
        // vertices opposite the edge.
        let common = self.neighbors(a).intersection(&self.neighbors(b)).count();
        if common != 2 {
            return false;
        }

        let moved = |v: u32| {
            if v == a || v == b {
                c.target
            } else {
                self.positions[v as usize]
            }
        };
        self.live_faces_of(a)
            .chain(self.live_faces_of(b))
            .filter(|fi| !shared.contains(fi))
            .all(|fi| {
                let [p, q, r] = self.faces[fi];
                let before = cross(
                    sub(self.positions[q as usize], self.positions[p as usize]),
                    sub(self.positions[r as usize], self.positions[p as usize]),
                );
                let after = cross(sub(moved(q), moved(p)), sub(moved(r), moved(p)));
                let before_len2 = dot(before, before);
                dot(before, after) > 0.0 && dot(after, after) > 1e-12 * before_len2
            })
    }

    fn collapse(&mut self, c: &Candidate) {
        let (a, b) = (c.keep, c.drop);
        self.positions[a as usize] = c.target;
        self.quadrics[a as usize] = self.quadrics[a as usize].add(&self.quadrics[b as usize]);

        let b_faces = std::mem::take(&mut self.vertex_faces[b as usize]);
        for fi in b_faces {
            if !self.face_live[fi] {
                continue;
            }
            if self.faces[fi].contains(&a) {
                self.face_live[fi] = false;
                self.live_faces -= 1;
            } else {
                for v in &mut self.faces[fi] {
                    if *v == b {
                        *v = a;
                    }
                }
                self.vertex_faces[a as usize].push(fi);
            }
        }
        let face_live = &self.face_live;
        self.vertex_faces[a as usize].retain(|&fi| face_live[fi]);
        self.vertex_live[b as usize] = false;
        self.version[a as usize] += 1;

        let mut neighbors: Vec<u32> = self.neighbors(a).into_iter().collect();
        neighbors.sort_unstable();
        for u in neighbors {
            let candidate = self.candidate(a, u);
            self.heap.push(candidate);
        }
    }

    fn run(&mut self, target_faces: usize) {
        self.seed();
        // Four faces is the smallest closed surface.
        while self.live_faces > target_faces.max(4) {
            let Some(candidate) = self.heap.pop() else {
                break;
            };
            if self.is_stale(&candidate) || !self.can_collapse(&candidate) {
                continue;
            }
            self.collapse(&candidate);
        }
    }

    fn into_mesh(self) -> Mesh {
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut vertices = Vec::new();
        let mut faces = Vec::with_capacity(self.live_faces);
        for (face, _) in self
            .faces
            .iter()
            .zip(&self.face_live)
            .filter(|(_, live)| **live)
        {
            faces.push((*face).map(|v| {
                let slot = &mut remap[v as usize];
                if *slot == u32::MAX {
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        *slot = vertices.len() as u32;
                    }
                    vertices.push(self.positions[v as usize]);
                }
                *slot
            }));
        }
        Mesh::new(vertices, faces)
    }
}

/// Decimates `mesh` until it has at most `target_faces` faces or no
/// further collapse is allowed.
pub(crate) fn decimate(mesh: &Mesh, target_faces: usize) -> Mesh {
    let mut decimator = Decimator::new(mesh);
    decimator.run(target_faces);
    let out = decimator.into_mesh();
    debug!(
        "decimate: {} -> {} faces (target {target_faces})",
        mesh.faces.len(),
        out.faces.len()
    );
    out
}
