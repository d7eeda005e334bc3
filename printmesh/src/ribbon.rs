//! Solid ribbons tracing a route.

use crate::{mesh::positive, Mesh, MeshError, C};
use log::info;
use terrain::RouteEnu;

/// Default ribbon width (meters).
pub const DEFAULT_WIDTH_M: C = 20.0;

/// Default ribbon thickness (meters).
pub const DEFAULT_THICKNESS_M: C = 20.0;

/// Default ribbon height above terrain as a fraction of the terrain
/// base height.
pub const DEFAULT_HEIGHT_RATIO: C = 0.2;

/// Upper bound on the number of route samples a ribbon is built from.
pub const MAX_SAMPLES: usize = 500;

/// Builds a closed box-section ribbon following a route.
#[derive(Debug, Clone)]
pub struct RouteRibbon;

impl RouteRibbon {
    pub fn builder() -> RouteRibbonBuilder {
        RouteRibbonBuilder {
            width_m: DEFAULT_WIDTH_M,
            height_m: None,
            thickness_m: DEFAULT_THICKNESS_M,
        }
    }
}

pub struct RouteRibbonBuilder {
    /// Full width across the route (meters, defaults to 20).
    width_m: C,

    /// Height of the ribbon's top above the terrain (meters,
    /// required).
    height_m: Option<C>,

    /// Distance from the ribbon's top to its bottom (meters, defaults
    /// to 20).
    thickness_m: C,
}

impl RouteRibbonBuilder {
    /// Full width across the route (meters, defaults to 20).
    #[must_use]
    pub fn width(mut self, meters: C) -> Self {
        self.width_m = meters;
        self
    }

    /// Height of the ribbon's top above the terrain (meters,
    /// required).
    #[must_use]
    pub fn height(mut self, meters: C) -> Self {
        self.height_m = Some(meters);
        self
    }

    /// Sets the height to `ratio` of the terrain's base height.
    #[must_use]
    pub fn height_ratio(self, base_height_m: C, ratio: C) -> Self {
        self.height(base_height_m * ratio)
    }

    /// Distance from the ribbon's top to its bottom (meters, defaults
    /// to 20).
    #[must_use]
    pub fn thickness(mut self, meters: C) -> Self {
        self.thickness_m = meters;
        self
    }

    /// Returns a watertight, outward-wound ribbon over `route`, where
    /// `elevations[i]` is the terrain height under route sample `i`.
    ///
    /// Width, height and thickness must all be positive.
    ///
    /// Long routes are stride-sampled down to at most [`MAX_SAMPLES`]
    /// points first.
    pub fn build(&self, route: &RouteEnu, elevations: &[C]) -> Result<Mesh, MeshError> {
        let height_m = self.height_m.ok_or(MeshError::Builder("height"))?;
        let height_m = positive("height", height_m)?;
        let width_m = positive("width", self.width_m)?;
        let thickness_m = positive("thickness", self.thickness_m)?;
        if route.len() != elevations.len() {
            return Err(MeshError::Length(route.len(), elevations.len()));
        }

        let step = route.len().div_ceil(MAX_SAMPLES).max(1);
        let samples: Vec<[C; 3]> = (0..route.len())
            .step_by(step)
            .map(|i| [route.east[i], route.north[i], elevations[i] + height_m])
            .collect();
        let n = samples.len();
        if n < 2 {
            return Err(MeshError::InsufficientPoints(n));
        }

        let half = width_m / 2.0;
        let mut vertices = Vec::with_capacity(4 * n);
        for i in 0..n {
            let [px, py] = perpendicular(&samples, i);
            let [east, north, z] = samples[i];
            // Right of travel, then left, top before bottom.
            let top_right = [east - px * half, north - py * half, z];
            let top_left = [east + px * half, north + py * half, z];
            vertices.push(top_right);
            vertices.push(top_left);
            vertices.push([top_right[0], top_right[1], z - thickness_m]);
            vertices.push([top_left[0], top_left[1], z - thickness_m]);
        }

        let mut faces = Vec::with_capacity(8 * (n - 1) + 4);
        #[allow(clippy::cast_possible_truncation)]
        for i in 1..n as u32 {
            let (p, c) = (4 * (i - 1), 4 * i);
            // top
            faces.push([p, c, p + 1]);
            faces.push([p + 1, c, c + 1]);
            // bottom
            faces.push([p + 2, p + 3, c + 2]);
            faces.push([p + 3, c + 3, c + 2]);
            // right
            faces.push([p, p + 2, c]);
            faces.push([p + 2, c + 2, c]);
            // left
            faces.push([p + 1, c + 1, p + 3]);
            faces.push([p + 3, c + 1, c + 3]);
        }
        #[allow(clippy::cast_possible_truncation)]
        let last = 4 * (n as u32 - 1);
        faces.push([0, 1, 2]);
        faces.push([1, 3, 2]);
        faces.push([last, last + 2, last + 1]);
        faces.push([last + 1, last + 2, last + 3]);

        let mut mesh = Mesh::new(vertices, faces);
        mesh.merge_vertices();
        info!(
            "route ribbon: {} vertices, {} faces from {n} samples (step {step})",
            mesh.vertices.len(),
            mesh.faces.len()
        );
        Ok(mesh)
    }
}

/// Unit horizontal vector 90° counter-clockwise from the route's
/// direction at sample `i`.
///
/// Direction is a central difference in the interior and one-sided at
/// the ends; a zero-length difference falls back to due east.
fn perpendicular(samples: &[[C; 3]], i: usize) -> [C; 2] {
    let prev = samples[i.saturating_sub(1)];
    let next = samples[(i + 1).min(samples.len() - 1)];
    let (dx, dy) = (next[0] - prev[0], next[1] - prev[1]);
    let len = dx.hypot(dy);
    let (tx, ty) = if len > 0.0 {
        (dx / len, dy / len)
    } else {
        (1.0, 0.0)
    };
    [-ty, tx]
}

#[cfg(test)]
mod tests {
    use super::{perpendicular, MeshError, RouteRibbon, MAX_SAMPLES};
    use approx::assert_relative_eq;
    use terrain::RouteEnu;

    fn route(points: &[[f64; 2]]) -> RouteEnu {
        RouteEnu {
            east: points.iter().map(|p| p[0]).collect(),
            north: points.iter().map(|p| p[1]).collect(),
            up: vec![0.0; points.len()],
        }
    }

    #[test]
    fn test_two_points() {
        let route = route(&[[0.0, 0.0], [100.0, 0.0]]);
        let mesh = RouteRibbon::builder()
            .height(10.0)
            .build(&route, &[0.0, 0.0])
            .unwrap();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.faces.len(), 12);
        assert!(mesh.is_watertight());
        assert!(mesh.is_winding_consistent());
        // 100 m long, 20 m wide, 20 m thick.
        assert_relative_eq!(mesh.volume(), 100.0 * 20.0 * 20.0, epsilon = 1e-6);
        let (lo, hi) = mesh.bounds().unwrap();
        assert_relative_eq!(hi[2], 10.0);
        assert_relative_eq!(lo[2], -10.0);
    }

    #[test]
    fn test_straight_width() {
        let route = route(&[[0.0, 0.0], [30.0, 40.0], [60.0, 80.0], [90.0, 120.0]]);
        let mesh = RouteRibbon::builder()
            .width(7.5)
            .thickness(2.0)
            .height_ratio(50.0, 0.2)
            .build(&route, &[100.0; 4])
            .unwrap();
        for sample in mesh.vertices.chunks_exact(4) {
            let (right, left) = (sample[0], sample[1]);
            assert_relative_eq!((left[0] - right[0]).hypot(left[1] - right[1]), 7.5, epsilon = 1e-9);
            assert_relative_eq!(right[2], 110.0);
            assert_relative_eq!(sample[2][2], 108.0);
        }
        assert!(mesh.is_watertight());
        assert!(mesh.is_winding_consistent());
        assert!(mesh.volume() > 0.0);
    }

    #[test]
    fn test_winding_route() {
        let points: Vec<[f64; 2]> = (0..300)
            .map(|i| {
                let t = f64::from(i) * 0.05;
                [t.cos() * 500.0 + f64::from(i) * 3.0, t.sin() * 500.0]
            })
            .collect();
        let route = route(&points);
        let elevations: Vec<f64> = (0..300).map(|i| 1000.0 + f64::from(i)).collect();
        let mesh = RouteRibbon::builder()
            .height(10.0)
            .width(20.0)
            .build(&route, &elevations)
            .unwrap();
        assert_eq!(mesh.vertices.len(), 4 * 300);
        assert!(mesh.is_watertight());
        assert!(mesh.is_winding_consistent());
    }

    #[test]
    fn test_downsampling() {
        let cases: [(u32, usize); 6] = [
            (500, 500),
            (501, 251),
            (999, 500),
            (1499, 500),
            (1500, 500),
            (1501, 376),
        ];
        for (len, samples) in cases {
            let points: Vec<[f64; 2]> = (0..len).map(|i| [f64::from(i), 0.0]).collect();
            let mesh = RouteRibbon::builder()
                .height(1.0)
                .build(&route(&points), &vec![0.0; points.len()])
                .unwrap();
            assert_eq!(mesh.vertices.len(), 4 * samples, "len {len}");
            assert!(mesh.vertices.len() / 4 <= MAX_SAMPLES);
        }
    }

    #[test]
    fn test_repeated_point() {
        let route = route(&[[0.0, 0.0], [50.0, 0.0], [50.0, 0.0], [100.0, 0.0]]);
        let mesh = RouteRibbon::builder()
            .height(1.0)
            .build(&route, &[0.0; 4])
            .unwrap();
        assert!(mesh.is_watertight());
        assert!(mesh.is_winding_consistent());
    }

    #[test]
    fn test_errors() {
        let two = route(&[[0.0, 0.0], [1.0, 0.0]]);
        assert!(matches!(
            RouteRibbon::builder().build(&two, &[0.0, 0.0]),
            Err(MeshError::Builder("height"))
        ));
        assert!(matches!(
            RouteRibbon::builder().height(1.0).build(&two, &[0.0]),
            Err(MeshError::Length(2, 1))
        ));
        for (builder, name) in [
            (RouteRibbon::builder().height(0.0), "height"),
            (RouteRibbon::builder().height(-1.0), "height"),
            (RouteRibbon::builder().height(1.0).width(0.0), "width"),
            (RouteRibbon::builder().height(1.0).width(-20.0), "width"),
            (RouteRibbon::builder().height(1.0).thickness(0.0), "thickness"),
            (RouteRibbon::builder().height(1.0).thickness(-5.0), "thickness"),
        ] {
            assert!(matches!(
                builder.build(&two, &[0.0, 0.0]),
                Err(MeshError::NonPositive(param, _)) if param == name
            ));
        }
        let one = route(&[[0.0, 0.0]]);
        assert!(matches!(
            RouteRibbon::builder().height(1.0).build(&one, &[0.0]),
            Err(MeshError::InsufficientPoints(1))
        ));
    }

    #[test]
    fn test_perpendicular() {
        let samples = [[0.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 10.0, 0.0]];
        // Heading north, left is west.
        assert_eq!(perpendicular(&samples, 0), [-1.0, 0.0]);
        assert_eq!(perpendicular(&samples, 1), [-1.0, 0.0]);
        // Zero-length final segment falls back to east.
        assert_eq!(perpendicular(&samples, 2), [-0.0, 1.0]);
    }
}
