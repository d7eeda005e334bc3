//! WGS-84 geodetic ↔ local East-North-Up conversion.
//!
//! Points are taken through Earth-centered, Earth-fixed (ECEF)
//! coordinates and rotated into the tangent plane of a single fixed
//! origin.

use crate::C;
use geo::geometry::Coord;
use rayon::prelude::*;

/// WGS-84 semi-major axis (meters).
const WGS84_A: C = 6_378_137.0;

/// WGS-84 flattening.
const WGS84_F: C = 1.0 / 298.257_223_563;

/// WGS-84 first eccentricity squared.
const WGS84_E2: C = WGS84_F * (2.0 - WGS84_F);

/// A point on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPoint {
    /// Degrees north.
    pub lat: C,
    /// Degrees east.
    pub lon: C,
    /// Meters above the ellipsoid.
    pub elevation: C,
}

impl GeodeticPoint {
    pub fn new(lat: C, lon: C, elevation: C) -> Self {
        Self {
            lat,
            lon,
            elevation,
        }
    }
}

impl From<GeodeticPoint> for Coord<C> {
    fn from(p: GeodeticPoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

/// A point in meters relative to a [`LocalOrigin`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnuPoint {
    pub east: C,
    pub north: C,
    pub up: C,
}

impl EnuPoint {
    pub fn new(east: C, north: C, up: C) -> Self {
        Self { east, north, up }
    }
}

/// The fixed tangent point all ENU coordinates of a run are relative
/// to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalOrigin {
    origin: GeodeticPoint,
    ecef: [C; 3],
    sin_lat: C,
    cos_lat: C,
    sin_lon: C,
    cos_lon: C,
}

impl LocalOrigin {
    pub fn new(origin: GeodeticPoint) -> Self {
        let (sin_lat, cos_lat) = origin.lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = origin.lon.to_radians().sin_cos();
        Self {
            origin,
            ecef: geodetic_to_ecef(&origin),
            sin_lat,
            cos_lat,
            sin_lon,
            cos_lon,
        }
    }

    pub fn origin(&self) -> GeodeticPoint {
        self.origin
    }

    /// Converts one geodetic point to ENU.
    pub fn to_enu(&self, point: &GeodeticPoint) -> EnuPoint {
        let [x, y, z] = geodetic_to_ecef(point);
        let dx = x - self.ecef[0];
        let dy = y - self.ecef[1];
        let dz = z - self.ecef[2];
        EnuPoint {
            east: -self.sin_lon * dx + self.cos_lon * dy,
            north: -self.sin_lat * self.cos_lon * dx - self.sin_lat * self.sin_lon * dy
                + self.cos_lat * dz,
            up: self.cos_lat * self.cos_lon * dx
                + self.cos_lat * self.sin_lon * dy
                + self.sin_lat * dz,
        }
    }

    /// Converts one ENU point back to geodetic.
    pub fn to_geodetic(&self, point: &EnuPoint) -> GeodeticPoint {
        let EnuPoint { east, north, up } = *point;
        let dx = -self.sin_lon * east - self.sin_lat * self.cos_lon * north
            + self.cos_lat * self.cos_lon * up;
        let dy = self.cos_lon * east - self.sin_lat * self.sin_lon * north
            + self.cos_lat * self.sin_lon * up;
        let dz = self.cos_lat * north + self.sin_lat * up;
        ecef_to_geodetic([
            self.ecef[0] + dx,
            self.ecef[1] + dy,
            self.ecef[2] + dz,
        ])
    }

    /// Converts a batch of geodetic points to ENU, preserving order.
    pub fn geodetic_to_enu(&self, points: &[GeodeticPoint]) -> Vec<EnuPoint> {
        points.par_iter().map(|p| self.to_enu(p)).collect()
    }

    /// Converts a batch of ENU points to geodetic, preserving order.
    pub fn enu_to_geodetic(&self, points: &[EnuPoint]) -> Vec<GeodeticPoint> {
        points.par_iter().map(|p| self.to_geodetic(p)).collect()
    }
}

fn geodetic_to_ecef(p: &GeodeticPoint) -> [C; 3] {
    let (sin_lat, cos_lat) = p.lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = p.lon.to_radians().sin_cos();
    // Prime vertical radius of curvature.
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    [
        (n + p.elevation) * cos_lat * cos_lon,
        (n + p.elevation) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + p.elevation) * sin_lat,
    ]
}

fn ecef_to_geodetic([x, y, z]: [C; 3]) -> GeodeticPoint {
    let p = x.hypot(y);
    let lon = y.atan2(x);
    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut elevation = 0.0;
    for _ in 0..10 {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        elevation = if cos_lat.abs() > 1e-9 {
            p / cos_lat - n
        } else {
            z.abs() - n * (1.0 - WGS84_E2)
        };
        let next = z.atan2(p * (1.0 - WGS84_E2 * n / (n + elevation)));
        let converged = (next - lat).abs() < 1e-14;
        lat = next;
        if converged {
            break;
        }
    }
    GeodeticPoint {
        lat: lat.to_degrees(),
        lon: lon.to_degrees(),
        elevation,
    }
}

#[cfg(test)]
mod tests {
    use super::{EnuPoint, GeodeticPoint, LocalOrigin};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const MT_WASHINGTON: GeodeticPoint = GeodeticPoint {
        lat: 44.2705,
        lon: -71.30325,
        elevation: 1916.0,
    };

    #[test]
    fn test_origin_maps_to_zero() {
        let origin = LocalOrigin::new(MT_WASHINGTON);
        let enu = origin.to_enu(&MT_WASHINGTON);
        assert_abs_diff_eq!(enu.east, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(enu.north, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(enu.up, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_axes() {
        let origin = LocalOrigin::new(GeodeticPoint::new(0.0, 0.0, 0.0));
        // 0.001° of latitude at the equator is ~110.57 m north.
        let north = origin.to_enu(&GeodeticPoint::new(0.001, 0.0, 0.0));
        assert_abs_diff_eq!(north.north, 110.574, epsilon = 0.01);
        assert_abs_diff_eq!(north.east, 0.0, epsilon = 1e-9);
        // 0.001° of longitude at the equator is ~111.32 m east.
        let east = origin.to_enu(&GeodeticPoint::new(0.0, 0.001, 0.0));
        assert_abs_diff_eq!(east.east, 111.319, epsilon = 0.01);
        assert_abs_diff_eq!(east.north, 0.0, epsilon = 1e-9);
        let up = origin.to_enu(&GeodeticPoint::new(0.0, 0.0, 10.0));
        assert_abs_diff_eq!(up.up, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_batch_preserves_order() {
        let origin = LocalOrigin::new(MT_WASHINGTON);
        let points: Vec<GeodeticPoint> = (0..1000)
            .map(|i| GeodeticPoint::new(44.0 + f64::from(i) * 1e-4, -71.3, 1000.0))
            .collect();
        let enu = origin.geodetic_to_enu(&points);
        assert_eq!(enu.len(), points.len());
        for (p, e) in points.iter().zip(&enu) {
            assert_eq!(origin.to_enu(p), *e);
        }
        let back = origin.enu_to_geodetic(&enu);
        assert_abs_diff_eq!(back[999].lat, points[999].lat, epsilon = 1e-9);
    }

    #[test]
    fn test_enu_to_geodetic_origin() {
        let origin = LocalOrigin::new(MT_WASHINGTON);
        let p = origin.to_geodetic(&EnuPoint::default());
        assert_abs_diff_eq!(p.lat, MT_WASHINGTON.lat, epsilon = 1e-10);
        assert_abs_diff_eq!(p.lon, MT_WASHINGTON.lon, epsilon = 1e-10);
        assert_abs_diff_eq!(p.elevation, MT_WASHINGTON.elevation, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn enu_roundtrip_within_100km(
            lat0 in -80.0_f64..80.0,
            lon0 in -179.0_f64..179.0,
            h0 in -100.0_f64..5000.0,
            dlat in -0.6_f64..0.6,
            dlon in -0.6_f64..0.6,
            h in -100.0_f64..5000.0,
        ) {
            let origin = LocalOrigin::new(GeodeticPoint::new(lat0, lon0, h0));
            let point = GeodeticPoint::new(lat0 + dlat, lon0 + dlon, h);
            let back = origin.to_geodetic(&origin.to_enu(&point));
            prop_assert!((back.lat - point.lat).abs() < 1e-6);
            prop_assert!((back.lon - point.lon).abs() < 1e-6);
            prop_assert!((back.elevation - point.elevation).abs() < 1e-3);
        }
    }
}
