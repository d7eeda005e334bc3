use crate::{BoundingBox, EnuPoint, GeodeticPoint, LocalOrigin, TerrainError, C};

/// An ordered GPS track.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<GeodeticPoint>,
}

impl Route {
    /// Returns a route over `points`.
    ///
    /// Fails with [`TerrainError::MissingTrackData`] when fewer than
    /// two points are given.
    pub fn new(points: Vec<GeodeticPoint>) -> Result<Self, TerrainError> {
        if points.len() < 2 {
            return Err(TerrainError::MissingTrackData(points.len()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[GeodeticPoint] {
        &self.points
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The route's first point, which every run uses as its ENU
    /// origin.
    pub fn origin(&self) -> LocalOrigin {
        LocalOrigin::new(self.points[0])
    }

    pub fn bounding_box(&self) -> BoundingBox {
        // Non-empty by construction.
        BoundingBox::from_points(&self.points).unwrap_or_else(|| {
            let p = self.points[0];
            BoundingBox::new(p.lon, p.lat, p.lon, p.lat)
        })
    }

    /// Projects every point into `origin`'s ENU frame, in order.
    pub fn to_enu(&self, origin: &LocalOrigin) -> RouteEnu {
        RouteEnu::from(origin.geodetic_to_enu(&self.points))
    }
}

/// A route in local ENU meters, stored column-wise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteEnu {
    pub east: Vec<C>,
    pub north: Vec<C>,
    pub up: Vec<C>,
}

impl RouteEnu {
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.east.len()
    }

    pub fn point(&self, idx: usize) -> EnuPoint {
        EnuPoint::new(self.east[idx], self.north[idx], self.up[idx])
    }

    /// Iterates the horizontal (east, north) positions.
    pub fn horizontal(&self) -> impl Iterator<Item = [C; 2]> + '_ {
        self.east.iter().zip(&self.north).map(|(&e, &n)| [e, n])
    }
}

impl From<Vec<EnuPoint>> for RouteEnu {
    fn from(points: Vec<EnuPoint>) -> Self {
        let mut route = Self {
            east: Vec::with_capacity(points.len()),
            north: Vec::with_capacity(points.len()),
            up: Vec::with_capacity(points.len()),
        };
        for EnuPoint { east, north, up } in points {
            route.east.push(east);
            route.north.push(north);
            route.up.push(up);
        }
        route
    }
}
