//! JSON route input.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};
use terrain::{GeodeticPoint, Route};

/// One route sample, either `[lat, lon, ele]` or
/// `{"lat": .., "lon": .., "ele": ..}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum RoutePoint {
    Triple([f64; 3]),
    Object {
        lat: f64,
        lon: f64,
        #[serde(default, alias = "elevation")]
        ele: f64,
    },
}

impl From<RoutePoint> for GeodeticPoint {
    fn from(point: RoutePoint) -> Self {
        match point {
            RoutePoint::Triple([lat, lon, ele]) | RoutePoint::Object { lat, lon, ele } => {
                GeodeticPoint::new(lat, lon, ele)
            }
        }
    }
}

fn into_route(points: Vec<RoutePoint>) -> Result<Route> {
    let route = Route::new(points.into_iter().map(GeodeticPoint::from).collect())?;
    Ok(route)
}

/// Reads a route from a JSON file.
pub fn read(path: &Path) -> Result<Route> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let points: Vec<RoutePoint> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing route {}", path.display()))?;
    into_route(points)
}

#[cfg(test)]
fn parse(json: &str) -> Result<Route> {
    into_route(serde_json::from_str(json)?)
}
