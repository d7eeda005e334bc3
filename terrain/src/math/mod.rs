mod enu;

pub use enu::{EnuPoint, GeodeticPoint, LocalOrigin};
