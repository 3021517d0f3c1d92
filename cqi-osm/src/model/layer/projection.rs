use geo::{Coord, LineString};

/// mean earth radius in meters, matching geo's haversine implementation.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// equirectangular projection around a local origin. way networks processed
/// here span a city at most, where the distortion of this projection is far
/// below tagging precision, and it keeps offset geometry math in plain
/// meters.
#[derive(Clone, Copy, Debug)]
pub struct LocalProjection {
    origin: Coord<f64>,
    cos_origin_lat: f64,
}

impl LocalProjection {
    /// build a projection centered on a WGS84 coordinate (lon/lat degrees).
    pub fn new(origin: Coord<f64>) -> LocalProjection {
        LocalProjection {
            origin,
            cos_origin_lat: origin.y.to_radians().cos(),
        }
    }

    /// WGS84 degrees to local planar meters.
    pub fn project(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x).to_radians() * self.cos_origin_lat * EARTH_RADIUS_METERS,
            y: (c.y - self.origin.y).to_radians() * EARTH_RADIUS_METERS,
        }
    }

    /// local planar meters back to WGS84 degrees.
    pub fn unproject(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x / (self.cos_origin_lat * EARTH_RADIUS_METERS)).to_degrees() + self.origin.x,
            y: (c.y / EARTH_RADIUS_METERS).to_degrees() + self.origin.y,
        }
    }

    pub fn project_linestring(&self, ls: &LineString<f64>) -> LineString<f64> {
        LineString::new(ls.coords().map(|c| self.project(*c)).collect())
    }

    pub fn unproject_linestring(&self, ls: &LineString<f64>) -> LineString<f64> {
        LineString::new(ls.coords().map(|c| self.unproject(*c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn test_project_roundtrip() {
        let proj = LocalProjection::new(coord! { x: 13.4, y: 52.5 });
        let original = coord! { x: 13.4132, y: 52.4871 };
        let local = proj.project(original);
        let back = proj.unproject(local);
        assert!((back.x - original.x).abs() < 1e-12);
        assert!((back.y - original.y).abs() < 1e-12);
    }

    #[test]
    fn test_projected_distance_is_metric() {
        let proj = LocalProjection::new(coord! { x: 13.4, y: 52.5 });
        // one degree of latitude is about 111.2 km
        let a = proj.project(coord! { x: 13.4, y: 52.5 });
        let b = proj.project(coord! { x: 13.4, y: 53.5 });
        let d = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
        assert!((d - 111_194.9).abs() < 10.0);
    }
}
