//! Geographic sampling: a polar grid of coordinates around a clicked point.
//!
//! Offsets are computed on a sphere (great-circle destination), not as degree
//! offsets: at European latitudes a degree of longitude is ~40% shorter than a
//! degree of latitude, and a naive grid would come out as an ellipse.

use serde::Serialize;

/// Mean radius of the Earth, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Invalid input to the sampler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("radius must be a positive number of kilometers, got {0}")]
    Radius(f64),
    #[error("grid needs at least one ring and one angle, got {rings} rings x {angles} angles")]
    InvalidGrid { rings: usize, angles: usize },
}

/// A coordinate on the Earth's surface, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, checking that it lies within the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// One coordinate of the polar grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePoint {
    /// Unique within one call to [generate_sample_points].
    pub sample_id: String,
    pub point: GeoPoint,
    /// 0 for the center, 1 for the innermost ring.
    pub ring: usize,
    pub ring_distance_km: f64,
    /// Degrees clockwise from North; None for the center.
    pub bearing_degrees: Option<f64>,
}

/// Shape of the polar grid: how many rings, and how many points per ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rings: usize,
    pub angles: usize,
}

impl Default for GridShape {
    fn default() -> Self {
        Self {
            rings: 5,
            angles: 16,
        }
    }
}

impl GridShape {
    /// Number of points in the grid, including the center.
    pub fn point_count(&self) -> usize {
        1 + self.rings * self.angles
    }

    /// Spacing between bearings on a ring, in degrees.
    pub fn angle_step(&self) -> f64 {
        360.0 / self.angles as f64
    }

    fn validate(&self) -> Result<(), GeoError> {
        if self.rings == 0 || self.angles == 0 {
            return Err(GeoError::InvalidGrid {
                rings: self.rings,
                angles: self.angles,
            });
        }
        Ok(())
    }
}

/// Produce the polar grid around `center`.
///
/// Output is the center, then rings from innermost to outermost; within a ring,
/// by increasing bearing starting at 0 (North). Ring `r` of `n` lies at
/// `radius_km * r / n`.
pub fn generate_sample_points(
    center: GeoPoint,
    radius_km: f64,
    shape: GridShape,
) -> Result<Vec<SamplePoint>, GeoError> {
    if !(radius_km > 0.0 && radius_km.is_finite()) {
        return Err(GeoError::Radius(radius_km));
    }
    shape.validate()?;

    let mut points = Vec::with_capacity(shape.point_count());
    points.push(SamplePoint {
        sample_id: "center".to_owned(),
        point: center,
        ring: 0,
        ring_distance_km: 0.0,
        bearing_degrees: None,
    });

    for ring in 1..=shape.rings {
        let distance = radius_km * ring as f64 / shape.rings as f64;
        // Index-based bearings: the last one is strictly below 360, so the
        // ring never repeats North.
        for i in 0..shape.angles {
            let bearing = i as f64 * shape.angle_step();
            points.push(SamplePoint {
                sample_id: format!("ring{ring}-{i:02}"),
                point: destination(&center, bearing, distance),
                ring,
                ring_distance_km: distance,
                bearing_degrees: Some(bearing),
            });
        }
    }
    tracing::trace!("generated {} sample points around {}", points.len(), center);
    Ok(points)
}

/// Great-circle destination from `start`, travelling `distance_km` along the
/// initial bearing `bearing_degrees`.
pub fn destination(start: &GeoPoint, bearing_degrees: f64, distance_km: f64) -> GeoPoint {
    let angular = distance_km / EARTH_RADIUS_KM;
    let theta = bearing_degrees.to_radians();
    let lat1 = start.latitude.to_radians();
    let lon1 = start.longitude.to_radians();

    let sin_lat2 = lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * theta.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lon2 = lon1
        + (theta.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint {
        latitude: lat2.to_degrees().clamp(-90.0, 90.0),
        longitude: normalize_longitude(lon2.to_degrees()),
    }
}

/// Great-circle (haversine) distance between two points, in kilometers.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Initial bearing of the great circle from `a` to `b`, in degrees within [0, 360).
pub fn initial_bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid rounds tiny negative angles up to exactly 360.
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Wrap a longitude into [-180, 180).
pub fn normalize_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use approx::assert_abs_diff_eq;

    use super::*;

    fn germany() -> GeoPoint {
        GeoPoint::new(51.1657, 10.4515).unwrap()
    }

    /// Smallest difference between two bearings, in degrees.
    fn bearing_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn default_grid_has_81_points() {
        let points = generate_sample_points(germany(), 10.0, GridShape::default()).unwrap();
        assert_eq!(points.len(), 81);
        assert_eq!(GridShape::default().point_count(), 81);
    }

    #[test]
    fn custom_grid_size() {
        let shape = GridShape {
            rings: 3,
            angles: 8,
        };
        let points = generate_sample_points(germany(), 25.0, shape).unwrap();
        assert_eq!(points.len(), 1 + 3 * 8);
    }

    #[test]
    fn center_comes_first() {
        let points = generate_sample_points(germany(), 10.0, GridShape::default()).unwrap();
        let center = &points[0];
        assert_eq!(center.point, germany());
        assert_eq!(center.ring, 0);
        assert_eq!(center.ring_distance_km, 0.0);
        assert_eq!(center.bearing_degrees, None);
    }

    #[test]
    fn rings_lie_at_their_distance() {
        let c = germany();
        let points = generate_sample_points(c, 10.0, GridShape::default()).unwrap();
        for p in &points[1..] {
            assert_abs_diff_eq!(p.ring_distance_km, 2.0 * p.ring as f64, epsilon = 1e-9);
            assert_abs_diff_eq!(distance_km(&c, &p.point), p.ring_distance_km, epsilon = 0.01);
        }
    }

    #[test]
    fn ordering_and_spacing() {
        let shape = GridShape::default();
        let points = generate_sample_points(germany(), 10.0, shape).unwrap();
        for (ring, chunk) in points[1..].chunks(shape.angles).enumerate() {
            for (i, p) in chunk.iter().enumerate() {
                assert_eq!(p.ring, ring + 1);
                let bearing = p.bearing_degrees.expect("ring points have a bearing");
                assert_abs_diff_eq!(bearing, 22.5 * i as f64, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn no_duplicate_north() {
        let points = generate_sample_points(germany(), 10.0, GridShape::default()).unwrap();
        let ids: HashSet<_> = points.iter().map(|p| p.sample_id.as_str()).collect();
        assert_eq!(ids.len(), points.len());
        let norths = points
            .iter()
            .filter(|p| p.ring == 1)
            .filter(|p| bearing_diff(p.bearing_degrees.unwrap(), 0.0) < 1e-9)
            .count();
        assert_eq!(norths, 1);
    }

    #[test]
    fn bearing_and_distance_round_trip() {
        let c = germany();
        let points = generate_sample_points(c, 50.0, GridShape::default()).unwrap();
        for p in &points[1..] {
            let d = distance_km(&c, &p.point);
            let b = initial_bearing(&c, &p.point);
            assert_abs_diff_eq!(d, p.ring_distance_km, epsilon = 0.01);
            assert!(
                bearing_diff(b, p.bearing_degrees.unwrap()) < 0.01,
                "{}: bearing {} vs {:?}",
                p.sample_id,
                b,
                p.bearing_degrees
            );
        }
    }

    #[test]
    fn east_offset_accounts_for_latitude() {
        // At ~51°N, 10 km East is ~0.143° of longitude, not the ~0.09° of a
        // degree-of-latitude offset.
        let c = germany();
        let east = destination(&c, 90.0, 10.0);
        assert_abs_diff_eq!(east.longitude() - c.longitude(), 0.1434, epsilon = 1e-3);
        assert_abs_diff_eq!(east.latitude(), c.latitude(), epsilon = 1e-3);
    }

    #[test]
    fn antimeridian_wraps() {
        let c = GeoPoint::new(0.0, 179.95).unwrap();
        let points = generate_sample_points(c, 20.0, GridShape::default()).unwrap();
        for p in &points {
            assert!((-180.0..=180.0).contains(&p.point.longitude()));
            assert_abs_diff_eq!(distance_km(&c, &p.point), p.ring_distance_km, epsilon = 0.01);
        }
        let east = destination(&c, 90.0, 20.0);
        assert!(east.longitude() < 0.0, "{east} should have wrapped");
    }

    #[test]
    fn normalize() {
        assert_abs_diff_eq!(normalize_longitude(190.0), -170.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_longitude(-190.0), 170.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_longitude(540.0), -180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_longitude(10.5), 10.5, epsilon = 1e-9);
    }

    #[test]
    fn invalid_radius() {
        for r in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = generate_sample_points(germany(), r, GridShape::default())
                .expect_err("radius should be rejected");
            assert!(matches!(err, GeoError::Radius(_)));
        }
    }

    #[test]
    fn invalid_grid() {
        let shape = GridShape {
            rings: 0,
            angles: 16,
        };
        let err = generate_sample_points(germany(), 10.0, shape).expect_err("no rings");
        assert_eq!(
            err,
            GeoError::InvalidGrid {
                rings: 0,
                angles: 16
            }
        );
    }

    #[test]
    fn invalid_coordinates() {
        assert_eq!(GeoPoint::new(91.0, 0.0), Err(GeoError::Latitude(91.0)));
        assert_eq!(GeoPoint::new(0.0, -180.5), Err(GeoError::Longitude(-180.5)));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
    }
}
