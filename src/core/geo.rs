use crate::core::constants::{COMPLETE_ANGLE, EARTH_MEAN_RADIUS_M, HALF_ANGLE};
use geo::HaversineDistance;
use serde::{Deserialize, Serialize};

/// Latitude in degrees, always within [-90, 90]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Latitude(f64);

impl Latitude {
    pub const MIN: f64 = -90.0;
    pub const MAX: f64 = 90.0;

    /// Creates a latitude, clamping out-of-range values to the nearest pole
    pub fn new(value: f64) -> Self {
        Self(Self::clamp(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Clamps a raw degree value into [-90, 90]
    pub fn clamp(value: f64) -> f64 {
        Self::MAX.min(Self::MIN.max(value))
    }

    /// Latitude is not periodic, so unwinding only normalizes into range.
    pub fn unwind(value: f64) -> f64 {
        Self::clamp(value)
    }
}

impl From<f64> for Latitude {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Latitude> for f64 {
    fn from(latitude: Latitude) -> Self {
        latitude.0
    }
}

/// Longitude in degrees, stored in the canonical range [-180, 180)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Longitude(f64);

impl Longitude {
    /// Creates a longitude from any degree value, wrapping it into [-180, 180)
    pub fn new(value: f64) -> Self {
        Self(Self::wrap(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Maps `value` into [-180, 180)
    ///
    /// Only meant for presenting a longitude. Animation paths keep working in
    /// unwrapped space and call [`Longitude::unwind`] instead.
    pub fn wrap(value: f64) -> f64 {
        let wrapped = (value + HALF_ANGLE).rem_euclid(COMPLETE_ANGLE) - HALF_ANGLE;
        // rem_euclid can round up to exactly the period for tiny negative inputs
        if wrapped >= HALF_ANGLE {
            wrapped - COMPLETE_ANGLE
        } else {
            wrapped
        }
    }

    /// Rebases an unwrapped longitude onto the period closest to zero.
    ///
    /// The result differs from `value` by a whole number of turns, so the
    /// globe looks the same before and after.
    pub fn unwind(value: f64) -> f64 {
        let turns = (value / COMPLETE_ANGLE).round();
        value - turns * COMPLETE_ANGLE
    }
}

impl From<f64> for Longitude {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Longitude> for f64 {
    fn from(longitude: Longitude) -> Self {
        longitude.0
    }
}

/// Returns the representation of `target` that lies within 180° of `current`.
///
/// `current` is an unwrapped angle, `target` may be given in any period.
/// Animating from `current` to the returned value always takes the short way
/// around the globe. When the two are exactly antipodal the target stays on
/// the side it was rebased to, which keeps the choice deterministic.
pub fn shortest_target(current: f64, target: f64) -> f64 {
    let residue = current % COMPLETE_ANGLE;
    let base = current - residue;

    let rebased = base + Longitude::wrap(target);

    let diff = current - rebased;
    if diff > HALF_ANGLE {
        rebased + COMPLETE_ANGLE
    } else if diff < -HALF_ANGLE {
        rebased - COMPLETE_ANGLE
    } else {
        rebased
    }
}

/// A geographic point on the globe
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLong {
    pub latitude: Latitude,
    pub longitude: Longitude,
}

impl LatLong {
    pub fn new(latitude: Latitude, longitude: Longitude) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Creates a point from raw degrees, normalizing both axes
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self::new(Latitude::new(latitude), Longitude::new(longitude))
    }

    /// Unwrapped animation-space representation (`x` = longitude, `y` = latitude)
    pub fn to_offset(&self) -> Point {
        Point::new(self.longitude.value(), self.latitude.value())
    }

    /// Builds a point back from animation space, wrapping and clamping as needed
    pub fn from_offset(offset: Point) -> Self {
        Self::from_degrees(offset.y, offset.x)
    }

    /// Great-circle distance to `other`, expressed as degrees of arc
    pub fn arc_distance_to(&self, other: &LatLong) -> f64 {
        let from: geo_types::Point<f64> = (*self).into();
        let to: geo_types::Point<f64> = (*other).into();
        let meters = from.haversine_distance(&to);
        (meters / EARTH_MEAN_RADIUS_M).to_degrees()
    }
}

impl From<LatLong> for geo_types::Point<f64> {
    fn from(lat_long: LatLong) -> Self {
        geo_types::Point::new(lat_long.longitude.value(), lat_long.latitude.value())
    }
}

/// A 2D vector used for screen pixels, normalized device coordinates and
/// unwrapped lat/long offsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.subtract(other).length()
    }

    /// Angle of the vector in degrees, measured from the positive x axis
    pub fn angle_degrees(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            0.0
        } else {
            self.y.atan2(self.x).to_degrees()
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_latitude_clamps_instead_of_wrapping() {
        assert_eq!(Latitude::new(95.0).value(), 90.0);
        assert_eq!(Latitude::new(-120.0).value(), -90.0);
        assert_eq!(Latitude::new(45.5).value(), 45.5);
        assert_eq!(Latitude::unwind(30.0), 30.0);
    }

    #[test]
    fn test_longitude_wrap_range() {
        assert_eq!(Longitude::wrap(180.0), -180.0);
        assert_eq!(Longitude::wrap(-180.0), -180.0);
        assert_eq!(Longitude::wrap(190.0), -170.0);
        assert_eq!(Longitude::wrap(-190.0), 170.0);
        assert_eq!(Longitude::wrap(720.0 + 45.0), 45.0);

        for i in -2000..2000 {
            let wrapped = Longitude::wrap(i as f64 * 0.73);
            assert!((-180.0..180.0).contains(&wrapped), "{wrapped}");
        }
    }

    #[test]
    fn test_unwind_preserves_visual_position() {
        for x in [0.0, 359.0, 1234.5, -9876.25, 1.0e6 + 0.5, -725.0] {
            let unwound = Longitude::unwind(x);
            assert!(unwound.abs() <= 180.0 + EPS);
            let turns = (x - unwound) / COMPLETE_ANGLE;
            assert!((turns - turns.round()).abs() < 1e-9);

            let from_wrapped = Longitude::unwind(Longitude::wrap(x));
            assert!((Longitude::wrap(from_wrapped) - Longitude::wrap(x)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_shortest_target_crosses_antimeridian() {
        // 350 -> -170 is a 20 degree hop east, not 520 west
        assert!((shortest_target(350.0, -170.0) - 190.0).abs() < EPS);
        assert!((shortest_target(-350.0, 170.0) - -190.0).abs() < EPS);
        assert!((shortest_target(10.0, 20.0) - 20.0).abs() < EPS);
        assert!((shortest_target(725.0, 0.0) - 720.0).abs() < EPS);
    }

    #[test]
    fn test_shortest_target_stays_within_half_turn() {
        let currents = [-1000.0, -540.0, -181.0, -0.5, 0.0, 179.9, 360.0, 1081.0, 5000.3];
        let targets = [-180.0, -179.0, -90.0, 0.0, 45.0, 179.99, 300.0, -400.0];
        for current in currents {
            for target in targets {
                let t = shortest_target(current, target);
                assert!((t - current).abs() <= HALF_ANGLE + 1e-6, "{current} -> {target} = {t}");
                let diff = (Longitude::wrap(t) - Longitude::wrap(target)).abs();
                assert!(diff < 1e-6 || (diff - COMPLETE_ANGLE).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_antipodal_target_is_deterministic() {
        let first = shortest_target(10.0, -170.0);
        let second = shortest_target(10.0, -170.0);
        assert_eq!(first, second);
        assert!(((first - 10.0).abs() - 180.0).abs() < EPS);
    }

    #[test]
    fn test_lat_long_offset_roundtrip_normalizes() {
        let berlin = LatLong::from_degrees(52.52, 13.405);
        let offset = berlin.to_offset();
        assert_eq!(offset, Point::new(13.405, 52.52));

        let spun = LatLong::from_offset(Point::new(13.405 + 720.0, 52.52));
        assert!((spun.longitude.value() - 13.405).abs() < 1e-9);
    }

    #[test]
    fn test_arc_distance() {
        let a = LatLong::from_degrees(0.0, 0.0);
        let b = LatLong::from_degrees(0.0, 90.0);
        assert!((a.arc_distance_to(&b) - 90.0).abs() < 1e-6);
        assert!(a.arc_distance_to(&a).abs() < 1e-9);
    }

    #[test]
    fn test_point_math() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.add(&Point::new(1.0, 1.0)), Point::new(4.0, 5.0));
        assert_eq!(a.subtract(&a), Point::ZERO);
        assert_eq!(Point::new(0.0, 2.0).angle_degrees(), 90.0);
    }
}
