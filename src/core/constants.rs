//! Engine-wide constants for the globe camera and interaction defaults.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// One full turn, in degrees.
pub const COMPLETE_ANGLE: f64 = 360.0;

/// Half a turn, in degrees.
pub const HALF_ANGLE: f64 = 180.0;

/// Mean earth radius used by the haversine formula, in meters.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// Radius of the rendered globe in world units.
pub const SPHERE_RADIUS: f64 = 1.0;

/// Default camera distance from the globe center.
pub const DEFAULT_ZOOM: f64 = 1.5;

/// Default vertical framing; the look-at target sits in the middle of the view.
pub const DEFAULT_VERTICAL_BIAS: f64 = 0.5;

/// Default vertical field of view, in degrees.
pub const DEFAULT_FIELD_OF_VIEW: f64 = 70.0;

/// Near clip plane. Closer than any allowed zoom can bring the eye to the surface.
pub const NEAR_PLANE: f64 = 0.1;

/// Far clip plane, enclosing the whole sphere from any sane zoom.
pub const FAR_PLANE: f64 = 100.0;

/// Default marker size in world units.
pub const DEFAULT_MARKER_SIZE: f64 = 0.02;

/// Maximum distance, in normalized device units, between a tap and a marker.
pub const MARKER_HIT_THRESHOLD: f64 = 0.03;

/// Land and ocean meshes are drawn slightly inside the contour lines to avoid z-fighting.
pub const LAND_OCEAN_SCALE_FACTOR: f32 = 0.99999;

/// Friction constant of the exponential decay used for flings.
pub const EXPONENTIAL_DECAY_FRICTION: f64 = -4.2;

/// Velocity (units per second) below which a decay is considered settled.
pub const DECAY_VELOCITY_THRESHOLD: f64 = 0.1;
