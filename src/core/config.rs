//! Configuration for the globe's interaction engine
//!
//! Hosts either pick a preset through [`InteractionProfile`] or build a
//! [`GlobeConfig`] by hand (or from JSON). Every config goes through
//! [`GlobeConfig::validate`] before the engine accepts it.

use crate::core::constants::MARKER_HIT_THRESHOLD;
use crate::core::geo::Point;
use crate::{GlobeError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionProfile {
    Balanced,
    /// Lighter friction and a short snap-back delay
    Responsive,
    /// Heavier friction, slower pans, long snap-back delay
    Gentle,
    Custom(GlobeConfig),
}

impl InteractionProfile {
    pub fn resolve(&self) -> GlobeConfig {
        match self {
            Self::Balanced => GlobeConfig::default(),
            Self::Responsive => GlobeConfig {
                fling_friction: 0.7,
                snap_back: TweenConfig {
                    duration_ms: 800,
                    delay_ms: 1500,
                },
                ..GlobeConfig::default()
            },
            Self::Gentle => GlobeConfig {
                pan_sensitivity: Point::new(1.0 / 70.0, 1.0 / 56.0),
                zoom_sensitivity: 0.35,
                fling_friction: 1.6,
                snap_back: TweenConfig {
                    duration_ms: 1200,
                    delay_ms: 4000,
                },
                ..GlobeConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for InteractionProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// A closed `[min, max]` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// A fixed-duration easing with an initial delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweenConfig {
    pub duration_ms: u64,
    pub delay_ms: u64,
}

/// Duration of a re-center animation, scaled by how far the camera has to travel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecenterConfig {
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    /// Milliseconds added per degree of great-circle arc
    pub ms_per_degree: f64,
}

impl RecenterConfig {
    pub fn duration_ms(&self, arc_degrees: f64) -> u64 {
        let scaled = (arc_degrees.abs() * self.ms_per_degree).round();
        let min = self.min_duration_ms as f64;
        let max = self.max_duration_ms as f64;
        scaled.clamp(min, max) as u64
    }
}

impl Default for RecenterConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 1300,
            max_duration_ms: 2500,
            ms_per_degree: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// When false the camera follows the host's camera position verbatim and drags are ignored
    pub interactive: bool,
    /// Allowed camera distance from the globe center
    pub zoom_range: Range,
    /// Latitudes the camera may pan to
    pub latitude_range: Range,
    /// Degrees moved per pixel of pan at zoom 1, per axis
    pub pan_sensitivity: Point,
    /// Zoom change per unit of pinch scale
    pub zoom_sensitivity: f64,
    /// Pixels of combined motion before a touch counts as a gesture
    pub touch_slop: f64,
    /// Ignore rotation when a gesture starts without any
    pub pan_zoom_lock: bool,
    /// Multiplier on the decay friction, higher stops flings sooner
    pub fling_friction: f64,
    /// Cap on the fling velocity, degrees per second
    pub max_fling_velocity: f64,
    pub snap_back: TweenConfig,
    pub recenter: RecenterConfig,
    /// Maximum tap-to-marker distance in normalized device units
    pub hit_threshold: f64,
    pub long_press_timeout_ms: u64,
    pub double_tap_timeout_ms: u64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            zoom_range: Range::new(1.2, 2.0),
            latitude_range: Range::new(-40.0, 60.0),
            pan_sensitivity: Point::new(1.0 / 50.0, 1.0 / 40.0),
            zoom_sensitivity: 0.5,
            touch_slop: 18.0,
            pan_zoom_lock: true,
            fling_friction: 1.0,
            max_fling_velocity: 1000.0,
            snap_back: TweenConfig {
                duration_ms: 1000,
                delay_ms: 3000,
            },
            recenter: RecenterConfig::default(),
            hit_threshold: MARKER_HIT_THRESHOLD,
            long_press_timeout_ms: 500,
            double_tap_timeout_ms: 300,
        }
    }
}

impl GlobeConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GlobeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| {
            #[cfg(feature = "debug")]
            log::warn!("rejecting globe config: {}", reason);
            Err(GlobeError::InvalidConfig(reason))
        };

        if !self.zoom_range.is_well_formed() || self.zoom_range.min <= 0.0 {
            return fail(format!("zoom range {:?} must be positive and ordered", self.zoom_range));
        }
        if !self.latitude_range.is_well_formed()
            || self.latitude_range.min < -90.0
            || self.latitude_range.max > 90.0
        {
            return fail(format!(
                "latitude range {:?} must be ordered and within [-90, 90]",
                self.latitude_range
            ));
        }
        if !self.pan_sensitivity.x.is_finite()
            || !self.pan_sensitivity.y.is_finite()
            || !self.zoom_sensitivity.is_finite()
        {
            return fail("sensitivities must be finite".to_string());
        }
        if !(self.touch_slop > 0.0) {
            return fail(format!("touch slop must be positive, got {}", self.touch_slop));
        }
        if !(self.fling_friction > 0.0) || !self.fling_friction.is_finite() {
            return fail(format!("fling friction must be positive, got {}", self.fling_friction));
        }
        if !(self.max_fling_velocity > 0.0) {
            return fail(format!(
                "max fling velocity must be positive, got {}",
                self.max_fling_velocity
            ));
        }
        if self.recenter.min_duration_ms > self.recenter.max_duration_ms
            || !(self.recenter.ms_per_degree >= 0.0)
        {
            return fail(format!("recenter timing {:?} is inconsistent", self.recenter));
        }
        if !(self.hit_threshold > 0.0) {
            return fail(format!("hit threshold must be positive, got {}", self.hit_threshold));
        }
        Ok(())
    }
}
