use crate::core::{
    colors::GlobeColors,
    constants::{DEFAULT_FIELD_OF_VIEW, DEFAULT_VERTICAL_BIAS, DEFAULT_ZOOM},
    geo::LatLong,
};
use crate::layers::marker::Marker;
use serde::{Deserialize, Serialize};

/// Where the camera is looking from
///
/// `zoom` is the eye's distance from the globe center. Bounds on it are the
/// animation layer's job, this type carries whatever it is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub lat_long: LatLong,
    pub zoom: f64,
    /// Fraction of the viewport height, from the top, where the look-at target is drawn
    pub vertical_bias: f64,
    /// Vertical field of view in degrees
    pub field_of_view: f64,
}

impl CameraPosition {
    pub fn new(lat_long: LatLong) -> Self {
        Self {
            lat_long,
            zoom: DEFAULT_ZOOM,
            vertical_bias: DEFAULT_VERTICAL_BIAS,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_vertical_bias(mut self, vertical_bias: f64) -> Self {
        self.vertical_bias = vertical_bias;
        self
    }

    pub fn with_field_of_view(mut self, field_of_view: f64) -> Self {
        self.field_of_view = field_of_view;
        self
    }
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::new(LatLong::default())
    }
}

/// Everything the host application hands to the globe in one update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobeViewState {
    pub camera_position: CameraPosition,
    pub markers: Vec<Marker>,
    pub colors: GlobeColors,
}

impl GlobeViewState {
    pub fn new(camera_position: CameraPosition, markers: Vec<Marker>, colors: GlobeColors) -> Self {
        Self {
            camera_position,
            markers,
            colors,
        }
    }
}

/// Which parts of a view state changed between two updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewStateChanges {
    pub target: bool,
    pub framing: bool,
    pub markers: bool,
    pub colors: bool,
}

impl ViewStateChanges {
    pub fn between(old: &GlobeViewState, new: &GlobeViewState) -> Self {
        let old_camera = &old.camera_position;
        let new_camera = &new.camera_position;
        Self {
            target: old_camera.lat_long != new_camera.lat_long,
            framing: old_camera.zoom != new_camera.zoom
                || old_camera.vertical_bias != new_camera.vertical_bias
                || old_camera.field_of_view != new_camera.field_of_view,
            markers: old.markers != new.markers,
            colors: old.colors != new.colors,
        }
    }

    pub fn any(&self) -> bool {
        self.target || self.framing || self.markers || self.colors
    }
}
