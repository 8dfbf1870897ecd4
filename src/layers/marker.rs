use crate::core::{colors::LocationMarkerColors, constants::DEFAULT_MARKER_SIZE, geo::LatLong};
use serde::{Deserialize, Serialize};

/// A point of interest drawn on the globe
///
/// The `id` is opaque to the engine. Markers without an id are drawn but can
/// never be picked by a tap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub lat_long: LatLong,
    pub size: f64,
    pub colors: LocationMarkerColors,
    pub id: Option<String>,
}

impl Marker {
    pub fn new(lat_long: LatLong, colors: LocationMarkerColors) -> Self {
        Self {
            lat_long,
            size: DEFAULT_MARKER_SIZE,
            colors,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn is_selectable(&self) -> bool {
        self.id.is_some()
    }
}
