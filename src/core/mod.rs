pub mod colors;
pub mod config;
pub mod constants;
pub mod geo;
pub mod globe;
pub mod view_state;

pub use colors::{Color, GlobeColors, LocationMarkerColors};
pub use config::{GlobeConfig, InteractionProfile, Range, RecenterConfig, TweenConfig};
pub use geo::{LatLong, Latitude, Longitude, Point};
pub use globe::{Globe, GlobeListener, NoopListener};
pub use view_state::{CameraPosition, GlobeViewState, ViewStateChanges};
