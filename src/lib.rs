//! # Globelet
//!
//! An interactive 3D globe: perspective camera, multi-touch gesture decoding,
//! fling inertia with snap-back, and marker picking.
//!
//! The [`Globe`] controller owns all interaction state on one thread and
//! hands immutable [`RenderSnapshot`]s to a renderer on another. Drawing
//! itself is left to the host; snapshots carry `bytemuck`-ready uniform
//! blocks for that purpose.

pub mod animation;
pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    colors::{Color, GlobeColors, LocationMarkerColors},
    config::{GlobeConfig, InteractionProfile},
    geo::{shortest_target, LatLong, Latitude, Longitude, Point},
    globe::{Globe, GlobeListener, NoopListener},
    view_state::{CameraPosition, GlobeViewState},
};

pub use layers::marker::Marker;

pub use input::{
    events::{PointerBatch, PointerEvent, PointerPhase},
    gestures::{GestureDecoder, GestureEvent},
    tap::{TapEvent, TapRecognizer},
};

pub use animation::{
    inertia::{InertiaAnimator, InertiaPhase},
    velocity::DiffVelocityTracker,
};

pub use rendering::{
    camera::CameraModel,
    frame::{FrameReceiver, GlobeUniforms, MarkerInstance, RenderSnapshot},
};

pub use spatial::index::MarkerIndex;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, GlobeError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum GlobeError {
    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render channel closed")]
    RenderChannelClosed,
}

/// Error type alias for convenience
pub type Error = GlobeError;
