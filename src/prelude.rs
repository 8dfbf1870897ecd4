pub use crate::core::{
    colors::{Color, GlobeColors, LocationMarkerColors},
    config::{GlobeConfig, InteractionProfile},
    geo::{LatLong, Point},
    globe::{Globe, GlobeListener, NoopListener},
    view_state::{CameraPosition, GlobeViewState},
};

pub use crate::input::{PointerBatch, PointerEvent, PointerPhase};

pub use crate::layers::marker::Marker;

pub use crate::rendering::frame::{FrameReceiver, RenderSnapshot};

pub use crate::{Error as GlobeError, Result};

pub use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
