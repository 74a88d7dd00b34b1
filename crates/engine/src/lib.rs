//! UI-agnostic state engine for the media canvas viewer.

pub mod api;
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod locator;
pub mod media;
pub mod viewport;

pub use api::{Command, Engine, Event, MediaSnapshot};
pub use backend::{FfmpegMediaBackend, MediaBackend, RasterFrame};
pub use clock::{
    ClockPhase, ClockSnapshot, IndicatorPolicy, StopReason, TimelineWindow, VideoCommand,
};
pub use config::ViewerConfig;
pub use error::{EngineError, Result};
pub use input::coerce_number;
pub use locator::{LocatorRegistry, ResourceLocator};
pub use media::{MediaHandle, MediaKind, content_type_for_path, picker_extensions};
pub use viewport::{RenderRequest, RenderTracker, Viewport};
