use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::RasterFrame;
use crate::clock::{
    ClockEffect, ClockInput, ClockSnapshot, PlaybackClock, StopReason, TimelineWindow,
    VideoCommand,
};
use crate::config::ViewerConfig;
use crate::locator::{LocatorRegistry, ResourceLocator};
use crate::media::{MediaHandle, MediaKind};
use crate::viewport::{RenderRequest, RenderTracker, Viewport};

/// Commands accepted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replaces the loaded media with `path`. Any file is accepted.
    Load {
        path: PathBuf,
    },
    SetWidth(i64),
    SetHeight(i64),
    SetStart(i64),
    SetEnd(i64),
    TogglePlayPause,
    /// One firing of the recurring ticker started by `Event::TickerScheduled`.
    Tick {
        schedule: u64,
    },
    RenderCompleted {
        generation: u64,
        frame: RasterFrame,
    },
    RenderFailed {
        generation: u64,
        message: String,
    },
    /// Cancels the ticker and releases the loaded media.
    Teardown,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MediaChanged(Option<MediaSnapshot>),
    ResourceReleased { locator: ResourceLocator },
    ViewportChanged(Viewport),
    WindowChanged(TimelineWindow),
    ClockChanged(ClockSnapshot),
    /// Start a recurring one-second ticker; any previous ticker is replaced.
    TickerScheduled { schedule: u64 },
    TickerCancelled,
    Video(VideoCommand),
    RenderRequested(RenderRequest),
    /// The raster surface has nothing drawable at the current viewport.
    SurfaceCleared,
    FrameReady { generation: u64, frame: RasterFrame },
}

/// Immutable view of the loaded media consumed by front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaSnapshot {
    pub locator: ResourceLocator,
    pub path: PathBuf,
    pub content_type: &'static str,
    pub kind: MediaKind,
}

impl From<&MediaHandle> for MediaSnapshot {
    fn from(value: &MediaHandle) -> Self {
        Self {
            locator: value.locator,
            path: value.path.clone(),
            content_type: value.content_type,
            kind: value.kind,
        }
    }
}

/// Owner of all viewer state.
///
/// Every mutation goes through [`Engine::handle_command`], which returns the
/// events front ends need to mirror the new state.
///
/// # Example
/// ```
/// use std::path::PathBuf;
///
/// use engine::{Command, Engine, Event, ViewerConfig};
///
/// let mut engine = Engine::new(&ViewerConfig::default());
/// let events = engine.handle_command(Command::Load {
///     path: PathBuf::from("holiday.jpg"),
/// });
/// assert!(events
///     .iter()
///     .any(|event| matches!(event, Event::RenderRequested(request) if request.width == 1200)));
/// ```
#[derive(Debug)]
pub struct Engine {
    media: Option<MediaHandle>,
    locators: LocatorRegistry,
    viewport: Viewport,
    window: TimelineWindow,
    clock: PlaybackClock,
    render: RenderTracker,
}

impl Engine {
    /// Creates an engine seeded from `config`.
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            media: None,
            locators: LocatorRegistry::default(),
            viewport: config.viewport(),
            window: config.window(),
            clock: PlaybackClock::new(config.indicator),
            render: RenderTracker::default(),
        }
    }

    /// Applies one command and returns emitted events. Commands never fail.
    pub fn handle_command(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::Load { path } => self.load(path),
            Command::SetWidth(width) => self.set_viewport(Viewport {
                width,
                ..self.viewport
            }),
            Command::SetHeight(height) => self.set_viewport(Viewport {
                height,
                ..self.viewport
            }),
            Command::SetStart(start) => self.set_window(TimelineWindow {
                start,
                ..self.window
            }),
            Command::SetEnd(end) => self.set_window(TimelineWindow { end, ..self.window }),
            Command::TogglePlayPause => self.drive_clock(ClockInput::TogglePlayPause),
            Command::Tick { schedule } => self.drive_clock(ClockInput::Tick { schedule }),
            Command::RenderCompleted { generation, frame } => {
                self.render_completed(generation, frame)
            }
            Command::RenderFailed {
                generation,
                message,
            } => {
                warn!(generation, %message, "render failed");
                Vec::new()
            }
            Command::Teardown => self.teardown(),
        }
    }

    /// Cancels the ticker and releases the loaded media. Safe to call repeatedly.
    pub fn teardown(&mut self) -> Vec<Event> {
        let mut events = self.drive_clock(ClockInput::Halt(StopReason::Teardown));
        self.render.invalidate();
        if let Some(handle) = self.media.take() {
            events.push(self.release(handle.locator));
            events.push(Event::MediaChanged(None));
        }
        events
    }

    pub fn media(&self) -> Option<MediaSnapshot> {
        self.media.as_ref().map(MediaSnapshot::from)
    }

    pub fn clock(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn window(&self) -> TimelineWindow {
        self.window
    }

    /// Resolves a locator handed out by this engine, if it is still live.
    pub fn resolve(&self, locator: ResourceLocator) -> Option<&Path> {
        self.locators.resolve(locator)
    }

    fn load(&mut self, path: PathBuf) -> Vec<Event> {
        let mut events = self.drive_clock(ClockInput::Halt(StopReason::MediaReplaced));
        if let Some(previous) = self.media.take() {
            events.push(self.release(previous.locator));
        }

        let locator = self.locators.acquire(&path);
        let handle = MediaHandle::new(locator, path);
        info!(
            path = %handle.path.display(),
            %locator,
            content_type = handle.content_type,
            kind = ?handle.kind,
            "media loaded"
        );
        events.push(Event::MediaChanged(Some(MediaSnapshot::from(&handle))));
        self.media = Some(handle);

        match self.request_render() {
            Some(event) => events.push(event),
            None => self.render.invalidate(),
        }
        events
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Vec<Event> {
        self.viewport = viewport;
        let mut events = vec![Event::ViewportChanged(viewport)];
        events.extend(self.request_render());
        events
    }

    fn set_window(&mut self, window: TimelineWindow) -> Vec<Event> {
        self.window = window;
        let mut events = vec![Event::WindowChanged(window)];
        events.extend(self.drive_clock(ClockInput::BoundsChanged));
        events
    }

    /// Issues a render for the loaded image. Returns `None` for video or no media.
    fn request_render(&mut self) -> Option<Event> {
        let handle = self
            .media
            .as_ref()
            .filter(|handle| handle.kind == MediaKind::Image)?;

        match self.render.issue(&handle.path, self.viewport) {
            Some(request) => {
                debug!(
                    generation = request.generation,
                    width = request.width,
                    height = request.height,
                    "render requested"
                );
                Some(Event::RenderRequested(request))
            }
            None => Some(Event::SurfaceCleared),
        }
    }

    fn render_completed(&mut self, generation: u64, frame: RasterFrame) -> Vec<Event> {
        if !self.render.is_current(generation) {
            debug!(generation, "dropping stale render");
            return Vec::new();
        }
        vec![Event::FrameReady { generation, frame }]
    }

    fn drive_clock(&mut self, input: ClockInput) -> Vec<Event> {
        let before = self.clock.snapshot();
        let kind = self.media.as_ref().map(|handle| handle.kind);
        let effects = self.clock.apply(input, self.window, kind);
        let after = self.clock.snapshot();

        let mut events: Vec<Event> = effects
            .into_iter()
            .map(|effect| match effect {
                ClockEffect::ScheduleTicker { schedule } => Event::TickerScheduled { schedule },
                ClockEffect::CancelTicker => Event::TickerCancelled,
                ClockEffect::Video(command) => Event::Video(command),
            })
            .collect();
        if after != before {
            events.push(Event::ClockChanged(after));
        }
        events
    }

    fn release(&mut self, locator: ResourceLocator) -> Event {
        let released = self.locators.release(locator);
        debug_assert!(released, "active media locator was not live");
        debug!(%locator, "resource released");
        Event::ResourceReleased { locator }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}
