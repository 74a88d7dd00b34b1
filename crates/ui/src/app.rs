use std::path::PathBuf;
use std::sync::mpsc::TrySendError;
use std::time::{Duration, Instant};

use engine::{
    ClockSnapshot, Command, Event, FfmpegMediaBackend, MediaBackend, MediaKind, MediaSnapshot,
    ResourceLocator, ViewerConfig, Viewport, picker_extensions,
};
use iced::widget::{container, row};
use iced::{Element, Length, Subscription, Task, time, window};
use tracing::{debug, info, warn};

use crate::bridge::{BridgeEvent, EngineCommandSender, engine_subscription, run_blocking};
use crate::widgets::controls::{self, NumericFields, PanelMessage};
use crate::widgets::surface::{self, RasterSurface};
use crate::widgets::video::{POSITION_REFRESH, PosterRequest, VideoMessage, VideoSurface};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// UI messages handled by the iced app update loop.
#[derive(Debug, Clone)]
pub enum Message {
    Panel(PanelMessage),
    FilePicked(Option<PathBuf>),
    ClockTick { schedule: u64 },
    Video(VideoMessage),
    Bridge(BridgeEvent),
    CloseRequested(window::Id),
}

/// Root UI state mirroring the engine.
pub struct AppState {
    engine_tx: Option<EngineCommandSender>,
    pending: Vec<Command>,
    config: ViewerConfig,
    media: Option<MediaSnapshot>,
    fields: NumericFields,
    viewport: Viewport,
    clock: ClockSnapshot,
    ticker: Option<u64>,
    raster: RasterSurface,
    video: Option<VideoSurface>,
    status: String,
    closing: bool,
}

impl AppState {
    /// Returns the iced initializer; `initial` is loaded as soon as the engine is ready.
    pub fn boot(
        config: ViewerConfig,
        initial: Option<PathBuf>,
    ) -> impl FnOnce() -> (Self, Task<Message>) {
        move || {
            let mut state = Self::new(config);
            state.status = String::from("starting engine bridge");
            if let Some(path) = initial {
                state.pending.push(Command::Load { path });
            }
            (state, Task::none())
        }
    }

    fn new(config: ViewerConfig) -> Self {
        Self {
            engine_tx: None,
            pending: Vec::new(),
            fields: NumericFields::from_config(&config),
            viewport: config.viewport(),
            config,
            media: None,
            clock: ClockSnapshot::default(),
            ticker: None,
            raster: RasterSurface::default(),
            video: None,
            status: String::new(),
            closing: false,
        }
    }

    /// Handles one UI message.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Panel(PanelMessage::ImportPressed) => {
                return Task::perform(pick_media_file(), Message::FilePicked);
            }
            Message::Panel(PanelMessage::PlayPausePressed) => {
                self.send_command(Command::TogglePlayPause);
            }
            Message::Panel(PanelMessage::FieldChanged(field, text)) => {
                if let Some(command) = self.fields.set(field, text) {
                    self.send_command(command);
                }
            }
            Message::FilePicked(Some(path)) => {
                self.status = format!("loading {}", path.display());
                self.send_command(Command::Load { path });
            }
            Message::FilePicked(None) => {}
            Message::ClockTick { schedule } => {
                self.send_command(Command::Tick { schedule });
            }
            Message::Video(message) => return self.update_video(message),
            Message::Bridge(BridgeEvent::Ready(sender)) => {
                self.engine_tx = Some(sender);
                self.status = String::from("engine ready");
                for command in std::mem::take(&mut self.pending) {
                    self.send_command(command);
                }
            }
            Message::Bridge(BridgeEvent::Event(event)) => {
                return self.apply_engine_event(event);
            }
            Message::Bridge(BridgeEvent::Disconnected) => {
                self.engine_tx = None;
                self.ticker = None;
                if self.closing {
                    return iced::exit();
                }
                self.status = String::from("engine event channel closed");
            }
            Message::CloseRequested(id) => {
                debug!(?id, "close requested");
                self.closing = true;
                if !self.send_command(Command::Teardown) {
                    return iced::exit();
                }
            }
        }

        Task::none()
    }

    fn update_video(&mut self, message: VideoMessage) -> Task<Message> {
        let Some(video) = self.video.as_mut() else {
            return Task::none();
        };
        let now = Instant::now();

        match message {
            VideoMessage::TogglePressed => video.toggle(now),
            VideoMessage::Advance => {
                if let Some(request) = video.advance(now) {
                    return decode_poster(video.locator(), request);
                }
            }
            VideoMessage::PosterDecoded {
                locator,
                generation,
                frame,
            } => {
                if locator == video.locator() {
                    video.set_poster(generation, frame);
                }
            }
            VideoMessage::DurationProbed { locator, duration } => {
                if locator == video.locator() {
                    video.set_duration(duration);
                }
            }
        }

        Task::none()
    }

    /// Sends a command, queueing it while the engine is still starting.
    fn send_command(&mut self, command: Command) -> bool {
        let Some(sender) = &self.engine_tx else {
            if self.closing {
                return false;
            }
            self.pending.push(command);
            self.status = String::from("engine is not ready");
            return true;
        };

        match sender.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.status = String::from("engine command queue is full");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.status = String::from("engine command channel closed");
                self.engine_tx = None;
                false
            }
        }
    }

    fn apply_engine_event(&mut self, event: Event) -> Task<Message> {
        match event {
            Event::MediaChanged(Some(media)) => {
                self.status = format!("{} ({})", media.path.display(), media.content_type);
                let task = match media.kind {
                    MediaKind::Image => {
                        self.video = None;
                        Task::none()
                    }
                    MediaKind::Video => {
                        self.raster.clear();
                        let (video, poster) = VideoSurface::new(media.locator, media.path.clone());
                        info!(path = %video.path().display(), "video surface mounted");
                        self.video = Some(video);
                        Task::batch([
                            decode_poster(media.locator, poster),
                            probe_duration(media.locator, media.path.clone()),
                        ])
                    }
                };
                self.media = Some(media);
                return task;
            }
            Event::MediaChanged(None) => {
                self.media = None;
                self.video = None;
                self.raster.clear();
            }
            Event::ResourceReleased { locator } => {
                debug!(%locator, "resource released");
            }
            Event::ViewportChanged(viewport) => {
                self.viewport = viewport;
            }
            Event::WindowChanged(window) => {
                debug!(start = window.start, end = window.end, "window changed");
            }
            Event::ClockChanged(clock) => {
                self.clock = clock;
            }
            Event::TickerScheduled { schedule } => {
                self.ticker = Some(schedule);
            }
            Event::TickerCancelled => {
                self.ticker = None;
            }
            Event::Video(command) => {
                let Some(video) = self.video.as_mut() else {
                    return Task::none();
                };
                if let Some(poster) = video.apply(command, Instant::now()) {
                    return decode_poster(video.locator(), poster);
                }
            }
            Event::RenderRequested(request) => {
                debug!(
                    generation = request.generation,
                    width = request.width,
                    height = request.height,
                    "waiting for render"
                );
            }
            Event::SurfaceCleared => {
                self.raster.clear();
            }
            Event::FrameReady { generation, frame } => {
                self.raster.show(generation, &frame);
            }
        }

        Task::none()
    }

    /// Renders the UI tree.
    pub fn view(&self) -> Element<'_, Message> {
        let panel = controls::view(
            &self.fields,
            &self.clock,
            self.media.as_ref().map(|media| media.kind),
            &self.status,
        )
        .map(Message::Panel);

        let canvas: Element<'_, Message> = match &self.video {
            Some(video) => video
                .view(self.viewport, Instant::now())
                .map(Message::Video),
            None => surface::view(&self.raster),
        };

        row![
            panel,
            container(canvas)
                .padding(16)
                .width(Length::Fill)
                .height(Length::Fill)
        ]
        .into()
    }

    /// Engine bridge, the recurring tick while playing, video refresh and close requests.
    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            engine_subscription(&self.config).map(Message::Bridge),
            window::close_requests().map(Message::CloseRequested),
        ];

        if let Some(schedule) = self.ticker {
            subscriptions.push(
                time::every(TICK_INTERVAL)
                    .with(schedule)
                    .map(|(schedule, _)| Message::ClockTick { schedule }),
            );
        }

        if self.video.as_ref().is_some_and(VideoSurface::is_playing) {
            subscriptions.push(
                time::every(POSITION_REFRESH).map(|_| Message::Video(VideoMessage::Advance)),
            );
        }

        Subscription::batch(subscriptions)
    }

    #[cfg(test)]
    fn from_sender_for_test(engine_tx: EngineCommandSender) -> Self {
        let mut state = Self::new(ViewerConfig::default());
        state.engine_tx = Some(engine_tx);
        state.status = String::from("idle");
        state
    }
}

async fn pick_media_file() -> Option<PathBuf> {
    let images = picker_extensions(MediaKind::Image);
    let videos = picker_extensions(MediaKind::Video);
    let all: Vec<&str> = images.iter().chain(videos.iter()).copied().collect();

    rfd::AsyncFileDialog::new()
        .set_title("Import Media")
        .add_filter("Images and videos", all.as_slice())
        .add_filter("Images", images.as_slice())
        .add_filter("Videos", videos.as_slice())
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

fn decode_poster(locator: ResourceLocator, request: PosterRequest) -> Task<Message> {
    let PosterRequest {
        generation,
        path,
        at_seconds,
    } = request;

    Task::perform(
        run_blocking(move || {
            FfmpegMediaBackend
                .decode_poster(&path, at_seconds)
                .inspect_err(|error| {
                    warn!(path = %path.display(), at_seconds, %error, "poster decode failed");
                })
                .ok()
        }),
        move |frame| {
            Message::Video(VideoMessage::PosterDecoded {
                locator,
                generation,
                frame: frame.flatten(),
            })
        },
    )
}

fn probe_duration(locator: ResourceLocator, path: PathBuf) -> Task<Message> {
    Task::perform(
        run_blocking(move || {
            FfmpegMediaBackend
                .media_duration(&path)
                .inspect_err(|error| {
                    warn!(path = %path.display(), %error, "duration probe failed");
                })
                .ok()
                .flatten()
        }),
        move |duration| {
            Message::Video(VideoMessage::DurationProbed {
                locator,
                duration: duration.flatten(),
            })
        },
    )
}
