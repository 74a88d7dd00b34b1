//! Video presentation surface.
//!
//! The surface keeps its own playback position, advanced by wall-clock time
//! while playing, and exposes its own play/pause control. The simulated
//! playback clock drives it only through [`VideoCommand`]s and never reads its
//! position back.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use engine::{RasterFrame, ResourceLocator, VideoCommand, Viewport};
use iced::widget::{Space, button, column, container, image, row, text};
use iced::{ContentFit, Element, Length};
use tracing::debug;

use crate::widgets::surface::RasterImage;

/// Poster decode job for the current position.
#[derive(Debug, Clone, PartialEq)]
pub struct PosterRequest {
    pub generation: u64,
    pub path: PathBuf,
    pub at_seconds: f64,
}

#[derive(Debug, Clone)]
pub enum VideoMessage {
    TogglePressed,
    Advance,
    PosterDecoded {
        locator: ResourceLocator,
        generation: u64,
        frame: Option<RasterFrame>,
    },
    DurationProbed {
        locator: ResourceLocator,
        duration: Option<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct VideoSurface {
    locator: ResourceLocator,
    path: PathBuf,
    base_seconds: f64,
    playing_since: Option<Instant>,
    duration: Option<f64>,
    poster: Option<RasterImage>,
    poster_generation: u64,
    poster_pending: bool,
}

impl VideoSurface {
    /// Mounts a surface for the media behind `locator` and requests its first poster.
    pub fn new(locator: ResourceLocator, path: PathBuf) -> (Self, PosterRequest) {
        let mut surface = Self {
            locator,
            path,
            base_seconds: 0.0,
            playing_since: None,
            duration: None,
            poster: None,
            poster_generation: 0,
            poster_pending: false,
        };
        let request = surface.poster_request(0.0);
        (surface, request)
    }

    pub fn locator(&self) -> ResourceLocator {
        self.locator
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    /// Current position in seconds, clamped to the known duration.
    pub fn position(&self, now: Instant) -> f64 {
        let elapsed = self
            .playing_since
            .map(|since| now.saturating_duration_since(since).as_secs_f64())
            .unwrap_or(0.0);
        let position = self.base_seconds + elapsed;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    /// Applies a command from the playback clock.
    pub fn apply(&mut self, command: VideoCommand, now: Instant) -> Option<PosterRequest> {
        debug!(?command, path = %self.path.display(), "video command");
        match command {
            VideoCommand::Seek { seconds } => {
                let target = (seconds.max(0) as f64).min(self.duration.unwrap_or(f64::MAX));
                self.base_seconds = target;
                if self.playing_since.is_some() {
                    self.playing_since = Some(now);
                }
                Some(self.poster_request(target))
            }
            VideoCommand::Play => {
                self.play(now);
                None
            }
            VideoCommand::Pause => {
                self.pause(now);
                None
            }
        }
    }

    /// Handles the surface's own play/pause control.
    pub fn toggle(&mut self, now: Instant) {
        if self.is_playing() {
            self.pause(now);
        } else {
            self.play(now);
        }
    }

    /// Moves playback forward, pausing once the end of the media is reached.
    ///
    /// While playing, requests the frame at the new position unless the
    /// previous frame is still being decoded.
    pub fn advance(&mut self, now: Instant) -> Option<PosterRequest> {
        if let Some(duration) = self.duration {
            if self.is_playing() && self.position(now) >= duration {
                self.pause(now);
            }
        }
        if !self.is_playing() || self.poster_pending {
            return None;
        }
        Some(self.poster_request(self.position(now)))
    }

    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration.filter(|duration| duration.is_finite() && *duration > 0.0);
    }

    /// Stores a decoded poster unless a newer seek has been requested since.
    pub fn set_poster(&mut self, generation: u64, frame: Option<RasterFrame>) {
        if generation != self.poster_generation {
            return;
        }
        self.poster_pending = false;
        if let Some(frame) = frame {
            self.poster = RasterImage::from_frame(generation, &frame);
        }
    }

    pub fn view<'a>(&'a self, viewport: Viewport, now: Instant) -> Element<'a, VideoMessage> {
        let (width, height) = viewport
            .output_size()
            .map(|(width, height)| (Length::Fixed(width as f32), Length::Fixed(height as f32)))
            .unwrap_or((Length::Shrink, Length::Shrink));

        let picture: Element<'a, VideoMessage> = match &self.poster {
            Some(poster) => image(poster.handle.clone())
                .content_fit(ContentFit::Cover)
                .width(width)
                .height(height)
                .into(),
            None => container(Space::new(Length::Shrink, Length::Shrink))
                .width(width)
                .height(height)
                .into(),
        };

        let controls = row![
            button(if self.is_playing() { "❚❚" } else { "▶" })
                .on_press(VideoMessage::TogglePressed),
            text(format_position(self.position(now), self.duration)),
        ]
        .spacing(8);

        column![picture, controls].spacing(4).into()
    }

    fn play(&mut self, now: Instant) {
        if self.playing_since.is_none() {
            self.playing_since = Some(now);
        }
    }

    fn pause(&mut self, now: Instant) {
        self.base_seconds = self.position(now);
        self.playing_since = None;
    }

    fn poster_request(&mut self, at_seconds: f64) -> PosterRequest {
        self.poster_generation += 1;
        self.poster_pending = true;
        PosterRequest {
            generation: self.poster_generation,
            path: self.path.clone(),
            at_seconds,
        }
    }
}

/// Refresh interval of the position readout while playing.
pub const POSITION_REFRESH: Duration = Duration::from_millis(250);

fn format_position(position: f64, duration: Option<f64>) -> String {
    let clock = |seconds: f64| {
        let whole = seconds.max(0.0).floor() as u64;
        format!("{}:{:02}", whole / 60, whole % 60)
    };
    match duration {
        Some(duration) => format!("{} / {}", clock(position), clock(duration)),
        None => clock(position),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use engine::{LocatorRegistry, RasterFrame, ResourceLocator, VideoCommand};

    use super::{VideoSurface, format_position};

    fn locator() -> ResourceLocator {
        LocatorRegistry::default().acquire(Path::new("clip.mp4"))
    }

    fn mounted() -> VideoSurface {
        VideoSurface::new(locator(), PathBuf::from("clip.mp4")).0
    }

    fn frame() -> RasterFrame {
        RasterFrame {
            width: 1,
            height: 1,
            bytes: Arc::from(vec![0_u8; 4]),
        }
    }

    #[test]
    fn mounting_requests_poster_at_zero() {
        let (_, request) = VideoSurface::new(locator(), PathBuf::from("clip.mp4"));

        assert_eq!(request.at_seconds, 0.0);
        assert_eq!(request.path, PathBuf::from("clip.mp4"));
    }

    #[test]
    fn seek_then_play_advances_with_wall_clock() {
        let mut surface = mounted();
        let t0 = Instant::now();

        let request = surface
            .apply(VideoCommand::Seek { seconds: 2 }, t0)
            .expect("seek requests a poster");
        surface.apply(VideoCommand::Play, t0);

        assert_eq!(request.at_seconds, 2.0);
        assert!(surface.is_playing());
        assert_eq!(surface.position(t0 + Duration::from_millis(1_500)), 3.5);
    }

    #[test]
    fn pause_freezes_position() {
        let mut surface = mounted();
        let t0 = Instant::now();
        surface.apply(VideoCommand::Play, t0);

        surface.apply(VideoCommand::Pause, t0 + Duration::from_secs(3));

        assert!(!surface.is_playing());
        assert_eq!(surface.position(t0 + Duration::from_secs(10)), 3.0);
    }

    #[test]
    fn negative_seek_clamps_to_zero() {
        let mut surface = mounted();

        let request = surface
            .apply(VideoCommand::Seek { seconds: -4 }, Instant::now())
            .expect("seek requests a poster");

        assert_eq!(request.at_seconds, 0.0);
    }

    #[test]
    fn native_toggle_is_independent_of_commands() {
        let mut surface = mounted();
        let t0 = Instant::now();

        surface.toggle(t0);
        assert!(surface.is_playing());
        surface.toggle(t0 + Duration::from_secs(1));
        assert!(!surface.is_playing());
        assert_eq!(surface.position(t0 + Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn reaching_duration_pauses_playback() {
        let mut surface = mounted();
        surface.set_duration(Some(2.0));
        let t0 = Instant::now();
        surface.toggle(t0);

        assert_eq!(surface.advance(t0 + Duration::from_secs(3)), None);

        assert!(!surface.is_playing());
        assert_eq!(surface.position(t0 + Duration::from_secs(9)), 2.0);
    }

    #[test]
    fn advancing_while_playing_requests_frame_at_new_position() {
        let (mut surface, first) = VideoSurface::new(locator(), PathBuf::from("clip.mp4"));
        surface.set_poster(first.generation, Some(frame()));
        let t0 = Instant::now();
        surface.toggle(t0);

        let request = surface
            .advance(t0 + Duration::from_millis(1_500))
            .expect("playing surface requests the next frame");

        assert_eq!(request.at_seconds, 1.5);
        assert!(request.generation > first.generation);
    }

    #[test]
    fn advancing_waits_for_pending_frame() {
        let mut surface = mounted();
        let t0 = Instant::now();
        surface.toggle(t0);

        assert_eq!(surface.advance(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn advancing_while_paused_requests_nothing() {
        let (mut surface, first) = VideoSurface::new(locator(), PathBuf::from("clip.mp4"));
        surface.set_poster(first.generation, None);

        assert_eq!(surface.advance(Instant::now()), None);
    }

    #[test]
    fn stale_poster_is_ignored() {
        let mut surface = mounted();
        let first = surface
            .apply(VideoCommand::Seek { seconds: 1 }, Instant::now())
            .expect("seek requests a poster");
        let second = surface
            .apply(VideoCommand::Seek { seconds: 5 }, Instant::now())
            .expect("seek requests a poster");

        surface.set_poster(first.generation, Some(frame()));
        assert!(surface.poster.is_none());

        surface.set_poster(second.generation, Some(frame()));
        assert!(surface.poster.is_some());
    }

    #[test]
    fn position_is_formatted_as_minutes_and_seconds() {
        assert_eq!(format_position(75.4, None), "1:15");
        assert_eq!(format_position(3.0, Some(610.0)), "0:03 / 10:10");
    }
}
