//! Simulated playback clock.
//!
//! The clock counts whole seconds from `start` towards `end` of a
//! [`TimelineWindow`]. It never reads the video surface's own position; it only
//! emits one-way [`VideoCommand`]s for it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::media::MediaKind;

/// Bounds of simulated playback in whole seconds. `end >= start` is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimelineWindow {
    pub start: i64,
    pub end: i64,
}

/// Why the clock left the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    Boundary,
    Manual,
    MediaReplaced,
    Teardown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockPhase {
    #[default]
    Idle,
    Running,
    Stopped(StopReason),
}

/// Whether a manual pause hides the time readout.
///
/// Reaching `end` always hides it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorPolicy {
    #[default]
    KeepOnManualPause,
    HideOnAnyStop,
}

/// Commands for the video presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoCommand {
    Seek { seconds: i64 },
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockInput {
    TogglePlayPause,
    /// One firing of the recurring ticker identified by `schedule`.
    Tick {
        schedule: u64,
    },
    BoundsChanged,
    Halt(StopReason),
}

/// Side effects requested by a clock transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEffect {
    ScheduleTicker { schedule: u64 },
    CancelTicker,
    Video(VideoCommand),
}

/// Read-only view of the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    pub phase: ClockPhase,
    pub current: Option<i64>,
    pub indicator_visible: bool,
    /// Live ticker schedule while running.
    pub ticker: Option<u64>,
}

impl ClockSnapshot {
    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    /// Text of the time readout, or `None` while the indicator is hidden.
    pub fn readout(&self) -> Option<String> {
        if !self.indicator_visible {
            return None;
        }
        self.current.map(|current| format!("Time: {current}s"))
    }
}

/// Playback clock state machine.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    phase: ClockPhase,
    current: Option<i64>,
    indicator_visible: bool,
    schedule: u64,
    policy: IndicatorPolicy,
}

impl PlaybackClock {
    pub fn new(policy: IndicatorPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            phase: self.phase,
            current: self.current,
            indicator_visible: self.indicator_visible,
            ticker: self.is_running().then_some(self.schedule),
        }
    }

    /// Applies one input. `window` is read at call time, never cached.
    ///
    /// # Example
    /// ```
    /// use engine::clock::{ClockEffect, ClockInput, PlaybackClock, TimelineWindow};
    ///
    /// let window = TimelineWindow { start: 2, end: 3 };
    /// let mut clock = PlaybackClock::default();
    /// let effects = clock.apply(ClockInput::TogglePlayPause, window, None);
    /// let [ClockEffect::ScheduleTicker { schedule }] = effects.as_slice() else {
    ///     panic!("play schedules a ticker");
    /// };
    /// let schedule = *schedule;
    ///
    /// clock.apply(ClockInput::Tick { schedule }, window, None);
    /// assert_eq!(clock.snapshot().current, Some(3));
    /// clock.apply(ClockInput::Tick { schedule }, window, None);
    /// assert!(!clock.is_running());
    /// ```
    pub fn apply(
        &mut self,
        input: ClockInput,
        window: TimelineWindow,
        kind: Option<MediaKind>,
    ) -> Vec<ClockEffect> {
        match input {
            ClockInput::TogglePlayPause if self.is_running() => {
                self.stop(StopReason::Manual, kind)
            }
            ClockInput::TogglePlayPause => self.start(window, kind),
            ClockInput::Tick { schedule } => self.tick(schedule, window, kind),
            ClockInput::BoundsChanged if self.is_running() => {
                self.schedule += 1;
                debug!(schedule = self.schedule, ?window, "ticker rescheduled");
                vec![ClockEffect::ScheduleTicker {
                    schedule: self.schedule,
                }]
            }
            ClockInput::BoundsChanged => Vec::new(),
            ClockInput::Halt(reason) if self.is_running() => self.stop(reason, kind),
            ClockInput::Halt(_) => {
                self.indicator_visible = false;
                Vec::new()
            }
        }
    }

    fn start(&mut self, window: TimelineWindow, kind: Option<MediaKind>) -> Vec<ClockEffect> {
        self.phase = ClockPhase::Running;
        self.current = Some(window.start);
        self.indicator_visible = true;
        self.schedule += 1;
        info!(
            start = window.start,
            end = window.end,
            schedule = self.schedule,
            "playback started"
        );

        let mut effects = Vec::with_capacity(3);
        if kind == Some(MediaKind::Video) {
            effects.push(ClockEffect::Video(VideoCommand::Seek {
                seconds: window.start,
            }));
            effects.push(ClockEffect::Video(VideoCommand::Play));
        }
        effects.push(ClockEffect::ScheduleTicker {
            schedule: self.schedule,
        });
        effects
    }

    fn tick(
        &mut self,
        schedule: u64,
        window: TimelineWindow,
        kind: Option<MediaKind>,
    ) -> Vec<ClockEffect> {
        if !self.is_running() || schedule != self.schedule {
            debug!(schedule, live = self.schedule, "ignoring stale tick");
            return Vec::new();
        }

        match self.current {
            Some(current) if current >= window.end => self.stop(StopReason::Boundary, kind),
            Some(current) => {
                self.current = Some(current.saturating_add(1));
                Vec::new()
            }
            None => {
                self.current = Some(window.start);
                Vec::new()
            }
        }
    }

    fn stop(&mut self, reason: StopReason, kind: Option<MediaKind>) -> Vec<ClockEffect> {
        self.phase = ClockPhase::Stopped(reason);
        self.indicator_visible = match reason {
            StopReason::Manual => {
                self.indicator_visible && self.policy == IndicatorPolicy::KeepOnManualPause
            }
            StopReason::Boundary | StopReason::MediaReplaced | StopReason::Teardown => false,
        };
        info!(?reason, current = ?self.current, "playback stopped");

        let mut effects = vec![ClockEffect::CancelTicker];
        if kind == Some(MediaKind::Video) {
            effects.push(ClockEffect::Video(VideoCommand::Pause));
        }
        effects
    }
}
