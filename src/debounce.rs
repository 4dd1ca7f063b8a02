//! Event debouncing: per-frame gesture labels to discrete actions.
//!
//! Holds no state of its own; everything that must survive between frames
//! lives in [`TimerState`], which the pipeline owns and passes in by
//! reference. All timestamps are caller-supplied monotonic [`Duration`]s
//! (time since session start), so tests drive time synthetically.

use std::time::Duration;
use tracing::{debug, trace};

use crate::action::{ActionEvent, ActionKind};
use crate::config::{PointerConfig, TimingConfig};
use crate::gesture::{Classification, Gesture};
use crate::mode::Mode;
use crate::pointer::ScreenPoint;

// ── Cooldowns ──────────────────────────────────────────────

/// Last-fired timestamps and minimum re-fire intervals per action kind
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    cooldowns: [Duration; 5],
    last_fired: [Option<Duration>; 5],
}

impl CooldownTracker {
    pub fn new(timing: &TimingConfig) -> Self {
        let mut tracker = Self {
            cooldowns: [Duration::ZERO; 5],
            last_fired: [None; 5],
        };
        tracker.set_cooldowns(timing);
        tracker
    }

    /// Replace the intervals, keeping last-fired times
    pub fn set_cooldowns(&mut self, timing: &TimingConfig) {
        let ms = |kind| match kind {
            ActionKind::ClickLeft => timing.click_cooldown_ms,
            ActionKind::ClickRight => timing.right_click_cooldown_ms,
            ActionKind::KeyPress => timing.key_press_cooldown_ms,
            ActionKind::ToggleMode => timing.toggle_cooldown_ms,
            ActionKind::Scroll => timing.scroll_cooldown_ms,
        };
        for kind in ActionKind::ALL {
            self.cooldowns[kind.index()] = Duration::from_millis(ms(kind));
        }
    }

    pub fn cooldown(&self, kind: ActionKind) -> Duration {
        self.cooldowns[kind.index()]
    }

    pub fn last_fired(&self, kind: ActionKind) -> Option<Duration> {
        self.last_fired[kind.index()]
    }

    /// Whether `kind` may fire at `now`
    pub fn is_ready(&self, kind: ActionKind, now: Duration) -> bool {
        match self.last_fired[kind.index()] {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.cooldowns[kind.index()] && now >= last,
        }
    }

    /// Fire `kind` if its cooldown has elapsed, stamping `now` on success
    pub fn try_fire(&mut self, kind: ActionKind, now: Duration) -> bool {
        if !self.is_ready(kind, now) {
            trace!("{:?} suppressed by cooldown", kind);
            return false;
        }
        self.last_fired[kind.index()] = Some(now);
        true
    }
}

// ── Pinch tracking ─────────────────────────────────────────

/// Pinch transition observed on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchPhase {
    Idle,
    Began,
    Held,
    Released,
}

/// Hold timer of the current pinch
#[derive(Debug, Clone, Copy, Default)]
pub struct PinchTracker {
    started: Option<Duration>,
    last_seen: Duration,
    dragging: bool,
}

impl PinchTracker {
    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Hold time from pinch-begin to the latest pinch frame
    pub fn held_for(&self) -> Duration {
        self.started
            .map(|start| self.last_seen.saturating_sub(start))
            .unwrap_or_default()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Timer state ────────────────────────────────────────────

/// All inter-frame timing state of one pipeline
#[derive(Debug, Clone)]
pub struct TimerState {
    pub cooldowns: CooldownTracker,
    pub pinch: PinchTracker,
    /// Previous ScrollPose frame's index-tip y
    pub scroll_baseline: Option<f64>,
}

impl TimerState {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            cooldowns: CooldownTracker::new(timing),
            pinch: PinchTracker::default(),
            scroll_baseline: None,
        }
    }
}

// ── Debouncer ──────────────────────────────────────────────

/// What the debouncer decided for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceOutput {
    pub event: Option<ActionEvent>,
    pub pinch: PinchPhase,
}

/// Turns labels into at most one discrete event per frame
#[derive(Debug, Clone)]
pub struct EventDebouncer {
    drag_hold: Duration,
    scroll_scale: f64,
    scroll_deadband_px: f64,
}

impl EventDebouncer {
    pub fn new(timing: &TimingConfig, pointer: &PointerConfig) -> Self {
        Self {
            drag_hold: timing.drag_hold(),
            scroll_scale: pointer.scroll_scale,
            scroll_deadband_px: pointer.scroll_deadband_px,
        }
    }

    /// Process one classified frame
    ///
    /// In keyboard mode the pointer-only kinds (clicks, drags, scroll) are
    /// never fired, so their cooldowns stay untouched for the return to
    /// mouse mode. Pinch phases are still reported.
    ///
    /// # Arguments
    /// * `mode` - Current interaction mode
    /// * `timers` - Timer state owned by the pipeline
    /// * `frame` - Classifier output for this frame
    /// * `pointer` - Smoothed pointer position, if this frame moved the pointer
    /// * `now` - Monotonic frame timestamp
    pub fn process(
        &self,
        mode: Mode,
        timers: &mut TimerState,
        frame: &Classification,
        pointer: Option<ScreenPoint>,
        now: Duration,
    ) -> DebounceOutput {
        let scroll_dy = self.track_scroll(timers, &frame.gesture);
        let pointer_live = mode == Mode::Mouse;
        let (pinch, release_or_drag) = self.track_pinch(timers, frame, pointer, pointer_live, now);

        // Release/drag events win the frame; the new label is evaluated next frame
        if release_or_drag.is_some() || matches!(pinch, PinchPhase::Began | PinchPhase::Held) {
            return DebounceOutput {
                event: release_or_drag,
                pinch,
            };
        }

        let event = match frame.gesture {
            Gesture::RightClickPose | Gesture::ScrollPose { .. } if !pointer_live => None,
            Gesture::RightClickPose => timers
                .cooldowns
                .try_fire(ActionKind::ClickRight, now)
                .then_some(ActionEvent::ClickRight),
            Gesture::ScrollPose { .. } => scroll_dy
                .filter(|_| timers.cooldowns.try_fire(ActionKind::Scroll, now))
                .map(|dy| ActionEvent::ScrollBy { dy }),
            Gesture::Fist => Some(ActionEvent::Pause),
            Gesture::ThreeFingerPose => timers
                .cooldowns
                .try_fire(ActionKind::ToggleMode, now)
                .then_some(ActionEvent::ToggleMode),
            Gesture::None | Gesture::Point | Gesture::Pinch => None,
        };

        DebounceOutput { event, pinch }
    }

    /// Click-vs-drag state machine
    fn track_pinch(
        &self,
        timers: &mut TimerState,
        frame: &Classification,
        pointer: Option<ScreenPoint>,
        pointer_live: bool,
        now: Duration,
    ) -> (PinchPhase, Option<ActionEvent>) {
        let tracker = &mut timers.pinch;

        match (tracker.is_active(), frame.gesture.is_pinch()) {
            (false, false) => (PinchPhase::Idle, None),
            (false, true) => {
                tracker.started = Some(now);
                tracker.last_seen = now;
                tracker.dragging = false;
                trace!("Pinch began");
                (PinchPhase::Began, None)
            }
            (true, true) => {
                tracker.last_seen = now;
                let event = if tracker.dragging {
                    pointer.map(|p| ActionEvent::DragMove { x: p.x, y: p.y })
                } else if pointer_live && tracker.held_for() >= self.drag_hold {
                    tracker.dragging = true;
                    debug!("Pinch held {:?}, starting drag", tracker.held_for());
                    Some(ActionEvent::DragStart)
                } else {
                    None
                };
                (PinchPhase::Held, event)
            }
            (true, false) => {
                let was_dragging = tracker.dragging;
                let held = tracker.held_for();
                tracker.reset();

                let event = if was_dragging {
                    Some(ActionEvent::DragEnd)
                } else if !frame.hand_present() {
                    debug!("Hand lost mid-pinch after {:?}, discarding click", held);
                    None
                } else if !pointer_live {
                    None
                } else if timers.cooldowns.try_fire(ActionKind::ClickLeft, now) {
                    Some(ActionEvent::ClickLeft)
                } else {
                    None
                };
                (PinchPhase::Released, event)
            }
        }
    }

    /// Advance the scroll baseline; returns a scroll amount worth emitting
    fn track_scroll(&self, timers: &mut TimerState, gesture: &Gesture) -> Option<i32> {
        let Gesture::ScrollPose { index_y } = *gesture else {
            timers.scroll_baseline = None;
            return None;
        };

        let prev = timers.scroll_baseline.replace(index_y)?;
        // Image y grows downward: moving the hand up gives a positive delta
        let raw = prev - index_y;
        if raw.abs() <= self.scroll_deadband_px {
            return None;
        }

        let dy = (raw * self.scroll_scale).round() as i32;
        (dy != 0).then_some(dy)
    }
}
