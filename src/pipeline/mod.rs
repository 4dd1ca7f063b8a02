//! Frame pipeline: landmarks in, routed action events out.
//!
//! One [`GesturePipeline`] is one session. It owns every piece of mutable
//! state (timers, mode, smoothing memory, press-candidate) and is advanced
//! only through [`GesturePipeline::process`], one frame at a time. Nothing
//! here blocks or reads a clock; the caller supplies monotonic timestamps.
//!
//! Per frame:
//!
//! 1. Validate input (malformed frames change nothing)
//! 2. Classify the hand pose
//! 3. Advance the pointer filter when the label moves the pointer
//! 4. Debounce the label into at most one discrete event
//! 5. Route by mode: cursor motion in Mouse mode, hover/commit in Keyboard mode

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

use crate::action::ActionEvent;
use crate::config::AppConfig;
use crate::debounce::{EventDebouncer, TimerState};
use crate::error::PipelineError;
use crate::gesture::{Classification, Gesture, GestureClassifier};
use crate::keyboard::{Key, KeyLayout, VirtualKeyboard};
use crate::landmarks::{FrameSize, Landmark, LandmarkFrame};
use crate::mode::{Mode, ModeController};
use crate::pointer::{PointerFilter, ScreenPoint};

/// Read-only view of pipeline state for an overlay renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySnapshot {
    pub mode: Mode,
    pub gesture: Gesture,
    pub hovered_key: Option<Key>,
    pub committed_key: Option<Key>,
    /// Thumb/index tip distance of the last frame with a hand
    pub pinch_distance: Option<f64>,
    pub dragging: bool,
}

/// Result of one pipeline pass
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Events for the action sink, in emission order
    pub actions: Vec<ActionEvent>,
    pub snapshot: OverlaySnapshot,
}

/// Labels whose frames carry a pointer position
fn moves_pointer(gesture: &Gesture) -> bool {
    matches!(
        gesture,
        Gesture::Point | Gesture::Pinch | Gesture::RightClickPose | Gesture::None
    )
}

/// The gesture-to-action pipeline
#[derive(Debug, Clone)]
pub struct GesturePipeline {
    classifier: GestureClassifier,
    debouncer: EventDebouncer,
    timers: TimerState,
    filter: PointerFilter,
    modes: ModeController,
    keyboard: VirtualKeyboard,
    last_gesture: Gesture,
    last_pinch_distance: Option<f64>,
    frames: u64,
}

impl GesturePipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            classifier: GestureClassifier::new(config.gesture.clone()),
            debouncer: EventDebouncer::new(&config.timing, &config.pointer),
            timers: TimerState::new(&config.timing),
            filter: PointerFilter::new(&config.pointer, &config.screen),
            modes: ModeController::new(),
            keyboard: VirtualKeyboard::new(KeyLayout::qwerty(&config.screen, &config.keyboard)),
            last_gesture: Gesture::None,
            last_pinch_distance: None,
            frames: 0,
        }
    }

    /// Swap tunables between frames
    ///
    /// Mode, cooldown timestamps, the pinch timer and smoothing memory are
    /// kept. The key layout is rebuilt, which clears the hover state.
    pub fn apply_config(&mut self, config: &AppConfig) {
        self.classifier = GestureClassifier::new(config.gesture.clone());
        self.debouncer = EventDebouncer::new(&config.timing, &config.pointer);
        self.timers.cooldowns.set_cooldowns(&config.timing);
        self.filter.reconfigure(&config.pointer, &config.screen);
        self.keyboard
            .set_layout(KeyLayout::qwerty(&config.screen, &config.keyboard));
        debug!("Pipeline reconfigured");
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn keyboard(&self) -> &VirtualKeyboard {
        &self.keyboard
    }

    pub fn timers(&self) -> &TimerState {
        &self.timers
    }

    /// Last smoothed pointer position
    pub fn pointer(&self) -> Option<ScreenPoint> {
        self.filter.last()
    }

    /// Frames successfully processed so far
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            mode: self.modes.mode(),
            gesture: self.last_gesture,
            hovered_key: self.keyboard.hovered(),
            committed_key: self.keyboard.committed(),
            pinch_distance: self.last_pinch_distance,
            dragging: self.timers.pinch.is_dragging(),
        }
    }

    /// Run one frame through the pipeline
    ///
    /// # Arguments
    /// * `landmarks` - 21 hand landmarks in frame pixels, or `None` without a hand
    /// * `frame` - Camera frame dimensions
    /// * `now` - Monotonic timestamp of the frame
    ///
    /// # Errors
    /// Malformed input is rejected before any state changes.
    pub fn process(
        &mut self,
        landmarks: Option<&[Landmark]>,
        frame: FrameSize,
        now: Duration,
    ) -> Result<FrameOutput, PipelineError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(PipelineError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }
        let hand = landmarks.map(LandmarkFrame::from_slice).transpose()?;

        let classification = self.classifier.classify(hand.as_ref());
        if classification.gesture != self.last_gesture {
            debug!(
                "Gesture: {} -> {}",
                self.last_gesture.as_str(),
                classification.gesture.as_str()
            );
        }

        let pointer = self.advance_pointer(&classification, frame);
        let was_dragging = self.timers.pinch.is_dragging();
        let debounced = self
            .debouncer
            .process(self.modes.mode(), &mut self.timers, &classification, pointer, now);

        let mut actions = Vec::new();
        match self.modes.mode() {
            Mode::Mouse => {
                // While dragging the debouncer carries the position as DragMove
                if let (Some(p), false) = (pointer, was_dragging) {
                    actions.push(ActionEvent::MoveTo { x: p.x, y: p.y });
                }
            }
            Mode::Keyboard => {
                let hover = if classification.hand_present() {
                    pointer.or(self.filter.last())
                } else {
                    None
                };
                actions.extend(self.keyboard.update(
                    hover,
                    debounced.pinch,
                    &mut self.timers.cooldowns,
                    now,
                ));
            }
        }

        if let Some(event) = debounced.event.and_then(|e| self.modes.route(e)) {
            if event == ActionEvent::ToggleMode {
                // Overlays track hover by change; tell them the highlight is gone
                if self.keyboard.hovered().is_some() {
                    actions.push(ActionEvent::KeyHover { key: None });
                }
                self.keyboard.reset();
            }
            actions.push(event);
        }

        self.last_gesture = classification.gesture;
        if let Some(m) = &classification.measurements {
            self.last_pinch_distance = Some(m.pinch_distance);
        }
        self.frames += 1;

        Ok(FrameOutput {
            actions,
            snapshot: self.snapshot(),
        })
    }

    /// Feed the filter on pointer-moving frames
    fn advance_pointer(
        &mut self,
        classification: &Classification,
        frame: FrameSize,
    ) -> Option<ScreenPoint> {
        let m = classification.measurements.as_ref()?;
        if !moves_pointer(&classification.gesture) {
            return None;
        }
        let p = self.filter.update(&m.index_tip, frame);
        trace!(
            "Pointer ({:.1}, {:.1}) pinch {:.1}px tips {:.1}px",
            p.x,
            p.y,
            m.pinch_distance,
            m.tips_distance
        );
        Some(p)
    }
}
