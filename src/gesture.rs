//! Gesture classification from hand landmarks.
//!
//! Derives finger-extension flags and tip distances from one landmark frame
//! and maps them to exactly one [`Gesture`]. Poses share finger signatures
//! (a right-click pose is also "two fingers up"), so labels are resolved by a
//! fixed priority order rather than independent checks:
//!
//! ```text
//! Pinch > RightClickPose > ThreeFingerPose > ScrollPose > Fist > Point > None
//! ```
//!
//! The classifier is stateless; scroll deltas and hold timers live in the
//! debouncer.

use serde::{Deserialize, Serialize};

use crate::config::GestureConfig;
use crate::landmarks::*;

// ── Labels ─────────────────────────────────────────────────

/// The single gesture label of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gesture {
    /// No hand, or a hand in no recognised pose (e.g. open palm).
    None,
    /// Index extended, middle/ring/pinky curled.
    Point,
    /// Thumb and index tips touching.
    Pinch,
    /// No finger extended.
    Fist,
    /// Index and middle extended with their tips together.
    RightClickPose,
    /// Index and middle extended and apart, ring/pinky curled.
    /// Carries the index-tip y used for scroll deltas.
    ScrollPose { index_y: f64 },
    /// Index, middle and ring extended, pinky curled.
    ThreeFingerPose,
}

impl Gesture {
    /// String representation for logs and overlays.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Point => "point",
            Self::Pinch => "pinch",
            Self::Fist => "fist",
            Self::RightClickPose => "right-click",
            Self::ScrollPose { .. } => "scroll",
            Self::ThreeFingerPose => "three-finger",
        }
    }

    pub fn is_pinch(&self) -> bool {
        matches!(self, Self::Pinch)
    }
}

// ── Measurements ───────────────────────────────────────────

/// Per-finger extension flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn any(&self) -> bool {
        self.thumb || self.index || self.middle || self.ring || self.pinky
    }
}

/// Raw geometry of one hand, reused downstream and by overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandMeasurements {
    pub fingers: FingerState,
    /// Thumb tip to index tip (px)
    pub pinch_distance: f64,
    /// Index tip to middle tip (px)
    pub tips_distance: f64,
    pub index_tip: Landmark,
}

/// Classifier output for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub gesture: Gesture,
    /// `None` when no hand was detected
    pub measurements: Option<HandMeasurements>,
}

impl Classification {
    pub fn no_hand() -> Self {
        Self {
            gesture: Gesture::None,
            measurements: None,
        }
    }

    pub fn hand_present(&self) -> bool {
        self.measurements.is_some()
    }
}

// ── Classifier ─────────────────────────────────────────────

/// Rule-based gesture classifier.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Classify a frame; `None` input means no hand was detected.
    pub fn classify(&self, frame: Option<&LandmarkFrame>) -> Classification {
        let Some(frame) = frame else {
            return Classification::no_hand();
        };

        let m = self.measure(frame);
        Classification {
            gesture: self.label(&m),
            measurements: Some(m),
        }
    }

    /// Extract extension flags and distances.
    pub fn measure(&self, frame: &LandmarkFrame) -> HandMeasurements {
        let margin = self.config.extension_margin_px;
        let fingers = FingerState {
            thumb: thumb_extended(frame, margin),
            index: finger_extended(frame, INDEX_TIP, INDEX_PIP, margin),
            middle: finger_extended(frame, MIDDLE_TIP, MIDDLE_PIP, margin),
            ring: finger_extended(frame, RING_TIP, RING_PIP, margin),
            pinky: finger_extended(frame, PINKY_TIP, PINKY_PIP, margin),
        };

        HandMeasurements {
            fingers,
            pinch_distance: frame.point(THUMB_TIP).distance(frame.point(INDEX_TIP)),
            tips_distance: frame.point(INDEX_TIP).distance(frame.point(MIDDLE_TIP)),
            index_tip: *frame.point(INDEX_TIP),
        }
    }

    /// Resolve measurements to a label, highest priority first.
    fn label(&self, m: &HandMeasurements) -> Gesture {
        let f = &m.fingers;
        let two_up = f.index && f.middle;

        if m.pinch_distance < self.config.pinch_threshold_px {
            Gesture::Pinch
        } else if two_up && m.tips_distance < self.config.right_click_threshold_px {
            Gesture::RightClickPose
        } else if two_up && f.ring && !f.pinky {
            Gesture::ThreeFingerPose
        } else if two_up && !f.ring && !f.pinky {
            Gesture::ScrollPose {
                index_y: m.index_tip.y,
            }
        } else if !f.any() {
            Gesture::Fist
        } else if f.index && !f.middle && !f.ring && !f.pinky {
            Gesture::Point
        } else {
            Gesture::None
        }
    }
}

/// Tip above its PIP joint (smaller image y) by at least `margin`.
fn finger_extended(frame: &LandmarkFrame, tip: usize, pip: usize, margin: f64) -> bool {
    frame.point(pip).y - frame.point(tip).y >= margin
}

/// The thumb swings sideways: compare horizontal reach of tip vs. IP joint
/// measured from the thumb MCP. The tip must reach at least `margin` further.
fn thumb_extended(frame: &LandmarkFrame, margin: f64) -> bool {
    let mcp_x = frame.point(THUMB_MCP).x;
    let tip_reach = (frame.point(THUMB_TIP).x - mcp_x).abs();
    let ip_reach = (frame.point(THUMB_IP).x - mcp_x).abs();
    tip_reach - ip_reach >= margin
}
