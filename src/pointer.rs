//! Pointer filter: camera-frame position to smoothed screen position.
//!
//! Two stages, applied per axis:
//!
//! 1. **Active-zone mapping** - the frame is inset by a margin on every side
//!    and the remaining rectangle is stretched over the whole screen, so the
//!    hand never has to reach the edge of the camera view. Positions outside
//!    the zone clamp to the screen edge.
//! 2. **Exponential smoothing** - `s = s_prev + alpha * (target - s_prev)`.
//!    The first position seen passes through unchanged; afterwards the state
//!    is kept for the life of the filter, including across hand loss, so
//!    re-acquiring the hand resumes from the last position instead of jumping.

use serde::{Deserialize, Serialize};

use crate::config::{PointerConfig, ScreenConfig};
use crate::landmarks::{FrameSize, Landmark};

/// A position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Map one axis from the active zone onto `[0, screen]`
///
/// # Arguments
/// * `value` - Coordinate in frame pixels
/// * `frame` - Frame extent along this axis
/// * `margin` - Fraction trimmed from each side (0.15 keeps the central 70%)
/// * `screen` - Screen extent along this axis
fn map_axis(value: f64, frame: f64, margin: f64, screen: f64) -> f64 {
    let lo = frame * margin;
    let hi = frame * (1.0 - margin);
    let t = (value.clamp(lo, hi) - lo) / (hi - lo);
    t * screen
}

/// Active-zone mapping without smoothing
pub fn map_to_screen(
    position: &Landmark,
    frame: FrameSize,
    margin: f64,
    screen: &ScreenConfig,
) -> ScreenPoint {
    ScreenPoint {
        x: map_axis(position.x, frame.width as f64, margin, screen.width as f64),
        y: map_axis(position.y, frame.height as f64, margin, screen.height as f64),
    }
}

/// Mapping plus exponential smoothing, with memory of the last output
#[derive(Debug, Clone)]
pub struct PointerFilter {
    margin: f64,
    alpha: f64,
    screen: ScreenConfig,
    smoothed: Option<ScreenPoint>,
}

impl PointerFilter {
    pub fn new(pointer: &PointerConfig, screen: &ScreenConfig) -> Self {
        Self {
            margin: pointer.active_zone_margin,
            alpha: pointer.smoothing_alpha,
            screen: screen.clone(),
            smoothed: None,
        }
    }

    /// Swap tunables; the smoothing memory is kept
    pub fn reconfigure(&mut self, pointer: &PointerConfig, screen: &ScreenConfig) {
        self.margin = pointer.active_zone_margin;
        self.alpha = pointer.smoothing_alpha;
        self.screen = screen.clone();
    }

    /// Last smoothed output, if any position has been seen
    pub fn last(&self) -> Option<ScreenPoint> {
        self.smoothed
    }

    /// Map and smooth one frame-space position
    pub fn update(&mut self, position: &Landmark, frame: FrameSize) -> ScreenPoint {
        let target = map_to_screen(position, frame, self.margin, &self.screen);

        let next = match self.smoothed {
            None => target,
            Some(prev) => ScreenPoint {
                x: prev.x + self.alpha * (target.x - prev.x),
                y: prev.y + self.alpha * (target.y - prev.y),
            },
        };

        self.smoothed = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME: FrameSize = FrameSize { width: 640, height: 480 };

    fn filter() -> PointerFilter {
        PointerFilter::new(&PointerConfig::default(), &ScreenConfig::default())
    }

    #[test]
    fn test_zone_center_maps_to_screen_center() {
        let p = map_to_screen(&Landmark::new(320.0, 240.0), FRAME, 0.15, &ScreenConfig::default());
        assert!((p.x - 960.0).abs() < 1e-9);
        assert!((p.y - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_zone_corners_map_to_screen_corners() {
        let screen = ScreenConfig::default();
        let top_left = map_to_screen(&Landmark::new(96.0, 72.0), FRAME, 0.15, &screen);
        assert_eq!(top_left, ScreenPoint::new(0.0, 0.0));
        let bottom_right = map_to_screen(&Landmark::new(544.0, 408.0), FRAME, 0.15, &screen);
        assert!((bottom_right.x - 1920.0).abs() < 1e-9);
        assert!((bottom_right.y - 1080.0).abs() < 1e-9);
    }

    #[test]
    fn test_outside_zone_clamps() {
        let screen = ScreenConfig::default();
        let p = map_to_screen(&Landmark::new(-50.0, 10.0), FRAME, 0.15, &screen);
        assert_eq!(p, ScreenPoint::new(0.0, 0.0));
        let p = map_to_screen(&Landmark::new(700.0, 470.0), FRAME, 0.15, &screen);
        assert_eq!(p, ScreenPoint::new(1920.0, 1080.0));
    }

    #[test]
    fn test_first_sample_is_unsmoothed() {
        let mut f = filter();
        let p = f.update(&Landmark::new(96.0, 72.0), FRAME);
        assert_eq!(p, ScreenPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_smoothing_step() {
        let mut f = filter();
        f.update(&Landmark::new(96.0, 72.0), FRAME);
        // Target is the screen centre; alpha 0.3 moves 30% of the way
        let p = f.update(&Landmark::new(320.0, 240.0), FRAME);
        assert!((p.x - 288.0).abs() < 1e-9);
        assert!((p.y - 162.0).abs() < 1e-9);
    }

    #[test]
    fn test_state_survives_gaps() {
        let mut f = filter();
        f.update(&Landmark::new(320.0, 240.0), FRAME);
        let before = f.last().unwrap();
        // Re-acquire far away: output moves only alpha of the distance
        let p = f.update(&Landmark::new(544.0, 408.0), FRAME);
        assert!((p.x - (before.x + 0.3 * (1920.0 - before.x))).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_one_disables_smoothing() {
        let config = PointerConfig {
            smoothing_alpha: 1.0,
            ..PointerConfig::default()
        };
        let mut f = PointerFilter::new(&config, &ScreenConfig::default());
        f.update(&Landmark::new(96.0, 72.0), FRAME);
        let p = f.update(&Landmark::new(320.0, 240.0), FRAME);
        assert!((p.x - 960.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn still_input_is_a_fixed_point(x in 96.0f64..544.0, y in 72.0f64..408.0, steps in 1usize..20) {
            let mut f = filter();
            let first = f.update(&Landmark::new(x, y), FRAME);
            for _ in 0..steps {
                let p = f.update(&Landmark::new(x, y), FRAME);
                prop_assert_eq!(p, first);
            }
        }

        #[test]
        fn output_stays_on_screen(points in prop::collection::vec((-200.0f64..900.0, -200.0f64..700.0), 1..30)) {
            let mut f = filter();
            for (x, y) in points {
                let p = f.update(&Landmark::new(x, y), FRAME);
                prop_assert!(p.x >= -1e-9 && p.x <= 1920.0 + 1e-9);
                prop_assert!(p.y >= -1e-9 && p.y <= 1080.0 + 1e-9);
            }
        }
    }
}
