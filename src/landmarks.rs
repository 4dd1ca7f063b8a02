//! Hand landmark types
//!
//! A detected hand arrives as 21 points in camera-frame pixel coordinates,
//! indexed by fixed anatomical identity (MediaPipe hand model ordering).

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Number of landmarks per detected hand
pub const LANDMARK_COUNT: usize = 21;

/// A single landmark in frame-pixel space, with optional depth
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Euclidean distance in the image plane (depth is ignored)
    pub fn distance(&self, other: &Landmark) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

/// Camera frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One validated hand: exactly 21 finite landmarks
///
/// Construction is the only place input is checked, so everything
/// downstream can index landmarks without bounds concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Validate a raw landmark slice from the detector
    pub fn from_slice(points: &[Landmark]) -> Result<Self, PipelineError> {
        let points: [Landmark; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| PipelineError::WrongLandmarkCount {
                    expected: LANDMARK_COUNT,
                    got: points.len(),
                })?;

        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PipelineError::NonFiniteLandmark { index });
        }

        Ok(Self { points })
    }

    /// Landmark by anatomical index (see the `*_TIP` / `*_PIP` constants)
    pub fn point(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = PipelineError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_slice(&points)
    }
}
