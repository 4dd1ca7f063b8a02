//! Error types for the frame pipeline

use thiserror::Error;

/// Frame-local failure raised before any pipeline state is touched.
///
/// Every variant is a malformed-input condition: the caller handed the
/// pipeline something the landmark detector contract does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("malformed input: expected {expected} landmarks, got {got}")]
    WrongLandmarkCount { expected: usize, got: usize },

    #[error("malformed input: landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("malformed input: frame size {width}x{height} has a zero dimension")]
    EmptyFrame { width: u32, height: u32 },
}

impl PipelineError {
    /// All current variants are malformed input; kept as a method so callers
    /// don't need to match on every variant to classify a failure.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::WrongLandmarkCount { .. } | Self::NonFiniteLandmark { .. } | Self::EmptyFrame { .. }
        )
    }
}
