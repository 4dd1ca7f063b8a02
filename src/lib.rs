//! AirPointer - touchless mouse and virtual keyboard
//!
//! Turns per-frame hand landmarks into mouse and keyboard commands. The
//! core ([`GesturePipeline`]) is synchronous and clock-free; the binary
//! wraps it in a tokio loop with a replay source, hot-reloaded config and
//! a pluggable [`sinks::ActionSink`].

pub mod action;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gesture;
pub mod keyboard;
pub mod landmarks;
pub mod mode;
pub mod pipeline;
pub mod pointer;
pub mod replay;
pub mod sinks;

pub use action::{ActionEvent, ActionKind};
pub use config::AppConfig;
pub use error::PipelineError;
pub use gesture::{Gesture, GestureClassifier};
pub use keyboard::{Key, KeyLayout, VirtualKeyboard};
pub use landmarks::{FrameSize, Landmark, LandmarkFrame};
pub use mode::Mode;
pub use pipeline::{FrameOutput, GesturePipeline, OverlaySnapshot};
pub use pointer::{PointerFilter, ScreenPoint};
