//! Mouse/Keyboard interaction mode and event routing.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::action::ActionEvent;

/// Top-level interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Mouse,
    Keyboard,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Mouse => Mode::Keyboard,
            Mode::Keyboard => Mode::Mouse,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Mouse => write!(f, "MOUSE"),
            Mode::Keyboard => write!(f, "KEYBOARD"),
        }
    }
}

/// Owns the current mode and decides which events reach the sink
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Route one debounced event
    ///
    /// `ToggleMode` flips the mode and is forwarded so sinks can show it.
    /// Pointer-only events are dropped while in keyboard mode.
    pub fn route(&mut self, event: ActionEvent) -> Option<ActionEvent> {
        match event {
            ActionEvent::ToggleMode => {
                let previous = self.mode;
                self.mode = previous.toggled();
                info!("🔀 Mode: {} -> {}", previous, self.mode);
                Some(event)
            }
            e if e.is_pointer_only() && self.mode == Mode::Keyboard => {
                debug!("Dropping {} in keyboard mode", e.name());
                None
            }
            e => Some(e),
        }
    }
}
