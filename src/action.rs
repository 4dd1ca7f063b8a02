//! Abstract action commands delivered to sinks

use serde::{Deserialize, Serialize};

use crate::keyboard::Key;

/// A discrete intent produced by the pipeline.
///
/// Coordinates are screen pixels. `DragMove` means "move while the left
/// button is held", never a separate click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionEvent {
    MoveTo { x: f64, y: f64 },
    ClickLeft,
    ClickRight,
    DragStart,
    DragMove { x: f64, y: f64 },
    DragEnd,
    /// Positive scrolls up
    ScrollBy { dy: i32 },
    ToggleMode,
    KeyHover { key: Option<Key> },
    KeyPress { key: Key },
    Pause,
}

impl ActionEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move_to",
            Self::ClickLeft => "click_left",
            Self::ClickRight => "click_right",
            Self::DragStart => "drag_start",
            Self::DragMove { .. } => "drag_move",
            Self::DragEnd => "drag_end",
            Self::ScrollBy { .. } => "scroll_by",
            Self::ToggleMode => "toggle_mode",
            Self::KeyHover { .. } => "key_hover",
            Self::KeyPress { .. } => "key_press",
            Self::Pause => "pause",
        }
    }

    /// Events that only mean something while driving the system cursor
    pub fn is_pointer_only(&self) -> bool {
        matches!(
            self,
            Self::MoveTo { .. }
                | Self::ClickLeft
                | Self::ClickRight
                | Self::DragStart
                | Self::DragMove { .. }
                | Self::DragEnd
                | Self::ScrollBy { .. }
        )
    }
}

/// Action kinds guarded by a cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ClickLeft,
    ClickRight,
    KeyPress,
    ToggleMode,
    Scroll,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::ClickLeft,
        ActionKind::ClickRight,
        ActionKind::KeyPress,
        ActionKind::ToggleMode,
        ActionKind::Scroll,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::ClickLeft => 0,
            Self::ClickRight => 1,
            Self::KeyPress => 2,
            Self::ToggleMode => 3,
            Self::Scroll => 4,
        }
    }
}
