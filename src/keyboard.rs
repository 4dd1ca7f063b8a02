//! Virtual keyboard: layout, hover tracking and pinch-to-type commits.
//!
//! The layout is a fixed QWERTY block laid out in screen space near the
//! bottom edge. Each frame the hover position selects at most one key (the
//! press-candidate). A pinch-begin commits the candidate that was cached
//! when the pinch started; the finger drifting to another key while the
//! pinch is held does not change what was typed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::action::{ActionEvent, ActionKind};
use crate::config::{KeyboardConfig, ScreenConfig};
use crate::debounce::{CooldownTracker, PinchPhase};
use crate::pointer::ScreenPoint;

// ── Keys ───────────────────────────────────────────────────

/// A key of the virtual keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    /// Uppercase ASCII letter
    Letter(char),
    Backspace,
    Space,
}

impl Key {
    /// Key name understood by OS injection backends
    pub fn symbol(&self) -> String {
        match self {
            Key::Letter(c) => c.to_ascii_lowercase().to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Space => "space".to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Letter(c) => write!(f, "{}", c),
            Key::Backspace => write!(f, "Backspace"),
            Key::Space => write!(f, "Space"),
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "Backspace" | "BKSP" => Ok(Key::Backspace),
            "Space" | "SPACE" => Ok(Key::Space),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        Ok(Key::Letter(c.to_ascii_uppercase()))
                    }
                    _ => Err(format!("Unknown key '{}'", s)),
                }
            }
        }
    }
}

// ── Layout ─────────────────────────────────────────────────

/// Screen rectangle of one key; edges are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyRect {
    pub key: Key,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl KeyRect {
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

const LETTER_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// Immutable key geometry
#[derive(Debug, Clone, PartialEq)]
pub struct KeyLayout {
    keys: Vec<KeyRect>,
}

impl KeyLayout {
    /// QWERTY block centred horizontally, sitting `bottom_margin` above the
    /// bottom edge: three letter rows (Backspace closing the third) and a
    /// Space bar as wide as the top row.
    pub fn qwerty(screen: &ScreenConfig, geometry: &KeyboardConfig) -> Self {
        let w = screen.width as f64;
        let h = screen.height as f64;
        let kw = geometry.key_width;
        let kh = geometry.key_height;
        let pad = geometry.key_padding;
        // Backspace grows by 20 px per 50 px of key width
        let backspace_extra = kw * 0.4;

        let row_count = LETTER_ROWS.len() + 1;
        let block_h = row_count as f64 * (kh + pad) + pad;
        let start_y = h - block_h - geometry.bottom_margin;

        let mut keys = Vec::with_capacity(28);
        for (row_idx, row) in LETTER_ROWS.iter().enumerate() {
            let y1 = start_y + row_idx as f64 * (kh + pad);
            let mut row_keys: Vec<Key> = row.chars().map(Key::Letter).collect();
            if row_idx == LETTER_ROWS.len() - 1 {
                row_keys.push(Key::Backspace);
            }

            let row_w = row_keys.len() as f64 * (kw + pad) - pad;
            let row_x = (w - row_w) / 2.0;
            for (col, key) in row_keys.into_iter().enumerate() {
                let x1 = row_x + col as f64 * (kw + pad);
                let width = if key == Key::Backspace { kw + backspace_extra } else { kw };
                keys.push(KeyRect { key, x1, y1, x2: x1 + width, y2: y1 + kh });
            }
        }

        let top_row_w = LETTER_ROWS[0].len() as f64 * (kw + pad);
        let space_x = (w - top_row_w) / 2.0;
        let space_y = start_y + LETTER_ROWS.len() as f64 * (kh + pad);
        keys.push(KeyRect {
            key: Key::Space,
            x1: space_x,
            y1: space_y,
            x2: space_x + top_row_w,
            y2: space_y + kh,
        });

        Self { keys }
    }

    pub fn keys(&self) -> &[KeyRect] {
        &self.keys
    }

    pub fn rect(&self, key: Key) -> Option<&KeyRect> {
        self.keys.iter().find(|r| r.key == key)
    }

    /// First key (in row order) containing the point
    pub fn hit_test(&self, p: ScreenPoint) -> Option<Key> {
        self.keys.iter().find(|r| r.contains(p)).map(|r| r.key)
    }
}

// ── Engine ─────────────────────────────────────────────────

/// The key currently under the hover position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressCandidate {
    pub key: Key,
    /// When the key was first hovered in the current run
    pub since: Duration,
    /// Consecutive frames the key has been hovered
    pub frames: u32,
}

/// Hover and commit state of the virtual keyboard
#[derive(Debug, Clone)]
pub struct VirtualKeyboard {
    layout: KeyLayout,
    candidate: Option<PressCandidate>,
    /// Key typed by the pinch currently held
    committed: Option<Key>,
}

impl VirtualKeyboard {
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            layout,
            candidate: None,
            committed: None,
        }
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Swap in a new layout; hover state is dropped since keys may have moved
    pub fn set_layout(&mut self, layout: KeyLayout) {
        self.layout = layout;
        self.reset();
    }

    pub fn hovered(&self) -> Option<Key> {
        self.candidate.map(|c| c.key)
    }

    pub fn candidate(&self) -> Option<PressCandidate> {
        self.candidate
    }

    pub fn committed(&self) -> Option<Key> {
        self.committed
    }

    /// Clear hover and commit state (mode switches)
    pub fn reset(&mut self) {
        self.candidate = None;
        self.committed = None;
    }

    /// Process one frame in keyboard mode
    ///
    /// # Arguments
    /// * `position` - Hover position in screen space, `None` without a hand
    /// * `pinch` - Pinch transition of this frame
    /// * `cooldowns` - Shared cooldown tracker (KeyPress is gated here)
    /// * `now` - Monotonic frame timestamp
    ///
    /// # Returns
    /// `KeyHover` when the hovered key changed, and/or `KeyPress` on commit
    pub fn update(
        &mut self,
        position: Option<ScreenPoint>,
        pinch: PinchPhase,
        cooldowns: &mut CooldownTracker,
        now: Duration,
    ) -> Vec<ActionEvent> {
        let mut events = Vec::new();

        // The pinch transition happened since the last frame; the cached
        // candidate is what the finger was on before the pinch moved it
        let cached = self.hovered();

        if let Some(event) = self.hover(position, now) {
            events.push(event);
        }

        match pinch {
            PinchPhase::Began => {
                if let Some(key) = cached.or_else(|| self.hovered()) {
                    if cooldowns.try_fire(ActionKind::KeyPress, now) {
                        info!("⌨️  Key pressed: {}", key);
                        self.committed = Some(key);
                        events.push(ActionEvent::KeyPress { key });
                    } else {
                        debug!("Key {} suppressed by cooldown", key);
                    }
                }
            }
            PinchPhase::Released => self.committed = None,
            PinchPhase::Idle | PinchPhase::Held => {}
        }

        events
    }

    /// Update the press-candidate; returns `KeyHover` when it changed
    fn hover(&mut self, position: Option<ScreenPoint>, now: Duration) -> Option<ActionEvent> {
        let key = position.and_then(|p| self.layout.hit_test(p));

        if key == self.hovered() {
            if let Some(current) = self.candidate.as_mut() {
                current.frames = current.frames.saturating_add(1);
            }
            return None;
        }

        debug!("Hover: {:?} -> {:?}", self.hovered(), key);
        self.candidate = key.map(|key| PressCandidate {
            key,
            since: now,
            frames: 1,
        });
        Some(ActionEvent::KeyHover { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn keyboard() -> VirtualKeyboard {
        VirtualKeyboard::new(KeyLayout::qwerty(
            &ScreenConfig::default(),
            &KeyboardConfig::default(),
        ))
    }

    fn center(kb: &VirtualKeyboard, key: Key) -> Option<ScreenPoint> {
        kb.layout().rect(key).map(|r| r.center())
    }

    #[test]
    fn test_layout_has_all_keys() {
        let layout = KeyLayout::qwerty(&ScreenConfig::default(), &KeyboardConfig::default());
        assert_eq!(layout.keys().len(), 28);
        for c in 'A'..='Z' {
            assert!(layout.rect(Key::Letter(c)).is_some(), "missing {}", c);
        }
        assert!(layout.rect(Key::Backspace).is_some());
        assert!(layout.rect(Key::Space).is_some());
    }

    #[test]
    fn test_layout_geometry() {
        let layout = KeyLayout::qwerty(&ScreenConfig::default(), &KeyboardConfig::default());
        // Block: 4 rows of 165 + 15 = 675 tall, bottom margin 60
        let q = layout.rect(Key::Letter('Q')).unwrap();
        assert_eq!(q.y1, 1080.0 - 675.0 - 60.0);
        // Top row: 10 * 165 - 15 = 1635 wide, centred
        assert_eq!(q.x1, (1920.0 - 1635.0) / 2.0);
        let space = layout.rect(Key::Space).unwrap();
        assert_eq!(space.x2 - space.x1, 1650.0);
        let bksp = layout.rect(Key::Backspace).unwrap();
        assert_eq!(bksp.x2 - bksp.x1, 210.0);
    }

    #[test]
    fn test_hit_test_edges_inclusive() {
        let layout = KeyLayout::qwerty(&ScreenConfig::default(), &KeyboardConfig::default());
        let a = *layout.rect(Key::Letter('A')).unwrap();
        assert_eq!(layout.hit_test(ScreenPoint::new(a.x1, a.y1)), Some(Key::Letter('A')));
        assert_eq!(layout.hit_test(ScreenPoint::new(a.x2, a.y2)), Some(Key::Letter('A')));
        // Gap between A and S
        assert_eq!(layout.hit_test(ScreenPoint::new(a.x2 + 5.0, a.y1 + 10.0)), None);
        assert_eq!(layout.hit_test(ScreenPoint::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_hover_events_only_on_change() {
        let mut kb = keyboard();
        let mut cd = CooldownTracker::new(&TimingConfig::default());
        let a = center(&kb, Key::Letter('A'));

        let events = kb.update(a, PinchPhase::Idle, &mut cd, ms(0));
        assert_eq!(events, vec![ActionEvent::KeyHover { key: Some(Key::Letter('A')) }]);
        assert!(kb.update(a, PinchPhase::Idle, &mut cd, ms(33)).is_empty());
        assert_eq!(kb.candidate().unwrap().frames, 2);

        let events = kb.update(Some(ScreenPoint::new(5.0, 5.0)), PinchPhase::Idle, &mut cd, ms(66));
        assert_eq!(events, vec![ActionEvent::KeyHover { key: None }]);
        assert!(kb.update(None, PinchPhase::Idle, &mut cd, ms(99)).is_empty());
    }

    #[test]
    fn test_commit_uses_candidate_cached_at_pinch_begin() {
        let mut kb = keyboard();
        let mut cd = CooldownTracker::new(&TimingConfig::default());
        let a = center(&kb, Key::Letter('A'));
        let s = center(&kb, Key::Letter('S'));

        for i in 0..3 {
            kb.update(a, PinchPhase::Idle, &mut cd, ms(i * 33));
        }
        // Finger slid onto S on the very frame the pinch closed
        let events = kb.update(s, PinchPhase::Began, &mut cd, ms(99));
        assert!(events.contains(&ActionEvent::KeyPress { key: Key::Letter('A') }));
        assert_eq!(kb.committed(), Some(Key::Letter('A')));

        let events = kb.update(s, PinchPhase::Held, &mut cd, ms(132));
        assert!(events.is_empty());
        assert_eq!(kb.committed(), Some(Key::Letter('A')));
        assert_eq!(kb.hovered(), Some(Key::Letter('S')));

        kb.update(s, PinchPhase::Released, &mut cd, ms(165));
        assert_eq!(kb.committed(), None);
    }

    #[test]
    fn test_no_candidate_no_press() {
        let mut kb = keyboard();
        let mut cd = CooldownTracker::new(&TimingConfig::default());
        let events = kb.update(Some(ScreenPoint::new(5.0, 5.0)), PinchPhase::Began, &mut cd, ms(0));
        assert!(events.is_empty());
        assert_eq!(cd.last_fired(ActionKind::KeyPress), None);
    }

    #[test]
    fn test_key_press_cooldown() {
        let mut kb = keyboard();
        let mut cd = CooldownTracker::new(&TimingConfig::default());
        let space = center(&kb, Key::Space);

        kb.update(space, PinchPhase::Idle, &mut cd, ms(0));
        let first = kb.update(space, PinchPhase::Began, &mut cd, ms(10));
        assert_eq!(first, vec![ActionEvent::KeyPress { key: Key::Space }]);
        kb.update(space, PinchPhase::Released, &mut cd, ms(100));
        let second = kb.update(space, PinchPhase::Began, &mut cd, ms(200));
        assert!(second.is_empty());
        kb.update(space, PinchPhase::Released, &mut cd, ms(300));
        let third = kb.update(space, PinchPhase::Began, &mut cd, ms(510));
        assert_eq!(third, vec![ActionEvent::KeyPress { key: Key::Space }]);
    }

    #[test]
    fn test_key_string_forms() {
        assert_eq!(Key::try_from("q".to_string()), Ok(Key::Letter('Q')));
        assert_eq!(Key::try_from("BKSP".to_string()), Ok(Key::Backspace));
        assert!(Key::try_from("F1".to_string()).is_err());
        assert_eq!(Key::Letter('Q').symbol(), "q");
        assert_eq!(Key::Space.symbol(), "space");
        assert_eq!(String::from(Key::Backspace), "Backspace");
    }
}
