//! Terminal output for the command-line interface

use colored::*;

use crate::config::AppConfig;
use crate::gesture::Gesture;

/// Gesture cheat-sheet: (pose, label it produces, effect)
const GESTURES: &[(&str, &str, &str)] = &[
    ("Index finger pointing", "point", "Move cursor"),
    ("Quick thumb + index pinch", "pinch", "Left click"),
    ("Held thumb + index pinch", "pinch", "Drag"),
    ("Index + middle tips together", "right-click", "Right click"),
    ("Two fingers up, move up/down", "scroll", "Scroll"),
    ("Three fingers up", "three-finger", "Toggle keyboard mode"),
    ("Fist", "fist", "Pause cursor"),
    ("Hover key + pinch", "pinch", "Type key (keyboard mode)"),
];

/// Print the gesture summary along with the active tunables
pub fn print_gesture_summary(config: &AppConfig) {
    println!("\n{}", "=== AirPointer Gestures ===".bold().cyan());

    for (pose, label, effect) in GESTURES {
        println!("  {:<32} {:<14} {}", pose.yellow(), label.dimmed(), effect.green());
    }

    let t = &config.timing;
    println!("\n{}", "Timing:".bold());
    for (name, value) in [
        ("Drag after hold", t.drag_hold_ms),
        ("Click cooldown", t.click_cooldown_ms),
        ("Right-click cooldown", t.right_click_cooldown_ms),
        ("Key press cooldown", t.key_press_cooldown_ms),
        ("Mode toggle cooldown", t.toggle_cooldown_ms),
        ("Scroll cooldown", t.scroll_cooldown_ms),
    ] {
        println!("  {:<22} {} ms", format!("{}:", name), value.to_string().green());
    }

    let g = &config.gesture;
    println!("\n{}", "Thresholds:".bold());
    println!("  {:<22} {} px", "Pinch:", g.pinch_threshold_px.to_string().green());
    println!("  {:<22} {} px", "Right-click tips:", g.right_click_threshold_px.to_string().green());

    println!(
        "\n  Priority: {}",
        label_priority()
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
            .bright_white()
    );
    println!();
}

/// Labels in classification priority order
fn label_priority() -> [Gesture; 7] {
    [
        Gesture::Pinch,
        Gesture::RightClickPose,
        Gesture::ThreeFingerPose,
        Gesture::ScrollPose { index_y: 0.0 },
        Gesture::Fist,
        Gesture::Point,
        Gesture::None,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cheat_sheet_labels_are_real() {
        let known: Vec<&str> = label_priority().iter().map(|g| g.as_str()).collect();
        for (_, label, _) in GESTURES {
            assert!(known.contains(label), "unknown label {}", label);
        }
    }
}
