//! Configuration management for AirPointer
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.
//! Every tunable of the gesture pipeline lives here; nothing in the core is
//! hardcoded without a matching field.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::info;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
}

/// Gesture classifier thresholds (camera-frame pixels)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GestureConfig {
    /// Thumb/index tip distance below which the hand is pinching
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold_px: f64,
    /// Index/middle tip distance below which the tips count as together
    #[serde(default = "default_right_click_threshold")]
    pub right_click_threshold_px: f64,
    /// How far a tip must clear its PIP joint to count as extended
    #[serde(default = "default_extension_margin")]
    pub extension_margin_px: f64,
}

/// Cooldowns and hold thresholds, in milliseconds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimingConfig {
    #[serde(default = "default_drag_hold")]
    pub drag_hold_ms: u64,
    #[serde(default = "default_click_cooldown")]
    pub click_cooldown_ms: u64,
    #[serde(default = "default_click_cooldown")]
    pub right_click_cooldown_ms: u64,
    #[serde(default = "default_key_press_cooldown")]
    pub key_press_cooldown_ms: u64,
    #[serde(default = "default_toggle_cooldown")]
    pub toggle_cooldown_ms: u64,
    #[serde(default = "default_scroll_cooldown")]
    pub scroll_cooldown_ms: u64,
}

/// Pointer mapping, smoothing and scroll scaling
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PointerConfig {
    /// Fraction of the frame trimmed from each side to form the active zone
    #[serde(default = "default_active_zone_margin")]
    pub active_zone_margin: f64,
    /// Exponential smoothing factor (1.0 disables smoothing)
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,
    /// Scroll units per pixel of vertical finger motion
    #[serde(default = "default_scroll_scale")]
    pub scroll_scale: f64,
    /// Vertical finger motion (px) ignored as tremor while scrolling
    #[serde(default = "default_scroll_deadband")]
    pub scroll_deadband_px: f64,
}

/// Target screen resolution
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_width")]
    pub width: u32,
    #[serde(default = "default_screen_height")]
    pub height: u32,
}

/// Virtual keyboard geometry (screen pixels)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeyboardConfig {
    #[serde(default = "default_key_size")]
    pub key_width: f64,
    #[serde(default = "default_key_size")]
    pub key_height: f64,
    #[serde(default = "default_key_padding")]
    pub key_padding: f64,
    /// Gap between the bottom row and the bottom screen edge
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold_px: default_pinch_threshold(),
            right_click_threshold_px: default_right_click_threshold(),
            extension_margin_px: default_extension_margin(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            drag_hold_ms: default_drag_hold(),
            click_cooldown_ms: default_click_cooldown(),
            right_click_cooldown_ms: default_click_cooldown(),
            key_press_cooldown_ms: default_key_press_cooldown(),
            toggle_cooldown_ms: default_toggle_cooldown(),
            scroll_cooldown_ms: default_scroll_cooldown(),
        }
    }
}

impl TimingConfig {
    pub fn drag_hold(&self) -> Duration {
        Duration::from_millis(self.drag_hold_ms)
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            active_zone_margin: default_active_zone_margin(),
            smoothing_alpha: default_smoothing_alpha(),
            scroll_scale: default_scroll_scale(),
            scroll_deadband_px: default_scroll_deadband(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_screen_width(),
            height: default_screen_height(),
        }
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            key_width: default_key_size(),
            key_height: default_key_size(),
            key_padding: default_key_padding(),
            bottom_margin: default_bottom_margin(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        let g = &self.gesture;
        if !(g.pinch_threshold_px > 0.0) {
            anyhow::bail!("gesture.pinch_threshold_px must be positive");
        }
        if !(g.right_click_threshold_px > 0.0) {
            anyhow::bail!("gesture.right_click_threshold_px must be positive");
        }
        if !(g.extension_margin_px >= 0.0) {
            anyhow::bail!("gesture.extension_margin_px cannot be negative");
        }

        if self.timing.drag_hold_ms == 0 {
            anyhow::bail!("timing.drag_hold_ms must be at least 1");
        }

        let p = &self.pointer;
        if !(0.0..0.5).contains(&p.active_zone_margin) {
            anyhow::bail!(
                "pointer.active_zone_margin {} is invalid (must be in [0, 0.5))",
                p.active_zone_margin
            );
        }
        if !(p.smoothing_alpha > 0.0 && p.smoothing_alpha <= 1.0) {
            anyhow::bail!(
                "pointer.smoothing_alpha {} is invalid (must be in (0, 1])",
                p.smoothing_alpha
            );
        }
        if !(p.scroll_scale > 0.0) {
            anyhow::bail!("pointer.scroll_scale must be positive");
        }
        if !(p.scroll_deadband_px >= 0.0) {
            anyhow::bail!("pointer.scroll_deadband_px cannot be negative");
        }

        if self.screen.width == 0 || self.screen.height == 0 {
            anyhow::bail!(
                "screen size {}x{} is invalid (both dimensions must be positive)",
                self.screen.width,
                self.screen.height
            );
        }

        self.validate_keyboard()
            .context("Invalid keyboard geometry")?;

        Ok(())
    }

    /// Make sure the key block fits on screen
    fn validate_keyboard(&self) -> Result<()> {
        let k = &self.keyboard;
        if !(k.key_width > 0.0 && k.key_height > 0.0) {
            anyhow::bail!("key_width and key_height must be positive");
        }
        if !(k.key_padding >= 0.0 && k.bottom_margin >= 0.0) {
            anyhow::bail!("key_padding and bottom_margin cannot be negative");
        }

        let screen_w = self.screen.width as f64;
        let screen_h = self.screen.height as f64;
        let block_w = 10.0 * (k.key_width + k.key_padding);
        let block_h = 4.0 * (k.key_height + k.key_padding) + k.key_padding + k.bottom_margin;
        if block_w > screen_w || block_h > screen_h {
            anyhow::bail!(
                "keyboard block {:.0}x{:.0} does not fit on a {}x{} screen",
                block_w,
                block_h,
                self.screen.width,
                self.screen.height
            );
        }

        Ok(())
    }
}

// Default value functions
fn default_pinch_threshold() -> f64 { 40.0 }
fn default_right_click_threshold() -> f64 { 40.0 }
fn default_extension_margin() -> f64 { 5.0 }
fn default_drag_hold() -> u64 { 300 }
fn default_click_cooldown() -> u64 { 400 }
fn default_key_press_cooldown() -> u64 { 500 }
fn default_toggle_cooldown() -> u64 { 800 }
fn default_scroll_cooldown() -> u64 { 50 }
fn default_active_zone_margin() -> f64 { 0.15 }
fn default_smoothing_alpha() -> f64 { 0.3 }
fn default_scroll_scale() -> f64 { 0.2 }
fn default_scroll_deadband() -> f64 { 2.0 }
fn default_screen_width() -> u32 { 1920 }
fn default_screen_height() -> u32 { 1080 }
fn default_key_size() -> f64 { 150.0 }
fn default_key_padding() -> f64 { 15.0 }
fn default_bottom_margin() -> f64 { 60.0 }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
gesture:
  pinch_threshold_px: 32.5
timing:
  toggle_cooldown_ms: 1000
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gesture.pinch_threshold_px, 32.5);
        assert_eq!(config.gesture.right_click_threshold_px, 40.0);
        assert_eq!(config.timing.toggle_cooldown_ms, 1000);
        assert_eq!(config.timing.click_cooldown_ms, 400);
        assert_eq!(config.pointer.smoothing_alpha, 0.3);
        assert_eq!(config.screen.width, 1920);
    }

    #[test]
    fn test_rejects_bad_alpha() {
        let mut config = AppConfig::default();
        config.pointer.smoothing_alpha = 0.0;
        assert!(config.validate().is_err());
        config.pointer.smoothing_alpha = 1.5;
        assert!(config.validate().is_err());
        config.pointer.smoothing_alpha = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_margin() {
        let mut config = AppConfig::default();
        config.pointer.active_zone_margin = 0.5;
        assert!(config.validate().is_err());
        config.pointer.active_zone_margin = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_keyboard_larger_than_screen() {
        let mut config = AppConfig::default();
        config.screen.width = 800;
        config.screen.height = 600;
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("does not fit"));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("airpointer.yaml");
        let path = path.to_string_lossy().to_string();

        let mut config = AppConfig::default();
        config.pointer.smoothing_alpha = 0.45;
        config.timing.scroll_cooldown_ms = 80;
        config.save(&path).await?;

        let loaded = AppConfig::load(&path).await?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_or_default_missing_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("missing.yaml");
        let config = AppConfig::load_or_default(&path.to_string_lossy()).await?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_values() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("bad.yaml");
        std::fs::write(&path, "screen:\n  width: 0\n")?;
        assert!(AppConfig::load(&path.to_string_lossy()).await.is_err());
        Ok(())
    }
}
