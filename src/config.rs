// src/config.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{PointerError, Result};
use crate::gesture::GestureProfile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub gesture: GestureConfig,
    pub cooldown: CooldownConfig,
    pub smoothing: SmoothingConfig,
    pub scroll: ScrollConfig,
    pub screen: ScreenConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub profile: GestureProfile,
    /// One classification per interval instead of one per frame.
    pub suppression_enabled: bool,
    pub suppression_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            profile: GestureProfile::Discrete,
            suppression_enabled: false,
            suppression_ms: 2000,
        }
    }
}

impl GestureConfig {
    pub fn suppression(&self) -> Option<Duration> {
        self.suppression_enabled
            .then(|| Duration::from_millis(self.suppression_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub click_ms: u64,
    pub move_ms: u64,
    pub scroll_ms: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            click_ms: 500,
            move_ms: 5,
            scroll_ms: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub alpha: f64,
    pub jump_threshold_px: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            jump_threshold_px: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Ticks per unit of normalized fingertip travel.
    pub sensitivity: f64,
    /// Normalized distance the pointing tips must hang below the hand.
    pub down_margin: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            sensitivity: 80.0,
            down_margin: 0.02,
        }
    }
}

/// Screen size override; the pointer backend is asked when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ControllerConfig {
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "handpointer", "HandPointer")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, else the platform config file when it
    /// exists, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.exists() => Self::load(default),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let alpha = self.smoothing.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(PointerError::Config(format!(
                "smoothing.alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        if !(self.smoothing.jump_threshold_px > 0.0) {
            return Err(PointerError::Config(
                "smoothing.jump_threshold_px must be positive".into(),
            ));
        }
        if !(self.scroll.sensitivity >= 0.0) || !(self.scroll.down_margin >= 0.0) {
            return Err(PointerError::Config(
                "scroll.sensitivity and scroll.down_margin must be non-negative".into(),
            ));
        }
        if self.gesture.suppression_enabled && self.gesture.suppression_ms == 0 {
            return Err(PointerError::Config(
                "gesture.suppression_ms must be non-zero when suppression is enabled".into(),
            ));
        }
        if matches!(self.screen.width, Some(0)) || matches!(self.screen.height, Some(0)) {
            return Err(PointerError::Config("screen dimensions must be non-zero".into()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gesture.suppression(), None);
        assert_eq!(config.cooldown.click_ms, 500);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "gesture": {{ "profile": "split_scroll", "suppression_enabled": true }},
                 "smoothing": {{ "alpha": 0.25 }} }}"#
        )
        .unwrap();

        let config = ControllerConfig::load(file.path()).unwrap();
        assert_eq!(config.gesture.profile, GestureProfile::SplitScroll);
        assert_eq!(config.gesture.suppression(), Some(Duration::from_secs(2)));
        assert_eq!(config.smoothing.alpha, 0.25);
        assert_eq!(config.smoothing.jump_threshold_px, 500.0);
        assert_eq!(config.scroll, ScrollConfig::default());
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let mut config = ControllerConfig::default();
        config.smoothing.alpha = 1.0;
        assert!(matches!(config.validate(), Err(PointerError::Config(_))));
        config.smoothing.alpha = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip_keeps_profile_name() {
        let mut config = ControllerConfig::default();
        config.gesture.profile = GestureProfile::SplitScroll;
        let json = config.to_json().unwrap();
        assert!(json.contains("\"split_scroll\""));
        let back: ControllerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            ControllerConfig::resolve(Some(&missing)),
            Err(PointerError::Io(_))
        ));
    }
}
