use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ColorFeature, NeoZoneError, Result};

/// Top-level configuration for one physical strip and its controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub pixel_count: u16,
    pub max_animations: u16,
    /// Length of one animation time unit in milliseconds.
    pub animation_timescale_ms: u32,
    pub color_feature: ColorFeature,
    /// The two characters closing the base64 alphabet, `+/` or `-_` for URL-safe.
    pub base64_last_chars: String,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            pixel_count: 60,
            max_animations: 32,
            animation_timescale_ms: 100,
            color_feature: ColorFeature::Rgbw,
            base64_last_chars: "+/".to_string(),
        }
    }
}

impl StripConfig {
    pub fn with_pixel_count(pixel_count: u16) -> Self {
        Self {
            pixel_count,
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: StripConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pixel_count == 0 {
            return Err(NeoZoneError::msg("pixel_count must be at least 1"));
        }
        if self.animation_timescale_ms == 0 {
            return Err(NeoZoneError::msg("animation_timescale_ms must be at least 1"));
        }

        let chars: Vec<char> = self.base64_last_chars.chars().collect();
        let valid = chars.len() == 2
            && chars[0] != chars[1]
            && chars
                .iter()
                .all(|c| c.is_ascii_graphic() && !c.is_ascii_alphanumeric() && *c != '=');
        if !valid {
            return Err(NeoZoneError::msg(format!(
                "base64_last_chars `{}` must be two distinct symbols",
                self.base64_last_chars
            )));
        }
        Ok(())
    }
}
