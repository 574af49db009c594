use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::OverlayError;

pub const APP_TITLE: &str = "Grok";
pub const WEBSITE: &str = "https://grok.com";

/// Height of the draggable strip at the top of the overlay, in logical points.
pub const DRAG_AREA_HEIGHT: f64 = 30.0;
pub const CORNER_RADIUS: f64 = 15.0;
pub const FRAME_SAVE_NAME: &str = "GrokOverlayWindowFrame";

pub const SAFARI_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

/// File name looked up in the app config directory for overrides.
pub const CONFIG_FILE: &str = "config.json";

/// Initial frame of the overlay window, before any autosaved frame is restored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for InitialFrame {
    fn default() -> Self {
        Self {
            x: 500.0,
            y: 200.0,
            width: 550.0,
            height: 580.0,
        }
    }
}

/// Static configuration of the overlay. Every field has a compiled-in
/// default; `config.json` only needs the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    pub title: String,
    pub home_url: String,
    pub frame: InitialFrame,
    pub drag_area_height: f64,
    pub corner_radius: f64,
    pub frame_save_name: String,
    pub user_agent: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            title: APP_TITLE.to_string(),
            home_url: WEBSITE.to_string(),
            frame: InitialFrame::default(),
            drag_area_height: DRAG_AREA_HEIGHT,
            corner_radius: CORNER_RADIUS,
            frame_save_name: FRAME_SAVE_NAME.to_string(),
            user_agent: SAFARI_USER_AGENT.to_string(),
        }
    }
}

impl OverlayConfig {
    /// Parse a JSON override document and validate the result.
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        let config: OverlayConfig =
            serde_json::from_str(json).map_err(|e| OverlayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.json` from `dir`. A missing file yields the defaults; an
    /// unreadable or invalid one is logged and also yields the defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read config: {e}");
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config overrides");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring config: {e}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), OverlayError> {
        let url = self.home_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OverlayError::Config(format!(
                "home URL must be http(s), got '{}'",
                self.home_url
            )));
        }
        if !(self.drag_area_height > 0.0) {
            return Err(OverlayError::Config("drag area height must be positive".into()));
        }
        if self.frame.width <= self.drag_area_height || self.frame.height <= self.drag_area_height {
            return Err(OverlayError::Config(
                "initial frame must be larger than the drag area".into(),
            ));
        }
        Ok(())
    }

    pub fn home_url(&self) -> Result<Url, OverlayError> {
        Url::parse(&self.home_url).map_err(|e| OverlayError::Config(format!("home URL: {e}")))
    }
}
