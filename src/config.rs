//! Startup configuration read from a JSON file.

use crate::entity::EntityConfig;
use crate::error::LoadError;
use serde::Deserialize;
use std::path::Path;

/// Window and frame pacing settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub width: i32,
    pub height: i32,
    pub fullscreen: bool,
    /// Target frame rate of the limiter
    pub fps: i32,
    pub limit_fps: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fullscreen: false,
            fps: 60,
            limit_fps: true,
        }
    }
}

impl VideoConfig {
    /// Initial zoom: one step per background height (216px) of window.
    pub fn initial_zoom(&self) -> f64 {
        1.0 + (self.height / 216) as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub video: VideoConfig,
    pub player: EntityConfig,
}

impl Config {
    /// Reads `path`. A missing or malformed file is logged and replaced by
    /// the defaults; the game runs either way.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(err) => {
                tracing::warn!(%err, "couldn't load configuration file, using defaults");
                Self::default()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let txt = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&txt).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.sanitize();
        Ok(config)
    }

    /// Negative sizes and rates become their absolute value.
    pub fn sanitize(&mut self) {
        let video = &mut self.video;
        video.width = video.width.saturating_abs();
        video.height = video.height.saturating_abs();
        video.fps = video.fps.saturating_abs();
        self.player.sanitize();
    }
}
