/// Viewer settings, optionally read from a JSON file
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use surfgen_core::camera::{FRICTION, KEY_SPEED};
use surfgen_core::{CameraState, View};

/// Every field falls back to its default when missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Target frame rate
    pub fps: u32,
    /// Share of the spin velocity lost per frame after a drag
    pub friction: f32,
    /// Spin velocity added per key press, radians per frame
    pub key_speed: f32,
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Overrides the distance the chosen scene was composed for
    pub view_distance: Option<f32>,
    /// Constant spin around Y, radians per frame
    pub auto_spin: f32,
    /// Direction towards the light, in view space
    pub light_dir: [f32; 3],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            friction: FRICTION,
            key_speed: KEY_SPEED,
            fov_degrees: 40.0,
            z_near: 1.0,
            z_far: 100.0,
            view_distance: None,
            auto_spin: 0.0,
            light_dir: [0.0, 0.5, 1.0],
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn view(&self, scene_distance: f32) -> View {
        View::new(
            self.fov_degrees,
            self.z_near,
            self.z_far,
            self.view_distance.unwrap_or(scene_distance),
        )
    }

    pub fn camera(&self) -> CameraState {
        CameraState::new(self.friction, self.key_speed)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_viewer() {
        let config = AppConfig::default();
        let view = config.view(12.0);
        assert_eq!(view, View::default());
        assert_eq!(config.camera(), CameraState::default());
        assert_eq!(config.frame_time(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn test_partial_json() {
        let config = AppConfig::from_json(r#"{ "fps": 60, "view_distance": 20.0 }"#).unwrap();
        assert_eq!(config.fps, 60);
        assert_eq!(config.view(12.0).distance, 20.0);
        assert_eq!(config.friction, FRICTION);
        assert_eq!(config.light_dir, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(AppConfig::from_json(r#"{ "fsp": 60 }"#).is_err());
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let config = AppConfig {
            fps: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.frame_time(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = AppConfig::load(Path::new("/nonexistent/surfgen.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/surfgen.json"));
    }
}
