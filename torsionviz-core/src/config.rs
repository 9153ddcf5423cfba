/// Runtime configuration for the visualizer.
///
/// Every field has a default, so an empty TOML document is a valid config.
///
/// ```toml
/// [camera]
/// rotation_x_deg = 20.0
/// rotation_y_deg = -30.0
/// zoom = 1.5
///
/// [interaction]
/// drag_sensitivity = 0.01
///
/// [display]
/// show_original = false
/// ```
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::StressColorMap;
use crate::error::ConfigError;
use crate::projection::{Camera, MAX_ZOOM, MIN_ZOOM};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
    pub stress_colors: StressColorMap,
    pub display: DisplayOptions,
}

/// Initial camera, angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub rotation_x_deg: f64,
    pub rotation_y_deg: f64,
    pub rotation_z_deg: f64,
    pub distance: f64,
    pub zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rotation_x_deg: 20.0,
            rotation_y_deg: -30.0,
            rotation_z_deg: 0.0,
            distance: 1000.0,
            zoom: 1.5,
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera::new(
            self.rotation_x_deg.to_radians(),
            self.rotation_y_deg.to_radians(),
            self.rotation_z_deg.to_radians(),
            self.distance,
            self.zoom,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Radians of orbit per pixel of drag
    pub drag_sensitivity: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.01,
            zoom_in_factor: 1.05,
            zoom_out_factor: 0.95,
        }
    }
}

/// Which layers a frame draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Faint undeformed shaft behind the deformed one
    pub show_original: bool,
    pub show_deformed: bool,
    /// Gradient cross-sections
    pub show_stress: bool,
    /// Longitudinal reference lines
    pub show_grid: bool,
    /// Angle and stress labels
    pub show_measurements: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_original: true,
            show_deformed: true,
            show_stress: true,
            show_grid: true,
            show_measurements: true,
        }
    }
}

impl VisualizerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.distance.is_finite() && camera.distance >= 1.0) {
            return Err(invalid("camera.distance", "must be at least 1"));
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&camera.zoom) {
            return Err(invalid(
                "camera.zoom",
                format!("must lie in [{}, {}]", MIN_ZOOM, MAX_ZOOM),
            ));
        }

        let interaction = &self.interaction;
        if !(interaction.drag_sensitivity.is_finite() && interaction.drag_sensitivity > 0.0) {
            return Err(invalid("interaction.drag_sensitivity", "must be positive"));
        }
        if !(interaction.zoom_in_factor > 1.0 && interaction.zoom_in_factor.is_finite()) {
            return Err(invalid("interaction.zoom_in_factor", "must be greater than 1"));
        }
        if !(interaction.zoom_out_factor > 0.0 && interaction.zoom_out_factor < 1.0) {
            return Err(invalid("interaction.zoom_out_factor", "must lie in (0, 1)"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}
