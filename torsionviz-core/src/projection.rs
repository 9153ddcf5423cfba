/// Camera state and the hand-rolled perspective projection
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::VisualizerError;
use crate::transform::{RotationState, Transform};

/// Eye-to-projection-plane constant of the perspective divide
pub const PERSPECTIVE: f64 = 2000.0;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 10.0;

/// Preset orientations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPreset {
    Front,
    Side,
    Top,
}

/// A point projected to screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    /// Perspective scale factor
    pub scale: f64,
    /// Post-rotation view depth, larger is farther
    pub depth: f64,
}

impl ProjectedPoint {
    /// Returned in place of points that cannot be projected
    pub const DEGENERATE: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        depth: 0.0,
    };
}

/// A point whose coordinates may be missing, as received from loosely
/// shaped input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointInput {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl PointInput {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }
}

impl TryFrom<PointInput> for Point3<f64> {
    type Error = VisualizerError;

    fn try_from(input: PointInput) -> Result<Self, Self::Error> {
        match (input.x, input.y, input.z) {
            (Some(x), Some(y), Some(z)) => Ok(Point3::new(x, y, z)),
            _ => Err(VisualizerError::InvalidGeometry(format!(
                "point is missing a coordinate: {:?}",
                input
            ))),
        }
    }
}

/// Drawing-surface size and the model-to-pixel scale for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub base_scale: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, base_scale: f64) -> Self {
        Self {
            width,
            height,
            base_scale,
        }
    }

    /// Fit a shaft of the given length and diameter inside the surface
    pub fn fit_shaft(width: f64, height: f64, length: f64, outer_diameter: f64) -> Self {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        let max_dimension = length.max(outer_diameter * aspect);
        let base_scale = if max_dimension > 0.0 {
            width.min(height) / (max_dimension * 1.5)
        } else {
            1.0
        };
        Self::new(width, height, base_scale)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Camera configuration for the orbit view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
    pub distance: f64,
    zoom: f64,
}

impl Camera {
    pub fn new(rotation_x: f64, rotation_y: f64, rotation_z: f64, distance: f64, zoom: f64) -> Self {
        Self {
            rotation_x,
            rotation_y,
            rotation_z,
            distance,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    /// Orbit by deltas about the X and Y axes (radians)
    pub fn rotate(&mut self, about_x: f64, about_y: f64) {
        self.rotation_x += about_x;
        self.rotation_y += about_y;
    }

    pub fn rotation(&self) -> RotationState {
        RotationState::new(self.rotation_x, self.rotation_y, self.rotation_z)
    }

    pub fn set_view(&mut self, view: ViewPreset) {
        let (x, y) = match view {
            ViewPreset::Front => (0.0, 0.0),
            ViewPreset::Side => (0.0, std::f64::consts::FRAC_PI_2),
            ViewPreset::Top => (std::f64::consts::FRAC_PI_2, 0.0),
        };
        self.rotation_x = x;
        self.rotation_y = y;
    }

    /// Project a 3D point to 2D screen space, reporting unprojectable points
    pub fn try_project(
        &self,
        point: &Point3<f64>,
        viewport: &Viewport,
    ) -> Result<ProjectedPoint, VisualizerError> {
        if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
            return Err(VisualizerError::InvalidGeometry(format!(
                "non-finite coordinate in {:?}",
                point
            )));
        }

        let view = Transform::view_matrix(&self.rotation(), viewport.base_scale * self.zoom);
        let rotated = view.transform_point(point);

        let denominator = PERSPECTIVE + rotated.z + self.distance;
        if denominator <= f64::EPSILON {
            return Err(VisualizerError::InvalidGeometry(format!(
                "point at depth {:.3} lies behind the eye",
                rotated.z
            )));
        }
        let scale = PERSPECTIVE / denominator;
        let (cx, cy) = viewport.center();

        Ok(ProjectedPoint {
            x: cx + rotated.x * scale,
            y: cy + rotated.y * scale,
            scale,
            depth: rotated.z,
        })
    }

    /// Project a 3D point, degrading to [`ProjectedPoint::DEGENERATE`] on failure
    pub fn project(&self, point: &Point3<f64>, viewport: &Viewport) -> ProjectedPoint {
        self.try_project(point, viewport).unwrap_or_else(|err| {
            warn!(%err, "projection fell back to the degenerate point");
            ProjectedPoint::DEGENERATE
        })
    }

    /// Project every point, or `None` if any of them cannot be projected
    pub fn project_all<I>(&self, points: I, viewport: &Viewport) -> Option<Vec<ProjectedPoint>>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        points
            .into_iter()
            .map(|p| self.try_project(&p, viewport).ok())
            .collect()
    }

    /// Project a point that may be missing coordinates
    pub fn project_input(&self, input: PointInput, viewport: &Viewport) -> ProjectedPoint {
        match Point3::try_from(input) {
            Ok(point) => self.project(&point, viewport),
            Err(err) => {
                warn!(%err, "projection fell back to the degenerate point");
                ProjectedPoint::DEGENERATE
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(20f64.to_radians(), (-30f64).to_radians(), 0.0, 1000.0, 1.5)
    }
}
