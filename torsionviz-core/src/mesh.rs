/// Procedural twisted-cylinder surface
use std::f64::consts::TAU;

use nalgebra::Point3;

use crate::calculator::segment_rotation;
use crate::error::VisualizerError;
use crate::params::ShaftParams;
use crate::transform::Transform;

/// Number of angular steps around the circumference
pub const ANGULAR_RESOLUTION: usize = 48;

/// A surface vertex and the twist that placed it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Point3<f64>,
    /// Angular position on the untwisted circle
    pub angle: f64,
    /// Twist rotation of the ring this point belongs to
    pub rotation: f64,
}

/// Grid of surface points, rows along the shaft axis and columns around it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    rows: Vec<Vec<SurfacePoint>>,
}

impl SurfaceMesh {
    /// Wrap pre-built rows. Rows may be ragged; the renderer skips what it cannot draw.
    pub fn from_rows(rows: Vec<Vec<SurfacePoint>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<SurfacePoint>] {
        &self.rows
    }

    pub fn ring_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, ring: usize, column: usize) -> Option<&SurfacePoint> {
        self.rows.get(ring).and_then(|row| row.get(column))
    }

    /// Largest |rotation| over every point
    pub fn max_rotation(&self) -> f64 {
        self.rows
            .iter()
            .flatten()
            .map(|p| p.rotation.abs())
            .fold(0.0, f64::max)
    }
}

/// Build the surface of a shaft twisted linearly from 0 at `z = -L/2` to
/// `twist_angle` at `z = +L/2`.
///
/// Produces `segments + 1` rings of `ANGULAR_RESOLUTION + 1` points; the last
/// column repeats the first at angle 2π so the seam closes.
pub fn generate_twisted_surface(
    params: &ShaftParams,
    twist_angle: f64,
) -> Result<SurfaceMesh, VisualizerError> {
    params.validate()?;
    if !twist_angle.is_finite() {
        return Err(VisualizerError::invalid_parameter(
            "twist_angle",
            format!("must be finite, got {}", twist_angle),
        ));
    }

    let radius = params.outer_radius();
    let start_z = -params.length / 2.0;

    let rows = (0..=params.segments)
        .map(|i| {
            let z = start_z + params.length * (i as f64 / params.segments as f64);
            let rotation = segment_rotation(twist_angle, i, params.segments);

            (0..=ANGULAR_RESOLUTION)
                .map(|j| {
                    let angle = j as f64 / ANGULAR_RESOLUTION as f64 * TAU;
                    let untwisted = Point3::new(radius * angle.cos(), radius * angle.sin(), z);
                    SurfacePoint {
                        position: Transform::twist_about_axis(&untwisted, rotation),
                        angle,
                        rotation,
                    }
                })
                .collect()
        })
        .collect();

    Ok(SurfaceMesh { rows })
}
