/// Camera rotation state and the model-to-view transform
use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Transform builder for the view pipeline
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f64> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // X is applied first, then Y, then Z
        rz * ry * rx
    }

    /// Create a uniform scale matrix
    pub fn scale_matrix(scale: f64) -> Matrix4<f64> {
        Matrix4::new_scaling(scale)
    }

    /// Scale into pixels, then rotate into view space
    pub fn view_matrix(rotation: &RotationState, scale: f64) -> Matrix4<f64> {
        Self::rotation_matrix(rotation) * Self::scale_matrix(scale)
    }

    /// Rotate a point about the shaft (z) axis, leaving z untouched
    pub fn twist_about_axis(point: &Point3<f64>, angle: f64) -> Point3<f64> {
        let (sin, cos) = angle.sin_cos();
        Point3::new(
            point.x * cos - point.y * sin,
            point.x * sin + point.y * cos,
            point.z,
        )
    }
}
