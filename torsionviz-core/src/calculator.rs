/// Closed-form torsion of a circular shaft
use std::f64::consts::PI;

use serde::Serialize;

use crate::params::ShaftParams;

const PA_PER_GPA: f64 = 1e9;

/// Derived quantities for one parameter set. Recomputed on every change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Results {
    /// J in m⁴
    pub polar_moment_of_inertia: f64,
    /// τmax in Pa
    pub max_shear_stress: f64,
    /// θ in radians
    pub twist_angle: f64,
    pub twist_angle_degrees: f64,
    /// θ/L in rad/m
    pub twist_per_length: f64,
    /// ½·T·θ in J
    pub strain_energy: f64,
    /// T/θ in N·m/rad
    pub torsional_stiffness: f64,
}

impl Results {
    pub fn max_shear_stress_mpa(&self) -> f64 {
        self.max_shear_stress / 1e6
    }
}

/// J = π/32 (D⁴ − d⁴)
pub fn polar_moment_of_inertia(outer_diameter: f64, inner_diameter: f64) -> f64 {
    (PI / 32.0) * (outer_diameter.powi(4) - inner_diameter.powi(4))
}

/// τmax = T·r / J at the outer radius
pub fn max_shear_stress(torque: f64, outer_diameter: f64, inner_diameter: f64) -> f64 {
    let j = polar_moment_of_inertia(outer_diameter, inner_diameter);
    torque * (outer_diameter / 2.0) / j
}

/// θ = T·L / (G·J), with G given in GPa
pub fn twist_angle(
    torque: f64,
    length: f64,
    shear_modulus_gpa: f64,
    outer_diameter: f64,
    inner_diameter: f64,
) -> f64 {
    let j = polar_moment_of_inertia(outer_diameter, inner_diameter);
    torque * length / (shear_modulus_gpa * PA_PER_GPA * j)
}

/// Rotation of ring `index` out of `total` under a linear twist profile
pub fn segment_rotation(angle: f64, index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    angle * (index as f64 / total as f64)
}

pub fn calculate(params: &ShaftParams) -> Results {
    let twist = twist_angle(
        params.torque,
        params.length,
        params.shear_modulus,
        params.outer_diameter,
        params.inner_diameter,
    );

    Results {
        polar_moment_of_inertia: polar_moment_of_inertia(
            params.outer_diameter,
            params.inner_diameter,
        ),
        max_shear_stress: max_shear_stress(
            params.torque,
            params.outer_diameter,
            params.inner_diameter,
        ),
        twist_angle: twist,
        twist_angle_degrees: twist.to_degrees(),
        twist_per_length: twist / params.length,
        strain_energy: 0.5 * params.torque * twist,
        torsional_stiffness: params.torque / twist,
    }
}
