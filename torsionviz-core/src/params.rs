/// Shaft parameters and the rules for resolving them from raw text fields.
///
/// Form inputs arrive as free text. Each field is read by taking the longest
/// numeric prefix (so `"2.5 m"` reads as `2.5`) and falls back to its default
/// when nothing parses or the value read is zero.
use nom::{
    character::complete::{digit1, multispace0, one_of},
    combinator::{opt, recognize},
    number::complete::double,
    sequence::{pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::error::VisualizerError;

pub const DEFAULT_LENGTH: f64 = 1.0;
pub const DEFAULT_OUTER_DIAMETER: f64 = 0.1;
pub const DEFAULT_INNER_DIAMETER: f64 = 0.0;
pub const DEFAULT_SEGMENTS: usize = 10;
pub const DEFAULT_ELASTIC_MODULUS: f64 = 200.0;
pub const DEFAULT_SHEAR_MODULUS: f64 = 80.0;
pub const DEFAULT_POISSON_RATIO: f64 = 0.3;
pub const DEFAULT_TORQUE: f64 = 100.0;
pub const DEFAULT_DEFORMATION_SCALE: f64 = 1.0;

/// Geometry and material of a circular shaft under torque.
///
/// Lengths are in metres, torque in N·m, moduli in GPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaftParams {
    pub length: f64,
    pub outer_diameter: f64,
    /// Zero for a solid shaft
    pub inner_diameter: f64,
    /// Number of rings along the shaft axis
    pub segments: usize,
    pub torque: f64,
    pub shear_modulus: f64,
    pub elastic_modulus: f64,
    pub poisson_ratio: f64,
}

impl Default for ShaftParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            outer_diameter: DEFAULT_OUTER_DIAMETER,
            inner_diameter: DEFAULT_INNER_DIAMETER,
            segments: DEFAULT_SEGMENTS,
            torque: DEFAULT_TORQUE,
            shear_modulus: DEFAULT_SHEAR_MODULUS,
            elastic_modulus: DEFAULT_ELASTIC_MODULUS,
            poisson_ratio: DEFAULT_POISSON_RATIO,
        }
    }
}

impl ShaftParams {
    pub fn outer_radius(&self) -> f64 {
        self.outer_diameter / 2.0
    }

    /// Check the invariants every frame relies on
    pub fn validate(&self) -> Result<(), VisualizerError> {
        if self.segments == 0 {
            return Err(VisualizerError::invalid_parameter(
                "segments",
                "must be at least 1",
            ));
        }
        positive("length", self.length)?;
        positive("outer_diameter", self.outer_diameter)?;
        if !self.inner_diameter.is_finite() || self.inner_diameter < 0.0 {
            return Err(VisualizerError::invalid_parameter(
                "inner_diameter",
                format!("must be zero or positive, got {}", self.inner_diameter),
            ));
        }
        if self.inner_diameter >= self.outer_diameter {
            return Err(VisualizerError::invalid_parameter(
                "inner_diameter",
                format!(
                    "{} must be smaller than the outer diameter {}",
                    self.inner_diameter, self.outer_diameter
                ),
            ));
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), VisualizerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VisualizerError::invalid_parameter(
            name,
            format!("must be positive, got {}", value),
        ))
    }
}

/// Raw text of every parameter field, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamInputs {
    pub length: String,
    pub outer_diameter: String,
    pub inner_diameter: String,
    pub segments: String,
    pub elastic_modulus: String,
    pub shear_modulus: String,
    pub poisson_ratio: String,
    pub torque: String,
    pub deformation_scale: String,
}

impl ParamInputs {
    /// Resolve every field, substituting defaults for unreadable input.
    ///
    /// Returns the shaft parameters and the deformation scale multiplier.
    pub fn resolve(&self) -> (ShaftParams, f64) {
        let params = ShaftParams {
            length: float_or(&self.length, DEFAULT_LENGTH),
            outer_diameter: float_or(&self.outer_diameter, DEFAULT_OUTER_DIAMETER),
            inner_diameter: float_or(&self.inner_diameter, DEFAULT_INNER_DIAMETER),
            segments: int_or(&self.segments, DEFAULT_SEGMENTS),
            torque: float_or(&self.torque, DEFAULT_TORQUE),
            shear_modulus: float_or(&self.shear_modulus, DEFAULT_SHEAR_MODULUS),
            elastic_modulus: float_or(&self.elastic_modulus, DEFAULT_ELASTIC_MODULUS),
            poisson_ratio: float_or(&self.poisson_ratio, DEFAULT_POISSON_RATIO),
        };
        let deformation_scale = float_or(&self.deformation_scale, DEFAULT_DEFORMATION_SCALE);
        (params, deformation_scale)
    }
}

fn leading_float(input: &str) -> IResult<&str, f64> {
    preceded(multispace0, double)(input)
}

fn leading_int(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        recognize(pair(opt(one_of("+-")), digit1)),
    )(input)
}

/// Read the numeric prefix of `text`, or `default` when absent, zero or NaN
pub fn float_or(text: &str, default: f64) -> f64 {
    match leading_float(text) {
        Ok((_, value)) if value != 0.0 && !value.is_nan() => value,
        _ => default,
    }
}

/// Read the integer prefix of `text`, or `default` when absent or zero.
/// Negative counts also fall back, since a count cannot be negative.
pub fn int_or(text: &str, default: usize) -> usize {
    match leading_int(text) {
        Ok((_, digits)) => match digits.parse::<i64>() {
            Ok(value) if value > 0 => usize::try_from(value).unwrap_or(default),
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_prefix_parsing() {
        assert_eq!(float_or("2.5", 1.0), 2.5);
        assert_eq!(float_or("  2.5 m", 1.0), 2.5);
        assert_eq!(float_or("1e-3", 1.0), 0.001);
        assert_eq!(float_or("-4", 1.0), -4.0);
        assert_eq!(float_or("abc", 1.0), 1.0);
        assert_eq!(float_or("", 1.0), 1.0);
        // zero reads as "unset"
        assert_eq!(float_or("0", 0.1), 0.1);
    }

    #[test]
    fn test_int_prefix_parsing() {
        assert_eq!(int_or("12", 10), 12);
        assert_eq!(int_or("12.9", 10), 12);
        assert_eq!(int_or("0", 10), 10);
        assert_eq!(int_or("-3", 10), 10);
        assert_eq!(int_or("+5", 10), 5);
        assert_eq!(int_or(" +7 segments", 10), 7);
        assert_eq!(int_or("x", 10), 10);
    }

    #[test]
    fn test_resolve_defaults() {
        let (params, scale) = ParamInputs::default().resolve();
        assert_eq!(params, ShaftParams::default());
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_resolve_fields() {
        let inputs = ParamInputs {
            length: "2".into(),
            outer_diameter: "0.05".into(),
            segments: "20".into(),
            torque: "250".into(),
            deformation_scale: "100".into(),
            ..Default::default()
        };
        let (params, scale) = inputs.resolve();
        assert_eq!(params.length, 2.0);
        assert_eq!(params.outer_diameter, 0.05);
        assert_eq!(params.inner_diameter, 0.0);
        assert_eq!(params.segments, 20);
        assert_eq!(params.torque, 250.0);
        assert_eq!(params.shear_modulus, 80.0);
        assert_eq!(scale, 100.0);
    }

    #[test]
    fn test_validate() {
        assert!(ShaftParams::default().validate().is_ok());

        let params = ShaftParams {
            segments: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(VisualizerError::InvalidParameter { name: "segments", .. })
        ));

        let params = ShaftParams {
            length: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = ShaftParams {
            inner_diameter: 0.1,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(VisualizerError::InvalidParameter { name: "inner_diameter", .. })
        ));
    }
}
