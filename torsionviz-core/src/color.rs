/// Colors and the stress gradient
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const RED: Self = Self::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

/// Color with an opacity in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` notation
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        c.with_alpha(1.0)
    }
}

/// Linear gradient from a low-stress color to a high-stress color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressColorMap {
    pub min: Rgb,
    pub max: Rgb,
}

impl StressColorMap {
    pub fn new(min: Rgb, max: Rgb) -> Self {
        Self { min, max }
    }

    /// Map a normalized value to a color. Input outside `[0, 1]` is clamped and
    /// NaN reads as 0.
    pub fn color_for(&self, value: f64) -> Rgb {
        let t = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        Rgb::new(
            lerp_channel(self.min.r, self.max.r, t),
            lerp_channel(self.min.g, self.max.g, t),
            lerp_channel(self.min.b, self.max.b, t),
        )
    }
}

impl Default for StressColorMap {
    fn default() -> Self {
        Self::new(Rgb::BLUE, Rgb::RED)
    }
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let value = f64::from(from) + (f64::from(to) - f64::from(from)) * t;
    value.round().clamp(0.0, 255.0) as u8
}
