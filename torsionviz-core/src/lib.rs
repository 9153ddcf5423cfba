/// torsionviz Core Library - Shaft torsion formulas and the deformation rendering pipeline
///
/// This library provides the front-end independent pieces of the torsion
/// visualizer: the projection camera, twisted-surface mesh generation,
/// painter's-algorithm rendering onto an abstract 2D surface, stress coloring,
/// pointer interaction and overlay annotations.

pub mod annotation;
pub mod calculator;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod mesh;
pub mod params;
pub mod projection;
pub mod render;
pub mod surface;
pub mod transform;
pub mod visualizer;

// Re-export commonly used types
pub use calculator::{calculate, Results};
pub use color::{Rgb, Rgba, StressColorMap};
pub use config::{DisplayOptions, VisualizerConfig};
pub use controller::{InteractionController, PointerEvent};
pub use error::{ConfigError, VisualizerError};
pub use mesh::{generate_twisted_surface, SurfaceMesh, SurfacePoint};
pub use params::{ParamInputs, ShaftParams};
pub use projection::{Camera, PointInput, ProjectedPoint, ViewPreset, Viewport};
pub use render::MeshRenderer;
pub use surface::{DrawCommand, Paint, RecordingSurface, Surface};
pub use transform::RotationState;
pub use visualizer::{FrameOutcome, InputEvent, Visualizer};
