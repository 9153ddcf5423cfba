/// Overlay glyphs and text placed by projecting key points on the shaft.
///
/// Labels are rebuilt from scratch on every render; nothing is diffed or
/// carried between frames.
use std::f64::consts::{FRAC_PI_6, PI, TAU};

use nalgebra::Point3;
use tracing::debug;

use crate::calculator::Results;
use crate::color::{Rgb, Rgba};
use crate::params::ShaftParams;
use crate::projection::{Camera, ProjectedPoint, Viewport};
use crate::surface::{Paint, Surface};

/// Fractions of the shaft length that carry twist-angle labels
pub const LABEL_POSITIONS: [f64; 3] = [0.25, 0.5, 0.75];

/// Section indicators are drawn at `SECTION_STATIONS + 1` evenly spaced rings
pub const SECTION_STATIONS: usize = 8;

const LABEL_COLOR: Rgba = Rgba::new(255, 255, 255, 0.9);
const ARROW_COLOR: Rgba = Rgba::new(255, 0, 0, 0.7);
const SECTION_RING_COLOR: Rgba = Rgba::new(255, 255, 255, 0.2);
const RADIAL_LINE_COLOR: Rgba = Rgba::new(255, 255, 255, 0.8);

const ARROW_SEGMENTS: usize = 8;
const ARROW_TICK: f64 = 10.0;
const ARC_STEPS: usize = 32;
const ARROWHEAD_SIZE: f64 = 8.0;

/// Text placed at a screen position
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Holds the labels of the current frame
#[derive(Debug, Clone, Default)]
pub struct AnnotationLayer {
    labels: Vec<Label>,
}

impl AnnotationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// Replace the labels with the twist angles at [`LABEL_POSITIONS`] and,
    /// when results are known, the maximum shear stress. A twist label whose
    /// anchor cannot be projected is left out.
    pub fn update_labels(
        &mut self,
        params: &ShaftParams,
        deformation: f64,
        results: Option<&Results>,
        camera: &Camera,
        viewport: &Viewport,
    ) {
        self.labels.clear();

        let radius = params.outer_radius();
        for pos in LABEL_POSITIONS {
            let z = -params.length / 2.0 + params.length * pos;
            let anchor = match camera.try_project(&Point3::new(radius, 0.0, z), viewport) {
                Ok(anchor) => anchor,
                Err(err) => {
                    debug!(%err, pos, "twist label not placed");
                    continue;
                }
            };
            self.labels.push(Label {
                text: format!("θ = {:.1}°", (deformation * pos).to_degrees()),
                x: anchor.x,
                y: anchor.y,
            });
        }

        if let Some(results) = results {
            self.labels.push(Label {
                text: format!("τmax = {:.2} MPa", results.max_shear_stress_mpa()),
                x: 10.0,
                y: 20.0,
            });
        }
    }

    pub fn draw_labels<S: Surface + ?Sized>(&self, surface: &mut S) {
        for label in &self.labels {
            surface.fill_text(&label.text, label.x, label.y, LABEL_COLOR);
        }
    }
}

/// Circular arrows at both shaft ends showing the sense of the applied torque
pub fn draw_torsion_indicators<S: Surface + ?Sized>(
    surface: &mut S,
    params: &ShaftParams,
    deformation: f64,
    camera: &Camera,
    viewport: &Viewport,
) {
    let size = params.length * 0.1;
    let direction = if deformation > 0.0 { 1.0 } else { -1.0 };
    let half = params.length / 2.0;

    draw_arrow(surface, half, size, direction, camera, viewport);
    draw_arrow(surface, -half, size, -direction, camera, viewport);
}

fn draw_arrow<S: Surface + ?Sized>(
    surface: &mut S,
    z: f64,
    radius: f64,
    direction: f64,
    camera: &Camera,
    viewport: &Viewport,
) {
    let ring = (0..=ARROW_SEGMENTS).map(|i| {
        let angle = i as f64 / ARROW_SEGMENTS as f64 * TAU;
        Point3::new(radius * angle.cos(), radius * angle.sin(), z)
    });
    let Some(ring) = camera.project_all(ring, viewport) else {
        debug!(z, "torsion arrow not projectable");
        return;
    };
    surface.trace_path(&screen_path(&ring));
    surface.stroke(ARROW_COLOR, 1.0);

    let tick_angle = FRAC_PI_6 * direction;
    let tip = Point3::new(radius * tick_angle.cos(), radius * tick_angle.sin(), z);
    let Ok(tip) = camera.try_project(&tip, viewport) else {
        return;
    };
    surface.trace_path(&[(tip.x, tip.y), (tip.x + ARROW_TICK * direction, tip.y)]);
    surface.stroke(ARROW_COLOR, 1.0);
}

/// Rings along the shaft, each with an arc sweeping through the local twist
pub fn draw_section_indicators<S: Surface + ?Sized>(
    surface: &mut S,
    params: &ShaftParams,
    deformation: f64,
    camera: &Camera,
    viewport: &Viewport,
) {
    let radius = params.outer_radius();
    for i in 0..=SECTION_STATIONS {
        let ratio = i as f64 / SECTION_STATIONS as f64;
        let z = -params.length / 2.0 + params.length * ratio;
        draw_section(surface, z, radius, deformation * ratio, camera, viewport);
    }
}

fn draw_section<S: Surface + ?Sized>(
    surface: &mut S,
    z: f64,
    radius: f64,
    rotation: f64,
    camera: &Camera,
    viewport: &Viewport,
) {
    let arc_radius = radius * 1.2;
    let polar = |angle: f64| Point3::new(arc_radius * angle.cos(), arc_radius * angle.sin(), z);

    let ring = (0..=ARC_STEPS).map(|i| polar(i as f64 / ARC_STEPS as f64 * TAU));
    if let Some(ring) = camera.project_all(ring, viewport) {
        surface.trace_path(&screen_path(&ring));
        surface.close_path();
        surface.stroke(SECTION_RING_COLOR, 1.0);
    }

    let arc = (0..=ARC_STEPS).map(|i| polar(i as f64 / ARC_STEPS as f64 * rotation));
    if let Some(arc) = camera.project_all(arc, viewport) {
        let intensity = rotation.abs() / PI;
        let arc_color = Rgb::new(255, 165, 0).with_alpha((0.7 + intensity * 0.3).min(1.0));
        surface.trace_path(&screen_path(&arc));
        surface.stroke(arc_color, 2.0);
        if let [.., from, to] = arc.as_slice() {
            draw_arrowhead(surface, from, to, ARROWHEAD_SIZE, arc_color);
        }
    }

    let spoke = [
        Point3::new(0.0, 0.0, z),
        Point3::new(radius * rotation.cos(), radius * rotation.sin(), z),
    ];
    match camera.project_all(spoke, viewport) {
        Some(spoke) => {
            surface.trace_path(&screen_path(&spoke));
            surface.stroke(RADIAL_LINE_COLOR, 1.0);
        }
        None => debug!(z, "section indicator partly behind the eye"),
    }
}

fn draw_arrowhead<S: Surface + ?Sized>(
    surface: &mut S,
    from: &ProjectedPoint,
    to: &ProjectedPoint,
    size: f64,
    color: Rgba,
) {
    let heading = (to.y - from.y).atan2(to.x - from.x);
    surface.begin_path();
    for side in [heading - FRAC_PI_6, heading + FRAC_PI_6] {
        surface.move_to(to.x, to.y);
        surface.line_to(to.x - size * side.cos(), to.y - size * side.sin());
    }
    surface.stroke(color, 2.0);
}

/// Cross-sections at [`LABEL_POSITIONS`] shaded from the axis (low shear) to
/// the rim (high shear)
pub fn draw_stress_sections<S: Surface + ?Sized>(
    surface: &mut S,
    params: &ShaftParams,
    camera: &Camera,
    viewport: &Viewport,
) {
    let radius = params.outer_radius();
    for pos in LABEL_POSITIONS {
        let z = -params.length / 2.0 + params.length * pos;
        let Ok(center) = camera.try_project(&Point3::new(0.0, 0.0, z), viewport) else {
            continue;
        };
        let outline = (0..=ARC_STEPS).map(|i| {
            let angle = i as f64 / ARC_STEPS as f64 * TAU;
            Point3::new(radius * angle.cos(), radius * angle.sin(), z)
        });
        let Some(outline) = camera.project_all(outline, viewport) else {
            debug!(z, "stress section not projectable");
            continue;
        };

        surface.trace_path(&screen_path(&outline));
        surface.close_path();
        surface.fill(&Paint::RadialGradient {
            cx: center.x,
            cy: center.y,
            radius: radius * viewport.base_scale * camera.zoom(),
            inner: Rgb::BLUE.with_alpha(0.2),
            outer: Rgb::RED.with_alpha(0.2),
        });
    }
}

fn screen_path(points: &[ProjectedPoint]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.x, p.y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn setup() -> (Camera, Viewport) {
        (Camera::default(), Viewport::new(800.0, 600.0, 200.0))
    }

    #[test]
    fn test_labels_show_twist_at_quarter_points() {
        let (camera, viewport) = setup();
        let mut layer = AnnotationLayer::new();
        layer.update_labels(&ShaftParams::default(), PI, None, &camera, &viewport);

        let texts: Vec<&str> = layer.labels().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["θ = 45.0°", "θ = 90.0°", "θ = 135.0°"]);
    }

    #[test]
    fn test_labels_are_replaced() {
        let (camera, viewport) = setup();
        let params = ShaftParams::default();
        let results = calculate(&params);
        let mut layer = AnnotationLayer::new();

        layer.update_labels(&params, 0.2, Some(&results), &camera, &viewport);
        assert_eq!(layer.labels().len(), 4);
        assert!(layer.labels()[3].text.starts_with("τmax = 0.51"));

        layer.update_labels(&params, 0.4, None, &camera, &viewport);
        assert_eq!(layer.labels().len(), 3);
        assert_eq!(layer.labels()[1].text, "θ = 11.5°");
    }

    #[test]
    fn test_draw_labels() {
        let (camera, viewport) = setup();
        let mut layer = AnnotationLayer::new();
        layer.update_labels(&ShaftParams::default(), 0.0, None, &camera, &viewport);

        let mut surface = RecordingSurface::new(800.0, 600.0);
        layer.draw_labels(&mut surface);
        assert_eq!(surface.texts().count(), 3);
    }

    #[test]
    fn test_torsion_indicator_direction_follows_sign() {
        let mut camera = Camera::default();
        camera.set_view(crate::projection::ViewPreset::Front);
        let viewport = Viewport::new(800.0, 600.0, 200.0);
        let params = ShaftParams::default();

        let tick_dx = |deformation: f64| {
            let mut surface = RecordingSurface::new(800.0, 600.0);
            draw_torsion_indicators(&mut surface, &params, deformation, &camera, &viewport);
            // second path of the first arrow is the tick
            let moves: Vec<(f64, f64)> = surface
                .commands()
                .iter()
                .filter_map(|c| match c {
                    DrawCommand::MoveTo(x, y) | DrawCommand::LineTo(x, y) => Some((*x, *y)),
                    _ => None,
                })
                .collect();
            let tick_start = moves[ARROW_SEGMENTS + 1];
            let tick_end = moves[ARROW_SEGMENTS + 2];
            tick_end.0 - tick_start.0
        };

        assert!((tick_dx(0.3) - ARROW_TICK).abs() < 1e-9);
        assert!((tick_dx(-0.3) + ARROW_TICK).abs() < 1e-9);
    }

    #[test]
    fn test_section_indicators_per_station() {
        let (camera, viewport) = setup();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        draw_section_indicators(&mut surface, &ShaftParams::default(), 0.5, &camera, &viewport);
        // ring, arc, arrowhead and radial line per station
        let strokes = surface.count(|c| matches!(c, DrawCommand::Stroke { .. }));
        assert_eq!(strokes, 4 * (SECTION_STATIONS + 1));
    }

    #[test]
    fn test_glyphs_behind_the_eye_are_dropped() {
        let mut camera = Camera::default();
        camera.set_zoom(crate::projection::MAX_ZOOM);
        let params = ShaftParams::default();
        let viewport = Viewport::fit_shaft(1920.0, 1080.0, params.length, params.outer_diameter);
        let mut surface = RecordingSurface::new(1920.0, 1080.0);
        draw_torsion_indicators(&mut surface, &params, 0.5, &camera, &viewport);
        draw_section_indicators(&mut surface, &params, 0.5, &camera, &viewport);

        let strokes = surface.count(|c| matches!(c, DrawCommand::Stroke { .. }));
        assert!(strokes < 2 * 2 + 4 * (SECTION_STATIONS + 1));
        assert_eq!(
            surface.count(|c| matches!(
                c,
                DrawCommand::MoveTo(x, y) | DrawCommand::LineTo(x, y) if *x == 0.0 && *y == 0.0
            )),
            0
        );
    }

    #[test]
    fn test_stress_sections_use_gradient() {
        let (camera, viewport) = setup();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        draw_stress_sections(&mut surface, &ShaftParams::default(), &camera, &viewport);
        let gradients = surface.count(|c| matches!(c, DrawCommand::Fill(Paint::RadialGradient { .. })));
        assert_eq!(gradients, LABEL_POSITIONS.len());
    }
}
