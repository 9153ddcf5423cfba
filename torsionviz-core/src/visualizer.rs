/// The torsion visualizer: one owned pipeline from parameters to pixels.
///
/// Every state change (new parameters, camera drag, wheel, resize, toggle)
/// runs one complete pass: regenerate meshes, project, sort, draw, annotate.
/// A pass either draws a whole frame or leaves the previous one untouched.
use tracing::{debug, error};

use crate::annotation::{
    draw_section_indicators, draw_stress_sections, draw_torsion_indicators, AnnotationLayer,
};
use crate::calculator::{calculate, Results};
use crate::config::{DisplayOptions, VisualizerConfig};
use crate::controller::{InteractionController, PointerEvent};
use crate::error::VisualizerError;
use crate::mesh::{generate_twisted_surface, SurfaceMesh};
use crate::params::ShaftParams;
use crate::projection::{Camera, ViewPreset, Viewport};
use crate::render::{MeshRenderer, MeshStats};
use crate::surface::Surface;

/// Opacity of the undeformed reference shaft
const ORIGINAL_ALPHA: f64 = 0.3;

/// Input the visualizer reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Resize { width: f64, height: f64 },
    View(ViewPreset),
    Display(DisplayOptions),
}

/// What a render call did
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Drawn(FrameStats),
    /// The parameters were rejected; the previous frame is still on the surface
    Rejected(VisualizerError),
    /// Nothing has been rendered yet
    NoParams,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub original: Option<MeshStats>,
    pub deformed: Option<MeshStats>,
    pub points_skipped: usize,
}

pub struct Visualizer {
    camera: Camera,
    controller: InteractionController,
    renderer: MeshRenderer,
    annotations: AnnotationLayer,
    options: DisplayOptions,
    current: Option<(ShaftParams, f64)>,
    results: Option<Results>,
}

impl Visualizer {
    pub fn new(config: &VisualizerConfig) -> Self {
        Self {
            camera: config.camera.to_camera(),
            controller: InteractionController::new(config.interaction),
            renderer: MeshRenderer::new(config.stress_colors),
            annotations: AnnotationLayer::new(),
            options: config.display,
            current: None,
            results: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn annotations(&self) -> &AnnotationLayer {
        &self.annotations
    }

    pub fn options(&self) -> DisplayOptions {
        self.options
    }

    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    /// Parameters and deformation of the frame on screen
    pub fn current(&self) -> Option<(ShaftParams, f64)> {
        self.current
    }

    /// Recompute results for `params` and draw the shaft deformed by
    /// `deformation_scale` times the computed twist angle.
    pub fn update<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        params: &ShaftParams,
        deformation_scale: f64,
    ) -> (Results, FrameOutcome) {
        let results = calculate(params);
        debug!(
            twist_deg = results.twist_angle_degrees,
            max_shear_mpa = results.max_shear_stress_mpa(),
            "results"
        );
        let outcome = self.render_with(
            surface,
            params,
            deformation_scale * results.twist_angle,
            Some(results),
        );
        (results, outcome)
    }

    /// Draw `params` twisted by `deformation` radians end to end
    pub fn render<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        params: &ShaftParams,
        deformation: f64,
    ) -> FrameOutcome {
        self.render_with(surface, params, deformation, None)
    }

    /// Redraw the untwisted shaft with the current parameters
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) -> FrameOutcome {
        match self.current {
            Some((params, _)) => {
                let results = self.results;
                self.render_with(surface, &params, 0.0, results)
            }
            None => FrameOutcome::NoParams,
        }
    }

    /// Redraw the last accepted state, e.g. after a camera change
    pub fn rerender<S: Surface + ?Sized>(&mut self, surface: &mut S) -> FrameOutcome {
        match self.current {
            Some((params, deformation)) => {
                let results = self.results;
                self.render_with(surface, &params, deformation, results)
            }
            None => {
                debug!("no parameters to render");
                FrameOutcome::NoParams
            }
        }
    }

    /// Apply an input event and redraw if it changed anything visible
    pub fn handle_input<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        event: InputEvent,
    ) -> Option<FrameOutcome> {
        let redraw = match event {
            InputEvent::Pointer(pointer) => self.controller.handle(&mut self.camera, pointer),
            InputEvent::Resize { width, height } => {
                surface.resize(width, height);
                true
            }
            InputEvent::View(view) => {
                self.camera.set_view(view);
                true
            }
            InputEvent::Display(options) => {
                self.options = options;
                true
            }
        };
        redraw.then(|| self.rerender(surface))
    }

    fn render_with<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        params: &ShaftParams,
        deformation: f64,
        results: Option<Results>,
    ) -> FrameOutcome {
        // Build everything fallible before touching the surface
        let meshes = match self.build_meshes(params, deformation) {
            Ok(meshes) => meshes,
            Err(err) => {
                error!(%err, "frame rejected, keeping the previous frame");
                return FrameOutcome::Rejected(err);
            }
        };
        self.current = Some((*params, deformation));
        self.results = results;

        let (width, height) = surface.size();
        let viewport = Viewport::fit_shaft(width, height, params.length, params.outer_diameter);
        let mut stats = FrameStats::default();

        surface.clear();
        if let Some(original) = &meshes.original {
            surface.set_global_alpha(ORIGINAL_ALPHA);
            stats.original = Some(self.draw_shaft(
                surface,
                params,
                original,
                0.0,
                &viewport,
                &mut stats.points_skipped,
            ));
            surface.set_global_alpha(1.0);
        }
        if let Some(deformed) = &meshes.deformed {
            stats.deformed = Some(self.draw_shaft(
                surface,
                params,
                deformed,
                deformation,
                &viewport,
                &mut stats.points_skipped,
            ));
        }

        if self.options.show_measurements {
            self.annotations.update_labels(
                params,
                deformation,
                self.results.as_ref(),
                &self.camera,
                &viewport,
            );
            self.annotations.draw_labels(surface);
        } else {
            self.annotations.clear();
        }

        debug!(
            width,
            height,
            base_scale = viewport.base_scale,
            "frame drawn"
        );
        FrameOutcome::Drawn(stats)
    }

    fn build_meshes(&self, params: &ShaftParams, deformation: f64) -> Result<Meshes, VisualizerError> {
        // Validate even when both layers are hidden
        let deformed = generate_twisted_surface(params, deformation)?;
        Ok(Meshes {
            original: self
                .options
                .show_original
                .then(|| generate_twisted_surface(params, 0.0))
                .transpose()?,
            deformed: self.options.show_deformed.then_some(deformed),
        })
    }

    fn draw_shaft<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        params: &ShaftParams,
        mesh: &SurfaceMesh,
        deformation: f64,
        viewport: &Viewport,
        points_skipped: &mut usize,
    ) -> MeshStats {
        let stats = self.renderer.render_mesh(surface, mesh, &self.camera, viewport);
        if self.options.show_grid {
            *points_skipped += self
                .renderer
                .render_reference_lines(surface, mesh, &self.camera, viewport);
        }
        draw_section_indicators(surface, params, deformation, &self.camera, viewport);
        if self.options.show_stress {
            draw_stress_sections(surface, params, &self.camera, viewport);
        }
        draw_torsion_indicators(surface, params, deformation, &self.camera, viewport);
        stats
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(&VisualizerConfig::default())
    }
}

struct Meshes {
    original: Option<SurfaceMesh>,
    deformed: Option<SurfaceMesh>,
}
