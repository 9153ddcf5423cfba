/// torsionviz Web - Canvas 2D front end for the torsion visualizer
///
/// Implements the drawing surface over a `CanvasRenderingContext2d` and
/// exposes the visualizer to JavaScript. Browser event handlers call into
/// [`WebVisualizer`], which redraws synchronously.
use torsionviz_core::{
    DisplayOptions, FrameOutcome, InputEvent, Paint, ParamInputs, PointerEvent, Results, Rgba,
    Surface, ViewPreset, Visualizer, VisualizerConfig,
};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const LABEL_FONT: &str = "12px Arial";

/// Drawing surface backed by an HTML canvas
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Look up a `<canvas>` by element id
    pub fn from_element_id(id: &str) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id '{id}'")))?
            .dyn_into::<HtmlCanvasElement>()?;
        Self::new(canvas)
    }

    fn fill_gradient(
        &self,
        cx: f64,
        cy: f64,
        radius: f64,
        inner: Rgba,
        outer: Rgba,
    ) -> Result<(), JsValue> {
        let gradient = self.ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, radius)?;
        gradient.add_color_stop(0.0, &inner.to_css())?;
        gradient.add_color_stop(1.0, &outer.to_css())?;
        self.ctx.set_fill_style(&gradient);
        self.ctx.fill();
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
    }

    fn clear(&mut self) {
        let (width, height) = self.size();
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self, paint: &Paint) {
        match *paint {
            Paint::Solid(color) => {
                self.ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
                self.ctx.fill();
            }
            Paint::RadialGradient {
                cx,
                cy,
                radius,
                inner,
                outer,
            } => {
                if let Err(err) = self.fill_gradient(cx, cy, radius, inner, outer) {
                    warn!(?err, "gradient fill failed");
                }
            }
        }
    }

    fn stroke(&mut self, color: Rgba, line_width: f64) {
        self.ctx.set_stroke_style(&JsValue::from_str(&color.to_css()));
        self.ctx.set_line_width(line_width);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgba) {
        self.ctx.set_font(LABEL_FONT);
        self.ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
        if let Err(err) = self.ctx.fill_text(text, x, y) {
            warn!(?err, text, "fill_text failed");
        }
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Visualizer bound to one canvas
#[wasm_bindgen]
pub struct WebVisualizer {
    visualizer: Visualizer,
    surface: CanvasSurface,
    results: Option<Results>,
    last_error: Option<String>,
}

#[wasm_bindgen]
impl WebVisualizer {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebVisualizer, JsValue> {
        Self::with(&VisualizerConfig::default(), canvas_id)
    }

    /// Build from a TOML settings document
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(canvas_id: &str, config_toml: &str) -> Result<WebVisualizer, JsValue> {
        let config = VisualizerConfig::from_toml_str(config_toml).map_err(to_js_error)?;
        Self::with(&config, canvas_id)
    }

    /// Recompute and redraw from raw form field values. Returns whether a
    /// frame was drawn; rejected parameters leave the previous frame up.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        length: &str,
        outer_diameter: &str,
        inner_diameter: &str,
        segments: &str,
        elastic_modulus: &str,
        shear_modulus: &str,
        poisson_ratio: &str,
        torque: &str,
        deformation_scale: &str,
    ) -> bool {
        let inputs = ParamInputs {
            length: length.to_string(),
            outer_diameter: outer_diameter.to_string(),
            inner_diameter: inner_diameter.to_string(),
            segments: segments.to_string(),
            elastic_modulus: elastic_modulus.to_string(),
            shear_modulus: shear_modulus.to_string(),
            poisson_ratio: poisson_ratio.to_string(),
            torque: torque.to_string(),
            deformation_scale: deformation_scale.to_string(),
        };
        let (params, scale) = inputs.resolve();
        let (results, outcome) = self.visualizer.update(&mut self.surface, &params, scale);
        self.results = Some(results);
        self.record(outcome)
    }

    /// Redraw the untwisted shaft
    pub fn reset(&mut self) -> bool {
        let outcome = self.visualizer.reset(&mut self.surface);
        self.record(outcome)
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.pointer(PointerEvent::Press { x, y })
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.pointer(PointerEvent::Move { x, y })
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> bool {
        self.pointer(PointerEvent::Release)
    }

    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.pointer(PointerEvent::Wheel { delta_y })
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.dispatch(InputEvent::Resize { width, height })
    }

    /// Snap to `"front"`, `"side"` or `"top"`
    #[wasm_bindgen(js_name = setView)]
    pub fn set_view(&mut self, view: &str) -> Result<bool, JsValue> {
        let view = match view {
            "front" => ViewPreset::Front,
            "side" => ViewPreset::Side,
            "top" => ViewPreset::Top,
            other => return Err(JsValue::from_str(&format!("unknown view '{other}'"))),
        };
        Ok(self.dispatch(InputEvent::View(view)))
    }

    #[wasm_bindgen(js_name = setShowOriginal)]
    pub fn set_show_original(&mut self, show: bool) -> bool {
        self.display(|o| o.show_original = show)
    }

    #[wasm_bindgen(js_name = setShowDeformed)]
    pub fn set_show_deformed(&mut self, show: bool) -> bool {
        self.display(|o| o.show_deformed = show)
    }

    #[wasm_bindgen(js_name = setShowStress)]
    pub fn set_show_stress(&mut self, show: bool) -> bool {
        self.display(|o| o.show_stress = show)
    }

    #[wasm_bindgen(js_name = setShowGrid)]
    pub fn set_show_grid(&mut self, show: bool) -> bool {
        self.display(|o| o.show_grid = show)
    }

    #[wasm_bindgen(js_name = setShowMeasurements)]
    pub fn set_show_measurements(&mut self, show: bool) -> bool {
        self.display(|o| o.show_measurements = show)
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.visualizer.camera().zoom()
    }

    #[wasm_bindgen(getter, js_name = twistAngle)]
    pub fn twist_angle(&self) -> f64 {
        self.results.map_or(0.0, |r| r.twist_angle)
    }

    #[wasm_bindgen(getter, js_name = twistAngleDegrees)]
    pub fn twist_angle_degrees(&self) -> f64 {
        self.results.map_or(0.0, |r| r.twist_angle_degrees)
    }

    /// Maximum shear stress in MPa
    #[wasm_bindgen(getter, js_name = maxShearStress)]
    pub fn max_shear_stress(&self) -> f64 {
        self.results.map_or(0.0, |r| r.max_shear_stress_mpa())
    }

    #[wasm_bindgen(getter, js_name = polarMomentOfInertia)]
    pub fn polar_moment_of_inertia(&self) -> f64 {
        self.results.map_or(0.0, |r| r.polar_moment_of_inertia)
    }

    #[wasm_bindgen(getter, js_name = twistPerLength)]
    pub fn twist_per_length(&self) -> f64 {
        self.results.map_or(0.0, |r| r.twist_per_length)
    }

    #[wasm_bindgen(getter, js_name = strainEnergy)]
    pub fn strain_energy(&self) -> f64 {
        self.results.map_or(0.0, |r| r.strain_energy)
    }

    #[wasm_bindgen(getter, js_name = torsionalStiffness)]
    pub fn torsional_stiffness(&self) -> f64 {
        self.results.map_or(0.0, |r| r.torsional_stiffness)
    }

    /// Message of the last rejected frame, if the latest call was rejected
    #[wasm_bindgen(getter, js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

impl WebVisualizer {
    fn with(config: &VisualizerConfig, canvas_id: &str) -> Result<WebVisualizer, JsValue> {
        Ok(Self {
            visualizer: Visualizer::new(config),
            surface: CanvasSurface::from_element_id(canvas_id)?,
            results: None,
            last_error: None,
        })
    }

    fn pointer(&mut self, event: PointerEvent) -> bool {
        self.dispatch(InputEvent::Pointer(event))
    }

    fn display(&mut self, change: impl FnOnce(&mut DisplayOptions)) -> bool {
        let mut options = self.visualizer.options();
        change(&mut options);
        self.dispatch(InputEvent::Display(options))
    }

    fn dispatch(&mut self, event: InputEvent) -> bool {
        match self.visualizer.handle_input(&mut self.surface, event) {
            Some(outcome) => self.record(outcome),
            None => false,
        }
    }

    fn record(&mut self, outcome: FrameOutcome) -> bool {
        match outcome {
            FrameOutcome::Drawn(_) => {
                self.last_error = None;
                true
            }
            FrameOutcome::Rejected(err) => {
                self.last_error = Some(err.to_string());
                false
            }
            FrameOutcome::NoParams => false,
        }
    }
}
