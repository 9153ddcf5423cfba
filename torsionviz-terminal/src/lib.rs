/// Terminal front end for the torsion visualizer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use torsionviz_core::{
    DisplayOptions, FrameOutcome, InputEvent, PointerEvent, Results, ShaftParams, ViewPreset,
    Visualizer, VisualizerConfig,
};
use tracing::{debug, info, warn};

pub mod renderer;

pub use renderer::{TerminalSurface, PIXELS_PER_ROW};

/// Rows below the raster reserved for the results panel
const STATUS_ROWS: u16 = 3;

/// Radians per arrow key press
const KEY_ROTATION: f64 = 0.1;

/// Torque multiplier per `+`/`-` press
const TORQUE_STEP: f64 = 1.1;

/// Main application struct for the terminal visualizer
pub struct TerminalApp {
    visualizer: Visualizer,
    surface: TerminalSurface,
    params: ShaftParams,
    deformation_scale: f64,
    results: Option<Results>,
    status: String,
    running: bool,
}

impl TerminalApp {
    pub fn new(
        config: &VisualizerConfig,
        params: ShaftParams,
        deformation_scale: f64,
    ) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_size(config, params, deformation_scale, cols, rows))
    }

    /// Build an app for a terminal of `cols` x `rows` cells
    pub fn with_size(
        config: &VisualizerConfig,
        params: ShaftParams,
        deformation_scale: f64,
        cols: u16,
        rows: u16,
    ) -> Self {
        let raster_rows = rows.saturating_sub(STATUS_ROWS);
        Self {
            visualizer: Visualizer::new(config),
            surface: TerminalSurface::new(usize::from(cols), usize::from(raster_rows)),
            params,
            deformation_scale,
            results: None,
            status: String::new(),
            running: true,
        }
    }

    pub fn visualizer(&self) -> &Visualizer {
        &self.visualizer
    }

    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    pub fn params(&self) -> &ShaftParams {
        &self.params
    }

    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        info!(cols = self.surface.cols(), rows = self.surface.rows(), "starting");
        self.update();
        self.render()?;

        while self.running {
            // Block until the next event; every event is fully handled before the next read
            let event = event::read()?;
            self.handle_event(event);
            if self.running {
                self.render()?;
            }
        }

        info!("stopped");
        Ok(())
    }

    /// Recompute results for the current parameters and redraw
    pub fn update(&mut self) {
        let (results, outcome) = self
            .visualizer
            .update(&mut self.surface, &self.params, self.deformation_scale);
        self.results = Some(results);
        self.record(outcome);
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => {
                debug!(cols, rows, "resize");
                let raster_rows = rows.saturating_sub(STATUS_ROWS);
                self.dispatch(InputEvent::Resize {
                    width: f64::from(cols),
                    height: f64::from(raster_rows) * PIXELS_PER_ROW,
                });
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Up => self.orbit(-KEY_ROTATION, 0.0),
            KeyCode::Down => self.orbit(KEY_ROTATION, 0.0),
            KeyCode::Left => self.orbit(0.0, -KEY_ROTATION),
            KeyCode::Right => self.orbit(0.0, KEY_ROTATION),
            KeyCode::Char('f') => self.dispatch(InputEvent::View(ViewPreset::Front)),
            KeyCode::Char('s') => self.dispatch(InputEvent::View(ViewPreset::Side)),
            KeyCode::Char('t') => self.dispatch(InputEvent::View(ViewPreset::Top)),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.params.torque *= TORQUE_STEP;
                self.update();
            }
            KeyCode::Char('-') => {
                self.params.torque /= TORQUE_STEP;
                self.update();
            }
            KeyCode::Char(']') => {
                self.deformation_scale *= 2.0;
                self.update();
            }
            KeyCode::Char('[') => {
                self.deformation_scale /= 2.0;
                self.update();
            }
            KeyCode::Char('o') => self.toggle(|o| o.show_original = !o.show_original),
            KeyCode::Char('d') => self.toggle(|o| o.show_deformed = !o.show_deformed),
            KeyCode::Char('x') => self.toggle(|o| o.show_stress = !o.show_stress),
            KeyCode::Char('g') => self.toggle(|o| o.show_grid = !o.show_grid),
            KeyCode::Char('m') => self.toggle(|o| o.show_measurements = !o.show_measurements),
            KeyCode::Char('r') => {
                let outcome = self.visualizer.reset(&mut self.surface);
                self.record(outcome);
            }
            KeyCode::Char('u') => self.update(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let x = f64::from(mouse.column);
        let y = f64::from(mouse.row) * PIXELS_PER_ROW;
        let pointer = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerEvent::Press { x, y },
            MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Move { x, y },
            MouseEventKind::Up(MouseButton::Left) => PointerEvent::Release,
            MouseEventKind::ScrollUp => PointerEvent::Wheel { delta_y: -1.0 },
            MouseEventKind::ScrollDown => PointerEvent::Wheel { delta_y: 1.0 },
            _ => return,
        };
        self.dispatch(InputEvent::Pointer(pointer));
    }

    fn orbit(&mut self, about_x: f64, about_y: f64) {
        self.visualizer.camera_mut().rotate(about_x, about_y);
        let outcome = self.visualizer.rerender(&mut self.surface);
        self.record(outcome);
    }

    fn toggle(&mut self, change: impl FnOnce(&mut DisplayOptions)) {
        let mut options = self.visualizer.options();
        change(&mut options);
        self.dispatch(InputEvent::Display(options));
    }

    fn dispatch(&mut self, event: InputEvent) {
        if let Some(outcome) = self.visualizer.handle_input(&mut self.surface, event) {
            self.record(outcome);
        }
    }

    fn record(&mut self, outcome: FrameOutcome) {
        match outcome {
            FrameOutcome::Drawn(_) => self.status.clear(),
            FrameOutcome::Rejected(err) => {
                warn!(%err, "parameters rejected");
                self.status = format!("rejected: {err}");
            }
            FrameOutcome::NoParams => {}
        }
    }

    /// Lines of the results panel
    pub fn panel_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(usize::from(STATUS_ROWS));
        match &self.results {
            Some(results) => lines.push(format!(
                "T = {:.1} N·m | θ = {:.4}° | τmax = {:.2} MPa | J = {:.3e} m⁴ | k = {:.1} N·m/rad | x{}",
                self.params.torque,
                results.twist_angle_degrees,
                results.max_shear_stress_mpa(),
                results.polar_moment_of_inertia,
                results.torsional_stiffness,
                self.deformation_scale,
            )),
            None => lines.push(String::from("no results")),
        }
        let options = self.visualizer.options();
        let flag = |on: bool| if on { '*' } else { ' ' };
        lines.push(format!(
            "[{}]o original [{}]d deformed [{}]x stress [{}]g grid [{}]m labels  {}",
            flag(options.show_original),
            flag(options.show_deformed),
            flag(options.show_stress),
            flag(options.show_grid),
            flag(options.show_measurements),
            self.status,
        ));
        lines.push(String::from(
            "drag/arrows=orbit wheel=zoom f/s/t=views +/-=torque [/]=scale r=reset q=quit",
        ));
        lines
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.surface.draw(&mut stdout)?;

        // Draw results panel
        let top = self.surface.rows() as u16;
        for (i, line) in self.panel_lines().into_iter().enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(0, top + i as u16),
                terminal::Clear(ClearType::CurrentLine),
                SetForegroundColor(Color::Yellow),
                Print(line),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use torsionviz_core::projection::MAX_ZOOM;

    fn app() -> TerminalApp {
        let mut app = TerminalApp::with_size(
            &VisualizerConfig::default(),
            ShaftParams::default(),
            100.0,
            80,
            27,
        );
        app.update();
        app
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_raster_excludes_panel() {
        let app = app();
        assert_eq!(app.surface().cols(), 80);
        assert_eq!(app.surface().rows(), 24);
        assert!(app.results().is_some());
    }

    #[test]
    fn test_first_frame_draws_shaft() {
        let app = app();
        let drawn = (0..app.surface().rows())
            .flat_map(|row| app.surface().line(row).chars().collect::<Vec<_>>())
            .filter(|c| *c != ' ')
            .count();
        assert!(drawn > 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut first = app();
        first.handle_event(key('q'));
        assert!(!first.is_running());

        let mut second = app();
        second.handle_event(Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!second.is_running());
    }

    #[test]
    fn test_mouse_drag_orbits() {
        let mut app = app();
        let before = *app.visualizer().camera();
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, 5));
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 5));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 30, 5));
        let after = app.visualizer().camera();
        assert!((after.rotation_y - before.rotation_y - 0.2).abs() < 1e-12);
        assert_eq!(after.rotation_x, before.rotation_x);
    }

    #[test]
    fn test_scroll_zooms() {
        let mut app = app();
        for _ in 0..100 {
            app.handle_event(mouse(MouseEventKind::ScrollUp, 0, 0));
        }
        assert_eq!(app.visualizer().camera().zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_torque_keys_recompute_results() {
        let mut app = app();
        let before = app.results().unwrap().twist_angle;
        app.handle_event(key('+'));
        let after = app.results().unwrap().twist_angle;
        assert!((after / before - TORQUE_STEP).abs() < 1e-9);
    }

    #[test]
    fn test_toggle_keys() {
        let mut app = app();
        assert!(app.visualizer().options().show_grid);
        app.handle_event(key('g'));
        assert!(!app.visualizer().options().show_grid);
        app.handle_event(key('m'));
        assert!(app.visualizer().annotations().labels().is_empty());
    }

    #[test]
    fn test_resize_reallocates_raster() {
        let mut app = app();
        app.handle_event(Event::Resize(100, 40));
        assert_eq!(app.surface().cols(), 100);
        assert_eq!(app.surface().rows(), 37);
    }

    #[test]
    fn test_view_keys() {
        let mut app = app();
        app.handle_event(key('f'));
        let camera = app.visualizer().camera();
        assert_eq!((camera.rotation_x, camera.rotation_y), (0.0, 0.0));
    }

    #[test]
    fn test_reset_untwists() {
        let mut app = app();
        app.handle_event(key('r'));
        assert_eq!(app.visualizer().current().unwrap().1, 0.0);
    }

    #[test]
    fn test_rejected_params_reported() {
        let mut app = TerminalApp::with_size(
            &VisualizerConfig::default(),
            ShaftParams {
                segments: 0,
                ..Default::default()
            },
            1.0,
            40,
            20,
        );
        app.update();
        assert!(app.status().starts_with("rejected"));
        assert!(app.panel_lines()[1].contains("rejected"));
    }
}
