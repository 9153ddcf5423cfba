/// Character raster implementing the visualizer's drawing surface
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use torsionviz_core::{Paint, Rgba, Surface};

/// Character ramp for fill coverage (faintest to densest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Fills fainter than this only paint blank cells
const TRANSLUCENT_FILL: f64 = 0.5;

/// Surface pixels per character row. Cells are roughly twice as tall as wide.
pub const PIXELS_PER_ROW: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: (u8, u8, u8),
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: (0, 0, 0),
};

#[derive(Debug, Clone, Default)]
struct Subpath {
    points: Vec<(f64, f64)>,
    closed: bool,
}

/// Colored character buffer addressed in surface pixels: one pixel per
/// column horizontally and [`PIXELS_PER_ROW`] pixels per row vertically.
pub struct TerminalSurface {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    path: Vec<Subpath>,
    global_alpha: f64,
}

impl TerminalSurface {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK; cols * rows],
            path: Vec::new(),
            global_alpha: 1.0,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Character at a cell, `None` outside the raster
    pub fn char_at(&self, col: usize, row: usize) -> Option<char> {
        self.index(col, row).map(|idx| self.cells[idx].ch)
    }

    pub fn color_at(&self, col: usize, row: usize) -> Option<(u8, u8, u8)> {
        self.index(col, row).map(|idx| self.cells[idx].color)
    }

    /// Row `row` as a string
    pub fn line(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        self.cells[row * self.cols..(row + 1) * self.cols]
            .iter()
            .map(|c| c.ch)
            .collect()
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    /// Cell under a surface pixel
    fn cell_at(&self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        self.index(x as usize, (y / PIXELS_PER_ROW) as usize)
    }

    /// Blend against the black background
    fn shade(&self, color: Rgba) -> (u8, u8, u8) {
        let a = (color.a * self.global_alpha).clamp(0.0, 1.0);
        let dim = |c: u8| (f64::from(c) * a).round() as u8;
        (dim(color.r), dim(color.g), dim(color.b))
    }

    fn plot(&mut self, idx: usize, ch: char, color: (u8, u8, u8)) {
        self.cells[idx] = Cell { ch, color };
    }

    fn fill_triangle(&mut self, v: [(f64, f64); 3], paint: &Paint) {
        let min_x = v[0].0.min(v[1].0).min(v[2].0).floor().max(0.0) as usize;
        let max_x = v[0].0.max(v[1].0).max(v[2].0).ceil();
        let min_row = (v[0].1.min(v[1].1).min(v[2].1) / PIXELS_PER_ROW)
            .floor()
            .max(0.0) as usize;
        let max_row = (v[0].1.max(v[1].1).max(v[2].1) / PIXELS_PER_ROW).ceil();
        if !max_x.is_finite() || !max_row.is_finite() || max_x < 0.0 || max_row < 0.0 {
            return;
        }
        let max_x = (max_x as usize).min(self.cols.saturating_sub(1));
        let max_row = (max_row as usize).min(self.rows.saturating_sub(1));

        for row in min_row..=max_row {
            for col in min_x..=max_x {
                let px = col as f64 + 0.5;
                let py = (row as f64 + 0.5) * PIXELS_PER_ROW;

                let Some((w0, w1, w2)) = barycentric(v[0], v[1], v[2], (px, py)) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let color = paint_at(paint, px, py);
                let coverage = (color.a * self.global_alpha).clamp(0.0, 1.0);
                let Some(idx) = self.index(col, row) else {
                    continue;
                };
                if coverage < TRANSLUCENT_FILL && self.cells[idx].ch != ' ' {
                    continue;
                }
                let ramp = (coverage * (LUMINOSITY_RAMP.len() - 1) as f64).ceil() as usize;
                let ch = LUMINOSITY_RAMP[ramp.min(LUMINOSITY_RAMP.len() - 1)];
                // Fully transparent fills leave the cell alone
                if ch != ' ' {
                    let shade = self.shade(color);
                    self.plot(idx, ch, shade);
                }
            }
        }
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), ch: char, color: (u8, u8, u8)) {
        let (x0, r0) = (from.0, from.1 / PIXELS_PER_ROW);
        let (x1, r1) = (to.0, to.1 / PIXELS_PER_ROW);
        let steps = (x1 - x0).abs().max((r1 - r0).abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        let steps = steps.max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = x0 + (x1 - x0) * t;
            let y = (r0 + (r1 - r0) * t) * PIXELS_PER_ROW;
            if let Some(idx) = self.cell_at(x, y) {
                self.plot(idx, ch, color);
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for row in 0..self.rows {
            writer.queue(MoveTo(0, row as u16))?;
            for cell in &self.cells[row * self.cols..(row + 1) * self.cols] {
                if cell.ch != ' ' && current != Some(cell.color) {
                    let (r, g, b) = cell.color;
                    writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.ch))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (f64, f64) {
        (self.cols as f64, self.rows as f64 * PIXELS_PER_ROW)
    }

    fn resize(&mut self, width: f64, height: f64) {
        let cols = width.max(0.0) as usize;
        let rows = (height / PIXELS_PER_ROW).max(0.0) as usize;
        *self = Self::new(cols, rows);
    }

    fn clear(&mut self) {
        self.cells.fill(BLANK);
        self.path.clear();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.global_alpha = alpha;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(Subpath {
            points: vec![(x, y)],
            closed: false,
        });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.path.last_mut() {
            Some(sub) if !sub.closed => sub.points.push((x, y)),
            _ => self.move_to(x, y),
        }
    }

    fn close_path(&mut self) {
        if let Some(sub) = self.path.last_mut() {
            sub.closed = true;
        }
    }

    fn fill(&mut self, paint: &Paint) {
        let path = std::mem::take(&mut self.path);
        for sub in &path {
            // Fan triangulation; the quads and rings drawn here are convex
            for i in 1..sub.points.len().saturating_sub(1) {
                self.fill_triangle([sub.points[0], sub.points[i], sub.points[i + 1]], paint);
            }
        }
        self.path = path;
    }

    fn stroke(&mut self, color: Rgba, _line_width: f64) {
        let shade = self.shade(color);
        let path = std::mem::take(&mut self.path);
        for sub in &path {
            let mut segments: Vec<((f64, f64), (f64, f64))> =
                sub.points.windows(2).map(|w| (w[0], w[1])).collect();
            if sub.closed && sub.points.len() > 2 {
                if let (Some(&last), Some(&first)) = (sub.points.last(), sub.points.first()) {
                    segments.push((last, first));
                }
            }
            for (from, to) in segments {
                self.draw_line(from, to, line_char(from, to), shade);
            }
        }
        self.path = path;
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgba) {
        let shade = self.shade(color);
        for (i, ch) in text.chars().enumerate() {
            if let Some(idx) = self.cell_at(x + i as f64, y) {
                self.plot(idx, ch, shade);
            }
        }
    }
}

/// Pick a stroke character from the segment's on-screen slope
fn line_char(from: (f64, f64), to: (f64, f64)) -> char {
    let dx = to.0 - from.0;
    let dy = (to.1 - from.1) / PIXELS_PER_ROW;
    if dx.abs() >= 2.0 * dy.abs() {
        '-'
    } else if dy.abs() >= 2.0 * dx.abs() {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

fn paint_at(paint: &Paint, x: f64, y: f64) -> Rgba {
    match *paint {
        Paint::Solid(color) => color,
        Paint::RadialGradient {
            cx,
            cy,
            radius,
            inner,
            outer,
        } => {
            let t = if radius > 0.0 {
                (((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / radius).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let lerp =
                |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
            Rgba::new(
                lerp(inner.r, outer.r),
                lerp(inner.g, outer.g),
                lerp(inner.b, outer.b),
                inner.a + (outer.a - inner.a) * t,
            )
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-9 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
