/// Abstract immediate-mode 2D drawing surface.
///
/// Front ends implement [`Surface`] over whatever they draw on (a canvas 2D
/// context, a character raster). [`RecordingSurface`] captures the command
/// stream instead of drawing it.
use crate::color::Rgba;

/// How a closed path is filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Radial gradient centred at `(cx, cy)`, `inner` at the centre fading to
    /// `outer` at `radius`
    RadialGradient {
        cx: f64,
        cy: f64,
        radius: f64,
        inner: Rgba,
        outer: Rgba,
    },
}

pub trait Surface {
    /// Width and height in pixels
    fn size(&self) -> (f64, f64);

    /// Reallocate for a new size. The contents are discarded.
    fn resize(&mut self, width: f64, height: f64);

    fn clear(&mut self);

    /// Opacity multiplier applied to every subsequent fill, stroke and text
    fn set_global_alpha(&mut self, alpha: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn fill(&mut self, paint: &Paint);
    fn stroke(&mut self, color: Rgba, line_width: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgba);

    /// Start a new path through `points`. Does nothing for an empty slice.
    fn trace_path(&mut self, points: &[(f64, f64)]) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.begin_path();
        self.move_to(x0, y0);
        for &(x, y) in rest {
            self.line_to(x, y);
        }
    }
}

/// A single recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    GlobalAlpha(f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    Fill(Paint),
    Stroke { color: Rgba, line_width: f64 },
    Text { text: String, x: f64, y: f64, color: Rgba },
}

/// Surface that records commands instead of drawing them
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    fn clear(&mut self) {
        // A clear supersedes everything drawn so far
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self, paint: &Paint) {
        self.commands.push(DrawCommand::Fill(*paint));
    }

    fn stroke(&mut self, color: Rgba, line_width: f64) {
        self.commands.push(DrawCommand::Stroke { color, line_width });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_path() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.trace_path(&[(0.0, 0.0), (1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(
            surface.commands(),
            &[
                DrawCommand::BeginPath,
                DrawCommand::MoveTo(0.0, 0.0),
                DrawCommand::LineTo(1.0, 2.0),
                DrawCommand::LineTo(3.0, 4.0),
            ]
        );

        surface.trace_path(&[]);
        assert_eq!(surface.commands().len(), 4);
    }

    #[test]
    fn test_clear_discards_history() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.begin_path();
        surface.clear();
        assert_eq!(surface.commands(), &[DrawCommand::Clear]);
    }
}
