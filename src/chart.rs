pub mod axes;
pub mod pdf;
pub mod raster;
pub mod text;

use crate::data::MarkerColor;

pub const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, alpha: 1.0 }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Color { alpha: alpha.clamp(0.0, 1.0), ..self }
    }

    pub fn alpha_byte(&self) -> u8 {
        (self.alpha * 255.0).round() as u8
    }
}

impl From<MarkerColor> for Color {
    fn from(value: MarkerColor) -> Self {
        let (r, g, b) = value.rgb();
        Color::rgb(r, g, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Rect {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn inflate(&self, by: f32) -> Rect {
        Rect {
            x0: self.x0 - by,
            y0: self.y0 - by,
            x1: self.x1 + by,
            y1: self.y1 + by,
        }
    }

    fn include(bounds: Option<Rect>, x: f32, y: f32) -> Option<Rect> {
        let point = Rect { x0: x, y0: y, x1: x, y1: y };
        Some(match bounds {
            Some(rect) => rect.union(&point),
            None => point,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32),
    CubicTo(f32, f32, f32, f32, f32, f32),
    Close,
}

/// A vector outline made of one or more subpaths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub segments: Vec<Segment>,
}

// Cubic control distance for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

impl Shape {
    pub fn new() -> Self {
        Shape::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(Segment::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.segments.push(Segment::LineTo(x, y));
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.segments.push(Segment::QuadTo(cx, cy, x, y));
    }

    pub fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.segments.push(Segment::CubicTo(c1x, c1y, c2x, c2y, x, y));
    }

    pub fn close(&mut self) {
        self.segments.push(Segment::Close);
    }

    pub fn polyline(points: &[(f32, f32)]) -> Self {
        let mut shape = Shape::new();
        if let Some(((x0, y0), rest)) = points.split_first() {
            shape.move_to(*x0, *y0);
            for (x, y) in rest {
                shape.line_to(*x, *y);
            }
        }
        shape
    }

    pub fn rect(rect: &Rect) -> Self {
        let mut shape = Shape::polyline(&[
            (rect.x0, rect.y0),
            (rect.x1, rect.y0),
            (rect.x1, rect.y1),
            (rect.x0, rect.y1),
        ]);
        shape.close();
        shape
    }

    pub fn rounded_rect(rect: &Rect, radius: f32) -> Self {
        let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
        let k = r * (1.0 - KAPPA);
        let Rect { x0, y0, x1, y1 } = *rect;

        let mut shape = Shape::new();
        shape.move_to(x0 + r, y0);
        shape.line_to(x1 - r, y0);
        shape.cubic_to(x1 - k, y0, x1, y0 + k, x1, y0 + r);
        shape.line_to(x1, y1 - r);
        shape.cubic_to(x1, y1 - k, x1 - k, y1, x1 - r, y1);
        shape.line_to(x0 + r, y1);
        shape.cubic_to(x0 + k, y1, x0, y1 - k, x0, y1 - r);
        shape.line_to(x0, y0 + r);
        shape.cubic_to(x0, y0 + k, x0 + k, y0, x0 + r, y0);
        shape.close();
        shape
    }

    pub fn circle(cx: f32, cy: f32, radius: f32) -> Self {
        let k = radius * KAPPA;
        let mut shape = Shape::new();
        shape.move_to(cx + radius, cy);
        shape.cubic_to(cx + radius, cy + k, cx + k, cy + radius, cx, cy + radius);
        shape.cubic_to(cx - k, cy + radius, cx - radius, cy + k, cx - radius, cy);
        shape.cubic_to(cx - radius, cy - k, cx - k, cy - radius, cx, cy - radius);
        shape.cubic_to(cx + k, cy - radius, cx + radius, cy - k, cx + radius, cy);
        shape.close();
        shape
    }

    /// Box around every point and control point; curves never leave their hull.
    pub fn bounds(&self) -> Option<Rect> {
        let mut bounds = None;
        for segment in &self.segments {
            match *segment {
                Segment::MoveTo(x, y) | Segment::LineTo(x, y) => {
                    bounds = Rect::include(bounds, x, y);
                },
                Segment::QuadTo(cx, cy, x, y) => {
                    bounds = Rect::include(bounds, cx, cy);
                    bounds = Rect::include(bounds, x, y);
                },
                Segment::CubicTo(c1x, c1y, c2x, c2y, x, y) => {
                    bounds = Rect::include(bounds, c1x, c1y);
                    bounds = Rect::include(bounds, c2x, c2y);
                    bounds = Rect::include(bounds, x, y);
                },
                Segment::Close => (),
            }
        }
        bounds
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fill {
        shape: Shape,
        color: Color,
    },
    Stroke {
        shape: Shape,
        color: Color,
        width: f32,
        dash: Vec<f32>,
    },
}

/// Display list for one chart page.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<Command>,
    content: Option<Rect>,
}

impl Figure {
    pub fn new(width_in: f32, height_in: f32) -> Self {
        Figure {
            width: width_in * POINTS_PER_INCH,
            height: height_in * POINTS_PER_INCH,
            commands: Vec::new(),
            content: None,
        }
    }

    pub fn page(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn extend_content(&mut self, rect: Rect) {
        self.content = Some(match self.content {
            Some(content) => content.union(&rect),
            None => rect,
        });
    }

    pub fn fill(&mut self, shape: Shape, color: Color) {
        if let Some(bounds) = shape.bounds() {
            self.extend_content(bounds);
            self.commands.push(Command::Fill { shape, color });
        }
    }

    pub fn stroke(&mut self, shape: Shape, color: Color, width: f32) {
        self.stroke_dashed(shape, color, width, Vec::new());
    }

    pub fn stroke_dashed(&mut self, shape: Shape, color: Color, width: f32, dash: Vec<f32>) {
        if let Some(bounds) = shape.bounds() {
            self.extend_content(bounds.inflate(width / 2.0));
            self.commands.push(Command::Stroke { shape, color, width, dash });
        }
    }

    pub fn content_bounds(&self) -> Option<Rect> {
        self.content
    }

    /// Inked area plus `pad` points on every side, or the whole page when nothing was drawn.
    pub fn tight_bounds(&self, pad: f32) -> Rect {
        match self.content_bounds() {
            Some(content) => content.inflate(pad),
            None => self.page(),
        }
    }
}

/// Tick positions on "nice" steps (1, 2, 2.5 or 5 times a power of ten) covering `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, max_intervals: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || max_intervals == 0 {
        return Vec::new();
    }
    let raw_step = (max - min) / max_intervals as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let eps = raw_step * 1e-9;
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw_step - eps)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Fewest decimals that print every tick of a `step`-spaced axis exactly.
pub fn tick_decimals(step: f64) -> usize {
    (0..=6)
        .find(|decimals| {
            let scaled = step * 10f64.powi(*decimals as i32);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn longitude_ticks_step_by_tenths() {
        let ticks = nice_ticks(-74.3, -73.7, 8);
        assert_close(&ticks, &[-74.3, -74.2, -74.1, -74.0, -73.9, -73.8, -73.7]);
        assert_eq!(tick_decimals(ticks[1] - ticks[0]), 1);
    }

    #[test]
    fn latitude_ticks_step_by_twentieths() {
        let ticks = nice_ticks(40.5, 40.9, 8);
        assert_eq!(ticks.len(), 9);
        assert!((ticks[0] - 40.5).abs() < 1e-9);
        assert!((ticks[8] - 40.9).abs() < 1e-9);
        assert_eq!(tick_decimals(0.05), 2);
    }

    #[test]
    fn empty_range_has_no_ticks() {
        assert!(nice_ticks(1.0, 1.0, 8).is_empty());
        assert!(nice_ticks(f64::NAN, 1.0, 8).is_empty());
    }

    #[test]
    fn stroke_bounds_include_half_the_width() {
        let mut figure = Figure::new(1.0, 1.0);
        figure.stroke(Shape::polyline(&[(10.0, 10.0), (20.0, 10.0)]), Color::BLACK, 4.0);
        assert_eq!(figure.content_bounds(), Some(Rect::new(8.0, 8.0, 22.0, 12.0)));
        assert_eq!(figure.tight_bounds(1.0), Rect::new(7.0, 7.0, 23.0, 13.0));
    }

    #[test]
    fn empty_shapes_are_not_recorded() {
        let mut figure = Figure::new(2.0, 1.0);
        figure.fill(Shape::new(), Color::BLACK);
        assert!(figure.commands.is_empty());
        assert_eq!(figure.tight_bounds(5.0), Rect::new(0.0, 0.0, 144.0, 72.0));
    }

    #[test]
    fn circle_bounds_match_radius() {
        let bounds = Shape::circle(50.0, 40.0, 4.0).bounds().unwrap();
        assert_eq!(bounds, Rect::new(46.0, 36.0, 54.0, 44.0));
    }
}
