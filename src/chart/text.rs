use std::path::Path;

use font_kit::{
    family_name::FamilyName,
    font::Font,
    hinting::HintingOptions,
    outline::OutlineSink,
    properties::{Properties, Weight},
    source::SystemSource,
};
use log::{info, warn};
use pathfinder_geometry::{line_segment::LineSegment2F, vector::Vector2F};

use crate::errors::Result;

use super::{Color, Figure, Rect, Shape};

/// Families tried in order before falling back to the generic sans-serif.
const PREFERRED_FAMILIES: [&str; 9] = [
    "Noto Sans CJK SC",
    "Noto Sans SC",
    "Source Han Sans SC",
    "WenQuanYi Micro Hei",
    "WenQuanYi Zen Hei",
    "Microsoft YaHei",
    "SimHei",
    "PingFang SC",
    "Arial Unicode MS",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Baseline,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label<'a> {
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub weight: FontWeight,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// Degrees, counter-clockwise.
    pub rotation: f32,
    pub color: Color,
}

impl<'a> Label<'a> {
    pub fn new(text: &'a str, x: f32, y: f32, size: f32) -> Self {
        Label {
            text,
            x,
            y,
            size,
            weight: FontWeight::Regular,
            h_align: HAlign::Left,
            v_align: VAlign::Baseline,
            rotation: 0.0,
            color: Color::BLACK,
        }
    }

    pub fn align(mut self, h_align: HAlign, v_align: VAlign) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Horizontal advance and vertical extent of a line of text, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

pub struct Typeface {
    regular: Option<Font>,
    bold: Option<Font>,
}

fn system_font(weight: Weight) -> Option<Font> {
    let mut families: Vec<FamilyName> = PREFERRED_FAMILIES
        .iter()
        .map(|name| FamilyName::Title(name.to_string()))
        .collect();
    families.push(FamilyName::SansSerif);

    let mut properties = Properties::new();
    properties.weight(weight);

    let handle = match SystemSource::new().select_best_match(&families, &properties) {
        Ok(handle) => handle,
        Err(err) => {
            warn!(err = err.to_string(); "No system font matched");
            return None;
        },
    };
    match handle.load() {
        Ok(font) => Some(font),
        Err(err) => {
            warn!(err = err.to_string(); "Could not load matched system font");
            None
        },
    }
}

impl Typeface {
    /// An explicit `font_path` must load; otherwise system fonts are searched and a
    /// missing font only disables text.
    pub fn load(font_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = font_path {
            let font = Font::from_path(path, 0)?;
            info!(font = font.full_name(), path = path.display().to_string(); "Loaded font from file");
            return Ok(Typeface { regular: Some(font), bold: None });
        }

        let regular = match system_font(Weight::NORMAL) {
            Some(font) => font,
            None => {
                warn!("No usable font found, chart text will be skipped");
                return Ok(Typeface::without_fonts());
            },
        };
        info!(font = regular.full_name(); "Using system font");
        Ok(Typeface {
            bold: system_font(Weight::BOLD),
            regular: Some(regular),
        })
    }

    /// A typeface that lays text out with estimated metrics and draws nothing.
    pub fn without_fonts() -> Self {
        Typeface { regular: None, bold: None }
    }

    pub fn has_font(&self) -> bool {
        self.regular.is_some()
    }

    fn face(&self, weight: FontWeight) -> Option<&Font> {
        match weight {
            FontWeight::Bold => self.bold.as_ref().or(self.regular.as_ref()),
            FontWeight::Regular => self.regular.as_ref(),
        }
    }

    fn glyph(font: &Font, c: char) -> Option<u32> {
        font.glyph_for_char(c).or_else(|| font.glyph_for_char('\u{FFFD}'))
    }

    pub fn measure(&self, text: &str, size: f32, weight: FontWeight) -> Result<TextExtent> {
        let font = match self.face(weight) {
            Some(font) => font,
            None => return Ok(estimate_extent(text, size)),
        };
        let metrics = font.metrics();
        let scale = size / metrics.units_per_em as f32;

        let mut width = 0.0;
        for c in text.chars() {
            width += match Self::glyph(font, c) {
                Some(id) => font.advance(id)?.x() * scale,
                None => size * 0.5,
            };
        }
        Ok(TextExtent {
            width,
            ascent: metrics.ascent * scale,
            descent: -metrics.descent * scale,
        })
    }

    fn outline(&self, text: &str, size: f32, weight: FontWeight, placement: &Placement) -> Result<Shape> {
        let mut shape = Shape::new();
        let font = match self.face(weight) {
            Some(font) => font,
            None => return Ok(shape),
        };
        let scale = size / font.metrics().units_per_em as f32;

        let mut pen = 0.0;
        for c in text.chars() {
            let id = match Self::glyph(font, c) {
                Some(id) => id,
                None => {
                    pen += size * 0.5;
                    continue;
                },
            };
            let mut sink = GlyphSink {
                shape: &mut shape,
                placement,
                pen,
                scale,
            };
            font.outline(id, HintingOptions::None, &mut sink)?;
            pen += font.advance(id)?.x() * scale;
        }
        Ok(shape)
    }
}

fn estimate_extent(text: &str, size: f32) -> TextExtent {
    let width: f32 = text.chars()
        .map(|c| if c.is_ascii() { 0.6 * size } else { size })
        .sum();
    TextExtent {
        width,
        ascent: 0.8 * size,
        descent: 0.2 * size,
    }
}

/// Maps text-local coordinates (u along the baseline, v downwards) into figure space.
struct Placement {
    origin_x: f32,
    origin_y: f32,
    cos: f32,
    sin: f32,
}

impl Placement {
    fn map(&self, u: f32, v: f32) -> (f32, f32) {
        (
            self.origin_x + u * self.cos + v * self.sin,
            self.origin_y - u * self.sin + v * self.cos,
        )
    }
}

struct GlyphSink<'a> {
    shape: &'a mut Shape,
    placement: &'a Placement,
    pen: f32,
    scale: f32,
}

impl GlyphSink<'_> {
    // Glyph outlines are y-up in font units.
    fn map(&self, point: Vector2F) -> (f32, f32) {
        self.placement.map(self.pen + point.x() * self.scale, -point.y() * self.scale)
    }
}

impl OutlineSink for GlyphSink<'_> {
    fn move_to(&mut self, to: Vector2F) {
        let (x, y) = self.map(to);
        self.shape.move_to(x, y);
    }

    fn line_to(&mut self, to: Vector2F) {
        let (x, y) = self.map(to);
        self.shape.line_to(x, y);
    }

    fn quadratic_curve_to(&mut self, ctrl: Vector2F, to: Vector2F) {
        let (cx, cy) = self.map(ctrl);
        let (x, y) = self.map(to);
        self.shape.quad_to(cx, cy, x, y);
    }

    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
        let (c1x, c1y) = self.map(ctrl.from());
        let (c2x, c2y) = self.map(ctrl.to());
        let (x, y) = self.map(to);
        self.shape.cubic_to(c1x, c1y, c2x, c2y, x, y);
    }

    fn close(&mut self) {
        self.shape.close();
    }
}

fn place(label: &Label, extent: &TextExtent) -> (Placement, Rect) {
    let du = match label.h_align {
        HAlign::Left => 0.0,
        HAlign::Center => -extent.width / 2.0,
        HAlign::Right => -extent.width,
    };
    let dv = match label.v_align {
        VAlign::Top => extent.ascent,
        VAlign::Center => (extent.ascent - extent.descent) / 2.0,
        VAlign::Baseline => 0.0,
        VAlign::Bottom => -extent.descent,
    };
    let radians = label.rotation.to_radians();
    let (sin, cos) = radians.sin_cos();

    let anchor = Placement { origin_x: label.x, origin_y: label.y, cos, sin };
    let (origin_x, origin_y) = anchor.map(du, dv);
    let placement = Placement { origin_x, origin_y, cos, sin };

    let corners = [
        placement.map(0.0, -extent.ascent),
        placement.map(extent.width, -extent.ascent),
        placement.map(extent.width, extent.descent),
        placement.map(0.0, extent.descent),
    ];
    let mut bounds = Rect::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1);
    for (x, y) in &corners[1..] {
        bounds = bounds.union(&Rect::new(*x, *y, *x, *y));
    }
    (placement, bounds)
}

/// Box the label will occupy once drawn.
pub fn text_bounds(typeface: &Typeface, label: &Label) -> Result<Rect> {
    let extent = typeface.measure(label.text, label.size, label.weight)?;
    Ok(place(label, &extent).1)
}

pub fn draw_text(figure: &mut Figure, typeface: &Typeface, label: &Label) -> Result<Rect> {
    let extent = typeface.measure(label.text, label.size, label.weight)?;
    let (placement, bounds) = place(label, &extent);
    let shape = typeface.outline(label.text, label.size, label.weight, &placement)?;
    figure.fill(shape, label.color);
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{pdf, Command, Segment};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn estimated_extent_widens_cjk() {
        let extent = estimate_extent("ab中", 10.0);
        assert!(approx(extent.width, 22.0));
        assert!(approx(extent.ascent, 8.0));
    }

    #[test]
    fn centered_label_straddles_anchor() {
        let typeface = Typeface::without_fonts();
        let label = Label::new("abcd", 100.0, 50.0, 10.0).align(HAlign::Center, VAlign::Center);
        let bounds = text_bounds(&typeface, &label).unwrap();
        assert!(approx(bounds.x0, 88.0));
        assert!(approx(bounds.x1, 112.0));
        assert!(approx((bounds.y0 + bounds.y1) / 2.0, 50.0));
    }

    #[test]
    fn rotated_label_runs_upwards() {
        let typeface = Typeface::without_fonts();
        let label = Label::new("abcd", 100.0, 50.0, 10.0)
            .align(HAlign::Left, VAlign::Bottom)
            .rotated(90.0);
        let bounds = text_bounds(&typeface, &label).unwrap();
        assert!(approx(bounds.y1, 50.0));
        assert!(approx(bounds.y0, 26.0));
        assert!(approx(bounds.x1, 100.0));
        assert!(approx(bounds.x0, 90.0));
    }

    #[test]
    fn system_font_outlines_fit_measured_box() {
        let typeface = Typeface::load(None).unwrap();
        if !typeface.has_font() {
            return;
        }
        let label = Label::new("Times Square", 20.0, 60.0, 24.0);
        let expected = text_bounds(&typeface, &label).unwrap();
        let mut figure = Figure::new(4.0, 2.0);
        let drawn = draw_text(&mut figure, &typeface, &label).unwrap();
        assert_eq!(drawn, expected);

        let shape = match figure.commands.as_slice() {
            [Command::Fill { shape, .. }] => shape,
            other => panic!("expected a single fill, got {:?}", other),
        };
        assert!(shape.segments.iter().any(|segment| matches!(segment, Segment::QuadTo(..) | Segment::CubicTo(..))));
        let ink = shape.bounds().unwrap();
        let slack = 0.1 * label.size;
        assert!(ink.x0 >= expected.x0 - slack && ink.x1 <= expected.x1 + slack, "{:?} vs {:?}", ink, expected);
        assert!(ink.y0 >= expected.y0 - slack && ink.y1 <= expected.y1 + slack, "{:?} vs {:?}", ink, expected);

        let bytes = pdf::render(&figure, &figure.page(), "Times Square");
        let curves = String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.split_whitespace().last() == Some("c"))
            .count();
        assert!(curves > 0);
    }

    #[test]
    fn text_without_fonts_draws_nothing() {
        let typeface = Typeface::without_fonts();
        let mut figure = Figure::new(1.0, 1.0);
        let bounds = draw_text(&mut figure, &typeface, &Label::new("x", 10.0, 10.0, 12.0)).unwrap();
        assert!(figure.commands.is_empty());
        assert!(bounds.width() > 0.0);
    }
}
