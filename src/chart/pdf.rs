use log::debug;
use pdf_writer::{
    types::{LineCapStyle, LineJoinStyle},
    Content, Finish, Name, Pdf, Ref, TextStr,
};

use super::{Color, Command, Figure, Rect, Segment, Shape};

const CATALOG_ID: i32 = 1;
const PAGES_ID: i32 = 2;
const PAGE_ID: i32 = 3;
const CONTENT_ID: i32 = 4;
const INFO_ID: i32 = 5;
const FIRST_STATE_ID: i32 = 6;

/// PDF page space: points, origin at the bottom left of `bounds`.
struct Projection {
    origin_x: f32,
    top: f32,
}

impl Projection {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.origin_x, self.top - y)
    }
}

fn channel(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Control points of the cubic that traces the same curve as a quadratic.
fn elevate(from: (f32, f32), ctrl: (f32, f32), to: (f32, f32)) -> ((f32, f32), (f32, f32)) {
    (
        (from.0 + 2.0 / 3.0 * (ctrl.0 - from.0), from.1 + 2.0 / 3.0 * (ctrl.1 - from.1)),
        (to.0 + 2.0 / 3.0 * (ctrl.0 - to.0), to.1 + 2.0 / 3.0 * (ctrl.1 - to.1)),
    )
}

#[derive(Default)]
struct GraphicsStates {
    alphas: Vec<u16>,
}

impl GraphicsStates {
    // Keyed by thousandths so equal alphas share one entry.
    fn name_for(&mut self, alpha: f32) -> String {
        let key = (alpha * 1000.0).round() as u16;
        let index = match self.alphas.iter().position(|existing| *existing == key) {
            Some(index) => index,
            None => {
                self.alphas.push(key);
                self.alphas.len() - 1
            },
        };
        format!("GS{}", index)
    }

    fn entries(&self) -> impl Iterator<Item = (String, Ref, f32)> + '_ {
        self.alphas.iter().enumerate().map(|(index, key)| {
            (format!("GS{}", index), Ref::new(FIRST_STATE_ID + index as i32), *key as f32 / 1000.0)
        })
    }
}

fn write_path(content: &mut Content, shape: &Shape, projection: &Projection) {
    let mut current = (0.0, 0.0);
    let mut start = (0.0, 0.0);
    for segment in &shape.segments {
        match *segment {
            Segment::MoveTo(x, y) => {
                current = projection.point(x, y);
                start = current;
                content.move_to(current.0, current.1);
            },
            Segment::LineTo(x, y) => {
                current = projection.point(x, y);
                content.line_to(current.0, current.1);
            },
            Segment::QuadTo(cx, cy, x, y) => {
                let to = projection.point(x, y);
                let (c1, c2) = elevate(current, projection.point(cx, cy), to);
                content.cubic_to(c1.0, c1.1, c2.0, c2.1, to.0, to.1);
                current = to;
            },
            Segment::CubicTo(c1x, c1y, c2x, c2y, x, y) => {
                let (a, b) = projection.point(c1x, c1y);
                let (c, d) = projection.point(c2x, c2y);
                current = projection.point(x, y);
                content.cubic_to(a, b, c, d, current.0, current.1);
            },
            Segment::Close => {
                content.close_path();
                current = start;
            },
        }
    }
}

fn set_alpha(content: &mut Content, states: &mut GraphicsStates, color: &Color) {
    if color.alpha < 1.0 {
        let name = states.name_for(color.alpha);
        content.set_parameters(Name(name.as_bytes()));
    }
}

fn content_stream(figure: &Figure, bounds: &Rect, states: &mut GraphicsStates) -> Vec<u8> {
    let projection = Projection { origin_x: bounds.x0, top: bounds.y1 };
    let mut content = Content::new();

    // White page background, like the raster output.
    content.set_fill_rgb(1.0, 1.0, 1.0);
    content.rect(0.0, 0.0, bounds.width(), bounds.height());
    content.fill_nonzero();

    for command in &figure.commands {
        content.save_state();
        match command {
            Command::Fill { shape, color } => {
                set_alpha(&mut content, states, color);
                content.set_fill_rgb(channel(color.r), channel(color.g), channel(color.b));
                write_path(&mut content, shape, &projection);
                content.fill_nonzero();
            },
            Command::Stroke { shape, color, width, dash } => {
                set_alpha(&mut content, states, color);
                content.set_stroke_rgb(channel(color.r), channel(color.g), channel(color.b));
                content.set_line_width(*width);
                content.set_line_cap(LineCapStyle::ProjectingSquareCap);
                content.set_line_join(LineJoinStyle::RoundJoin);
                if !dash.is_empty() {
                    content.set_dash_pattern(dash.iter().copied(), 0.0);
                }
                write_path(&mut content, shape, &projection);
                content.stroke();
            },
        }
        content.restore_state();
    }
    content.finish()
}

/// Serializes the part of `figure` inside `bounds` as a one-page PDF.
pub fn render(figure: &Figure, bounds: &Rect, title: &str) -> Vec<u8> {
    let mut states = GraphicsStates::default();
    let content = content_stream(figure, bounds, &mut states);
    debug!(commands = figure.commands.len(), bytes = content.len(); "Serialized PDF content stream");

    let pages_id = Ref::new(PAGES_ID);
    let page_id = Ref::new(PAGE_ID);
    let content_id = Ref::new(CONTENT_ID);

    let mut pdf = Pdf::new();
    pdf.catalog(Ref::new(CATALOG_ID)).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(pdf_writer::Rect::new(0.0, 0.0, bounds.width(), bounds.height()));
    page.parent(pages_id);
    page.contents(content_id);
    let mut resources = page.resources();
    let mut ext_states = resources.ext_g_states();
    for (name, id, _) in states.entries() {
        ext_states.pair(Name(name.as_bytes()), id);
    }
    ext_states.finish();
    resources.finish();
    page.finish();

    for (_, id, alpha) in states.entries() {
        pdf.ext_graphics(id).stroking_alpha(alpha).non_stroking_alpha(alpha);
    }

    pdf.stream(content_id, &content);
    pdf.document_info(Ref::new(INFO_ID)).title(TextStr(title)).producer(TextStr("nyc_map"));
    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_figure() -> Figure {
        let mut figure = Figure::new(2.0, 1.0);
        figure.fill(Shape::circle(20.0, 20.0, 5.0), Color::rgb(0xff, 0, 0));
        figure.stroke(Shape::polyline(&[(0.0, 0.0), (50.0, 10.0)]), Color::rgb(0, 0, 0xff).with_alpha(0.3), 2.0);
        figure.fill(Shape::rect(&Rect::new(30.0, 30.0, 40.0, 40.0)), Color::BLACK.with_alpha(0.3));
        figure
    }

    fn count_operator(content: &str, operator: &str) -> usize {
        content.lines()
            .filter(|line| line.split_whitespace().last() == Some(operator))
            .count()
    }

    #[test]
    fn document_structure_is_complete() {
        let figure = sample_figure();
        let bytes = render(&figure, &figure.page(), "纽约市平面地图");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/MediaBox"));
        assert!(text.contains("/ExtGState"));
        assert!(text.trim_end().ends_with("%%EOF"));
        // catalog, page tree, page, content, info and one shared graphics state
        assert_eq!(text.matches(" 0 obj").count(), 6);
    }

    #[test]
    fn startxref_points_at_the_table() {
        let figure = sample_figure();
        let bytes = render(&figure, &figure.page(), "Test");
        let text = String::from_utf8_lossy(&bytes).to_string();
        let xref_start: usize = text
            .rsplit("startxref").next().unwrap()
            .trim()
            .lines().next().unwrap()
            .parse().unwrap();
        assert!(bytes[xref_start..].starts_with(b"xref"));
    }

    #[test]
    fn equal_alphas_share_a_graphics_state() {
        let figure = sample_figure();
        let mut states = GraphicsStates::default();
        let content = content_stream(&figure, &figure.page(), &mut states);
        let content = String::from_utf8(content).unwrap();
        assert_eq!(states.alphas, vec![300]);
        assert_eq!(content.matches("/GS0 gs").count(), 2);
        assert_eq!(count_operator(&content, "S"), 1);
        // background plus two fills
        assert_eq!(count_operator(&content, "f"), 3);
    }

    #[test]
    fn quadratic_segments_become_cubics() {
        let mut figure = Figure::new(1.0, 1.0);
        let mut shape = Shape::new();
        shape.move_to(0.0, 0.0);
        shape.quad_to(30.0, 0.0, 30.0, 30.0);
        shape.close();
        figure.fill(shape, Color::BLACK);

        let content = content_stream(&figure, &figure.page(), &mut GraphicsStates::default());
        let content = String::from_utf8(content).unwrap();
        assert_eq!(count_operator(&content, "c"), 1);
        assert_eq!(count_operator(&content, "h"), 1);
    }

    #[test]
    fn elevated_controls_sit_two_thirds_towards_the_quadratic_control() {
        let approx = |a: (f32, f32), b: (f32, f32)| (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4;
        let (c1, c2) = elevate((0.0, 0.0), (30.0, 0.0), (30.0, 30.0));
        assert!(approx(c1, (20.0, 0.0)), "{:?}", c1);
        assert!(approx(c2, (30.0, 10.0)), "{:?}", c2);
    }

    #[test]
    fn y_axis_is_flipped() {
        let projection = Projection { origin_x: 10.0, top: 100.0 };
        assert_eq!(projection.point(10.0, 100.0), (0.0, 0.0));
        assert_eq!(projection.point(20.0, 0.0), (10.0, 100.0));
    }
}
