use std::{fs::File, io::BufWriter, path::Path};

use log::debug;
use png::{BitDepth, ColorType, PixelDimensions, Unit};
use raqote::{DrawOptions, DrawTarget, LineCap, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};

use crate::errors::Result;

use super::{Color, Command, Figure, Rect, Segment, Shape, POINTS_PER_INCH};

const INCHES_PER_METER: f32 = 39.370_08;

/// Rasterizes the part of `figure` inside `bounds` at `dpi`, on white.
pub fn render(figure: &Figure, bounds: &Rect, dpi: f32) -> Result<DrawTarget> {
    let scale = dpi / POINTS_PER_INCH;
    let width: i32 = ((bounds.width() * scale).ceil() as i64).max(1).try_into()?;
    let height: i32 = ((bounds.height() * scale).ceil() as i64).max(1).try_into()?;
    debug!(width = width, height = height, dpi = dpi; "Rasterizing figure");

    let mut dt = DrawTarget::new(width, height);
    dt.clear(SolidSource::from_unpremultiplied_argb(
        0xff, 0xff, 0xff, 0xff,
    ));

    let projection = Projection { origin_x: bounds.x0, origin_y: bounds.y0, scale };
    let draw_options = DrawOptions::new();
    for command in &figure.commands {
        match command {
            Command::Fill { shape, color } => {
                dt.fill(&projection.path(shape), &source(color), &draw_options);
            },
            Command::Stroke { shape, color, width, dash } => {
                dt.stroke(
                    &projection.path(shape),
                    &source(color),
                    &stroke(width * scale, dash.iter().map(|d| d * scale).collect()),
                    &draw_options,
                );
            },
        }
    }
    Ok(dt)
}

struct Projection {
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl Projection {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.origin_x) * self.scale, (y - self.origin_y) * self.scale)
    }

    fn path(&self, shape: &Shape) -> raqote::Path {
        let mut pb = PathBuilder::new();
        for segment in &shape.segments {
            match *segment {
                Segment::MoveTo(x, y) => {
                    let (x, y) = self.point(x, y);
                    pb.move_to(x, y);
                },
                Segment::LineTo(x, y) => {
                    let (x, y) = self.point(x, y);
                    pb.line_to(x, y);
                },
                Segment::QuadTo(cx, cy, x, y) => {
                    let (cx, cy) = self.point(cx, cy);
                    let (x, y) = self.point(x, y);
                    pb.quad_to(cx, cy, x, y);
                },
                Segment::CubicTo(c1x, c1y, c2x, c2y, x, y) => {
                    let (c1x, c1y) = self.point(c1x, c1y);
                    let (c2x, c2y) = self.point(c2x, c2y);
                    let (x, y) = self.point(x, y);
                    pb.cubic_to(c1x, c1y, c2x, c2y, x, y);
                },
                Segment::Close => pb.close(),
            }
        }
        pb.finish()
    }
}

fn source(color: &Color) -> Source<'static> {
    Source::Solid(SolidSource::from_unpremultiplied_argb(
        color.alpha_byte(), color.r, color.g, color.b,
    ))
}

fn stroke(width: f32, dash_array: Vec<f32>) -> StrokeStyle {
    StrokeStyle {
        cap: LineCap::Square,
        join: LineJoin::Round,
        width,
        miter_limit: 2.0,
        dash_array,
        dash_offset: 0.0,
    }
}

/// RGBA8 with alpha un-premultiplied, as PNG expects.
fn to_rgba(dt: &DrawTarget) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(dt.get_data().len() * 4);
    for pixel in dt.get_data() {
        let a = (pixel >> 24) & 0xff;
        let unpremultiply = |channel: u32| -> u8 {
            if a == 0 {
                0
            } else {
                ((channel * 255 + a / 2) / a).min(255) as u8
            }
        };
        rgba.push(unpremultiply((pixel >> 16) & 0xff));
        rgba.push(unpremultiply((pixel >> 8) & 0xff));
        rgba.push(unpremultiply(pixel & 0xff));
        rgba.push(a as u8);
    }
    rgba
}

/// Writes `dt` as an 8-bit RGBA PNG with the resolution stored in the pHYs chunk.
pub fn write_png(dt: &DrawTarget, path: &Path, dpi: f32) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(
        writer,
        dt.width().try_into()?,
        dt.height().try_into()?,
    );
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    let pixels_per_meter = (dpi * INCHES_PER_METER).round() as u32;
    encoder.set_pixel_dims(Some(PixelDimensions {
        xppu: pixels_per_meter,
        yppu: pixels_per_meter,
        unit: Unit::Meter,
    }));

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&to_rgba(dt))?;
    png_writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_square_figure() -> Figure {
        let mut figure = Figure::new(1.0, 1.0);
        figure.fill(Shape::rect(&Rect::new(10.0, 10.0, 20.0, 20.0)), Color::rgb(0xff, 0, 0));
        figure
    }

    #[test]
    fn canvas_covers_bounds_at_dpi() {
        let figure = red_square_figure();
        let bounds = figure.tight_bounds(0.0);
        let dt = render(&figure, &bounds, 144.0).unwrap();
        assert_eq!((dt.width(), dt.height()), (20, 20));
    }

    #[test]
    fn shapes_land_inside_the_crop() {
        let figure = red_square_figure();
        let bounds = Rect::new(0.0, 0.0, 30.0, 30.0);
        let dt = render(&figure, &bounds, 72.0).unwrap();
        let at = |x: i32, y: i32| dt.get_data()[(y * dt.width() + x) as usize];
        assert_eq!(at(15, 15), 0xffff0000);
        assert_eq!(at(2, 2), 0xffffffff);
    }

    #[test]
    fn png_records_resolution() {
        let figure = red_square_figure();
        let dt = render(&figure, &figure.tight_bounds(2.0), 300.0).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.png");
        write_png(&dt, &path, 300.0).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!(info.width, dt.width() as u32);
        let dims = info.pixel_dims.unwrap();
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.unit, Unit::Meter);
    }

    #[test]
    fn unpremultiplies_translucent_pixels() {
        let mut dt = DrawTarget::new(1, 1);
        dt.get_data_mut()[0] = 0x80400000;
        let rgba = to_rgba(&dt);
        assert_eq!(rgba, vec![0x80, 0x00, 0x00, 0x80]);
    }
}
