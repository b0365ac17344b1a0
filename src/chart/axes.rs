use crate::{data::MapCoords, errors::Result};

use super::{
    nice_ticks, tick_decimals,
    text::{draw_text, text_bounds, FontWeight, HAlign, Label, Typeface, VAlign},
    Color, Figure, Rect, Shape,
};

const MARGIN_LEFT: f32 = 80.0;
const MARGIN_RIGHT: f32 = 24.0;
const MARGIN_TOP: f32 = 48.0;
const MARGIN_BOTTOM: f32 = 60.0;

const TICK_LENGTH: f32 = 3.5;
const TICK_PAD: f32 = 3.5;
const TICK_LABEL_SIZE: f32 = 10.0;
const AXIS_LABEL_SIZE: f32 = 10.0;
const AXIS_LABEL_PAD: f32 = 4.0;
const TITLE_PAD: f32 = 6.0;
const SPINE_WIDTH: f32 = 0.8;
const MAX_TICK_INTERVALS: usize = 8;

const LEGEND_FONT_SIZE: f32 = 10.0;
const GRID_COLOR: Color = Color::rgb(0xb0, 0xb0, 0xb0);
const LEGEND_EDGE: Color = Color::rgb(0xcc, 0xcc, 0xcc);

struct LegendEntry {
    label: String,
    color: Color,
    width: f32,
}

/// A single plotting area inside a figure, mapping data coordinates
/// (longitude on x, latitude on y) onto the page.
pub struct Axes<'a> {
    frame: Rect,
    x_limits: (f64, f64),
    y_limits: (f64, f64),
    typeface: &'a Typeface,
    legend: Vec<LegendEntry>,
    tick_label_bounds: Option<Rect>,
}

impl<'a> Axes<'a> {
    pub fn new(figure: &Figure, typeface: &'a Typeface, x_limits: (f64, f64), y_limits: (f64, f64)) -> Self {
        Axes {
            frame: Rect::new(
                MARGIN_LEFT,
                MARGIN_TOP,
                figure.width - MARGIN_RIGHT,
                figure.height - MARGIN_BOTTOM,
            ),
            x_limits,
            y_limits,
            typeface,
            legend: Vec::new(),
            tick_label_bounds: None,
        }
    }

    fn project_x(&self, x: f64) -> f32 {
        let (min, max) = self.x_limits;
        self.frame.x0 + ((x - min) / (max - min)) as f32 * self.frame.width()
    }

    fn project_y(&self, y: f64) -> f32 {
        let (min, max) = self.y_limits;
        self.frame.y1 - ((y - min) / (max - min)) as f32 * self.frame.height()
    }

    pub fn project(&self, coords: &MapCoords) -> (f32, f32) {
        (self.project_x(coords.lng), self.project_y(coords.lat))
    }

    fn ticks(limits: (f64, f64)) -> (Vec<f64>, usize) {
        let ticks = nice_ticks(limits.0, limits.1, MAX_TICK_INTERVALS);
        let decimals = match ticks.as_slice() {
            [first, second, ..] => tick_decimals(second - first),
            _ => 0,
        };
        (ticks, decimals)
    }

    pub fn grid(&self, figure: &mut Figure, alpha: f32) {
        let color = GRID_COLOR.with_alpha(alpha);
        for x in Self::ticks(self.x_limits).0 {
            let px = self.project_x(x);
            figure.stroke(Shape::polyline(&[(px, self.frame.y0), (px, self.frame.y1)]), color, SPINE_WIDTH);
        }
        for y in Self::ticks(self.y_limits).0 {
            let py = self.project_y(y);
            figure.stroke(Shape::polyline(&[(self.frame.x0, py), (self.frame.x1, py)]), color, SPINE_WIDTH);
        }
    }

    fn remember_tick_label(&mut self, bounds: Rect) {
        self.tick_label_bounds = Some(match self.tick_label_bounds {
            Some(previous) => previous.union(&bounds),
            None => bounds,
        });
    }

    /// Frame, outward tick marks and tick labels.
    pub fn draw_axis(&mut self, figure: &mut Figure) -> Result<()> {
        figure.stroke(Shape::rect(&self.frame), Color::BLACK, SPINE_WIDTH);

        let (x_ticks, x_decimals) = Self::ticks(self.x_limits);
        for x in x_ticks {
            let px = self.project_x(x);
            let y = self.frame.y1;
            figure.stroke(Shape::polyline(&[(px, y), (px, y + TICK_LENGTH)]), Color::BLACK, SPINE_WIDTH);
            let text = format!("{:.*}", x_decimals, x);
            let label = Label::new(&text, px, y + TICK_LENGTH + TICK_PAD, TICK_LABEL_SIZE)
                .align(HAlign::Center, VAlign::Top);
            let bounds = draw_text(figure, self.typeface, &label)?;
            self.remember_tick_label(bounds);
        }

        let (y_ticks, y_decimals) = Self::ticks(self.y_limits);
        for y in y_ticks {
            let py = self.project_y(y);
            let x = self.frame.x0;
            figure.stroke(Shape::polyline(&[(x - TICK_LENGTH, py), (x, py)]), Color::BLACK, SPINE_WIDTH);
            let text = format!("{:.*}", y_decimals, y);
            let label = Label::new(&text, x - TICK_LENGTH - TICK_PAD, py, TICK_LABEL_SIZE)
                .align(HAlign::Right, VAlign::Center);
            let bounds = draw_text(figure, self.typeface, &label)?;
            self.remember_tick_label(bounds);
        }
        Ok(())
    }

    /// Filled circle of `size` points diameter.
    pub fn plot_point(&self, figure: &mut Figure, coords: &MapCoords, color: Color, size: f32) {
        let (x, y) = self.project(coords);
        let circle = Shape::circle(x, y, size / 2.0);
        figure.fill(circle.clone(), color);
        figure.stroke(circle, color, 1.0);
    }

    pub fn plot_line(&mut self, figure: &mut Figure, coords: &[MapCoords], color: Color, width: f32, label: Option<&str>) {
        let points: Vec<(f32, f32)> = coords.iter().map(|c| self.project(c)).collect();
        figure.stroke(Shape::polyline(&points), color, width);
        if let Some(label) = label {
            self.legend.push(LegendEntry {
                label: label.to_string(),
                color,
                width,
            });
        }
    }

    /// Text offset from a data point by `offset` points (x right, y up) on a rounded box.
    pub fn annotate(
        &self,
        figure: &mut Figure,
        text: &str,
        coords: &MapCoords,
        offset: (f32, f32),
        size: f32,
        box_color: Color,
    ) -> Result<()> {
        let (x, y) = self.project(coords);
        let label = Label::new(text, x + offset.0, y - offset.1, size);
        let pad = 0.2 * size;
        let frame = text_bounds(self.typeface, &label)?.inflate(pad);
        let background = Shape::rounded_rect(&frame, pad);
        figure.fill(background.clone(), box_color);
        figure.stroke(background, Color::BLACK.with_alpha(box_color.alpha), 1.0);
        draw_text(figure, self.typeface, &label)?;
        Ok(())
    }

    pub fn set_title(&self, figure: &mut Figure, title: &str, size: f32) -> Result<()> {
        let center = (self.frame.x0 + self.frame.x1) / 2.0;
        let label = Label::new(title, center, self.frame.y0 - TITLE_PAD, size)
            .align(HAlign::Center, VAlign::Bottom)
            .bold();
        draw_text(figure, self.typeface, &label)?;
        Ok(())
    }

    /// Must follow [`Axes::draw_axis`] so the label clears the tick labels.
    pub fn set_xlabel(&self, figure: &mut Figure, text: &str) -> Result<()> {
        let top = self.tick_label_bounds
            .map(|bounds| bounds.y1)
            .unwrap_or(self.frame.y1 + TICK_LENGTH + TICK_PAD)
            .max(self.frame.y1);
        let center = (self.frame.x0 + self.frame.x1) / 2.0;
        let label = Label::new(text, center, top + AXIS_LABEL_PAD, AXIS_LABEL_SIZE)
            .align(HAlign::Center, VAlign::Top);
        draw_text(figure, self.typeface, &label)?;
        Ok(())
    }

    /// Must follow [`Axes::draw_axis`] so the label clears the tick labels.
    pub fn set_ylabel(&self, figure: &mut Figure, text: &str) -> Result<()> {
        let right = self.tick_label_bounds
            .map(|bounds| bounds.x0)
            .unwrap_or(self.frame.x0 - TICK_LENGTH - TICK_PAD)
            .min(self.frame.x0);
        let middle = (self.frame.y0 + self.frame.y1) / 2.0;
        let label = Label::new(text, right - AXIS_LABEL_PAD, middle, AXIS_LABEL_SIZE)
            .align(HAlign::Center, VAlign::Bottom)
            .rotated(90.0);
        draw_text(figure, self.typeface, &label)?;
        Ok(())
    }

    /// Upper-right legend listing every labelled line.
    pub fn legend(&self, figure: &mut Figure) -> Result<()> {
        if self.legend.is_empty() {
            return Ok(());
        }
        let size = LEGEND_FONT_SIZE;
        let border_pad = 0.4 * size;
        let handle_length = 2.0 * size;
        let handle_pad = 0.8 * size;
        let axes_pad = 0.5 * size;

        let mut label_width: f32 = 0.0;
        let mut row_height: f32 = 0.0;
        for entry in &self.legend {
            let extent = self.typeface.measure(&entry.label, size, FontWeight::Regular)?;
            label_width = label_width.max(extent.width);
            row_height = row_height.max(extent.ascent + extent.descent);
        }
        let row_step = row_height + 0.5 * size;
        let rows = self.legend.len() as f32;
        let width = 2.0 * border_pad + handle_length + handle_pad + label_width;
        let height = 2.0 * border_pad + rows * row_step - 0.5 * size;

        let x1 = self.frame.x1 - axes_pad;
        let y0 = self.frame.y0 + axes_pad;
        let frame = Rect::new(x1 - width, y0, x1, y0 + height);
        let background = Shape::rounded_rect(&frame, 0.2 * size);
        figure.fill(background.clone(), Color::WHITE.with_alpha(0.8));
        figure.stroke(background, LEGEND_EDGE.with_alpha(0.8), 1.0);

        for (row, entry) in self.legend.iter().enumerate() {
            let center_y = frame.y0 + border_pad + row as f32 * row_step + row_height / 2.0;
            let handle_x = frame.x0 + border_pad;
            figure.stroke(
                Shape::polyline(&[(handle_x, center_y), (handle_x + handle_length, center_y)]),
                entry.color,
                entry.width,
            );
            let label = Label::new(&entry.label, handle_x + handle_length + handle_pad, center_y, size)
                .align(HAlign::Left, VAlign::Center);
            draw_text(figure, self.typeface, &label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(typeface: &Typeface) -> (Figure, Axes<'_>) {
        let figure = Figure::new(12.0, 10.0);
        let axes = Axes::new(&figure, typeface, (-74.3, -73.7), (40.5, 40.9));
        (figure, axes)
    }

    #[test]
    fn limits_map_to_frame_corners() {
        let typeface = Typeface::without_fonts();
        let (_, axes) = axes(&typeface);
        let frame = axes.frame;
        let (x, y) = axes.project(&MapCoords::new(40.5, -74.3));
        assert!((x - frame.x0).abs() < 1e-3 && (y - frame.y1).abs() < 1e-3);
        let (x, y) = axes.project(&MapCoords::new(40.9, -73.7));
        assert!((x - frame.x1).abs() < 1e-3 && (y - frame.y0).abs() < 1e-3);
    }

    #[test]
    fn labelled_lines_feed_the_legend() {
        let typeface = Typeface::without_fonts();
        let (mut figure, mut axes) = axes(&typeface);
        let ring = [MapCoords::new(40.6, -74.0), MapCoords::new(40.7, -74.0)];
        axes.plot_line(&mut figure, &ring, Color::rgb(0, 0, 255), 2.0, Some("曼哈顿"));
        axes.plot_line(&mut figure, &ring, Color::rgb(0, 128, 0), 2.0, None);
        assert_eq!(axes.legend.len(), 1);

        let before = figure.commands.len();
        axes.legend(&mut figure).unwrap();
        // background fill, background edge, one handle
        assert_eq!(figure.commands.len(), before + 3);
    }

    #[test]
    fn axis_labels_clear_tick_labels() {
        let typeface = Typeface::without_fonts();
        let (mut figure, mut axes) = axes(&typeface);
        axes.draw_axis(&mut figure).unwrap();
        let ticks = axes.tick_label_bounds.unwrap();
        assert!(ticks.y1 > axes.frame.y1);
        assert!(ticks.x0 < axes.frame.x0);
    }

    #[test]
    fn annotation_draws_box_behind_point() {
        let typeface = Typeface::without_fonts();
        let (mut figure, axes) = axes(&typeface);
        let yellow = Color::rgb(0xff, 0xff, 0x00).with_alpha(0.7);
        axes.annotate(&mut figure, "时代广场", &MapCoords::new(40.7589, -73.9851), (5.0, 5.0), 9.0, yellow).unwrap();
        match &figure.commands[0] {
            crate::chart::Command::Fill { color, .. } => assert_eq!(*color, yellow),
            other => panic!("unexpected first command {:?}", other),
        }
    }
}
