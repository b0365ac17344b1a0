use std::{fs, path::{Path, PathBuf}};

use log::info;

use crate::{
    chart::{axes::Axes, pdf, raster, text::Typeface, Color, Figure, POINTS_PER_INCH},
    data::{nyc, BoroughBoundary, Landmark, MapCoords},
    errors::Result,
    UserConfig,
};

use super::Etl;

pub const ETL_NAME: &str = "static_map";
pub const PNG_FILE_NAME: &str = "nyc_static_map.png";
pub const PDF_FILE_NAME: &str = "nyc_static_map.pdf";
pub const TITLE: &str = "纽约市平面地图 - New York City Map";

const FIGURE_SIZE_IN: (f32, f32) = (12.0, 10.0);
const LNG_LIMITS: (f64, f64) = (-74.3, -73.7);
const LAT_LIMITS: (f64, f64) = (40.5, 40.9);
const TIGHT_PAD_IN: f32 = 0.1;

const POINT_SIZE: f32 = 8.0;
const LABEL_SIZE: f32 = 9.0;
const LABEL_OFFSET: (f32, f32) = (5.0, 5.0);
const TITLE_SIZE: f32 = 16.0;
const OUTLINE_WIDTH: f32 = 2.0;
const GRID_ALPHA: f32 = 0.3;

const POINT_COLOR: Color = Color::rgb(0xff, 0x00, 0x00);
const LABEL_BOX_COLOR: Color = Color { r: 0xff, g: 0xff, b: 0x00, alpha: 0.7 };

pub struct StaticDataset {
    pub landmarks: Vec<Landmark>,
    pub outlines: Vec<BoroughBoundary>,
}

/// Lays the static chart out into a display list. No I/O.
pub fn build_figure(dataset: &StaticDataset, typeface: &Typeface) -> Result<Figure> {
    let mut figure = Figure::new(FIGURE_SIZE_IN.0, FIGURE_SIZE_IN.1);
    let mut axes = Axes::new(&figure, typeface, LNG_LIMITS, LAT_LIMITS);

    axes.grid(&mut figure, GRID_ALPHA);

    for outline in &dataset.outlines {
        axes.plot_line(
            &mut figure,
            &outline.coordinates,
            outline.color.into(),
            OUTLINE_WIDTH,
            Some(outline.name.as_str()),
        );
    }

    for landmark in &dataset.landmarks {
        let coords = MapCoords::from(landmark);
        axes.plot_point(&mut figure, &coords, POINT_COLOR, POINT_SIZE);
        axes.annotate(
            &mut figure,
            landmark.chinese_name(),
            &coords,
            LABEL_OFFSET,
            LABEL_SIZE,
            LABEL_BOX_COLOR,
        )?;
    }

    axes.draw_axis(&mut figure)?;
    axes.set_title(&mut figure, TITLE, TITLE_SIZE)?;
    axes.set_xlabel(&mut figure, "经度 Longitude")?;
    axes.set_ylabel(&mut figure, "纬度 Latitude")?;
    axes.legend(&mut figure)?;

    Ok(figure)
}

pub struct StaticMapEtl {
    dpi: f32,
    typeface: Typeface,
}

impl StaticMapEtl {
    pub fn new(user_config: &UserConfig) -> Result<StaticMapEtl> {
        let font_path = user_config.font_path.as_ref().map(PathBuf::from);
        let typeface = Typeface::load(font_path.as_deref())?;
        Ok(StaticMapEtl::with_typeface(user_config.dpi, typeface))
    }

    pub fn with_typeface(dpi: f32, typeface: Typeface) -> StaticMapEtl {
        StaticMapEtl { dpi, typeface }
    }
}

impl Etl for StaticMapEtl {
    type Input = StaticDataset;
    type Output = Figure;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> Vec<&'static str> {
        vec![PNG_FILE_NAME, PDF_FILE_NAME]
    }

    fn extract(&mut self) -> Result<Self::Input> {
        Ok(StaticDataset {
            landmarks: nyc::static_landmarks(),
            outlines: nyc::static_borough_outlines(),
        })
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let figure = build_figure(&input, &self.typeface)?;
        info!(
            etl_name = ETL_NAME,
            commands = figure.commands.len(),
            with_text = self.typeface.has_font();
            "Laid out chart"
        );
        Ok(figure)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let bounds = output.tight_bounds(TIGHT_PAD_IN * POINTS_PER_INCH);

        let dt = raster::render(&output, &bounds, self.dpi)?;
        raster::write_png(&dt, &dir.join(PNG_FILE_NAME), self.dpi)?;

        fs::write(dir.join(PDF_FILE_NAME), pdf::render(&output, &bounds, TITLE))?;

        println!("静态地图已保存为 {} 和 {}", PNG_FILE_NAME, PDF_FILE_NAME);
        Ok(())
    }
}
