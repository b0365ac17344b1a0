use std::path::Path;

use log::{info, warn};

use crate::{
    data::{nyc, BoroughBoundary, Landmark, MapCoords},
    errors::Result,
    leaflet::{LayerControl, LeafletMap, TileProvider},
};

use super::Etl;

pub const ETL_NAME: &str = "interactive_map";
pub const OUTPUT_FILE_NAME: &str = "nyc_interactive_map.html";
pub const TITLE: &str = "纽约市地图 - New York City Map";

pub struct MapDataset {
    pub landmarks: Vec<Landmark>,
    pub boroughs: Vec<BoroughBoundary>,
}

fn title_banner() -> String {
    format!(
        "<h3 align=\"center\" style=\"font-size:20px\"><b>{}</b></h3>",
        quick_xml::escape::escape(TITLE),
    )
}

/// The full web map: landmark markers, borough polygons, extra tile layers,
/// a layer switcher and the title banner.
pub fn create_nyc_map(dataset: &MapDataset) -> Result<LeafletMap> {
    let mut map = LeafletMap::new(nyc::CENTER, nyc::ZOOM_START, TileProvider::OpenStreetMap)?;

    for landmark in &dataset.landmarks {
        map.add_marker(MapCoords::from(landmark), &landmark.name, landmark.color)?;
    }
    for borough in &dataset.boroughs {
        if !borough.is_closed() {
            warn!(etl_name = ETL_NAME, borough = borough.name.as_str(); "Borough ring is not closed");
        }
        map.add_polygon(&borough.coordinates, &borough.name, borough.color)?;
    }

    map.add_tile_layer(TileProvider::StamenTerrain.layer());
    map.add_tile_layer(TileProvider::CartoDbPositron.layer());
    map.add_layer_control(LayerControl::default());
    map.add_html(&title_banner());

    Ok(map)
}

pub struct InteractiveMapEtl {
}

impl InteractiveMapEtl {
    pub fn new() -> InteractiveMapEtl {
        InteractiveMapEtl {}
    }
}

impl Etl for InteractiveMapEtl {
    type Input = MapDataset;
    type Output = LeafletMap;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> Vec<&'static str> {
        vec![OUTPUT_FILE_NAME]
    }

    fn extract(&mut self) -> Result<Self::Input> {
        Ok(MapDataset {
            landmarks: nyc::landmarks(),
            boroughs: nyc::borough_boundaries(),
        })
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let map = create_nyc_map(&input)?;
        info!(
            etl_name = ETL_NAME,
            markers = map.markers.len(),
            polygons = map.polygons.len(),
            tile_layers = map.tile_layers.len();
            "Built web map"
        );
        Ok(map)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        output.save(&dir.join(OUTPUT_FILE_NAME))
    }
}
